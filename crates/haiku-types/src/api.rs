use serde::{Deserialize, Serialize};

use crate::models::Haiku;

// -- Authors --

#[derive(Debug, Deserialize)]
pub struct RegisterAuthorRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterAuthorResponse {
    pub username: String,
    pub email: String,
}

// -- Haikus --

#[derive(Debug, Deserialize)]
pub struct PutHaikuRequest {
    pub text: String,
    #[serde(default)]
    pub tags: String,
}

#[derive(Debug, Serialize)]
pub struct HaikuResponse {
    pub haiku: Haiku,
}

#[derive(Debug, Deserialize)]
pub struct ListHaikusRequest {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub skip: i64,
}

impl Default for ListHaikusRequest {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            skip: 0,
        }
    }
}

fn default_limit() -> i64 {
    100
}

#[derive(Debug, Serialize)]
pub struct ListHaikusResponse {
    pub haikus: Vec<Haiku>,
}

#[derive(Debug, Serialize)]
pub struct DeleteHaikuResponse {
    #[serde(rename = "haikuID")]
    pub haiku_id: i64,
}

// -- Votes --

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    #[serde(rename = "haikuId")]
    pub haiku_id: String,
    pub direction: i64,
}

#[derive(Debug, Serialize)]
pub struct VoteResponse {
    #[serde(rename = "voteID")]
    pub vote_id: i64,
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorsResponse {
    pub errors: Vec<String>,
}
