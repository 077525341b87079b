use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered author as seen by everything outside the store.
/// The password hash never leaves `haiku-db`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub created: DateTime<Utc>,
}

/// Haikus keep the field names existing clients already read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Haiku {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "Text")]
    pub text: String,
    #[serde(rename = "Tags")]
    pub tags: String,
    #[serde(rename = "Rating")]
    pub rating: i64,
    #[serde(rename = "Created")]
    pub created: DateTime<Utc>,
    #[serde(rename = "AuthorID")]
    pub author_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub id: i64,
    pub upvoted: bool,
    pub voted_timestamp: DateTime<Utc>,
    pub author_id: i64,
    pub haiku_id: i64,
}
