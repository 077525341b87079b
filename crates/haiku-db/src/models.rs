//! Database row types. These map directly to SQLite rows and stay distinct
//! from the `haiku-types` models so the store layer stays independent.

pub struct AuthorRow {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub email: Option<String>,
    pub created: String,
}

pub struct HaikuRow {
    pub id: i64,
    pub text: String,
    pub tags: String,
    pub rating: i64,
    pub created: String,
    pub author_id: i64,
}

#[derive(Debug, Clone)]
pub struct VoteRow {
    pub id: i64,
    pub upvoted: bool,
    pub voted_timestamp: String,
    pub author_id: i64,
    pub haiku_id: i64,
}

/// What an upsert did to the `(author_id, haiku_id)` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteChange {
    Inserted,
    Flipped,
    Unchanged,
}
