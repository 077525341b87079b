use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;

use haiku_db::models::{AuthorRow, HaikuRow, VoteRow};
use haiku_types::models::{Author, Haiku, Vote};

/// Store timestamps are RFC 3339; rows written by hand through the sqlite
/// shell may carry `datetime('now')` output instead.
fn parse_timestamp(raw: &str, what: &str, id: i64) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc()))
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}' on {} {}: {}", raw, what, id, e);
            DateTime::default()
        })
}

/// Drops the password hash.
pub fn author_from_row(row: AuthorRow) -> Author {
    Author {
        created: parse_timestamp(&row.created, "author", row.id),
        id: row.id,
        username: row.username,
        email: row.email,
    }
}

pub fn haiku_from_row(row: HaikuRow) -> Haiku {
    Haiku {
        created: parse_timestamp(&row.created, "haiku", row.id),
        id: row.id,
        text: row.text,
        tags: row.tags,
        rating: row.rating,
        author_id: row.author_id,
    }
}

pub fn vote_from_row(row: VoteRow) -> Vote {
    Vote {
        voted_timestamp: parse_timestamp(&row.voted_timestamp, "vote", row.id),
        id: row.id,
        upvoted: row.upvoted,
        author_id: row.author_id,
        haiku_id: row.haiku_id,
    }
}
