use rusqlite::ErrorCode;
use rusqlite::ffi;
use thiserror::Error;

/// Store failures, classified here so callers never look at SQLite's
/// message text.
#[derive(Debug, Error)]
pub enum StoreError {
    /// UNIQUE or PRIMARY KEY violation. `constraint` holds the offending
    /// column names, e.g. `username`.
    #[error("unique constraint violated on {constraint}")]
    ConstraintViolation { constraint: String },

    #[error("foreign key constraint violated")]
    ReferenceViolation,

    #[error("database connection lock poisoned")]
    Poisoned,

    #[error(transparent)]
    Sqlite(rusqlite::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(ref err, ref msg) = e {
            if err.code == ErrorCode::ConstraintViolation {
                match err.extended_code {
                    ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                        return Self::ConstraintViolation {
                            constraint: constraint_columns(msg.as_deref()),
                        };
                    }
                    ffi::SQLITE_CONSTRAINT_FOREIGNKEY => return Self::ReferenceViolation,
                    _ => {}
                }
            }
        }
        Self::Sqlite(e)
    }
}

/// Pulls the column list out of SQLite's
/// `UNIQUE constraint failed: authors.username` diagnostic.
fn constraint_columns(msg: Option<&str>) -> String {
    let Some(detail) = msg.and_then(|m| m.split_once("constraint failed: ")).map(|(_, d)| d)
    else {
        return "unknown".to_string();
    };

    detail
        .split(',')
        .map(|qualified| {
            let qualified = qualified.trim();
            qualified
                .rsplit_once('.')
                .map_or(qualified, |(_, column)| column)
        })
        .collect::<Vec<_>>()
        .join(", ")
}
