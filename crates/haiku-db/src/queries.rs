use crate::models::{AuthorRow, HaikuRow};
use crate::{Database, StoreError, now_timestamp};
use rusqlite::{Connection, Row};

impl Database {
    // -- Authors --

    pub fn create_author(
        &self,
        username: &str,
        password_hash: &str,
        email: Option<&str>,
    ) -> Result<AuthorRow, StoreError> {
        self.with_conn_mut(|conn| {
            let row = conn.query_row(
                "INSERT INTO authors (username, password_hash, email, created)
                 VALUES (?1, ?2, ?3, ?4)
                 RETURNING id, username, password_hash, email, created",
                rusqlite::params![username, password_hash, email, now_timestamp()],
                author_from_row,
            )?;
            Ok(row)
        })
    }

    pub fn get_author_by_username(&self, username: &str) -> Result<Option<AuthorRow>, StoreError> {
        self.with_conn(|conn| query_author_by_username(conn, username))
    }

    // -- Haikus --

    pub fn insert_haiku(
        &self,
        text: &str,
        tags: &str,
        author_id: i64,
    ) -> Result<HaikuRow, StoreError> {
        self.with_conn_mut(|conn| {
            let row = conn.query_row(
                "INSERT INTO haikus (text, tags, rating, created, author_id)
                 VALUES (?1, ?2, 0, ?3, ?4)
                 RETURNING id, text, tags, rating, created, author_id",
                rusqlite::params![text, tags, now_timestamp(), author_id],
                haiku_from_row,
            )?;
            Ok(row)
        })
    }

    pub fn get_haiku(&self, id: i64) -> Result<Option<HaikuRow>, StoreError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, text, tags, rating, created, author_id FROM haikus WHERE id = ?1",
                [id],
                haiku_from_row,
            )
            .optional()
        })
    }

    pub fn list_haikus(&self, limit: u32, skip: u32) -> Result<Vec<HaikuRow>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, text, tags, rating, created, author_id
                 FROM haikus
                 ORDER BY id ASC
                 LIMIT ?1 OFFSET ?2",
            )?;

            let rows = stmt
                .query_map(rusqlite::params![limit, skip], haiku_from_row)?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Deletes a haiku only if `author_id` owns it. Returns whether a row
    /// was removed; votes on it go with it through the cascade.
    pub fn delete_haiku(&self, id: i64, author_id: i64) -> Result<bool, StoreError> {
        self.with_conn_mut(|conn| {
            let affected = conn.execute(
                "DELETE FROM haikus WHERE id = ?1 AND author_id = ?2",
                rusqlite::params![id, author_id],
            )?;
            Ok(affected > 0)
        })
    }
}

fn query_author_by_username(
    conn: &Connection,
    username: &str,
) -> Result<Option<AuthorRow>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, username, password_hash, email, created FROM authors WHERE username = ?1",
    )?;

    stmt.query_row([username], author_from_row).optional()
}

fn author_from_row(row: &Row<'_>) -> rusqlite::Result<AuthorRow> {
    Ok(AuthorRow {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        email: row.get(3)?,
        created: row.get(4)?,
    })
}

fn haiku_from_row(row: &Row<'_>) -> rusqlite::Result<HaikuRow> {
    Ok(HaikuRow {
        id: row.get(0)?,
        text: row.get(1)?,
        tags: row.get(2)?,
        rating: row.get(3)?,
        created: row.get(4)?,
        author_id: row.get(5)?,
    })
}

/// Extension trait for optional query results
pub(crate) trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>, StoreError>;
}

impl<T> OptionalExt<T> for Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>, StoreError> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
