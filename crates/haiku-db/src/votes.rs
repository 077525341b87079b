use rusqlite::{Connection, Row, TransactionBehavior};
use tracing::debug;

use crate::models::{VoteChange, VoteRow};
use crate::queries::OptionalExt;
use crate::{Database, StoreError, now_timestamp};

impl Database {
    pub fn get_vote(&self, author_id: i64, haiku_id: i64) -> Result<Option<VoteRow>, StoreError> {
        self.with_conn(|conn| query_vote(conn, author_id, haiku_id))
    }

    /// Atomic insert-or-flip keyed on `UNIQUE(author_id, haiku_id)`.
    ///
    /// Runs in one IMMEDIATE transaction together with the rating update, so
    /// concurrent callers for the same pair serialise on the write lock and
    /// the unique constraint rules out a second row either way.
    pub fn upsert_vote(
        &self,
        author_id: i64,
        haiku_id: i64,
        upvoted: bool,
    ) -> Result<(VoteRow, VoteChange), StoreError> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let existed = query_vote(&tx, author_id, haiku_id)?.is_some();

            // The WHERE on the update arm makes a same-direction re-vote a
            // no-op: RETURNING then yields no row.
            let written = tx
                .query_row(
                    "INSERT INTO votes (upvoted, voted_timestamp, author_id, haiku_id)
                     VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT(author_id, haiku_id) DO UPDATE SET
                        upvoted = excluded.upvoted,
                        voted_timestamp = excluded.voted_timestamp
                     WHERE votes.upvoted <> excluded.upvoted
                     RETURNING id, upvoted, voted_timestamp, author_id, haiku_id",
                    rusqlite::params![upvoted, now_timestamp(), author_id, haiku_id],
                    vote_from_row,
                )
                .optional()?;

            let (vote, change) = match written {
                Some(vote) if existed => (vote, VoteChange::Flipped),
                Some(vote) => (vote, VoteChange::Inserted),
                None => {
                    let vote = query_vote(&tx, author_id, haiku_id)?
                        .ok_or(StoreError::Sqlite(rusqlite::Error::QueryReturnedNoRows))?;
                    (vote, VoteChange::Unchanged)
                }
            };

            let delta = match (change, upvoted) {
                (VoteChange::Inserted, true) => 1,
                (VoteChange::Inserted, false) => -1,
                (VoteChange::Flipped, true) => 2,
                (VoteChange::Flipped, false) => -2,
                (VoteChange::Unchanged, _) => 0,
            };
            adjust_rating(&tx, haiku_id, delta)?;

            tx.commit()?;
            debug!(vote_id = vote.id, ?change, "vote upserted");
            Ok((vote, change))
        })
    }

    /// Removes the author's vote on a haiku, returning the row that was
    /// removed. `None` means there was nothing to remove.
    pub fn remove_vote(&self, author_id: i64, haiku_id: i64) -> Result<Option<VoteRow>, StoreError> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let Some(existing) = query_vote(&tx, author_id, haiku_id)? else {
                return Ok(None);
            };

            // Scoped by author as well as id: a vote id alone never
            // authorises a delete.
            tx.execute(
                "DELETE FROM votes WHERE id = ?1 AND author_id = ?2",
                rusqlite::params![existing.id, author_id],
            )?;
            adjust_rating(&tx, haiku_id, if existing.upvoted { -1 } else { 1 })?;

            tx.commit()?;
            debug!(vote_id = existing.id, "vote removed");
            Ok(Some(existing))
        })
    }
}

fn query_vote(
    conn: &Connection,
    author_id: i64,
    haiku_id: i64,
) -> Result<Option<VoteRow>, StoreError> {
    conn.query_row(
        "SELECT id, upvoted, voted_timestamp, author_id, haiku_id
         FROM votes WHERE author_id = ?1 AND haiku_id = ?2",
        rusqlite::params![author_id, haiku_id],
        vote_from_row,
    )
    .optional()
}

fn adjust_rating(conn: &Connection, haiku_id: i64, delta: i64) -> Result<(), StoreError> {
    if delta != 0 {
        conn.execute(
            "UPDATE haikus SET rating = rating + ?1 WHERE id = ?2",
            rusqlite::params![delta, haiku_id],
        )?;
    }
    Ok(())
}

fn vote_from_row(row: &Row<'_>) -> rusqlite::Result<VoteRow> {
    Ok(VoteRow {
        id: row.get(0)?,
        upvoted: row.get(1)?,
        voted_timestamp: row.get(2)?,
        author_id: row.get(3)?,
        haiku_id: row.get(4)?,
    })
}
