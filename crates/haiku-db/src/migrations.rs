use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| {
            r.get(0)
        })?;

    if version < 1 {
        info!("Running migration v1 (authors, haikus, votes)");
        conn.execute_batch(
            "
            BEGIN;

            CREATE TABLE authors (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                username        TEXT NOT NULL UNIQUE,
                password_hash   TEXT NOT NULL,
                email           TEXT UNIQUE,
                created         TEXT NOT NULL
            );

            CREATE TABLE haikus (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                text        TEXT NOT NULL,
                tags        TEXT NOT NULL DEFAULT '',
                rating      INTEGER NOT NULL DEFAULT 0,
                created     TEXT NOT NULL,
                author_id   INTEGER NOT NULL REFERENCES authors(id)
            );

            CREATE INDEX idx_haikus_author ON haikus(author_id);

            CREATE TABLE votes (
                id                  INTEGER PRIMARY KEY AUTOINCREMENT,
                upvoted             INTEGER NOT NULL,
                voted_timestamp     TEXT NOT NULL,
                author_id           INTEGER NOT NULL REFERENCES authors(id),
                haiku_id            INTEGER NOT NULL REFERENCES haikus(id) ON DELETE CASCADE,
                UNIQUE(author_id, haiku_id)
            );

            CREATE INDEX idx_votes_haiku ON votes(haiku_id);

            INSERT INTO schema_version (version) VALUES (1);

            COMMIT;
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
