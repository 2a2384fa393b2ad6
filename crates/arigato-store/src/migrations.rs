use rusqlite::Connection;
use tracing::info;

use crate::Result;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            user_id  TEXT PRIMARY KEY,
            doc      TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS messages (
            id          TEXT PRIMARY KEY,
            created_at  INTEGER NOT NULL,
            doc         TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_messages_created
            ON messages(created_at);

        -- Single-slot table: at most one persisted session per store.
        CREATE TABLE IF NOT EXISTS session (
            slot  TEXT PRIMARY KEY CHECK (slot = 'current'),
            doc   TEXT NOT NULL
        );
        ",
    )?;

    info!("Document store migrations complete");
    Ok(())
}
