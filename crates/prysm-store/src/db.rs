use rusqlite::Connection;

use crate::error::Result;

/// Initialise the doc store schema in `conn`.
///
/// `documents` is the schemaless collection table backing
/// `DocStore::{get,set,merge,scan}`: every persisted collection (preferences,
/// scheduling_preferences, articles, aifeed, audio, users, ...) is a logical
/// partition of this one physical table, addressed by `(collection, id)`.
/// `history` backs append-only writes (the `PodcastArtifact` run history).
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS documents (
            collection  TEXT NOT NULL,
            id          TEXT NOT NULL,
            doc         TEXT NOT NULL,   -- JSON-encoded document
            updated_at  TEXT NOT NULL,
            PRIMARY KEY (collection, id)
        );
        CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents (collection);

        CREATE TABLE IF NOT EXISTS history (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            collection  TEXT NOT NULL,
            doc_id      TEXT NOT NULL,
            doc         TEXT NOT NULL,
            created_at  TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_history_lookup ON history (collection, doc_id, created_at);
        ",
    )?;
    Ok(())
}
