use rusqlite::Connection;

use crate::error::Result;

/// Initialise the scheduler's per-window idempotency table (replaces the
/// teacher's `next_run`-advance-on-fire mechanism, since this scheduler
/// reads scheduling preferences directly rather than owning job rows).
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS fired_windows (
            user_id      TEXT NOT NULL,
            window_start TEXT NOT NULL,
            fired_at     TEXT NOT NULL,
            PRIMARY KEY (user_id, window_start)
        ) STRICT;
        ",
    )?;
    Ok(())
}

/// Attempt to claim `(user_id, window_start)`. Returns `true` if this call
/// is the first to claim it (the run should proceed), `false` if another
/// tick already claimed it (crash-and-restart-safe by construction, not by
/// locking).
pub fn try_claim_window(conn: &Connection, user_id: &str, window_start: &str, now: &str) -> Result<bool> {
    let n = conn.execute(
        "INSERT OR IGNORE INTO fired_windows (user_id, window_start, fired_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![user_id, window_start, now],
    )?;
    Ok(n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_claim_window_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        assert!(try_claim_window(&conn, "u1", "2026-07-28T09:00:00Z", "2026-07-28T09:01:00Z").unwrap());
        assert!(!try_claim_window(&conn, "u1", "2026-07-28T09:00:00Z", "2026-07-28T09:02:00Z").unwrap());
    }

    #[test]
    fn try_claim_window_distinguishes_users_and_windows() {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        assert!(try_claim_window(&conn, "u1", "2026-07-28T09:00:00Z", "now").unwrap());
        assert!(try_claim_window(&conn, "u2", "2026-07-28T09:00:00Z", "now").unwrap());
        assert!(try_claim_window(&conn, "u1", "2026-07-29T09:00:00Z", "now").unwrap());
    }
}
