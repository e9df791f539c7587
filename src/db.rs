use rusqlite::Connection;
use std::path::Path;

pub const DB_FILE: &str = "seating.sqlite3";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE);
    let conn = Connection::open(db_path)?;

    // One row per snapshot key; a save replaces the whole row.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS snapshots(
            key TEXT PRIMARY KEY,
            blob TEXT NOT NULL,
            sha256 TEXT NOT NULL,
            saved_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(conn)
}
