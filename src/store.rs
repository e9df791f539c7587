use crate::db;
use anyhow::{anyhow, Context};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::Path;

/// Key-value blob storage for persisted snapshots.
pub trait SnapshotStore {
    fn load(&self, key: &str) -> anyhow::Result<Option<String>>;
    /// Replaces the blob under `key` in one step.
    fn save(&mut self, key: &str, blob: &str) -> anyhow::Result<()>;
    fn remove(&mut self, key: &str) -> anyhow::Result<()>;
}

pub fn sha256_hex(blob: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(blob.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Snapshots in the workspace SQLite file, each stored with its SHA-256.
pub struct SqliteSnapshotStore {
    conn: Connection,
}

impl SqliteSnapshotStore {
    pub fn open(workspace: &Path) -> anyhow::Result<Self> {
        let conn = db::open_db(workspace)
            .with_context(|| format!("failed to open workspace {}", workspace.to_string_lossy()))?;
        Ok(Self { conn })
    }
}

impl SnapshotStore for SqliteSnapshotStore {
    fn load(&self, key: &str) -> anyhow::Result<Option<String>> {
        let row: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT blob, sha256 FROM snapshots WHERE key = ?",
                [key],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .optional()
            .context("failed to read snapshot")?;
        let Some((blob, digest)) = row else {
            return Ok(None);
        };
        if sha256_hex(&blob) != digest {
            return Err(anyhow!("snapshot {} failed its checksum", key));
        }
        Ok(Some(blob))
    }

    fn save(&mut self, key: &str, blob: &str) -> anyhow::Result<()> {
        self.conn
            .execute(
                "INSERT INTO snapshots(key, blob, sha256, saved_at)
                 VALUES(?, ?, ?, ?)
                 ON CONFLICT(key) DO UPDATE SET
                   blob = excluded.blob,
                   sha256 = excluded.sha256,
                   saved_at = excluded.saved_at",
                (key, blob, sha256_hex(blob), Utc::now().to_rfc3339()),
            )
            .context("failed to write snapshot")?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> anyhow::Result<()> {
        self.conn
            .execute("DELETE FROM snapshots WHERE key = ?", [key])
            .context("failed to delete snapshot")?;
        Ok(())
    }
}

/// Process-local store for tests. Without a workspace the daemon persists
/// nothing.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    blobs: HashMap<String, String>,
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.blobs.get(key).cloned())
    }

    fn save(&mut self, key: &str, blob: &str) -> anyhow::Result<()> {
        self.blobs.insert(key.to_string(), blob.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> anyhow::Result<()> {
        self.blobs.remove(key);
        Ok(())
    }
}
