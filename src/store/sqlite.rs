use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use super::DurableStore;
use crate::error::StoreError;

/// Key-value table in a SQLite database
pub struct SqliteStore {
  conn: Connection,
}

impl SqliteStore {
  pub fn open(path: &Path) -> Result<Self, StoreError> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    Self::from_connection(Connection::open(path)?)
  }

  pub fn open_in_memory() -> Result<Self, StoreError> {
    Self::from_connection(Connection::open_in_memory()?)
  }

  fn from_connection(conn: Connection) -> Result<Self, StoreError> {
    run_migrations(&conn)?;
    Ok(Self { conn })
  }
}

pub fn run_migrations(conn: &Connection) -> rusqlite::Result<()> {
  conn.execute_batch(
    r#"
    CREATE TABLE IF NOT EXISTS kv_store (
      key TEXT PRIMARY KEY,
      value TEXT NOT NULL,
      updated_at TEXT NOT NULL
    );
    "#,
  )
}

impl DurableStore for SqliteStore {
  fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
    let value = self
      .conn
      .query_row("SELECT value FROM kv_store WHERE key = ?1", params![key], |row| row.get(0))
      .optional()?;
    Ok(value)
  }

  fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
    let now = chrono::Utc::now().to_rfc3339();
    self.conn.execute(
      "INSERT OR REPLACE INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)",
      params![key, value, now],
    )?;
    Ok(())
  }
}
