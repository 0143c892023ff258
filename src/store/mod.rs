//! Durable key-value stores the scheduler persists into.
//!
//! The scheduler only ever reads and writes whole string values under a
//! single key; anything richer is the store's own business.

mod file;
mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use file::FileStore;
pub use memory::MemoryStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

use crate::config::{StorageBackend, StorageConfig};
use crate::error::StoreError;

pub trait DurableStore {
  fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
  fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Open the store described by the configuration
pub fn open_store(config: &StorageConfig) -> Result<Box<dyn DurableStore + Send>, StoreError> {
  tracing::info!(
    "Opening {} store at {}",
    config.backend.as_str(),
    config.path.display()
  );
  match config.backend {
    StorageBackend::File => Ok(Box::new(FileStore::open(&config.path)?)),
    #[cfg(feature = "sqlite")]
    StorageBackend::Sqlite => Ok(Box::new(SqliteStore::open(&crate::paths::sqlite_db_path(
      &config.path,
    ))?)),
    StorageBackend::Memory => Ok(Box::new(MemoryStore::new())),
  }
}
