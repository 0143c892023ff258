use std::collections::HashMap;

use super::DurableStore;
use crate::error::StoreError;

/// Process-local store; contents vanish on drop
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
  entries: HashMap<String, String>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

impl DurableStore for MemoryStore {
  fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
    Ok(self.entries.get(key).cloned())
  }

  fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
    self.entries.insert(key.to_string(), value.to_string());
    Ok(())
  }
}
