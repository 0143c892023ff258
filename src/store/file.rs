use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::DurableStore;
use crate::error::StoreError;
use crate::paths;

/// One JSON file per key inside a directory.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// crash mid-write leaves the previous value readable.
#[derive(Debug, Clone)]
pub struct FileStore {
  dir: PathBuf,
}

impl FileStore {
  pub fn open(dir: &Path) -> Result<Self, StoreError> {
    fs::create_dir_all(dir)?;
    Ok(Self {
      dir: dir.to_path_buf(),
    })
  }

  pub fn dir(&self) -> &Path {
    &self.dir
  }
}

impl DurableStore for FileStore {
  fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
    match fs::read_to_string(paths::key_file_path(&self.dir, key)) {
      Ok(contents) => Ok(Some(contents)),
      Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
      Err(e) => Err(e.into()),
    }
  }

  fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
    let path = paths::key_file_path(&self.dir, key);
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, value)?;
    fs::rename(&tmp, &path)?;
    Ok(())
  }
}
