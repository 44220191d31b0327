//! Durable key-value persistence behind the catalog.
//!
//! Values are opaque strings. [`FileStore`] keeps one file per key under a
//! directory; [`MemoryStore`] keeps the latest value per key in a shared map.
//! It backs `--ephemeral` sessions and doubles as the catalog's test store,
//! where it also records every write.

use anyhow::{Context, Result, anyhow};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex as StdMutex};

pub trait KeyValueStore: Send {
  /// Read the value under `key`; `Ok(None)` when it was never written.
  fn get(&self, key: &str) -> Result<Option<String>>;

  /// Overwrite the value under `key`.
  fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

// --- FileStore ---

pub struct FileStore {
  dir: PathBuf,
}

impl FileStore {
  pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
    let dir = dir.into();
    std::fs::create_dir_all(&dir).with_context(|| format!("Failed to create store directory {}", dir.display()))?;
    Ok(Self { dir })
  }

  pub fn dir(&self) -> &Path {
    &self.dir
  }

  fn path_for(&self, key: &str) -> Result<PathBuf> {
    if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
      return Err(anyhow!("Invalid store key: {:?}", key));
    }
    Ok(self.dir.join(key))
  }
}

impl KeyValueStore for FileStore {
  fn get(&self, key: &str) -> Result<Option<String>> {
    let path = self.path_for(key)?;
    match std::fs::read_to_string(&path) {
      Ok(content) => Ok(Some(content)),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
      Err(e) => Err(anyhow!(e).context(format!("Failed to read {}", path.display()))),
    }
  }

  fn set(&mut self, key: &str, value: &str) -> Result<()> {
    let path = self.path_for(key)?;
    // Write-then-rename so a crash mid-write never leaves a truncated value.
    let tmp = self.dir.join(format!(".{}.tmp", key));
    std::fs::write(&tmp, value).with_context(|| format!("Failed to write {}", tmp.display()))?;
    std::fs::rename(&tmp, &path).with_context(|| format!("Failed to move {} into place", path.display()))?;
    Ok(())
  }
}

// --- MemoryStore ---

#[derive(Default)]
struct MemoryInner {
  values: HashMap<String, String>,
  #[cfg(test)]
  writes: Vec<(String, String)>,
  fail_writes: bool,
}

/// In-memory store. Clones share the same state.
#[derive(Clone, Default)]
pub struct MemoryStore {
  inner: Arc<StdMutex<MemoryInner>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Seed a value without recording it as a write.
  #[cfg(test)]
  pub fn with_value(self, key: &str, value: &str) -> Self {
    self.lock().values.insert(key.to_string(), value.to_string());
    self
  }

  /// Make every subsequent `set` fail, as a full or read-only disk would.
  #[cfg(test)]
  pub fn fail_writes(&self) {
    self.lock().fail_writes = true;
  }

  /// Every successful write in order, as `(key, value)`.
  #[cfg(test)]
  pub fn writes(&self) -> Vec<(String, String)> {
    self.lock().writes.clone()
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
    // A poisoned map is still a valid map.
    self.inner.lock().unwrap_or_else(|e| e.into_inner())
  }
}

impl KeyValueStore for MemoryStore {
  fn get(&self, key: &str) -> Result<Option<String>> {
    Ok(self.lock().values.get(key).cloned())
  }

  fn set(&mut self, key: &str, value: &str) -> Result<()> {
    let mut inner = self.lock();
    if inner.fail_writes {
      return Err(anyhow!("write rejected for key {}", key));
    }
    inner.values.insert(key.to_string(), value.to_string());
    #[cfg(test)]
    inner.writes.push((key.to_string(), value.to_string()));
    Ok(())
  }
}
