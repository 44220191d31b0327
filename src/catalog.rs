//! The catalog store: an ordered, most-recent-first list of video entries
//! plus the banner image, mirrored to a [`KeyValueStore`] after every change.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::constants::constants;
use crate::storage::KeyValueStore;
use crate::view::matches_filter;

fn default_cover() -> String {
  constants().default_cover.clone()
}

/// One catalog item. Field names follow the camelCase layout the catalog has
/// always been stored with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoEntry {
  pub id: String,
  pub title: String,
  /// Local path of the video file.
  pub url: String,
  /// `data:` URL of an uploaded cover, or the default cover URL.
  #[serde(default = "default_cover")]
  pub cover_url: String,
  /// Generated summary. Stored, never rendered.
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub tags: Vec<String>,
  /// Epoch milliseconds.
  pub created_at: i64,
  #[serde(default)]
  pub likes: u32,
  #[serde(default)]
  pub comments: u32,
  #[serde(default)]
  pub shares: u32,
}

/// Proof that the user was asked before an entry is deleted. Only
/// [`CatalogStore::request_removal`] hands these out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRemoval {
  id: String,
  title: String,
}

impl PendingRemoval {
  pub fn id(&self) -> &str {
    &self.id
  }

  pub fn title(&self) -> &str {
    &self.title
  }
}

pub struct CatalogStore {
  entries: Vec<VideoEntry>,
  banner: String,
  storage: Box<dyn KeyValueStore>,
}

impl CatalogStore {
  /// Restore the catalog from `storage`. Anything unreadable is logged and
  /// replaced with defaults; loading never fails.
  pub fn load(storage: Box<dyn KeyValueStore>) -> Self {
    let c = constants();

    let entries = match storage.get(&c.videos_key) {
      Ok(Some(raw)) => match serde_json::from_str::<Vec<VideoEntry>>(&raw) {
        Ok(entries) => entries,
        Err(e) => {
          warn!(err = %e, "catalog: saved videos are unreadable, starting empty");
          Vec::new()
        }
      },
      Ok(None) => Vec::new(),
      Err(e) => {
        warn!(err = %e, "catalog: failed to read saved videos, starting empty");
        Vec::new()
      }
    };

    let banner = match storage.get(&c.banner_key) {
      Ok(Some(raw)) if !raw.is_empty() => raw,
      Ok(_) => c.default_banner.clone(),
      Err(e) => {
        warn!(err = %e, "catalog: failed to read saved banner, using default");
        c.default_banner.clone()
      }
    };

    info!(entries = entries.len(), "catalog: loaded");
    Self { entries, banner, storage }
  }

  pub fn entries(&self) -> &[VideoEntry] {
    &self.entries
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn get(&self, id: &str) -> Option<&VideoEntry> {
    self.entries.iter().find(|e| e.id == id)
  }

  pub fn banner(&self) -> &str {
    &self.banner
  }

  /// Entries whose title or any tag contains `term`, case-insensitively, in
  /// catalog order.
  pub fn filter(&self, term: &str) -> Vec<&VideoEntry> {
    self.entries.iter().filter(|e| matches_filter(e, term)).collect()
  }

  pub fn append(&mut self, entry: VideoEntry) {
    info!(id = %entry.id, title = %entry.title, "catalog: appended");
    self.entries.insert(0, entry);
    self.persist_entries();
  }

  /// First half of a deletion: look the entry up so the caller can ask for
  /// confirmation. `None` if no entry has this id.
  pub fn request_removal(&self, id: &str) -> Option<PendingRemoval> {
    self.get(id).map(|e| PendingRemoval { id: e.id.clone(), title: e.title.clone() })
  }

  /// Delete a confirmed entry. Returns whether anything was removed; an entry
  /// that vanished since confirmation leaves the catalog (and storage) alone.
  pub fn remove(&mut self, removal: PendingRemoval) -> bool {
    let before = self.entries.len();
    self.entries.retain(|e| e.id != removal.id);
    if self.entries.len() == before {
      debug!(id = %removal.id, "catalog: remove of unknown id ignored");
      return false;
    }
    info!(id = %removal.id, "catalog: removed");
    self.persist_entries();
    true
  }

  pub fn replace_banner(&mut self, image: String) {
    self.banner = image;
    let key = &constants().banner_key;
    if let Err(e) = self.storage.set(key, &self.banner) {
      warn!(err = %e, "catalog: failed to persist banner");
    }
  }

  fn persist_entries(&mut self) {
    if let Err(e) = self.write_entries() {
      warn!(err = %e, "catalog: failed to persist videos");
    }
  }

  fn write_entries(&mut self) -> Result<()> {
    let json = serde_json::to_string(&self.entries).context("Failed to serialize catalog")?;
    self.storage.set(&constants().videos_key, &json)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::storage::MemoryStore;

  fn entry(id: &str, title: &str, tags: &[&str]) -> VideoEntry {
    VideoEntry {
      id: id.to_string(),
      title: title.to_string(),
      url: format!("/videos/{}.mp4", id),
      cover_url: default_cover(),
      description: String::new(),
      tags: tags.iter().map(|t| t.to_string()).collect(),
      created_at: 1_700_000_000_000,
      likes: 3000,
      comments: 40,
      shares: 60,
    }
  }

  fn empty_store() -> (CatalogStore, MemoryStore) {
    let mem = MemoryStore::new();
    (CatalogStore::load(Box::new(mem.clone())), mem)
  }

  #[test]
  fn append_is_most_recent_first() {
    let (mut store, _) = empty_store();
    store.append(entry("e1", "First", &[]));
    store.append(entry("e2", "Second", &[]));
    let ids: Vec<&str> = store.entries().iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["e2", "e1"]);
  }

  #[test]
  fn duplicate_titles_are_allowed() {
    let (mut store, _) = empty_store();
    store.append(entry("a", "Same", &[]));
    store.append(entry("b", "Same", &[]));
    assert_eq!(store.len(), 2);
  }

  #[test]
  fn every_append_writes_full_sequence() {
    let (mut store, mem) = empty_store();
    store.append(entry("e1", "First", &[]));
    store.append(entry("e2", "Second", &[]));
    let writes = mem.writes();
    assert_eq!(writes.len(), 2);
    assert!(writes.iter().all(|(k, _)| k == "videos"));
    let last: Vec<VideoEntry> = serde_json::from_str(&writes[1].1).unwrap();
    assert_eq!(last, store.entries());
  }

  #[test]
  fn reload_round_trips_catalog() {
    let (mut store, mem) = empty_store();
    store.append(entry("e1", "First", &["a"]));
    store.append(entry("e2", "Second", &["b", "c"]));
    store.replace_banner("data:image/png;base64,AAAA".to_string());

    let reloaded = CatalogStore::load(Box::new(mem));
    assert_eq!(reloaded.entries(), store.entries());
    assert_eq!(reloaded.banner(), "data:image/png;base64,AAAA");
  }

  #[test]
  fn malformed_json_loads_empty() {
    let mem = MemoryStore::new().with_value("videos", "{not json");
    let store = CatalogStore::load(Box::new(mem));
    assert!(store.is_empty());
  }

  #[test]
  fn wrong_shape_loads_empty() {
    let mem = MemoryStore::new().with_value("videos", r#"{"id":"x"}"#);
    let store = CatalogStore::load(Box::new(mem));
    assert!(store.is_empty());
  }

  #[test]
  fn missing_banner_uses_default() {
    let (store, _) = empty_store();
    assert_eq!(store.banner(), "./banner.jpg");
  }

  #[test]
  fn legacy_entry_without_cover_gets_default() {
    let raw = r#"[{"id":"x","title":"Old","url":"blob:abc","description":"d","tags":["t"],"createdAt":1,"likes":1,"comments":2,"shares":3}]"#;
    let store = CatalogStore::load(Box::new(MemoryStore::new().with_value("videos", raw)));
    assert_eq!(store.entries()[0].cover_url, default_cover());
  }

  #[test]
  fn remove_requires_existing_entry() {
    let (mut store, _) = empty_store();
    store.append(entry("e1", "First", &[]));
    assert!(store.request_removal("nope").is_none());

    let pending = store.request_removal("e1").unwrap();
    assert_eq!(pending.title(), "First");
    assert!(store.remove(pending));
    assert!(store.is_empty());
  }

  #[test]
  fn remove_unknown_id_is_noop() {
    let (mut store, mem) = empty_store();
    store.append(entry("e1", "First", &[]));
    let snapshot = store.entries().to_vec();
    let writes_before = mem.writes().len();

    let stale = PendingRemoval { id: "ghost".to_string(), title: "Ghost".to_string() };
    assert!(!store.remove(stale));
    assert_eq!(store.entries(), snapshot.as_slice());
    assert_eq!(mem.writes().len(), writes_before);
  }

  #[test]
  fn remove_twice_second_is_noop() {
    let (mut store, _) = empty_store();
    store.append(entry("e1", "First", &[]));
    store.append(entry("e2", "Second", &[]));
    let pending = store.request_removal("e1").unwrap();
    assert!(store.remove(pending.clone()));
    assert!(!store.remove(pending));
    assert_eq!(store.len(), 1);
  }

  #[test]
  fn failed_write_keeps_in_memory_state() {
    let (mut store, mem) = empty_store();
    mem.fail_writes();
    store.append(entry("e1", "First", &[]));
    assert_eq!(store.len(), 1);
    assert!(mem.writes().is_empty());
  }

  #[test]
  fn filter_is_case_insensitive_on_tags() {
    let (mut store, _) = empty_store();
    store.append(entry("t", "Test", &["a", "b"]));
    let hits = store.filter("A");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Test");
  }

  #[test]
  fn empty_filter_returns_everything_in_order() {
    let (mut store, _) = empty_store();
    store.append(entry("e1", "One", &[]));
    store.append(entry("e2", "Two", &[]));
    store.append(entry("e3", "Three", &[]));
    let all: Vec<&VideoEntry> = store.entries().iter().collect();
    assert_eq!(store.filter(""), all);
  }
}
