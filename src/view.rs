//! View-side catalog logic: search matching, per-card session state and what
//! a click on a cover does in the current access mode.

use crate::access::AccessMode;
use crate::catalog::VideoEntry;
use crate::constants::constants;

/// Check if an entry matches the given filter string.
/// Matches case-insensitively against the title and every tag.
pub fn matches_filter(entry: &VideoEntry, filter: &str) -> bool {
  if filter.is_empty() {
    return true;
  }
  let needle = filter.to_lowercase();
  if entry.title.to_lowercase().contains(&needle) {
    return true;
  }
  entry.tags.iter().any(|tag| tag.to_lowercase().contains(&needle))
}

/// Like/save toggles for one card. Lives for the session only; the stored
/// counters are never touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardState {
  pub liked: bool,
  pub saved: bool,
  pub like_count: u32,
}

impl CardState {
  pub fn new(entry: &VideoEntry) -> Self {
    Self { liked: false, saved: false, like_count: entry.likes }
  }

  pub fn toggle_like(&mut self) {
    self.liked = !self.liked;
    self.like_count = if self.liked { self.like_count.saturating_add(1) } else { self.like_count.saturating_sub(1) };
  }

  pub fn toggle_save(&mut self) {
    self.saved = !self.saved;
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverAction {
  Play,
  /// Locked: send the viewer to this external page instead.
  Redirect(String),
}

pub fn cover_action(mode: AccessMode) -> CoverAction {
  if mode.can_play() { CoverAction::Play } else { CoverAction::Redirect(constants().locked_url.clone()) }
}

/// Headline and hint for an empty list.
pub fn empty_message(filter: &str, mode: AccessMode) -> (&'static str, &'static str) {
  if !filter.is_empty() {
    ("Nada encontrado...", "Tente buscar por outro termo.")
  } else if mode.can_manage() {
    ("Sua coleção está vazia", "Pressione 'a' para adicionar o primeiro vídeo.")
  } else {
    ("Catálogo indisponível no momento", "Fique atento, novidades em breve!")
  }
}

/// `createdAt` as a pt-BR style `dd/mm/yyyy` date in local time.
pub fn format_created_at(created_at_ms: i64) -> String {
  use chrono::{Local, TimeZone};
  match Local.timestamp_millis_opt(created_at_ms).single() {
    Some(dt) => dt.format("%d/%m/%Y").to_string(),
    None => String::new(),
  }
}
