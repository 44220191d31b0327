//! Application constants loaded from `constants.ron` at compile time.
//!
//! The RON file is embedded via `include_str!` so it's always available,
//! no runtime file I/O. Parsed once on first access via `LazyLock`.

use serde::Deserialize;
use std::sync::LazyLock;

/// All tuneable application constants.
#[derive(Debug, Deserialize)]
pub struct Constants {
  pub app_name: String,

  // Durable storage keys
  pub videos_key: String,
  pub banner_key: String,

  // Media defaults
  pub default_banner: String,
  pub default_cover: String,

  // Outbound navigation
  pub checkout_url: String,
  pub locked_url: String,

  // Access challenges
  pub admin_secret: String,
  pub spectator_phrase: String,

  // Metadata generator
  pub gemini_base_url: String,
  pub gemini_model: String,
  pub metadata_timeout_secs: u64,
  pub fallback_summary: String,
  pub fallback_tag: String,

  // Placeholder engagement counters, half-open `(low, high)` ranges
  pub likes_range: (u32, u32),
  pub comments_range: (u32, u32),
  pub shares_range: (u32, u32),
}

static CONSTANTS: LazyLock<Constants> = LazyLock::new(|| {
  // Safety: the RON file is embedded at compile time; if it's malformed this is a build-time error.
  ron::from_str(include_str!("../constants.ron")).expect("constants.ron must be valid RON (embedded at compile time)")
});

/// Returns a reference to the parsed application constants.
pub fn constants() -> &'static Constants {
  &CONSTANTS
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn embedded_constants_parse() {
    let c = constants();
    assert_eq!(c.videos_key, "videos");
    assert_eq!(c.fallback_tag, "Geral");
    assert!(c.likes_range.0 < c.likes_range.1);
    assert!(c.comments_range.0 < c.comments_range.1);
    assert!(c.shares_range.0 < c.shares_range.1);
  }
}
