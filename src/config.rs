use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::constants;

/// User preferences from `prefs.toml`. Every field is optional; unset fields
/// fall back to the embedded constants.
#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct Config {
  pub theme_name: Option<String>,
  pub display_mode: Option<String>,
  pub gemini_api_key: Option<String>,
  pub gemini_model: Option<String>,
  pub gemini_base_url: Option<String>,
  pub metadata_timeout_secs: Option<u64>,
  pub admin_secret: Option<String>,
  pub spectator_phrase: Option<String>,
  /// Command run with the share text on stdin (e.g. a messenger CLI).
  /// Split on whitespace without a shell, so quoted arguments are not supported.
  pub share_command: Option<String>,
  /// Public URL appended to shared messages.
  pub share_url: Option<String>,
}

fn project_dirs() -> Option<ProjectDirs> {
  ProjectDirs::from("", "", "reel")
}

impl Config {
  pub fn load() -> Self {
    if let Some(proj_dirs) = project_dirs() {
      let config_file = proj_dirs.config_dir().join("prefs.toml");
      if let Ok(content) = std::fs::read_to_string(config_file)
        && let Ok(config) = toml::from_str(&content)
      {
        return config;
      }
    }
    Self::default()
  }

  pub fn save(&self) {
    if let Some(proj_dirs) = project_dirs() {
      let config_dir = proj_dirs.config_dir();
      if std::fs::create_dir_all(config_dir).is_ok() {
        let config_file = config_dir.join("prefs.toml");
        if let Ok(content) = toml::to_string(self) {
          let _ = std::fs::write(config_file, content);
        }
      }
    }
  }

  /// API key for the metadata generator. `GEMINI_API_KEY` wins over the file.
  pub fn api_key(&self) -> Option<String> {
    std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.trim().is_empty()).or_else(|| self.gemini_api_key.clone())
  }

  pub fn model(&self) -> &str {
    self.gemini_model.as_deref().unwrap_or(&constants().gemini_model)
  }

  pub fn base_url(&self) -> &str {
    self.gemini_base_url.as_deref().unwrap_or(&constants().gemini_base_url)
  }

  pub fn metadata_timeout(&self) -> Duration {
    Duration::from_secs(self.metadata_timeout_secs.unwrap_or(constants().metadata_timeout_secs))
  }

  pub fn admin_secret(&self) -> &str {
    self.admin_secret.as_deref().unwrap_or(&constants().admin_secret)
  }

  pub fn spectator_phrase(&self) -> &str {
    self.spectator_phrase.as_deref().unwrap_or(&constants().spectator_phrase)
  }
}

/// Directory holding the durable store and the log file.
pub fn default_data_dir() -> PathBuf {
  project_dirs().map(|d| d.data_dir().to_path_buf()).unwrap_or_else(|| PathBuf::from(".reel"))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unset_fields_fall_back_to_constants() {
    let config = Config::default();
    assert_eq!(config.admin_secret(), "admin123");
    assert_eq!(config.spectator_phrase(), "prazer ilimitado");
    assert_eq!(config.model(), "gemini-2.5-flash");
    assert_eq!(config.metadata_timeout(), Duration::from_secs(30));
  }

  #[test]
  fn overrides_parse_from_toml() {
    let config: Config = toml::from_str(
      r#"
        admin_secret = "s3cret"
        spectator_phrase = "open sesame"
        metadata_timeout_secs = 5
      "#,
    )
    .unwrap();
    assert_eq!(config.admin_secret(), "s3cret");
    assert_eq!(config.spectator_phrase(), "open sesame");
    assert_eq!(config.metadata_timeout(), Duration::from_secs(5));
    assert!(config.theme_name.is_none());
  }
}
