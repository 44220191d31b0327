use clap::ValueEnum;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliDisplayMode {
  Auto,
  Direct,
  Ascii,
}

/// How cover and banner previews are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
  Ascii,
  Direct,
}

impl DisplayMode {
  pub fn label(self) -> &'static str {
    match self {
      DisplayMode::Ascii => "ASCII",
      DisplayMode::Direct => "Half-block",
    }
  }

  pub fn from_config(s: &str) -> Option<Self> {
    match s.to_lowercase().as_str() {
      "direct" | "half-block" => Some(DisplayMode::Direct),
      "ascii" => Some(DisplayMode::Ascii),
      _ => None,
    }
  }
}

/// True-color terminals get half-block previews; everything else ASCII.
pub fn detect_display_mode() -> DisplayMode {
  let colorterm = std::env::var("COLORTERM").unwrap_or_default().to_lowercase();
  color_support(&colorterm)
}

fn color_support(colorterm: &str) -> DisplayMode {
  if colorterm == "truecolor" || colorterm == "24bit" { DisplayMode::Direct } else { DisplayMode::Ascii }
}

/// CLI flag first, then the config file, then detection.
pub fn resolve_display_mode(cli: CliDisplayMode, configured: Option<&str>) -> DisplayMode {
  match cli {
    CliDisplayMode::Direct => DisplayMode::Direct,
    CliDisplayMode::Ascii => DisplayMode::Ascii,
    CliDisplayMode::Auto => configured.and_then(DisplayMode::from_config).unwrap_or_else(detect_display_mode),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn explicit_flag_wins() {
    assert_eq!(resolve_display_mode(CliDisplayMode::Ascii, Some("direct")), DisplayMode::Ascii);
    assert_eq!(resolve_display_mode(CliDisplayMode::Direct, None), DisplayMode::Direct);
  }

  #[test]
  fn auto_uses_config_when_valid() {
    assert_eq!(resolve_display_mode(CliDisplayMode::Auto, Some("ASCII")), DisplayMode::Ascii);
    assert_eq!(resolve_display_mode(CliDisplayMode::Auto, Some("half-block")), DisplayMode::Direct);
  }

  #[test]
  fn truecolor_detection() {
    assert_eq!(color_support("truecolor"), DisplayMode::Direct);
    assert_eq!(color_support("24bit"), DisplayMode::Direct);
    assert_eq!(color_support(""), DisplayMode::Ascii);
  }
}
