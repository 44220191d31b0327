use ratatui::style::Color;

pub struct Theme {
  pub name: &'static str,
  pub bg: Color,
  pub fg: Color,
  pub accent: Color,
  pub muted: Color,
  pub border: Color,
  pub highlight_fg: Color,
  pub highlight_bg: Color,
  pub stripe_bg: Color,
  pub status: Color,
  pub error: Color,
  pub key_fg: Color,
  pub key_bg: Color,
  /// Badge colour for the VIP mode toggle.
  pub vip: Color,
  /// Badge colour for admin mode.
  pub admin: Color,
}

pub const THEMES: [Theme; 3] = [
  Theme {
    name: "rosé",
    bg: Color::Rgb(0x4c, 0x05, 0x19),
    fg: Color::Rgb(0xff, 0xe4, 0xe6),
    accent: Color::Rgb(0xec, 0x48, 0x99),
    muted: Color::Rgb(0xfb, 0x71, 0x85),
    border: Color::Rgb(0x88, 0x13, 0x37),
    highlight_fg: Color::Rgb(0xff, 0xff, 0xff),
    highlight_bg: Color::Rgb(0x9f, 0x12, 0x39),
    stripe_bg: Color::Rgb(0x58, 0x0a, 0x22),
    status: Color::Rgb(0xfd, 0xe6, 0x8a),
    error: Color::Rgb(0xf8, 0x71, 0x71),
    key_fg: Color::Rgb(0x4c, 0x05, 0x19),
    key_bg: Color::Rgb(0xfd, 0xa4, 0xaf),
    vip: Color::Rgb(0x6e, 0xe7, 0xb7),
    admin: Color::Rgb(0xf8, 0x71, 0x71),
  },
  Theme {
    name: "noite",
    bg: Color::Rgb(0x0f, 0x17, 0x2a),
    fg: Color::Rgb(0xe2, 0xe8, 0xf0),
    accent: Color::Rgb(0x38, 0xbd, 0xf8),
    muted: Color::Rgb(0x64, 0x74, 0x8b),
    border: Color::Rgb(0x33, 0x41, 0x55),
    highlight_fg: Color::Rgb(0x0f, 0x17, 0x2a),
    highlight_bg: Color::Rgb(0x7d, 0xd3, 0xfc),
    stripe_bg: Color::Rgb(0x1e, 0x29, 0x3b),
    status: Color::Rgb(0xfa, 0xcc, 0x15),
    error: Color::Rgb(0xf8, 0x71, 0x71),
    key_fg: Color::Rgb(0x0f, 0x17, 0x2a),
    key_bg: Color::Rgb(0x94, 0xa3, 0xb8),
    vip: Color::Rgb(0x34, 0xd3, 0x99),
    admin: Color::Rgb(0xfb, 0x92, 0x3c),
  },
  Theme {
    name: "terminal",
    bg: Color::Reset,
    fg: Color::Reset,
    accent: Color::Magenta,
    muted: Color::DarkGray,
    border: Color::Gray,
    highlight_fg: Color::Black,
    highlight_bg: Color::Magenta,
    stripe_bg: Color::Reset,
    status: Color::Yellow,
    error: Color::Red,
    key_fg: Color::Black,
    key_bg: Color::Gray,
    vip: Color::Green,
    admin: Color::Red,
  },
];

/// Index of the theme called `name`, or the first theme.
pub fn theme_index(name: Option<&str>) -> usize {
  name.and_then(|n| THEMES.iter().position(|t| t.name == n)).unwrap_or(0)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn theme_index_by_name() {
    assert_eq!(theme_index(Some("noite")), 1);
    assert_eq!(theme_index(Some("missing")), 0);
    assert_eq!(theme_index(None), 0);
  }

  #[test]
  fn theme_names_are_unique() {
    for (i, a) in THEMES.iter().enumerate() {
      assert!(THEMES.iter().skip(i + 1).all(|b| b.name != a.name));
    }
  }
}
