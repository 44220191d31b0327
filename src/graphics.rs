use image::{DynamicImage, imageops::FilterType};
use ratatui::{
  buffer::Buffer,
  layout::Rect,
  style::{Color, Style},
  widgets::Widget,
};

use crate::display::DisplayMode;

// --- Preview Widget ---

/// Draws an already-resized image into a cell area.
pub struct PreviewWidget<'a> {
  pub image: &'a DynamicImage,
  pub display_mode: DisplayMode,
}

const ASCII_CHARS: [&str; 10] = [" ", ".", ":", "-", "=", "+", "*", "#", "%", "@"];

impl Widget for PreviewWidget<'_> {
  fn render(self, area: Rect, buf: &mut Buffer) {
    if area.is_empty() {
      return;
    }
    match self.display_mode {
      DisplayMode::Direct => render_direct(self.image, area, buf),
      DisplayMode::Ascii => render_ascii(self.image, area, buf),
    }
  }
}

/// Resize `image` to fill `area`: two pixel rows per cell in half-block
/// mode, one in ASCII mode.
pub fn fit_to_area(image: &DynamicImage, area: Rect, display_mode: DisplayMode) -> DynamicImage {
  let w = (area.width as u32).max(1);
  let h = match display_mode {
    DisplayMode::Direct => area.height as u32 * 2,
    DisplayMode::Ascii => area.height as u32,
  }
  .max(1);
  image.resize_to_fill(w, h, FilterType::Triangle)
}

fn cell(area: Rect, offset_x: u32, offset_y: u32, x: u32, y: u32) -> (u16, u16) {
  (
    area.x.saturating_add((offset_x.min(u16::MAX as u32)) as u16).saturating_add((x.min(u16::MAX as u32)) as u16),
    area.y.saturating_add((offset_y.min(u16::MAX as u32)) as u16).saturating_add((y.min(u16::MAX as u32)) as u16),
  )
}

fn render_direct(image: &DynamicImage, area: Rect, buf: &mut Buffer) {
  let rgb = image.to_rgb8();
  let img_w = rgb.width().min(area.width as u32);
  let img_h = rgb.height();
  let cell_h = img_h.div_ceil(2);
  let offset_x = (area.width as u32).saturating_sub(img_w) / 2;
  let offset_y = (area.height as u32).saturating_sub(cell_h) / 2;

  for y in 0..cell_h.min(area.height as u32) {
    for x in 0..img_w {
      let upper = rgb.get_pixel(x, y * 2);
      let lower_y = y * 2 + 1;
      let fg = Color::Rgb(upper[0], upper[1], upper[2]);
      let bg = if lower_y < img_h {
        let lower = rgb.get_pixel(x, lower_y);
        Color::Rgb(lower[0], lower[1], lower[2])
      } else {
        Color::Reset
      };
      let (cx, cy) = cell(area, offset_x, offset_y, x, y);
      buf.set_string(cx, cy, "▀", Style::default().fg(fg).bg(bg));
    }
  }
}

fn ascii_char(luma: u8) -> &'static str {
  let idx = ((luma as f32 / 255.0) * (ASCII_CHARS.len() - 1) as f32).round() as usize;
  ASCII_CHARS[idx.min(ASCII_CHARS.len() - 1)]
}

fn render_ascii(image: &DynamicImage, area: Rect, buf: &mut Buffer) {
  let luma = image.to_luma8();
  let img_w = luma.width().min(area.width as u32);
  let img_h = luma.height().min(area.height as u32);
  let offset_x = (area.width as u32).saturating_sub(img_w) / 2;
  let offset_y = (area.height as u32).saturating_sub(img_h) / 2;

  for y in 0..img_h {
    for x in 0..img_w {
      let (cx, cy) = cell(area, offset_x, offset_y, x, y);
      buf.set_string(cx, cy, ascii_char(luma.get_pixel(x, y)[0]), Style::default());
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ascii_ramp_ends() {
    assert_eq!(ascii_char(0), " ");
    assert_eq!(ascii_char(255), "@");
  }

  #[test]
  fn fit_doubles_rows_in_half_block_mode() {
    let img = DynamicImage::new_rgb8(64, 64);
    let area = Rect::new(0, 0, 10, 5);
    let direct = fit_to_area(&img, area, DisplayMode::Direct);
    assert_eq!((direct.width(), direct.height()), (10, 10));
    let ascii = fit_to_area(&img, area, DisplayMode::Ascii);
    assert_eq!((ascii.width(), ascii.height()), (10, 5));
  }

  #[test]
  fn render_direct_fills_cells() {
    let img = DynamicImage::new_rgb8(4, 4);
    let area = Rect::new(0, 0, 4, 2);
    let mut buf = Buffer::empty(area);
    PreviewWidget { image: &img, display_mode: DisplayMode::Direct }.render(area, &mut buf);
    assert_eq!(buf[(0, 0)].symbol(), "▀");
    assert_eq!(buf[(3, 1)].symbol(), "▀");
  }

  #[test]
  fn render_into_empty_area_is_noop() {
    let img = DynamicImage::new_rgb8(4, 4);
    let area = Rect::new(0, 0, 0, 0);
    let mut buf = Buffer::empty(Rect::new(0, 0, 1, 1));
    PreviewWidget { image: &img, display_mode: DisplayMode::Ascii }.render(area, &mut buf);
    assert_eq!(buf[(0, 0)].symbol(), " ");
  }
}
