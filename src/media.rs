//! Cover and banner references: embedding picked images as `data:` URLs and
//! turning any stored reference back into pixels for the preview pane.

use anyhow::{Context, Result, anyhow};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use image::DynamicImage;
use reqwest::Client;
use std::path::Path;

/// Read an image file and embed it as `data:<mime>;base64,<payload>`.
/// Fails if the bytes don't look like a known image format.
pub fn data_url_from_path(path: &Path) -> Result<String> {
  let bytes = std::fs::read(path).with_context(|| format!("Failed to read image {}", path.display()))?;
  data_url_from_bytes(&bytes).with_context(|| format!("{} is not a supported image", path.display()))
}

pub fn data_url_from_bytes(bytes: &[u8]) -> Result<String> {
  let format = image::guess_format(bytes).context("Unrecognized image format")?;
  Ok(format!("data:{};base64,{}", format.to_mime_type(), BASE64.encode(bytes)))
}

/// Split a `data:` URL into its mime type and decoded bytes.
pub fn decode_data_url(url: &str) -> Result<(String, Vec<u8>)> {
  let rest = url.strip_prefix("data:").ok_or_else(|| anyhow!("Not a data URL"))?;
  let (header, payload) = rest.split_once(',').ok_or_else(|| anyhow!("Data URL has no payload"))?;
  let mime = header.strip_suffix(";base64").ok_or_else(|| anyhow!("Only base64 data URLs are supported"))?;
  let bytes = BASE64.decode(payload.trim()).context("Invalid base64 in data URL")?;
  Ok((mime.to_string(), bytes))
}

/// Short human description of a reference, for places that can't draw it.
pub fn describe(reference: &str) -> String {
  if let Ok((mime, bytes)) = decode_data_url(reference) {
    format!("{} imagem incorporada, {} KB", mime, bytes.len().div_ceil(1024))
  } else {
    reference.to_string()
  }
}

/// Load the image behind a stored reference: a data URL, an http(s) URL or a
/// local path.
pub async fn load_image(client: &Client, reference: &str) -> Result<DynamicImage> {
  if reference.starts_with("data:") {
    let (_, bytes) = decode_data_url(reference)?;
    return image::load_from_memory(&bytes).context("Failed to decode embedded image");
  }

  if reference.starts_with("http://") || reference.starts_with("https://") {
    let response = client.get(reference).send().await.with_context(|| format!("Failed to fetch {}", reference))?;
    if !response.status().is_success() {
      return Err(anyhow!("Fetching {} returned {}", reference, response.status()));
    }
    let bytes = response.bytes().await.with_context(|| format!("Failed to read image bytes from {}", reference))?;
    return image::load_from_memory(&bytes).with_context(|| format!("Failed to decode image from {}", reference));
  }

  let path = reference.to_string();
  tokio::task::spawn_blocking(move || {
    image::ImageReader::open(&path)
      .with_context(|| format!("Failed to open {}", path))?
      .with_guessed_format()
      .with_context(|| format!("Failed to probe {}", path))?
      .decode()
      .with_context(|| format!("Failed to decode {}", path))
  })
  .await
  .context("Image loading task failed")?
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::ImageFormat;
  use std::io::Cursor;

  fn tiny_png() -> Vec<u8> {
    let img = DynamicImage::new_rgb8(2, 2);
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png).unwrap();
    buf
  }

  #[test]
  fn data_url_carries_sniffed_mime() {
    let url = data_url_from_bytes(&tiny_png()).unwrap();
    assert!(url.starts_with("data:image/png;base64,"));
    let (mime, bytes) = decode_data_url(&url).unwrap();
    assert_eq!(mime, "image/png");
    assert_eq!(bytes, tiny_png());
  }

  #[test]
  fn non_image_bytes_are_rejected() {
    assert!(data_url_from_bytes(b"definitely not an image").is_err());
  }

  #[test]
  fn data_url_from_path_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("capa.png");
    std::fs::write(&path, tiny_png()).unwrap();
    assert!(data_url_from_path(&path).unwrap().starts_with("data:image/png;"));
    assert!(data_url_from_path(&dir.path().join("missing.png")).is_err());
  }

  #[test]
  fn decode_rejects_plain_paths() {
    assert!(decode_data_url("./banner.jpg").is_err());
    assert!(decode_data_url("data:image/png,raw").is_err());
  }

  #[test]
  fn describe_keeps_paths_and_summarizes_payloads() {
    assert_eq!(describe("./banner.jpg"), "./banner.jpg");
    let url = data_url_from_bytes(&tiny_png()).unwrap();
    assert!(describe(&url).starts_with("image/png imagem incorporada"));
  }

  #[tokio::test]
  async fn load_image_from_data_url_and_path() {
    let client = Client::new();
    let url = data_url_from_bytes(&tiny_png()).unwrap();
    let img = load_image(&client, &url).await.unwrap();
    assert_eq!((img.width(), img.height()), (2, 2));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("capa.png");
    std::fs::write(&path, tiny_png()).unwrap();
    let img = load_image(&client, path.to_str().unwrap()).await.unwrap();
    assert_eq!(img.width(), 2);
  }
}
