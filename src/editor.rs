//! The "add video" form: field state, the one-submission-at-a-time guard and
//! turning a finished submission plus generated metadata into an entry.

use rand::Rng;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use crate::catalog::VideoEntry;
use crate::constants::constants;
use crate::media;
use crate::metadata::AiMetadata;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorField {
  #[default]
  Video,
  Cover,
  Title,
}

impl EditorField {
  pub const ALL: [EditorField; 3] = [EditorField::Video, EditorField::Cover, EditorField::Title];

  pub fn label(self) -> &'static str {
    match self {
      EditorField::Video => "1. Arquivo de vídeo",
      EditorField::Cover => "2. Capa do vídeo (opcional)",
      EditorField::Title => "Título",
    }
  }

  pub fn next(self) -> Self {
    let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
    Self::ALL[(idx + 1) % Self::ALL.len()]
  }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditorError {
  #[error("Informe um título.")]
  MissingTitle,
  #[error("Selecione um arquivo de vídeo.")]
  MissingVideo,
  #[error("O arquivo de vídeo não existe: {0}")]
  VideoNotFound(String),
  #[error("Já existe um envio em andamento.")]
  AlreadySubmitting,
}

/// Everything captured from the form at submit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
  pub title: String,
  pub filename: String,
  pub media_path: String,
  pub cover_url: String,
}

#[derive(Debug, Default)]
pub struct EntryEditor {
  pub title: String,
  pub video_input: String,
  pub cover_input: String,
  pub focus: EditorField,
  submitting: bool,
}

impl EntryEditor {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_submitting(&self) -> bool {
    self.submitting
  }

  /// The text buffer behind the focused field.
  pub fn focused_input(&mut self) -> &mut String {
    match self.focus {
      EditorField::Video => &mut self.video_input,
      EditorField::Cover => &mut self.cover_input,
      EditorField::Title => &mut self.title,
    }
  }

  /// Commit the typed video path. Picking a different file fills an empty
  /// title from its name; re-committing the same path leaves the title alone.
  pub fn set_video(&mut self, path: &str) {
    let path = path.trim();
    if path == self.video_input {
      return;
    }
    self.video_input = path.to_string();
    if self.title.trim().is_empty()
      && let Some(stem) = title_from_filename(&self.video_input)
    {
      self.title = stem;
    }
  }

  pub fn set_cover(&mut self, path: &str) {
    self.cover_input = path.trim().to_string();
  }

  pub fn can_submit(&self) -> bool {
    !self.submitting && !self.title.trim().is_empty() && !self.video_input.trim().is_empty()
  }

  /// Validate the form and close the gate until [`reset`](Self::reset). The
  /// cover is embedded now; a cover that can't be read falls back to the
  /// default instead of blocking the upload.
  pub fn begin_submit(&mut self) -> Result<Submission, EditorError> {
    if self.submitting {
      return Err(EditorError::AlreadySubmitting);
    }
    let title = self.title.trim();
    if title.is_empty() {
      return Err(EditorError::MissingTitle);
    }
    let video = self.video_input.trim();
    if video.is_empty() {
      return Err(EditorError::MissingVideo);
    }
    let video_path = Path::new(video);
    if !video_path.is_file() {
      return Err(EditorError::VideoNotFound(video.to_string()));
    }

    let media_path = std::path::absolute(video_path).unwrap_or_else(|_| PathBuf::from(video));
    let filename =
      video_path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| video.to_string());

    let cover = self.cover_input.trim();
    let cover_url = if cover.is_empty() {
      constants().default_cover.clone()
    } else {
      match media::data_url_from_path(Path::new(cover)) {
        Ok(url) => url,
        Err(e) => {
          warn!(err = ?e, "editor: cover unusable, using default");
          constants().default_cover.clone()
        }
      }
    };

    self.submitting = true;
    Ok(Submission {
      title: title.to_string(),
      filename,
      media_path: media_path.to_string_lossy().into_owned(),
      cover_url,
    })
  }

  /// Clear every field and reopen the gate.
  pub fn reset(&mut self) {
    *self = Self::default();
  }
}

/// File name without its last extension, e.g. `ferias.2024.mp4` -> `ferias.2024`.
pub fn title_from_filename(path: &str) -> Option<String> {
  let name = Path::new(path).file_name()?.to_string_lossy().into_owned();
  let title = match name.rsplit_once('.') {
    Some((stem, _)) => stem.to_string(),
    None => String::new(),
  };
  (!title.trim().is_empty()).then_some(title)
}

fn draw(rng: &mut impl Rng, (low, high): (u32, u32)) -> u32 {
  rng.gen_range(low..high)
}

/// Assemble the entry for a finished submission. Engagement counters are
/// placeholders drawn from the configured ranges.
pub fn build_entry(submission: Submission, metadata: AiMetadata, rng: &mut impl Rng, now_ms: i64) -> VideoEntry {
  let c = constants();
  VideoEntry {
    id: uuid::Uuid::new_v4().to_string(),
    title: submission.title,
    url: submission.media_path,
    cover_url: submission.cover_url,
    description: metadata.summary,
    tags: metadata.tags,
    created_at: now_ms,
    likes: draw(rng, c.likes_range),
    comments: draw(rng, c.comments_range),
    shares: draw(rng, c.shares_range),
  }
}
