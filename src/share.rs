use anyhow::{Context, Result, anyhow};
use std::io::Write;
use std::process::{Command, Stdio};
use tracing::{error, warn};

use crate::constants::constants;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareData {
  pub title: String,
  pub text: String,
  pub url: Option<String>,
}

impl ShareData {
  pub fn for_video(title: &str, url: Option<&str>) -> Self {
    Self {
      title: title.to_string(),
      text: format!("Confira este vídeo no {}: {}", constants().app_name, title),
      url: url.filter(|u| !u.trim().is_empty()).map(str::to_string),
    }
  }

  /// The block copied when sharing falls back to the clipboard.
  pub fn clipboard_text(&self) -> String {
    match &self.url {
      Some(url) => format!("{}\n{}\n{}", self.title, self.text, url),
      None => format!("{}\n{}", self.title, self.text),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
  Shared,
  Copied,
  Failed,
}

impl ShareOutcome {
  pub fn message(self) -> &'static str {
    match self {
      ShareOutcome::Shared => "Vídeo compartilhado!",
      ShareOutcome::Copied => "Informações do vídeo copiadas para a área de transferência!",
      ShareOutcome::Failed => "Não foi possível compartilhar este vídeo.",
    }
  }
}

pub trait ShareSink {
  fn share(&self, data: &ShareData) -> Result<()>;
}

/// Try the native share first, then the clipboard; each failure is logged and
/// hands over to the next stage.
pub fn share_with_fallback(native: &dyn ShareSink, clipboard: &dyn ShareSink, data: &ShareData) -> ShareOutcome {
  match native.share(data) {
    Ok(()) => return ShareOutcome::Shared,
    Err(e) => warn!(err = %e, "share: native share failed, falling back to clipboard"),
  }
  match clipboard.share(data) {
    Ok(()) => ShareOutcome::Copied,
    Err(e) => {
      error!(err = %e, "share: clipboard failed");
      ShareOutcome::Failed
    }
  }
}

fn pipe_to(program: &str, args: &[&str], input: &str) -> Result<()> {
  let mut child = Command::new(program)
    .args(args)
    .stdin(Stdio::piped())
    .stdout(Stdio::null())
    .stderr(Stdio::null())
    .spawn()
    .with_context(|| format!("Failed to spawn {}", program))?;
  if let Some(mut stdin) = child.stdin.take() {
    stdin.write_all(input.as_bytes()).with_context(|| format!("Failed to write to {}", program))?;
  }
  let status = child.wait().with_context(|| format!("Failed to wait for {}", program))?;
  if !status.success() {
    return Err(anyhow!("{} exited with {}", program, status));
  }
  Ok(())
}

/// Runs the user's configured share command with the share text on stdin.
pub struct CommandShare {
  pub command: Option<String>,
}

impl ShareSink for CommandShare {
  fn share(&self, data: &ShareData) -> Result<()> {
    let command = self.command.as_deref().map(str::trim).filter(|c| !c.is_empty());
    let Some(command) = command else {
      return Err(anyhow!("Share not supported: no share_command configured"));
    };
    // Plain whitespace split: no quoting, no shell expansion.
    let mut parts = command.split_whitespace();
    let program = parts.next().ok_or_else(|| anyhow!("Empty share_command"))?;
    let args: Vec<&str> = parts.collect();
    pipe_to(program, &args, &data.clipboard_text())
  }
}

/// Copies to the system clipboard.
pub struct SystemClipboard;

impl ShareSink for SystemClipboard {
  fn share(&self, data: &ShareData) -> Result<()> {
    arboard::Clipboard::new()
      .and_then(|mut cb| cb.set_text(data.clipboard_text()))
      .context("Failed to copy to clipboard")
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::cell::RefCell;

  struct Recording {
    fail: bool,
    seen: RefCell<Vec<String>>,
  }

  impl Recording {
    fn new(fail: bool) -> Self {
      Self { fail, seen: RefCell::new(Vec::new()) }
    }
  }

  impl ShareSink for Recording {
    fn share(&self, data: &ShareData) -> Result<()> {
      self.seen.borrow_mut().push(data.clipboard_text());
      if self.fail { Err(anyhow!("nope")) } else { Ok(()) }
    }
  }

  fn data() -> ShareData {
    ShareData::for_video("Praia", Some("https://reel.example/"))
  }

  #[test]
  fn native_success_skips_clipboard() {
    let (native, clip) = (Recording::new(false), Recording::new(false));
    assert_eq!(share_with_fallback(&native, &clip, &data()), ShareOutcome::Shared);
    assert!(clip.seen.borrow().is_empty());
  }

  #[test]
  fn native_failure_copies_to_clipboard() {
    let (native, clip) = (Recording::new(true), Recording::new(false));
    assert_eq!(share_with_fallback(&native, &clip, &data()), ShareOutcome::Copied);
    assert_eq!(clip.seen.borrow().as_slice(), ["Praia\nConfira este vídeo no Reel: Praia\nhttps://reel.example/"]);
  }

  #[test]
  fn both_failing_reports_failure() {
    let (native, clip) = (Recording::new(true), Recording::new(true));
    let outcome = share_with_fallback(&native, &clip, &data());
    assert_eq!(outcome, ShareOutcome::Failed);
    assert_eq!(outcome.message(), "Não foi possível compartilhar este vídeo.");
  }

  #[test]
  fn clipboard_text_omits_missing_url() {
    let d = ShareData::for_video("Praia", Some("  "));
    assert_eq!(d.url, None);
    assert_eq!(d.clipboard_text(), "Praia\nConfira este vídeo no Reel: Praia");
  }

  #[test]
  fn configured_command_receives_share_text() {
    let sink = CommandShare { command: Some("  cat -  ".to_string()) };
    assert!(sink.share(&data()).is_ok());
  }

  #[test]
  fn failing_command_is_an_error() {
    let sink = CommandShare { command: Some("false".to_string()) };
    assert!(sink.share(&data()).is_err());
  }

  #[test]
  fn unconfigured_command_share_is_unsupported() {
    let sink = CommandShare { command: None };
    let err = sink.share(&data()).unwrap_err();
    assert!(err.to_string().contains("not supported"));
  }
}
