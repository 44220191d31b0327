use anyhow::{Context, Result};
use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};

use crate::app::{App, AppMode, TextInput};

// --- Helpers ---

/// Convert a char index to a byte offset within the string.
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
  s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

/// Shared line-editing keys. Returns true when the key was consumed.
fn edit_text(input: &mut TextInput, code: KeyCode) -> bool {
  match code {
    KeyCode::Char(c) => {
      let byte_idx = char_to_byte_index(&input.value, input.cursor);
      input.value.insert(byte_idx, c);
      input.cursor += 1;
    }
    KeyCode::Backspace => {
      if input.cursor > 0 {
        input.cursor -= 1;
        let byte_idx = char_to_byte_index(&input.value, input.cursor);
        input.value.remove(byte_idx);
      }
    }
    KeyCode::Delete => {
      if input.cursor < input.value.chars().count() {
        let byte_idx = char_to_byte_index(&input.value, input.cursor);
        input.value.remove(byte_idx);
      }
    }
    KeyCode::Left => {
      input.cursor = input.cursor.saturating_sub(1);
    }
    KeyCode::Right => {
      if input.cursor < input.value.chars().count() {
        input.cursor += 1;
      }
    }
    KeyCode::Home => {
      input.cursor = 0;
    }
    KeyCode::End => {
      input.cursor = input.value.chars().count();
    }
    _ => return false,
  }
  true
}

// --- Event Handling ---

pub async fn handle_key_event(app: &mut App, key: event::KeyEvent) -> Result<()> {
  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
    app.should_quit = true;
    return Ok(());
  }

  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('t') {
    app.next_theme();
    return Ok(());
  }

  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s') {
    if app.player.is_playing() {
      app.player.stop().await.context("Failed to stop playback")?;
    }
    return Ok(());
  }

  match app.mode {
    AppMode::Browse => handle_browse_key(app, key).await.context("Failed to handle browse key event")?,
    AppMode::Filter => handle_filter_key(app, key),
    AppMode::Login(_) => handle_login_key(app, key),
    AppMode::Editor => handle_editor_key(app, key),
    AppMode::ConfirmDelete => app.confirm_delete(matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y'))),
    AppMode::BannerInput => handle_banner_key(app, key),
  }
  Ok(())
}

async fn handle_browse_key(app: &mut App, key: event::KeyEvent) -> Result<()> {
  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('a') {
    app.toggle_admin();
    return Ok(());
  }

  match key.code {
    KeyCode::Enter => app.activate_selected().await,
    KeyCode::Char(' ') => {
      if app.player.is_playing()
        && let Err(e) = app.player.toggle_pause().await
      {
        app.set_error(format!("Erro ao pausar: {}", e));
      }
    }
    KeyCode::Char('f') => {
      if app.player.is_playing()
        && let Err(e) = app.player.toggle_fullscreen().await
      {
        app.set_error(format!("Erro na tela cheia: {}", e));
      }
    }
    KeyCode::Char('/') => {
      app.mode = AppMode::Filter;
    }
    KeyCode::Down | KeyCode::Char('j') => app.select_next(),
    KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
    KeyCode::Char('l') => app.toggle_like(),
    KeyCode::Char('s') => app.toggle_save(),
    KeyCode::Char('c') => app.share_selected(),
    KeyCode::Char('v') => app.toggle_spectator(),
    KeyCode::Char('u') => app.open_checkout(),
    KeyCode::Char('a') => app.open_editor(),
    KeyCode::Char('d') | KeyCode::Delete => app.request_delete(),
    KeyCode::Char('b') => app.open_banner_input(),
    KeyCode::Char('q') => app.should_quit = true,
    KeyCode::Esc => {
      if !app.filter.value.is_empty() {
        app.filter.clear();
        app.clamp_selection();
      } else {
        app.should_quit = true;
      }
    }
    _ => {}
  }
  Ok(())
}

fn handle_filter_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Down => app.select_next(),
    KeyCode::Up => app.select_previous(),
    KeyCode::Enter => {
      app.mode = AppMode::Browse;
    }
    KeyCode::Esc => {
      app.filter.clear();
      app.clamp_selection();
      app.mode = AppMode::Browse;
    }
    code => {
      if edit_text(&mut app.filter, code) {
        app.clamp_selection();
      }
    }
  }
}

fn handle_login_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Enter => app.submit_password(),
    KeyCode::Esc => app.cancel_login(),
    code => {
      edit_text(&mut app.password, code);
    }
  }
}

fn handle_editor_key(app: &mut App, key: event::KeyEvent) {
  if key.code == KeyCode::Esc {
    app.cancel_editor();
    return;
  }
  // The form is frozen while the metadata request runs.
  if app.editor.is_submitting() {
    return;
  }
  app.clear_error();
  match key.code {
    KeyCode::Tab | KeyCode::Down | KeyCode::BackTab | KeyCode::Up => app.editor_next_field(),
    KeyCode::Enter => app.trigger_submit(),
    code => {
      edit_text(&mut app.editor_input, code);
    }
  }
}

fn handle_banner_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Enter => app.submit_banner(),
    KeyCode::Esc => {
      app.banner_input.clear();
      app.clear_error();
      app.mode = AppMode::Browse;
    }
    code => {
      edit_text(&mut app.banner_input, code);
    }
  }
}
