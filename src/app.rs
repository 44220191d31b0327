use anyhow::{Context, Result};
use image::DynamicImage;
use ratatui::widgets::ListState;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::access::{AccessController, AccessError, AccessMode, ExactSecret, FoldedPhrase};
use crate::catalog::{CatalogStore, PendingRemoval, VideoEntry};
use crate::config::Config;
use crate::constants::constants;
use crate::display::DisplayMode;
use crate::editor::{EditorField, EntryEditor, Submission, build_entry};
use crate::links::open_url;
use crate::media;
use crate::metadata::{AiMetadata, GeminiClient, generate_or_fallback};
use crate::player::{NowPlaying, VideoPlayer};
use crate::share::{CommandShare, ShareData, ShareOutcome, SystemClipboard, share_with_fallback};
use crate::theme::{THEMES, Theme, theme_index};
use crate::view::{CardState, CoverAction, cover_action};

// --- Types ---

type MetadataResult = (Submission, AiMetadata);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
  Browse,
  Filter,
  /// Password prompt for the given target mode.
  Login(AccessMode),
  Editor,
  ConfirmDelete,
  BannerInput,
}

/// Which stored image a preview belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PreviewKey {
  Banner,
  Cover(String),
}

/// Decoded banner/cover images plus their last resize. `None` marks a
/// reference that failed to load, so it isn't retried every tick.
#[derive(Default)]
pub struct PreviewCache {
  pub images: HashMap<PreviewKey, Option<DynamicImage>>,
  pub resized: HashMap<PreviewKey, (u16, u16, DynamicImage)>,
  loading: Option<(PreviewKey, oneshot::Receiver<Result<DynamicImage>>)>,
}

impl PreviewCache {
  pub fn get(&self, key: &PreviewKey) -> Option<&DynamicImage> {
    self.images.get(key).and_then(Option::as_ref)
  }

  fn forget(&mut self, key: &PreviewKey) {
    self.images.remove(key);
    self.resized.remove(key);
    if self.loading.as_ref().is_some_and(|(k, _)| k == key) {
      self.loading = None;
    }
  }
}

/// In-flight editor metadata generation and share cascade.
#[derive(Default)]
pub(crate) struct AsyncTasks {
  pub(crate) metadata_rx: Option<oneshot::Receiver<MetadataResult>>,
  pub(crate) metadata_handle: Option<JoinHandle<()>>,
  pub(crate) share_rx: Option<oneshot::Receiver<ShareOutcome>>,
}

/// A single-line text field with a char-indexed cursor.
#[derive(Debug, Default, Clone)]
pub struct TextInput {
  pub value: String,
  pub cursor: usize,
  pub scroll: usize,
}

impl TextInput {
  pub fn clear(&mut self) {
    *self = Self::default();
  }

  pub fn set(&mut self, value: &str) {
    self.value = value.to_string();
    self.cursor = value.chars().count();
    self.scroll = 0;
  }
}

pub struct App {
  pub catalog: CatalogStore,
  pub access: AccessController,
  pub editor: EntryEditor,
  pub player: VideoPlayer,
  pub config: Config,
  pub display_mode: DisplayMode,
  pub mode: AppMode,
  pub theme_index: usize,
  pub list_state: ListState,
  /// Search text; the visible list is recomputed from it on every draw.
  pub filter: TextInput,
  /// Password prompt; rendered masked.
  pub password: TextInput,
  pub banner_input: TextInput,
  /// Cursor/scroll for whichever editor field has focus.
  pub editor_input: TextInput,
  /// Session-only like/save state per entry id.
  pub cards: HashMap<String, CardState>,
  pub pending_removal: Option<PendingRemoval>,
  pub previews: PreviewCache,
  pub last_error: Option<String>,
  pub status_message: Option<String>,
  pub info_message: Option<String>,
  pub should_quit: bool,
  generator: Arc<GeminiClient>,
  http_client: reqwest::Client,
  pub(crate) tasks: AsyncTasks,
  message_time: Option<Instant>,
}

impl App {
  pub fn new(catalog: CatalogStore, config: Config, display_mode: DisplayMode) -> Result<Self> {
    let generator =
      GeminiClient::new(config.base_url(), config.model(), config.api_key(), config.metadata_timeout())?;
    let http_client =
      reqwest::Client::builder().timeout(config.metadata_timeout()).build().context("Failed to build HTTP client")?;
    let access = AccessController::new(
      Box::new(ExactSecret::new(config.admin_secret())),
      Box::new(FoldedPhrase::new(config.spectator_phrase())),
    );

    let mut list_state = ListState::default();
    if !catalog.is_empty() {
      list_state.select(Some(0));
    }

    Ok(Self {
      catalog,
      access,
      editor: EntryEditor::new(),
      player: VideoPlayer::new(),
      theme_index: theme_index(config.theme_name.as_deref()),
      config,
      display_mode,
      mode: AppMode::Browse,
      list_state,
      filter: TextInput::default(),
      password: TextInput::default(),
      banner_input: TextInput::default(),
      editor_input: TextInput::default(),
      cards: HashMap::new(),
      pending_removal: None,
      previews: PreviewCache::default(),
      last_error: None,
      status_message: None,
      info_message: None,
      should_quit: false,
      generator: Arc::new(generator),
      http_client,
      tasks: AsyncTasks::default(),
      message_time: None,
    })
  }

  pub fn theme(&self) -> &'static Theme {
    &THEMES[self.theme_index % THEMES.len()]
  }

  pub fn next_theme(&mut self) {
    self.theme_index = (self.theme_index + 1) % THEMES.len();
    self.config.theme_name = Some(self.theme().name.to_string());
    self.config.save();
  }

  /// Set an error message with auto-dismiss tracking.
  pub fn set_error(&mut self, msg: String) {
    self.info_message = None;
    self.last_error = Some(msg);
    self.message_time = Some(Instant::now());
  }

  pub fn set_info(&mut self, msg: String) {
    self.last_error = None;
    self.info_message = Some(msg);
    self.message_time = Some(Instant::now());
  }

  pub fn clear_error(&mut self) {
    self.last_error = None;
  }

  /// Clear stale error and info messages after 5 seconds.
  pub fn expire_messages(&mut self) {
    if let Some(t) = self.message_time
      && t.elapsed() >= Duration::from_secs(5)
    {
      self.last_error = None;
      self.info_message = None;
      self.message_time = None;
    }
  }

  // --- Catalog view ---

  /// Entries matching the current filter, in catalog order.
  pub fn visible_entries(&self) -> Vec<&VideoEntry> {
    self.catalog.filter(&self.filter.value)
  }

  pub fn selected_entry(&self) -> Option<&VideoEntry> {
    let idx = self.list_state.selected()?;
    self.visible_entries().get(idx).copied()
  }

  /// Keep the selection inside the visible list after it changes size.
  pub fn clamp_selection(&mut self) {
    let count = self.visible_entries().len();
    if count == 0 {
      self.list_state.select(None);
    } else {
      let sel = self.list_state.selected().unwrap_or(0);
      self.list_state.select(Some(sel.min(count - 1)));
    }
  }

  pub fn select_next(&mut self) {
    let count = self.visible_entries().len();
    if count > 0 {
      let i = self.list_state.selected().map_or(0, |i| (i + 1) % count);
      self.list_state.select(Some(i));
    }
  }

  pub fn select_previous(&mut self) {
    let count = self.visible_entries().len();
    if count > 0 {
      let i = self.list_state.selected().map_or(0, |i| if i == 0 { count - 1 } else { i - 1 });
      self.list_state.select(Some(i));
    }
  }

  /// Session card state for `id`, seeded from the stored counters.
  pub fn card(&self, id: &str) -> Option<CardState> {
    self.cards.get(id).cloned().or_else(|| self.catalog.get(id).map(CardState::new))
  }

  fn with_selected_card(&mut self, f: impl FnOnce(&mut CardState)) {
    let Some(id) = self.selected_entry().map(|e| e.id.clone()) else { return };
    let Some(mut card) = self.card(&id) else { return };
    f(&mut card);
    self.cards.insert(id, card);
  }

  pub fn toggle_like(&mut self) {
    self.with_selected_card(CardState::toggle_like);
  }

  pub fn toggle_save(&mut self) {
    self.with_selected_card(CardState::toggle_save);
  }

  // --- Access ---

  /// Admin button: log out when already admin, otherwise ask for the secret.
  pub fn toggle_admin(&mut self) {
    if self.access.mode() == AccessMode::Admin {
      self.access.logout();
      self.set_info("Modo administrador encerrado.".to_string());
    } else {
      self.open_login(AccessMode::Admin);
    }
  }

  /// VIP button: log out when already a spectator, otherwise ask for the phrase.
  pub fn toggle_spectator(&mut self) {
    if self.access.mode() == AccessMode::Spectator {
      self.access.logout();
      self.set_info("Modo VIP encerrado.".to_string());
    } else {
      self.open_login(AccessMode::Spectator);
    }
  }

  fn open_login(&mut self, target: AccessMode) {
    self.password.clear();
    self.clear_error();
    self.mode = AppMode::Login(target);
  }

  pub fn submit_password(&mut self) {
    let AppMode::Login(target) = self.mode else { return };
    let result = match target {
      AccessMode::Spectator => self.access.request_spectator(&self.password.value),
      AccessMode::Admin => self.access.request_admin(&self.password.value),
      // Public needs no credential.
      AccessMode::Public => {
        self.cancel_login();
        return;
      }
    };
    self.password.clear();
    match result {
      Ok(()) => {
        self.mode = AppMode::Browse;
        self.set_info(format!("Modo {} ativado.", target.label()));
      }
      Err(e) => {
        let AccessError::IncorrectPassword { target: attempted } = &e;
        debug!(mode = attempted.label(), "access: prompt stays open");
        self.set_error(e.to_string());
      }
    }
  }

  pub fn cancel_login(&mut self) {
    self.password.clear();
    self.clear_error();
    self.mode = AppMode::Browse;
  }

  // --- Cover actions ---

  /// Enter on a card: play it when the mode allows, otherwise send the
  /// viewer to the locked-content page.
  pub async fn activate_selected(&mut self) {
    let Some(entry) = self.selected_entry() else { return };
    let item = NowPlaying { id: entry.id.clone(), title: entry.title.clone(), path: entry.url.clone() };
    match cover_action(self.access.mode()) {
      CoverAction::Play => {
        self.clear_error();
        if let Err(e) = self.player.play(item).await {
          warn!(err = %e, "player: failed to start");
          self.set_error(format!("Erro ao reproduzir: {}", e));
          let _ = self.player.stop().await;
        }
      }
      CoverAction::Redirect(url) => self.open_link(&url),
    }
  }

  /// "Liberar VIP": only offered to public visitors.
  pub fn open_checkout(&mut self) {
    if self.access.mode() == AccessMode::Public {
      self.open_link(&constants().checkout_url);
    }
  }

  fn open_link(&mut self, url: &str) {
    if let Err(e) = open_url(url) {
      self.set_error(format!("Falha ao abrir o navegador: {}", e));
    }
  }

  /// The share command and clipboard may block, so the cascade runs on a
  /// blocking thread and its outcome is picked up by `check_pending`.
  pub fn share_selected(&mut self) {
    if self.tasks.share_rx.is_some() {
      return;
    }
    let Some(entry) = self.selected_entry() else { return };
    let data = ShareData::for_video(&entry.title, self.config.share_url.as_deref());
    let native = CommandShare { command: self.config.share_command.clone() };
    let (tx, rx) = oneshot::channel();
    tokio::task::spawn_blocking(move || {
      let _ = tx.send(share_with_fallback(&native, &SystemClipboard, &data));
    });
    self.tasks.share_rx = Some(rx);
  }

  fn finish_share(&mut self, outcome: ShareOutcome) {
    match outcome {
      ShareOutcome::Failed => self.set_error(outcome.message().to_string()),
      _ => self.set_info(outcome.message().to_string()),
    }
  }

  // --- Admin: removal ---

  pub fn request_delete(&mut self) {
    if !self.access.can_manage() {
      return;
    }
    let Some(id) = self.selected_entry().map(|e| e.id.clone()) else { return };
    if let Some(pending) = self.catalog.request_removal(&id) {
      self.pending_removal = Some(pending);
      self.mode = AppMode::ConfirmDelete;
    }
  }

  pub fn confirm_delete(&mut self, confirmed: bool) {
    let pending = self.pending_removal.take();
    self.mode = AppMode::Browse;
    let Some(pending) = pending else { return };
    if !confirmed {
      return;
    }
    let id = pending.id().to_string();
    let title = pending.title().to_string();
    if self.catalog.remove(pending) {
      self.cards.remove(&id);
      self.previews.forget(&PreviewKey::Cover(id));
      self.clamp_selection();
      self.set_info(format!("\"{}\" removido.", title));
    }
  }

  // --- Admin: banner ---

  pub fn open_banner_input(&mut self) {
    if self.access.can_manage() {
      self.banner_input.clear();
      self.mode = AppMode::BannerInput;
    }
  }

  pub fn submit_banner(&mut self) {
    let path = self.banner_input.value.trim().to_string();
    if path.is_empty() {
      self.set_error("Informe o caminho da imagem.".to_string());
      return;
    }
    match media::data_url_from_path(Path::new(&path)) {
      Ok(url) => {
        self.catalog.replace_banner(url);
        self.previews.forget(&PreviewKey::Banner);
        self.banner_input.clear();
        self.mode = AppMode::Browse;
        self.set_info("Banner atualizado.".to_string());
      }
      Err(e) => self.set_error(format!("{:#}", e)),
    }
  }

  // --- Admin: editor ---

  pub fn open_editor(&mut self) {
    if self.access.can_manage() {
      self.editor.reset();
      self.editor_input.clear();
      self.mode = AppMode::Editor;
    }
  }

  /// Move focus to the next editor field, committing the one being left.
  pub fn editor_next_field(&mut self) {
    self.commit_editor_field();
    self.editor.focus = self.editor.focus.next();
    let value = self.editor.focused_input().clone();
    self.editor_input.set(&value);
  }

  fn commit_editor_field(&mut self) {
    let value = self.editor_input.value.clone();
    match self.editor.focus {
      EditorField::Video => self.editor.set_video(&value),
      EditorField::Cover => self.editor.set_cover(&value),
      EditorField::Title => self.editor.title = value,
    }
  }

  pub fn trigger_submit(&mut self) {
    if self.editor.is_submitting() {
      return;
    }
    self.commit_editor_field();
    let submission = match self.editor.begin_submit() {
      Ok(s) => s,
      Err(e) => {
        self.set_error(e.to_string());
        return;
      }
    };
    info!(title = %submission.title, "editor: submitting");
    self.clear_error();
    self.status_message = Some("Gerando resumo e tags com IA…".to_string());

    let generator = Arc::clone(&self.generator);
    let (tx, rx) = oneshot::channel();
    let handle = tokio::spawn(async move {
      let metadata = generate_or_fallback(generator.as_ref(), &submission.title, &submission.filename).await;
      let _ = tx.send((submission, metadata));
    });
    self.tasks.metadata_rx = Some(rx);
    self.tasks.metadata_handle = Some(handle);
  }

  /// Close the editor. An in-flight metadata request is dropped with it.
  pub fn cancel_editor(&mut self) {
    if let Some(handle) = self.tasks.metadata_handle.take() {
      info!("editor: cancelled in-flight submission");
      handle.abort();
    }
    self.tasks.metadata_rx = None;
    self.status_message = None;
    self.editor.reset();
    self.editor_input.clear();
    self.mode = AppMode::Browse;
  }

  fn finish_submission(&mut self, submission: Submission, metadata: AiMetadata) {
    let now_ms = chrono::Utc::now().timestamp_millis();
    let entry = build_entry(submission, metadata, &mut rand::thread_rng(), now_ms);
    let title = entry.title.clone();
    self.catalog.append(entry);
    self.editor.reset();
    self.editor_input.clear();
    self.mode = AppMode::Browse;
    self.filter.clear();
    self.list_state.select(Some(0));
    self.set_info(format!("\"{}\" adicionado ao catálogo.", title));
  }

  // --- Background work ---

  pub fn check_pending(&mut self) {
    if let Some(mut rx) = self.tasks.metadata_rx.take() {
      match rx.try_recv() {
        Ok((submission, metadata)) => {
          self.status_message = None;
          self.tasks.metadata_handle = None;
          self.finish_submission(submission, metadata);
        }
        Err(oneshot::error::TryRecvError::Empty) => {
          self.tasks.metadata_rx = Some(rx);
        }
        Err(oneshot::error::TryRecvError::Closed) => {
          self.status_message = None;
          self.tasks.metadata_handle = None;
          self.editor.reset();
          self.editor_input.clear();
          self.mode = AppMode::Browse;
          self.set_error("Falha ao enviar o vídeo.".to_string());
        }
      }
    }

    if let Some(mut rx) = self.tasks.share_rx.take() {
      match rx.try_recv() {
        Ok(outcome) => self.finish_share(outcome),
        Err(oneshot::error::TryRecvError::Empty) => {
          self.tasks.share_rx = Some(rx);
        }
        Err(oneshot::error::TryRecvError::Closed) => self.finish_share(ShareOutcome::Failed),
      }
    }

    if let Some((key, mut rx)) = self.previews.loading.take() {
      match rx.try_recv() {
        Ok(result) => {
          let image = match result {
            Ok(img) => Some(img),
            Err(e) => {
              warn!(err = %e, key = ?key, "preview: failed to load image");
              None
            }
          };
          self.previews.images.insert(key, image);
        }
        Err(oneshot::error::TryRecvError::Empty) => {
          self.previews.loading = Some((key, rx));
        }
        Err(oneshot::error::TryRecvError::Closed) => {
          self.previews.images.insert(key, None);
        }
      }
    }

    self.request_previews();
  }

  /// Start loading the banner, then the selected cover, one at a time.
  fn request_previews(&mut self) {
    if self.previews.loading.is_some() {
      return;
    }
    let mut wanted = vec![(PreviewKey::Banner, self.catalog.banner().to_string())];
    if let Some(entry) = self.selected_entry() {
      wanted.push((PreviewKey::Cover(entry.id.clone()), entry.cover_url.clone()));
    }
    let Some((key, reference)) = wanted.into_iter().find(|(k, _)| !self.previews.images.contains_key(k)) else {
      return;
    };

    let client = self.http_client.clone();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(media::load_image(&client, &reference).await);
    });
    self.previews.loading = Some((key, rx));
  }

  pub async fn shutdown(&mut self) -> Result<()> {
    if let Some(handle) = self.tasks.metadata_handle.take() {
      handle.abort();
    }
    self.player.stop().await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::storage::MemoryStore;

  fn entry(id: &str, title: &str, tags: &[&str]) -> VideoEntry {
    VideoEntry {
      id: id.to_string(),
      title: title.to_string(),
      url: format!("/videos/{}.mp4", id),
      cover_url: constants().default_cover.clone(),
      description: String::new(),
      tags: tags.iter().map(|t| t.to_string()).collect(),
      created_at: 0,
      likes: 100,
      comments: 10,
      shares: 5,
    }
  }

  fn app_with(entries: &[VideoEntry]) -> App {
    let raw = serde_json::to_string(entries).unwrap();
    let store = MemoryStore::new().with_value(&constants().videos_key, &raw);
    let catalog = CatalogStore::load(Box::new(store));
    // Unroutable endpoint so a GEMINI_API_KEY in the environment can't reach the network.
    let config = Config { gemini_base_url: Some("http://127.0.0.1:9".to_string()), ..Config::default() };
    App::new(catalog, config, DisplayMode::Ascii).unwrap()
  }

  fn admin_app(entries: &[VideoEntry]) -> App {
    let mut app = app_with(entries);
    app.access.request_admin(&constants().admin_secret).unwrap();
    app
  }

  #[test]
  fn starts_in_public_browse_with_first_selected() {
    let app = app_with(&[entry("1", "Praia", &[]), entry("2", "Serra", &[])]);
    assert_eq!(app.mode, AppMode::Browse);
    assert_eq!(app.access.mode(), AccessMode::Public);
    assert_eq!(app.selected_entry().map(|e| e.id.as_str()), Some("1"));
  }

  #[test]
  fn filter_narrows_and_clamps_selection() {
    let mut app = app_with(&[entry("1", "Praia", &["mar"]), entry("2", "Serra", &["montanha"])]);
    app.list_state.select(Some(1));
    app.filter.set("MAR");
    app.clamp_selection();
    assert_eq!(app.visible_entries().len(), 1);
    assert_eq!(app.selected_entry().map(|e| e.id.as_str()), Some("1"));

    app.filter.set("nada");
    app.clamp_selection();
    assert!(app.selected_entry().is_none());
  }

  #[test]
  fn navigation_wraps() {
    let mut app = app_with(&[entry("1", "A", &[]), entry("2", "B", &[])]);
    app.select_previous();
    assert_eq!(app.list_state.selected(), Some(1));
    app.select_next();
    assert_eq!(app.list_state.selected(), Some(0));
  }

  #[test]
  fn wrong_password_keeps_mode_and_clears_field() {
    let mut app = app_with(&[]);
    app.toggle_admin();
    assert_eq!(app.mode, AppMode::Login(AccessMode::Admin));
    app.password.set("errada");
    app.submit_password();
    assert_eq!(app.mode, AppMode::Login(AccessMode::Admin));
    assert_eq!(app.access.mode(), AccessMode::Public);
    assert_eq!(app.last_error.as_deref(), Some("Senha incorreta."));
    assert!(app.password.value.is_empty());
  }

  #[test]
  fn public_login_prompt_never_checks_admin_secret() {
    let mut app = app_with(&[]);
    app.mode = AppMode::Login(AccessMode::Public);
    app.password.set(&constants().admin_secret);
    app.submit_password();
    assert_eq!(app.access.mode(), AccessMode::Public);
    assert_eq!(app.mode, AppMode::Browse);
    assert!(app.password.value.is_empty());
  }

  #[test]
  fn vip_toggle_logs_in_then_out() {
    let mut app = app_with(&[]);
    app.toggle_spectator();
    app.password.set("  Prazer Ilimitado ");
    app.submit_password();
    assert_eq!(app.access.mode(), AccessMode::Spectator);
    assert_eq!(app.mode, AppMode::Browse);

    app.toggle_spectator();
    assert_eq!(app.access.mode(), AccessMode::Public);
  }

  #[test]
  fn admin_actions_need_admin() {
    let mut app = app_with(&[entry("1", "A", &[])]);
    app.open_editor();
    app.request_delete();
    app.open_banner_input();
    assert_eq!(app.mode, AppMode::Browse);
    assert!(app.pending_removal.is_none());
  }

  #[test]
  fn delete_requires_confirmation() {
    let mut app = admin_app(&[entry("1", "A", &[]), entry("2", "B", &[])]);
    app.request_delete();
    assert_eq!(app.mode, AppMode::ConfirmDelete);
    app.confirm_delete(false);
    assert_eq!(app.catalog.len(), 2);

    app.request_delete();
    app.confirm_delete(true);
    assert_eq!(app.catalog.len(), 1);
    assert_eq!(app.selected_entry().map(|e| e.id.as_str()), Some("2"));
    assert_eq!(app.mode, AppMode::Browse);
  }

  #[test]
  fn like_state_is_session_only() {
    let mut app = app_with(&[entry("1", "A", &[])]);
    app.toggle_like();
    assert_eq!(app.card("1").unwrap().like_count, 101);
    assert_eq!(app.catalog.get("1").unwrap().likes, 100);
  }

  #[test]
  fn banner_rejects_non_image() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "hello").unwrap();
    let mut app = admin_app(&[]);
    app.open_banner_input();
    app.banner_input.set(path.to_str().unwrap());
    app.submit_banner();
    assert_eq!(app.mode, AppMode::BannerInput);
    assert!(app.last_error.is_some());
    assert_eq!(app.catalog.banner(), constants().default_banner);
  }

  #[test]
  fn editor_field_commit_autofills_title() {
    let mut app = admin_app(&[]);
    app.open_editor();
    app.editor_input.set("/tmp/viagem.mp4");
    app.editor_next_field();
    assert_eq!(app.editor.title, "viagem");
  }

  #[tokio::test]
  async fn submit_without_api_key_appends_fallback_entry() {
    let dir = tempfile::tempdir().unwrap();
    let video = dir.path().join("passeio.mp4");
    std::fs::write(&video, b"not really a video").unwrap();

    let mut app = admin_app(&[entry("1", "Antigo", &[])]);
    app.open_editor();
    app.editor_input.set(video.to_str().unwrap());
    app.trigger_submit();
    assert!(app.editor.is_submitting());

    for _ in 0..100 {
      app.check_pending();
      if app.mode == AppMode::Browse {
        break;
      }
      tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(app.catalog.len(), 2);
    let newest = &app.catalog.entries()[0];
    assert_eq!(newest.title, "passeio");
    assert_eq!(newest.tags, vec![constants().fallback_tag.clone()]);
    assert!(!app.editor.is_submitting());
  }

  #[tokio::test]
  async fn share_runs_off_the_event_loop() {
    let mut app = app_with(&[entry("1", "Praia", &[])]);
    app.config.share_command = Some("sleep 1".to_string());
    let started = Instant::now();
    app.share_selected();
    assert!(started.elapsed() < Duration::from_millis(500));
    assert!(app.tasks.share_rx.is_some());

    // A second request while one is in flight is ignored.
    app.share_selected();

    for _ in 0..300 {
      app.check_pending();
      if app.tasks.share_rx.is_none() {
        break;
      }
      tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(app.tasks.share_rx.is_none());
    assert_eq!(app.info_message.as_deref(), Some(ShareOutcome::Shared.message()));
  }

  #[tokio::test]
  async fn cancel_discards_in_flight_submission() {
    let dir = tempfile::tempdir().unwrap();
    let video = dir.path().join("clip.mp4");
    std::fs::write(&video, b"x").unwrap();

    let mut app = admin_app(&[]);
    app.open_editor();
    app.editor_input.set(video.to_str().unwrap());
    app.trigger_submit();
    app.cancel_editor();
    tokio::time::sleep(Duration::from_millis(20)).await;
    app.check_pending();

    assert!(app.catalog.is_empty());
    assert_eq!(app.mode, AppMode::Browse);
    assert!(!app.editor.is_submitting());
  }
}
