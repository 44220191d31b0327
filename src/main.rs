mod access;
mod app;
mod catalog;
mod config;
mod constants;
mod display;
mod editor;
mod graphics;
mod input;
mod links;
mod logging;
mod media;
mod metadata;
mod player;
mod share;
mod storage;
mod theme;
mod ui;
mod view;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use ratatui::{
  DefaultTerminal,
  crossterm::event::{self, Event, KeyEventKind},
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use app::App;
use catalog::CatalogStore;
use config::Config;
use display::CliDisplayMode;
use storage::{FileStore, KeyValueStore, MemoryStore};

// --- CLI ---

#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
struct Args {
  /// Preview rendering: 'auto', 'direct' (half-block) or 'ascii' (default: config, then auto-detect)
  #[arg(short, long, default_value = "auto")]
  display_mode: CliDisplayMode,

  /// Where the catalog and the log file live (default: the platform data directory)
  #[arg(long)]
  data_dir: Option<PathBuf>,

  /// Keep the catalog in memory only; nothing is written to disk
  #[arg(long)]
  ephemeral: bool,

  /// Print a shell completion script and exit
  #[arg(long, value_name = "SHELL")]
  completions: Option<Shell>,
}

fn open_storage(data_dir: &std::path::Path, ephemeral: bool) -> Box<dyn KeyValueStore> {
  if ephemeral {
    info!("storage: ephemeral session, using memory store");
    return Box::new(MemoryStore::new());
  }
  match FileStore::open(data_dir.join("store")) {
    Ok(store) => {
      info!(dir = %store.dir().display(), "storage: opened");
      Box::new(store)
    }
    Err(e) => {
      warn!(err = ?e, "storage: falling back to memory store, changes will not be saved");
      Box::new(MemoryStore::new())
    }
  }
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  if let Some(shell) = args.completions {
    let mut cmd = Args::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
    return Ok(());
  }

  let data_dir = args.data_dir.clone().unwrap_or_else(config::default_data_dir);
  let _log_guard = logging::init(&data_dir)?;
  info!(version = env!("CARGO_PKG_VERSION"), "starting");

  let default_hook = std::panic::take_hook();
  std::panic::set_hook(Box::new(move |info| {
    ratatui::restore();
    default_hook(info);
  }));

  let config = Config::load();
  let display_mode = display::resolve_display_mode(args.display_mode, config.display_mode.as_deref());
  let catalog = CatalogStore::load(open_storage(&data_dir, args.ephemeral));
  let mut app = App::new(catalog, config, display_mode)?;

  let mut terminal = ratatui::init();
  let result = run(&mut terminal, &mut app).await;
  ratatui::restore();
  app.shutdown().await?;
  info!("exiting");
  result
}

async fn run(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
  loop {
    app.check_pending();
    app.player.check_mpv_status();
    app.expire_messages();

    terminal.draw(|frame| ui::ui(frame, app))?;

    if event::poll(Duration::from_millis(100))? {
      match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
          input::handle_key_event(app, key).await?;
        }
        _ => {}
      }
    }

    if app.should_quit {
      break;
    }
  }
  Ok(())
}
