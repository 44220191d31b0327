use anyhow::{Context, Result, anyhow};
use std::path::Path;
use std::process::Stdio;
use tokio::{
  io::AsyncBufReadExt,
  io::BufReader as TokioBufReader,
  process::{Child as TokioChild, Command},
  sync::mpsc,
  task::JoinHandle,
};
use tracing::info;

/// What is currently loaded in the player.
#[derive(Debug, Clone)]
pub struct NowPlaying {
  pub id: String,
  pub title: String,
  pub path: String,
}

#[derive(Default)]
pub struct VideoPlayer {
  current_process: Option<TokioChild>,
  pub now_playing: Option<NowPlaying>,
  mpv_monitor_handle: Option<JoinHandle<()>>,
  mpv_status_rx: Option<mpsc::Receiver<String>>,
  last_mpv_status: Option<String>,
  ipc_socket_path: Option<String>,
  pub paused: bool,
}

impl VideoPlayer {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_playing(&self) -> bool {
    self.current_process.is_some()
  }

  /// Drain status lines and notice when mpv exits on its own (window closed,
  /// end of file).
  pub fn check_mpv_status(&mut self) {
    if let Some(rx) = &mut self.mpv_status_rx {
      while let Ok(status) = rx.try_recv() {
        self.last_mpv_status = Some(status);
      }
    }
    if let Some(child) = &mut self.current_process
      && let Ok(Some(status)) = child.try_wait()
    {
      info!(%status, "player: mpv exited");
      self.clear();
    }
  }

  pub fn get_last_mpv_status(&self) -> Option<String> {
    self.last_mpv_status.clone()
  }

  pub async fn play(&mut self, item: NowPlaying) -> Result<()> {
    self.stop().await.context("Failed to stop previous playback")?;
    if !Path::new(&item.path).is_file() {
      return Err(anyhow!("Arquivo de vídeo não encontrado: {}", item.path));
    }

    let socket_path = std::env::temp_dir().join(format!("reel-mpv-{}.sock", std::process::id()));
    let socket_path_str = socket_path.to_str().context("Temp dir path is not valid UTF-8")?.to_string();
    // Remove stale socket if it exists from a previous crash.
    let _ = std::fs::remove_file(&socket_path);

    let mut cmd = Command::new("mpv");
    cmd.args([
      "--force-window=yes",
      "--term-status-msg=Time: ${time-pos/full} / ${duration/full} | ${pause} ${percent-pos}%",
      &format!("--title={}", item.title),
      &format!("--input-ipc-server={}", socket_path_str),
      "--",
      &item.path,
    ]);
    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    // Send stderr to null: if piped but never drained, the pipe buffer
    // fills and mpv blocks.
    cmd.stderr(Stdio::null());

    let mut child = cmd.spawn().map_err(|e| {
      if e.kind() == std::io::ErrorKind::NotFound {
        anyhow!("mpv not found. Install it with: brew install mpv (macOS) or apt install mpv (Linux)")
      } else {
        anyhow!(e).context("Failed to spawn mpv process")
      }
    })?;

    let stdout = child.stdout.take().context("Failed to get mpv stdout")?;
    let (tx, rx) = mpsc::channel::<String>(10);
    self.mpv_status_rx = Some(rx);

    let monitor_handle = tokio::spawn(async move {
      let reader = TokioBufReader::new(stdout);
      let mut lines = reader.lines();
      while let Ok(Some(line)) = lines.next_line().await {
        if tx.send(line).await.is_err() {
          break;
        }
      }
    });

    info!(id = %item.id, "player: started");
    self.current_process = Some(child);
    self.mpv_monitor_handle = Some(monitor_handle);
    self.ipc_socket_path = Some(socket_path_str);
    self.now_playing = Some(item);
    self.paused = false;
    Ok(())
  }

  async fn send_command(&self, cmd: &[u8]) -> Result<()> {
    let Some(ref socket_path) = self.ipc_socket_path else {
      return Ok(());
    };
    let stream = tokio::net::UnixStream::connect(socket_path).await.context("Failed to connect to mpv IPC socket")?;
    stream.writable().await.context("mpv IPC socket not writable")?;
    let written = stream.try_write(cmd).context("Failed to send command to mpv")?;
    if written < cmd.len() {
      return Err(anyhow!("Partial write to mpv IPC socket: wrote {} of {} bytes", written, cmd.len()));
    }
    Ok(())
  }

  pub async fn toggle_pause(&mut self) -> Result<()> {
    self.send_command(b"{\"command\":[\"cycle\",\"pause\"]}\n").await?;
    self.paused = !self.paused;
    Ok(())
  }

  pub async fn toggle_fullscreen(&mut self) -> Result<()> {
    self.send_command(b"{\"command\":[\"cycle\",\"fullscreen\"]}\n").await
  }

  pub async fn stop(&mut self) -> Result<()> {
    if let Some(handle) = self.mpv_monitor_handle.take() {
      handle.abort();
      let _ = handle.await;
    }

    if let Some(mut child) = self.current_process.take() {
      // Already exited is fine.
      let _ = child.start_kill();
      let _ = child.wait().await;
    }

    self.clear();
    Ok(())
  }

  fn clear(&mut self) {
    if let Some(handle) = self.mpv_monitor_handle.take() {
      handle.abort();
    }
    self.current_process = None;
    self.mpv_status_rx = None;
    self.last_mpv_status = None;
    self.now_playing = None;
    self.paused = false;
    if let Some(path) = self.ipc_socket_path.take() {
      let _ = std::fs::remove_file(&path);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn play_rejects_missing_file() {
    let mut player = VideoPlayer::new();
    let err = player
      .play(NowPlaying { id: "x".to_string(), title: "X".to_string(), path: "/no/such/video.mp4".to_string() })
      .await
      .unwrap_err();
    assert!(err.to_string().contains("não encontrado"));
    assert!(!player.is_playing());
  }

  #[tokio::test]
  async fn commands_without_playback_are_noops() {
    let mut player = VideoPlayer::new();
    player.toggle_fullscreen().await.unwrap();
    player.stop().await.unwrap();
    assert!(player.now_playing.is_none());
  }
}
