// src/integrations/mpv/client.rs
//
// MPV Player Integration - Unix socket JSON IPC
//
// MPV launched with: --input-ipc-server=<tmp>/streamhub-mpv-<id>.sock
//
// CRITICAL RULES:
// - One long-lived socket connection, newline-delimited JSON
// - Commands go out one at a time; the next is written only after the reply
// - Replies are matched by request_id; unsolicited event lines are skipped
// - MPV starts paused; the playback controller decides when to play
// - The observer only reports what mpv says, it never changes playback

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixStream;
use tokio::process::{Child, Command};
use tokio::sync::{broadcast, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::media_element::{FullscreenHost, MediaElement, MediaEvent};

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct MpvConfig {
    pub binary: String,
    pub poll_interval_ms: u64,
    pub command_timeout_ms: u64,
    /// How long to wait for mpv to open its socket
    pub startup_timeout_ms: u64,
}

impl Default for MpvConfig {
    fn default() -> Self {
        Self {
            binary: "mpv".to_string(),
            poll_interval_ms: 250,
            command_timeout_ms: 2000,
            startup_timeout_ms: 5000,
        }
    }
}

/// MPV IPC command envelope
#[derive(Debug, Serialize)]
struct MpvCommand {
    command: Vec<Value>,
    request_id: u64,
}

/// MPV IPC reply or event line
#[derive(Debug, Deserialize)]
struct MpvResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    request_id: Option<u64>,
}

/// Last values seen by the observer
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Observation {
    duration: Option<f64>,
    time_pos: Option<f64>,
    paused_for_cache: Option<bool>,
}

/// Notifications implied by going from `prev` to `next`
fn diff_observation(prev: &Observation, next: &Observation) -> Vec<MediaEvent> {
    let mut events = Vec::new();

    if let Some(duration) = next.duration {
        if prev.duration != Some(duration) {
            events.push(MediaEvent::LoadedMetadata { duration });
        }
    }

    if let Some(current_time) = next.time_pos {
        if prev.time_pos != Some(current_time) {
            events.push(MediaEvent::TimeUpdate { current_time });
        }
    }

    match (prev.paused_for_cache, next.paused_for_cache) {
        (Some(false) | None, Some(true)) => events.push(MediaEvent::Waiting),
        (Some(true), Some(false)) => events.push(MediaEvent::Playing),
        _ => {}
    }

    events
}

/// Open IPC connection to one mpv instance
struct IpcConnection {
    writer: OwnedWriteHalf,
    lines: Lines<BufReader<OwnedReadHalf>>,
}

impl IpcConnection {
    async fn open(path: &Path) -> AppResult<Self> {
        let stream = UnixStream::connect(path).await?;
        let (reader, writer) = stream.into_split();
        Ok(Self {
            writer,
            lines: BufReader::new(reader).lines(),
        })
    }

    /// Writes one command and reads until its reply
    async fn exchange(&mut self, payload: &str, request_id: u64) -> AppResult<MpvResponse> {
        self.writer.write_all(payload.as_bytes()).await?;

        while let Some(line) = self.lines.next_line().await? {
            let Ok(response) = serde_json::from_str::<MpvResponse>(&line) else {
                continue;
            };
            if response.request_id == Some(request_id) {
                return Ok(response);
            }
        }
        Err(AppError::Player("mpv closed the IPC connection".to_string()))
    }
}

/// Request/reply channel over the IPC socket.
///
/// The connection is opened lazily and dropped after any failure or
/// timeout, so the next command reconnects.
struct MpvIpc {
    socket_path: PathBuf,
    timeout: Duration,
    next_request_id: AtomicU64,
    connection: AsyncMutex<Option<IpcConnection>>,
}

impl MpvIpc {
    fn new(socket_path: PathBuf, timeout: Duration) -> Self {
        Self {
            socket_path,
            timeout,
            next_request_id: AtomicU64::new(1),
            connection: AsyncMutex::new(None),
        }
    }

    async fn reset(&self) {
        *self.connection.lock().await = None;
    }

    async fn request(&self, command: Vec<Value>) -> AppResult<Option<Value>> {
        let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        let mut payload = serde_json::to_string(&MpvCommand {
            command,
            request_id,
        })?;
        payload.push('\n');

        let mut slot = self.connection.lock().await;
        let exchange = async {
            let mut connection = match slot.take() {
                Some(connection) => connection,
                None => IpcConnection::open(&self.socket_path).await?,
            };
            let response = connection.exchange(&payload, request_id).await?;
            *slot = Some(connection);
            Ok::<MpvResponse, AppError>(response)
        };

        let response = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| AppError::Player("mpv did not answer in time".to_string()))??;

        match response.error.as_deref() {
            Some("success") | None => Ok(response.data.filter(|v| !v.is_null())),
            Some(error) => Err(AppError::Player(format!("MPV IPC Error: {}", error))),
        }
    }
}

/// MPV client for Unix platforms
///
/// Handles process lifecycle, IPC and the notification observer.
pub struct MpvClient {
    config: MpvConfig,
    socket_path: PathBuf,
    process: Mutex<Option<Child>>,
    ipc: MpvIpc,
    events: broadcast::Sender<MediaEvent>,
    observer: Mutex<Option<JoinHandle<()>>>,
}

impl MpvClient {
    pub fn new(config: MpvConfig) -> Self {
        let socket_path =
            std::env::temp_dir().join(format!("streamhub-mpv-{}.sock", Uuid::new_v4()));
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let ipc = MpvIpc::new(
            socket_path.clone(),
            Duration::from_millis(config.command_timeout_ms),
        );

        Self {
            config,
            socket_path,
            process: Mutex::new(None),
            ipc,
            events,
            observer: Mutex::new(None),
        }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Launches MPV paused on `url` and starts observing it
    pub async fn launch(self: &Arc<Self>, url: &str, title: &str) -> AppResult<()> {
        self.stop().await?;

        let mut cmd = Command::new(&self.config.binary);
        cmd.arg(format!("--input-ipc-server={}", self.socket_path.display()))
            .arg("--idle=yes")
            .arg("--force-window=yes")
            .arg("--keep-open=yes")
            .arg("--pause")
            .arg(format!("--title={}", title))
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let child = cmd
            .spawn()
            .map_err(|e| AppError::Player(format!("Failed to spawn {}: {}", self.config.binary, e)))?;

        *self.process.lock().unwrap_or_else(|e| e.into_inner()) = Some(child);

        self.wait_for_socket().await?;
        self.spawn_observer();

        log::info!("mpv started for {}", url);
        Ok(())
    }

    /// Stops playback and kills the MPV process
    pub async fn stop(&self) -> AppResult<()> {
        if let Some(task) = self
            .observer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            task.abort();
        }

        if self.is_running() {
            if let Err(e) = self.send_command(vec![json!("quit")]).await {
                log::debug!("mpv quit command failed: {}", e);
            }
        }

        let child = self
            .process
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(mut child) = child {
            let _ = child.start_kill();
            let _ = child.wait().await;
        }

        self.ipc.reset().await;
        let _ = tokio::fs::remove_file(&self.socket_path).await;
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        let mut guard = self.process.lock().unwrap_or_else(|e| e.into_inner());
        match guard.as_mut().map(|child| child.try_wait()) {
            Some(Ok(None)) => true,
            Some(_) => {
                *guard = None;
                false
            }
            None => false,
        }
    }

    async fn wait_for_socket(&self) -> AppResult<()> {
        let step = Duration::from_millis(50);
        let deadline = tokio::time::Instant::now()
            + Duration::from_millis(self.config.startup_timeout_ms);

        while tokio::time::Instant::now() < deadline {
            if !self.is_running() {
                return Err(AppError::Player("mpv exited during startup".to_string()));
            }
            if UnixStream::connect(&self.socket_path).await.is_ok() {
                return Ok(());
            }
            tokio::time::sleep(step).await;
        }

        Err(AppError::Player("mpv IPC socket did not appear".to_string()))
    }

    fn spawn_observer(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        let interval = Duration::from_millis(self.config.poll_interval_ms);

        let task = tokio::spawn(async move {
            let mut last = Observation::default();

            loop {
                tokio::time::sleep(interval).await;

                let Some(client) = weak.upgrade() else {
                    break;
                };
                if !client.is_running() {
                    log::info!("mpv exited, observer stopping");
                    break;
                }

                let next = Observation {
                    duration: client.get_f64("duration").await.ok().flatten(),
                    time_pos: client.get_f64("time-pos").await.ok().flatten(),
                    paused_for_cache: client.get_bool("paused-for-cache").await.ok().flatten(),
                };

                for event in diff_observation(&last, &next) {
                    let _ = client.events.send(event);
                }
                last = next;
            }
        });

        *self.observer.lock().unwrap_or_else(|e| e.into_inner()) = Some(task);
    }

    async fn get_property(&self, name: &str) -> AppResult<Option<Value>> {
        self.send_command(vec![json!("get_property"), json!(name)])
            .await
    }

    async fn get_f64(&self, name: &str) -> AppResult<Option<f64>> {
        Ok(self.get_property(name).await?.and_then(|v| v.as_f64()))
    }

    async fn get_bool(&self, name: &str) -> AppResult<Option<bool>> {
        Ok(self.get_property(name).await?.and_then(|v| v.as_bool()))
    }

    async fn set_property(&self, name: &str, value: Value) -> AppResult<()> {
        self.send_command(vec![json!("set_property"), json!(name), value])
            .await
            .map(|_| ())
    }

    async fn send_command(&self, command: Vec<Value>) -> AppResult<Option<Value>> {
        if !self.is_running() {
            return Err(AppError::Player("mpv is not running".to_string()));
        }
        self.ipc.request(command).await
    }
}

#[async_trait]
impl MediaElement for MpvClient {
    async fn play(&self) -> AppResult<()> {
        self.set_property("pause", json!(false)).await
    }

    async fn pause(&self) -> AppResult<()> {
        self.set_property("pause", json!(true)).await
    }

    async fn current_time(&self) -> AppResult<f64> {
        Ok(self.get_f64("time-pos").await?.unwrap_or(0.0))
    }

    async fn set_current_time(&self, seconds: f64) -> AppResult<()> {
        self.send_command(vec![
            json!("seek"),
            json!(seconds.max(0.0)),
            json!("absolute"),
        ])
        .await
        .map(|_| ())
    }

    async fn set_volume(&self, volume: f64) -> AppResult<()> {
        // mpv volume is a percentage
        self.set_property("volume", json!(volume * 100.0)).await
    }

    async fn set_muted(&self, muted: bool) -> AppResult<()> {
        self.set_property("mute", json!(muted)).await
    }

    async fn set_playback_rate(&self, rate: f64) -> AppResult<()> {
        self.set_property("speed", json!(rate)).await
    }

    fn subscribe(&self) -> broadcast::Receiver<MediaEvent> {
        self.events.subscribe()
    }
}

#[async_trait]
impl FullscreenHost for MpvClient {
    async fn is_fullscreen(&self) -> AppResult<bool> {
        Ok(self.get_bool("fullscreen").await?.unwrap_or(false))
    }

    async fn request_fullscreen(&self) -> AppResult<()> {
        self.set_property("fullscreen", json!(true)).await
    }

    async fn exit_fullscreen(&self) -> AppResult<()> {
        self.set_property("fullscreen", json!(false)).await
    }
}

impl Drop for MpvClient {
    fn drop(&mut self) {
        if let Some(task) = self
            .observer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            task.abort();
        }
        if let Some(mut child) = self
            .process
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            let _ = child.start_kill();
        }
        // No runtime to await on here
        let _ = std::fs::remove_file(&self.socket_path);
    }
}
