//! The synchronization session
//!
//! One long-running event loop owns all mutable synchronization state.
//! Watcher callbacks and timers only ever enqueue [`SessionEvent`]s; the
//! loop applies them one at a time, so no cursor or watcher handle needs a
//! lock.

mod events;

pub use events::SessionEvent;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant};
use tracing::{debug, error, info, warn};

use dc_core::ports::{
    ClipboardPort, ClipboardWatchPort, ClockPort, FolderWatchPort, IdlePort, IdleState,
    StatusPort, StatusSignal, SyncCommandPort, SyncFolderPort, WatchGuard,
};
use dc_core::presence::PRESENCE_REFRESH_SECS;
use dc_core::protocol::OriginFilter;
use dc_core::retention::SWEEP_INTERVAL_SECS;
use dc_core::settings::Settings;
use dc_core::suppression::SyncCursors;

use crate::usecases::{ApplyArtifactUseCase, SendClipboardUseCase};

/// Pause after a clipboard-change trigger before snapshotting, so slow
/// clipboard owners finish writing all representations.
const CLIPBOARD_WRITE_DELAY_MS: u64 = 100;

/// Pause after a folder event before reading, so the substrate finishes
/// materializing the entry.
const ENTRY_SETTLE_DELAY_MS: u64 = 200;

const IDLE_POLL_SECS: u64 = 5;

/// User idle time after which synchronization suspends.
const SUSPEND_AFTER_IDLE_SECS: u64 = 15 * 60;

/// How often to re-check that the sync folder is still mounted.
const FOLDER_PROBE_SECS: u64 = 30;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Why the session could not (re)initialize.
#[derive(Debug, Error)]
pub enum InitError {
    /// The substrate has not mounted the folder (yet); the periodic probe
    /// retries.
    #[error("sync folder is not accessible: {}", .0.display())]
    FolderUnavailable(PathBuf),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// The ports a session runs against.
pub struct SyncSessionDeps {
    pub clipboard: Arc<dyn ClipboardPort>,
    pub folder: Arc<dyn SyncFolderPort>,
    pub clock: Arc<dyn ClockPort>,
    pub idle: Arc<dyn IdlePort>,
    pub status: Arc<dyn StatusPort>,
    pub clipboard_watch: Arc<dyn ClipboardWatchPort>,
    pub folder_watch: Arc<dyn FolderWatchPort>,
    pub sync_command: Arc<dyn SyncCommandPort>,
}

/// Live watcher handles plus the tasks forwarding their events into the
/// session channel. Dropping the set stops everything.
#[derive(Default)]
struct WatchSet {
    _clipboard_guard: Option<Box<dyn WatchGuard>>,
    _folder_guard: Option<Box<dyn WatchGuard>>,
    forwarders: Vec<JoinHandle<()>>,
}

impl Drop for WatchSet {
    fn drop(&mut self) {
        for forwarder in &self.forwarders {
            forwarder.abort();
        }
    }
}

pub struct SyncSession {
    deps: SyncSessionDeps,
    settings: Settings,
    send: SendClipboardUseCase,
    apply: ApplyArtifactUseCase,
    cursors: SyncCursors,
    events_tx: mpsc::Sender<SessionEvent>,
    events_rx: Option<mpsc::Receiver<SessionEvent>>,
    watch: Option<WatchSet>,
    initialized: bool,
    suspended_by_idle: bool,
}

impl SyncSession {
    pub fn new(deps: SyncSessionDeps, settings: Settings) -> Self {
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let send = SendClipboardUseCase::new(
            deps.clipboard.clone(),
            deps.folder.clone(),
            deps.clock.clone(),
            deps.status.clone(),
        );
        let apply = ApplyArtifactUseCase::new(
            deps.clipboard.clone(),
            deps.folder.clone(),
            deps.clock.clone(),
            deps.status.clone(),
        );
        Self {
            deps,
            settings,
            send,
            apply,
            cursors: SyncCursors::new(),
            events_tx,
            events_rx: Some(events_rx),
            watch: None,
            initialized: false,
            suspended_by_idle: false,
        }
    }

    /// Handle for pushing events from outside the loop (shutdown, resync).
    pub fn events(&self) -> mpsc::Sender<SessionEvent> {
        self.events_tx.clone()
    }

    pub async fn run(mut self) -> Result<()> {
        let mut events = self
            .events_rx
            .take()
            .context("session event loop already started")?;

        match self.initialize() {
            Ok(()) => {}
            Err(InitError::FolderUnavailable(folder)) => {
                warn!(folder = %folder.display(), "sync folder not accessible yet, waiting for it");
            }
            Err(InitError::Other(e)) => error!(error = %e, "session initialization failed"),
        }

        // first tick one period out: initialize() already did the immediate
        // marker write and sweep
        let mut presence = interval_after(PRESENCE_REFRESH_SECS);
        let mut sweep = interval_after(SWEEP_INTERVAL_SECS);
        let mut idle = interval_after(IDLE_POLL_SECS);
        let mut folder_probe = interval_after(FOLDER_PROBE_SECS);

        loop {
            tokio::select! {
                event = events.recv() => {
                    match event {
                        Some(SessionEvent::ClipboardChanged) => self.on_clipboard_changed().await,
                        Some(SessionEvent::FolderEntryChanged(path)) => {
                            self.on_folder_entry(path).await
                        }
                        Some(SessionEvent::Resync) => {
                            self.uninitialize("resync");
                            if let Err(e) = self.initialize() {
                                warn!(error = %e, "resync initialization failed");
                            }
                        }
                        Some(SessionEvent::Shutdown) | None => break,
                    }
                }
                _ = presence.tick() => self.refresh_presence(),
                _ = sweep.tick() => self.run_sweep(),
                _ = idle.tick() => self.check_idle(),
                _ = folder_probe.tick() => {
                    self.check_sync_command();
                    self.probe_folder();
                }
            }
        }

        self.uninitialize("shutting down");
        // the command may be running even when the session never
        // initialized (it can be what mounts the folder)
        self.deps.sync_command.stop();
        Ok(())
    }

    fn initialize(&mut self) -> Result<(), InitError> {
        if self.initialized {
            return Ok(());
        }

        // before the accessibility check: the command may be what mounts
        // the folder in the first place
        if let Some(command) = self.settings.sync_command.as_deref() {
            if !command.is_empty() && self.deps.sync_command.start(command) {
                info!("sync command launched");
            }
        }

        if !self.deps.folder.is_accessible() {
            return Err(InitError::FolderUnavailable(
                self.deps.folder.root().to_path_buf(),
            ));
        }

        let mut watch = WatchSet::default();

        if self.settings.is_sending_anything() {
            info!("starting clipboard watcher");
            let (tx, mut rx) = mpsc::channel(8);
            watch._clipboard_guard = Some(self.deps.clipboard_watch.watch(tx)?);

            let events = self.events_tx.clone();
            watch.forwarders.push(tokio::spawn(async move {
                while rx.recv().await.is_some() {
                    if events.send(SessionEvent::ClipboardChanged).await.is_err() {
                        break;
                    }
                }
            }));
        }

        if self.settings.is_receiving_anything() {
            info!(mode = ?self.settings.watch_mode, "starting folder watcher");
            let (tx, mut rx) = mpsc::channel(32);
            watch._folder_guard = Some(self.deps.folder_watch.watch(
                self.deps.folder.root(),
                self.settings.watch_mode,
                tx,
            )?);

            let events = self.events_tx.clone();
            watch.forwarders.push(tokio::spawn(async move {
                while let Some(path) = rx.recv().await {
                    if events
                        .send(SessionEvent::FolderEntryChanged(path))
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
            }));

            self.deps
                .folder
                .write_presence_marker(self.deps.clock.now_ms())
                .context("write initial presence marker failed")?;
        }

        if self.settings.auto_cleanup {
            self.deps.folder.sweep(self.deps.clock.now_ms());
        }

        self.watch = Some(watch);
        self.initialized = true;
        self.deps.status.signal(StatusSignal::Working);
        info!("synchronization session initialized");
        Ok(())
    }

    fn uninitialize(&mut self, reason: &str) {
        if !self.initialized {
            return;
        }
        // dropping the watch set stops watchers and forwarders
        self.watch = None;
        self.deps.folder.remove_presence_marker();
        self.deps.sync_command.stop();
        self.initialized = false;
        self.deps.status.signal(StatusSignal::Suspended);
        info!(reason, "synchronization session uninitialized");
    }

    async fn on_clipboard_changed(&mut self) {
        if !self.initialized {
            return;
        }
        if self.cursors.debounce(self.deps.clock.now_ms()) {
            debug!("clipboard change within debounce window");
            return;
        }

        sleep(Duration::from_millis(CLIPBOARD_WRITE_DELAY_MS)).await;

        if let Err(e) = self.send.execute(&self.settings, &mut self.cursors) {
            warn!(error = %e, "send path failed");
        }
    }

    async fn on_folder_entry(&mut self, path: PathBuf) {
        if !self.initialized {
            return;
        }

        // OneDrive materializes downloads via ~RFxxxx.TMP siblings
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        if name.contains("~RF") && name.ends_with(".TMP") {
            return;
        }

        let Some(artifact) = self.deps.folder.parse_entry(&path, OriginFilter::OnlyTheirs)
        else {
            return;
        };

        sleep(Duration::from_millis(ENTRY_SETTLE_DELAY_MS)).await;

        if let Err(e) = self
            .apply
            .execute(&artifact, &self.settings, &mut self.cursors)
        {
            warn!(error = %e, path = %artifact.path.display(), "receive path failed");
        }
    }

    fn refresh_presence(&self) {
        if !self.initialized || !self.settings.is_receiving_anything() {
            return;
        }
        if let Err(e) = self
            .deps
            .folder
            .write_presence_marker(self.deps.clock.now_ms())
        {
            warn!(error = %e, "presence marker refresh failed");
        }
    }

    /// Retention runs even while suspended; an idle host still accumulates
    /// expired artifacts from peers.
    fn run_sweep(&self) {
        if !self.settings.auto_cleanup || !self.deps.folder.is_accessible() {
            return;
        }
        self.deps.folder.sweep(self.deps.clock.now_ms());
    }

    fn check_idle(&mut self) {
        let idle_secs = match self.deps.idle.idle_state() {
            IdleState::Active => 0,
            IdleState::IdleFor(secs) => secs,
            // a broken probe must neither suspend nor resume
            IdleState::Unknown => return,
        };

        if idle_secs >= SUSPEND_AFTER_IDLE_SECS {
            if self.initialized {
                info!(idle_secs, "system is idle, suspending");
                self.suspended_by_idle = true;
                self.uninitialize("idle");
            }
        } else if self.suspended_by_idle {
            info!("system is active again, resuming");
            self.suspended_by_idle = false;
            if let Err(e) = self.initialize() {
                warn!(error = %e, "resume after idle failed");
            }
        }
    }

    /// A dead sync command means the folder stops replicating, so the
    /// session tears down; the folder probe brings it back with a fresh
    /// process.
    fn check_sync_command(&mut self) {
        if let Some(code) = self.deps.sync_command.check() {
            warn!(code, "sync command exited unexpectedly");
            self.uninitialize("sync command exited");
        }
    }

    fn probe_folder(&mut self) {
        let accessible = self.deps.folder.is_accessible();

        if !self.initialized && !self.suspended_by_idle && accessible {
            info!("sync folder is accessible now, starting");
            if let Err(e) = self.initialize() {
                warn!(error = %e, "initialization after folder came back failed");
            }
        } else if self.initialized && !accessible {
            info!("sync folder is no longer accessible, waiting for it");
            self.uninitialize("folder unavailable");
        }
    }
}

fn interval_after(period_secs: u64) -> tokio::time::Interval {
    let period = Duration::from_secs(period_secs);
    interval_at(Instant::now() + period, period)
}
