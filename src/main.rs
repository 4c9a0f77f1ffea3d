mod bootstrap;
mod status;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};

use dc_app::{SessionEvent, SyncSession, SyncSessionDeps};
use dc_core::ports::SettingsPort;
use dc_core::protocol::normalize_host;
use dc_infra::fs::default_settings_path;
use dc_infra::{FileSettingsRepository, SyncCommandRunner, SyncFolderStore, SystemClock};
use dc_platform::{ClipboardEventWatcher, FolderWatcher, SystemClipboard, SystemIdleProbe};

#[tokio::main]
async fn main() -> Result<()> {
    bootstrap::init_tracing()?;

    let host = normalize_host(&gethostname::gethostname().to_string_lossy());
    info!(host, version = env!("CARGO_PKG_VERSION"), "starting driveclip");

    let settings_path = default_settings_path()?;
    let settings_repo = FileSettingsRepository::new(&settings_path);
    let settings = settings_repo.load().await.context("load settings failed")?;

    let Some(folder) = settings.folder.clone() else {
        error!(
            settings = %settings_path.display(),
            "no sync folder configured, set \"folder\" in the settings file"
        );
        std::process::exit(1);
    };
    info!(folder, "using sync folder");

    let session = SyncSession::new(
        SyncSessionDeps {
            clipboard: Arc::new(SystemClipboard),
            folder: Arc::new(SyncFolderStore::new(&folder, host)),
            clock: Arc::new(SystemClock),
            idle: Arc::new(SystemIdleProbe),
            status: Arc::new(status::LogStatus),
            clipboard_watch: Arc::new(ClipboardEventWatcher),
            folder_watch: Arc::new(FolderWatcher),
            sync_command: Arc::new(SyncCommandRunner::new()),
        },
        settings,
    );

    let events = session.events();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, shutting down");
            let _ = events.send(SessionEvent::Shutdown).await;
        }
    });

    #[cfg(unix)]
    {
        let events = session.events();
        tokio::spawn(async move {
            use tokio::signal::unix::{signal, SignalKind};
            let Ok(mut hangup) = signal(SignalKind::hangup()) else {
                return;
            };
            while hangup.recv().await.is_some() {
                info!("SIGHUP received, forcing a resync");
                let _ = events.send(SessionEvent::Resync).await;
            }
        });
    }

    session.run().await
}
