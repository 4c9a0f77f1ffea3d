use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use notify::{PollWatcher, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, error};

use dc_core::ports::{FolderWatchPort, WatchGuard};
use dc_core::settings::WatchMode;

/// Poll interval for substrates whose placeholder updates emit no native
/// file events.
const POLL_INTERVAL_SECS: u64 = 5;

struct FolderWatchHandle {
    // dropping the watcher unsubscribes
    _watcher: Box<dyn Watcher + Send>,
}

impl WatchGuard for FolderWatchHandle {}

/// Watches the sync folder and forwards created/modified entry paths.
///
/// Paths are forwarded raw; artifact parsing and temp-file filtering stay
/// with the session.
pub struct FolderWatcher;

impl FolderWatchPort for FolderWatcher {
    fn watch(
        &self,
        folder: &Path,
        mode: WatchMode,
        tx: mpsc::Sender<PathBuf>,
    ) -> Result<Box<dyn WatchGuard>> {
        let event_handler = move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                if event.kind.is_create() || event.kind.is_modify() {
                    for path in event.paths {
                        // notify runs handlers on its own thread
                        if let Err(e) = tx.blocking_send(path) {
                            debug!(error = %e, "dropped folder event");
                        }
                    }
                }
            }
            Err(e) => {
                error!(error = %e, "folder watcher error");
            }
        };

        let watcher: Box<dyn Watcher + Send> = match mode {
            WatchMode::Polling => {
                let config = notify::Config::default()
                    .with_poll_interval(Duration::from_secs(POLL_INTERVAL_SECS));
                let mut watcher = PollWatcher::new(event_handler, config)
                    .context("create poll watcher failed")?;
                watcher
                    .watch(folder, RecursiveMode::NonRecursive)
                    .with_context(|| format!("watch sync folder failed: {}", folder.display()))?;
                Box::new(watcher)
            }
            WatchMode::Native => {
                let mut watcher =
                    RecommendedWatcher::new(event_handler, notify::Config::default())
                        .context("create native watcher failed")?;
                watcher
                    .watch(folder, RecursiveMode::NonRecursive)
                    .with_context(|| format!("watch sync folder failed: {}", folder.display()))?;
                Box::new(watcher)
            }
        };

        Ok(Box::new(FolderWatchHandle { _watcher: watcher }))
    }
}
