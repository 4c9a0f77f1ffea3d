//! Watcher ports - event sources feeding the synchronization session

use std::path::{Path, PathBuf};

use anyhow::Result;
use tokio::sync::mpsc;

use crate::settings::WatchMode;

/// Handle keeping a watch alive. Dropping it stops the watch; stopping must
/// be synchronous so suspend/shutdown cannot race a late event.
pub trait WatchGuard: Send {}

/// Local clipboard change notifications.
pub trait ClipboardWatchPort: Send + Sync {
    /// Start watching; each change sends one unit onto `tx`.
    fn watch(&self, tx: mpsc::Sender<()>) -> Result<Box<dyn WatchGuard>>;
}

/// "Entry created" notifications for the sync folder.
///
/// Implementations forward raw paths; filtering (substrate temp files,
/// own-origin artifacts, presence markers) is the engine's job.
pub trait FolderWatchPort: Send + Sync {
    fn watch(
        &self,
        folder: &Path,
        mode: WatchMode,
        tx: mpsc::Sender<PathBuf>,
    ) -> Result<Box<dyn WatchGuard>>;
}
