use std::path::PathBuf;

/// Everything that can wake the synchronization session.
///
/// All inputs funnel through one channel, so session state is only ever
/// touched from the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The local clipboard changed.
    ClipboardChanged,
    /// An entry appeared or changed in the sync folder.
    FolderEntryChanged(PathBuf),
    /// Tear the watchers down and start over (settings changed, folder
    /// switched).
    Resync,
    Shutdown,
}
