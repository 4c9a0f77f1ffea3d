//! Port traits: the seams between the synchronization engine and the
//! platform, filesystem and configuration adapters that implement them.

mod clipboard;
mod clock;
mod folder;
mod idle;
mod process;
mod settings;
mod status;
mod watch;

pub use clipboard::ClipboardPort;
pub use clock::ClockPort;
pub use folder::{ArtifactReadOutcome, SyncFolderPort};
pub use idle::{IdlePort, IdleState};
pub use process::SyncCommandPort;
pub use settings::SettingsPort;
pub use status::{StatusPort, StatusSignal};
pub use watch::{ClipboardWatchPort, FolderWatchPort, WatchGuard};
