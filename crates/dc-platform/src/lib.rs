pub mod clipboard;
pub mod folder_watcher;
pub mod idle;

pub use clipboard::{ClipboardEventWatcher, SystemClipboard};
pub use folder_watcher::FolderWatcher;
pub use idle::SystemIdleProbe;
