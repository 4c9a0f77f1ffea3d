mod system;
mod watcher;

pub use system::SystemClipboard;
pub use watcher::ClipboardEventWatcher;
