pub mod folder;
pub mod fs;
pub mod process;
pub mod settings;
pub mod time;

pub use folder::SyncFolderStore;
pub use process::SyncCommandRunner;
pub use settings::FileSettingsRepository;
pub use time::SystemClock;
