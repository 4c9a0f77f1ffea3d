mod sync_command;

pub use sync_command::SyncCommandRunner;
