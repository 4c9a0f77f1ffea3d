mod store;
mod unpin;

pub use store::SyncFolderStore;
