pub mod session;
pub mod usecases;

pub use session::{SessionEvent, SyncSession, SyncSessionDeps};
pub use usecases::{ApplyArtifactUseCase, SendClipboardUseCase};
