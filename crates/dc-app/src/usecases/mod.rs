mod apply_artifact;
mod send_clipboard;

#[cfg(test)]
pub(crate) mod testing;

pub use apply_artifact::ApplyArtifactUseCase;
pub use send_clipboard::{SendClipboardUseCase, MAX_FILES_SIZE_MB};
