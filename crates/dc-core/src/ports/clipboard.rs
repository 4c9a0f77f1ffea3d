//! Clipboard port - abstracts local clipboard access

use anyhow::Result;

use crate::content::ClipboardPayload;

/// Platform-agnostic access to the system clipboard.
///
/// Implementations must surface platform failures as recoverable errors,
/// never panic across this boundary: a failed snapshot aborts one send or
/// receive attempt, not the agent.
pub trait ClipboardPort: Send + Sync {
    /// Snapshot the current clipboard content.
    ///
    /// Kinds are probed in priority order file-list → image → text, because
    /// some platforms expose a text representation alongside image or file
    /// content. Returns `Ok(None)` when no supported kind is present.
    fn snapshot(&self) -> Result<Option<ClipboardPayload>>;

    /// Replace the clipboard content with the given payload.
    fn write(&self, payload: &ClipboardPayload) -> Result<()>;
}
