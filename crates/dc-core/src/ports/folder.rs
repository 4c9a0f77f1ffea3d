//! Sync folder port - abstracts the shared-folder transport

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::content::ClipboardPayload;
use crate::protocol::{ArtifactName, OriginFilter};

/// Outcome of reading an artifact's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactReadOutcome {
    Ready(ClipboardPayload),
    /// The artifact is still propagating through the sync substrate (a file
    /// bundle whose directory does not yet hold the declared file count).
    /// Explicitly not an error; the next watch event re-observes it.
    NotReady { present: u32, expected: u32 },
}

/// Everything the engine does against the shared folder.
///
/// Artifacts are immutable once fully written; each entry is created once by
/// its origin and deleted only by a TTL sweep, so implementations need no
/// locking beyond the folder itself.
pub trait SyncFolderPort: Send + Sync {
    /// The folder acting as transport.
    fn root(&self) -> &Path;

    /// Whether the folder currently exists and is a directory. The sync
    /// substrate may mount it late or take it away.
    fn is_accessible(&self) -> bool;

    /// Parse a path as an artifact name under this folder.
    fn parse_entry(&self, path: &Path, filter: OriginFilter) -> Option<ArtifactName>;

    /// Scan the folder and return one more than the highest beat among
    /// valid artifacts, or 1 if none.
    fn allocate_next_beat(&self) -> Result<u64>;

    /// True only if every other host's presence marker is absent or stale.
    fn no_peers_receiving(&self, now_ms: u64) -> bool;

    /// Write or refresh this host's presence marker.
    fn write_presence_marker(&self, now_ms: u64) -> Result<()>;

    /// Best-effort removal of this host's presence marker. Failure is
    /// non-fatal; the marker self-expires.
    fn remove_presence_marker(&self);

    /// Serialize a payload as the artifact for `beat`, named so a concurrent
    /// reader sees either nothing or a complete, correctly-named entry.
    fn write_artifact(&self, beat: u64, payload: &ClipboardPayload) -> Result<PathBuf>;

    /// Deserialize an artifact's content.
    fn read_artifact(&self, name: &ArtifactName) -> Result<ArtifactReadOutcome>;

    /// Total recursive size in MB of arbitrary local paths (the send-path
    /// size guard for file lists).
    fn recursive_size_mb(&self, paths: &[String]) -> f64;

    /// One retention pass: delete expired artifacts and legacy-format
    /// leftovers, unpin aging peer artifacts where the substrate supports
    /// it. Entries that vanish mid-sweep are already satisfied.
    fn sweep(&self, now_ms: u64);
}
