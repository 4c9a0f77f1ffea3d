//! Retention policy for synchronization artifacts
//!
//! Self-originated artifacts only need to survive long enough for the sync
//! substrate to propagate them; peer-originated ones must survive long
//! enough for this host to notice and apply them even under substrate
//! delay, so their TTL is longer.

use crate::protocol::ArtifactOrigin;

/// Interval between retention sweeps.
pub const SWEEP_INTERVAL_SECS: u64 = 60;

/// TTL for artifacts this host wrote.
pub const SELF_TTL_SECS: u64 = 5 * 60;

/// TTL for artifacts written by peers.
pub const PEER_TTL_SECS: u64 = 10 * 60;

/// Age past which an unexpired peer artifact may be unpinned from local
/// disk, where the sync substrate supports placeholder files.
pub const UNPIN_AFTER_SECS: u64 = 60;

/// What the sweep should do with a parsed artifact of a given age.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionAction {
    Keep,
    /// Remove recursively; bundles are directories.
    Delete,
    /// Keep, but release the local copy back to the substrate. Purely a
    /// substrate-compatibility nicety, never correctness-critical.
    Unpin,
}

/// Decide the retention action for an artifact.
pub fn action_for(origin: ArtifactOrigin, age_ms: u64) -> RetentionAction {
    let ttl_ms = match origin {
        ArtifactOrigin::Mine => SELF_TTL_SECS * 1_000,
        ArtifactOrigin::Theirs => PEER_TTL_SECS * 1_000,
    };
    if age_ms >= ttl_ms {
        return RetentionAction::Delete;
    }
    if origin == ArtifactOrigin::Theirs && age_ms >= UNPIN_AFTER_SECS * 1_000 {
        return RetentionAction::Unpin;
    }
    RetentionAction::Keep
}
