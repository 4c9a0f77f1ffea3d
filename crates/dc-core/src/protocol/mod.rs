//! Artifact naming protocol
//!
//! Filenames are the wire format of this system: every clipboard snapshot is
//! a file or directory in the sync folder whose name encodes its logical
//! timestamp (beat), originating host and content kind.

mod legacy;
mod name;

pub use legacy::is_legacy_artifact;
pub use name::{
    next_beat, normalize_host, parse_artifact_name, ArtifactName, ArtifactOrigin, ContentKind,
    OriginFilter,
};
