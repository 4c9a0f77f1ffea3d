use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

/// Grammar for artifact names in the sync folder.
///
/// Format: `{beat}-{host}.{text.json|png|{count}_files}`
///
/// The beat is a positive integer with no leading zero; the host identity is
/// restricted to a charset that cannot contain the `-` delimiter ambiguity or
/// a path separator. File bundles are directories, not plain files.
static ARTIFACT_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([1-9][0-9]*)-([0-9a-zA-Z-]+)\.((text\.json)|png|([1-9][0-9]*)_files)$")
        .expect("artifact name grammar must compile")
});

/// The kind of clipboard content an artifact carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Text,
    Image,
    /// A directory expected to contain exactly `count` files (recursively).
    Files { count: u32 },
}

impl ContentKind {
    /// The filename suffix for this kind, including the leading dot.
    pub fn marker(&self) -> String {
        match self {
            ContentKind::Text => ".text.json".to_string(),
            ContentKind::Image => ".png".to_string(),
            ContentKind::Files { count } => format!(".{count}_files"),
        }
    }
}

/// Whether an artifact was created by this host or another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactOrigin {
    Mine,
    Theirs,
}

/// Origin restriction applied while parsing.
///
/// A syntactically valid name whose origin does not match a restrictive
/// filter parses as "not an artifact", so callers can cheaply ignore
/// irrelevant entries without a second check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginFilter {
    Any,
    OnlyMine,
    OnlyTheirs,
}

/// A parsed artifact name from the sync folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactName {
    /// Full path of the artifact (always a direct child of the sync folder).
    pub path: PathBuf,
    /// Logical clock value. Never zero.
    pub beat: u64,
    /// Originating host identity.
    pub host: String,
    pub kind: ContentKind,
    pub origin: ArtifactOrigin,
}

impl ArtifactName {
    /// The bare file name this artifact serializes to.
    ///
    /// `parse_artifact_name` over the result yields the identical
    /// (beat, host, kind) tuple.
    pub fn file_name(&self) -> String {
        format!("{}-{}{}", self.beat, self.host, self.kind.marker())
    }
}

/// Normalize a raw machine name into a host identity.
///
/// Takes the first segment before any dot and maps characters outside the
/// artifact grammar charset to `-`, so the identity can never break the
/// filename grammar. Two hosts normalizing to the same identity is a
/// configuration hazard, not something handled defensively here.
pub fn normalize_host(raw: &str) -> String {
    let first = raw.split('.').next().unwrap_or(raw);
    first
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

/// Parse a path inside the sync folder as an artifact name.
///
/// Only the first path segment relative to `sync_folder` is consulted, so an
/// enumeration of a file bundle's contents never misparses an inner file as
/// a top-level artifact. Returns `None` for anything that is not an artifact
/// under the given `filter`.
pub fn parse_artifact_name(
    path: &Path,
    sync_folder: &Path,
    own_host: &str,
    filter: OriginFilter,
) -> Option<ArtifactName> {
    let relative = path.strip_prefix(sync_folder).ok()?;
    let base_name = relative.components().next()?.as_os_str().to_string_lossy();

    let captures = ARTIFACT_NAME_REGEX.captures(&base_name)?;

    let beat: u64 = captures.get(1)?.as_str().parse().ok()?;
    let host = captures.get(2)?.as_str().to_string();

    let kind = if let Some(count) = captures.get(5) {
        ContentKind::Files {
            count: count.as_str().parse().ok()?,
        }
    } else if captures.get(4).is_some() {
        ContentKind::Text
    } else {
        ContentKind::Image
    };

    let origin = if host == own_host {
        ArtifactOrigin::Mine
    } else {
        ArtifactOrigin::Theirs
    };

    match (filter, origin) {
        (OriginFilter::OnlyMine, ArtifactOrigin::Theirs) => return None,
        (OriginFilter::OnlyTheirs, ArtifactOrigin::Mine) => return None,
        _ => {}
    }

    Some(ArtifactName {
        path: sync_folder.join(base_name.as_ref()),
        beat,
        host,
        kind,
        origin,
    })
}

/// Compute the next beat value given every beat currently observed in the
/// sync folder.
///
/// Returns one more than the maximum, or 1 over an empty folder. Inherently
/// racy under truly concurrent writers; collisions are resolved by
/// last-applied-wins on the receive side, not by fencing.
pub fn next_beat(observed: impl IntoIterator<Item = u64>) -> u64 {
    observed.into_iter().max().map_or(1, |max| max + 1)
}
