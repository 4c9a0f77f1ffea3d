//! Shared-folder artifact store
//!
//! The sync folder is the entire transport. This store owns every direct
//! filesystem interaction with it: scanning, serializing artifacts, presence
//! markers, and the retention sweep. Callers hand in `now_ms` so policy
//! stays testable against fabricated clocks.

use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use dc_core::content::{ClipboardPayload, FileListPayload, ImagePayload, TextBundle};
use dc_core::ports::{ArtifactReadOutcome, SyncFolderPort};
use dc_core::presence::{is_presence_marker, marker_is_fresh, marker_name};
use dc_core::protocol::{
    is_legacy_artifact, next_beat, parse_artifact_name, ArtifactName, ContentKind, OriginFilter,
};
use dc_core::retention::{action_for, RetentionAction};

use super::unpin::unpin_path;

pub struct SyncFolderStore {
    root: PathBuf,
    host: String,
}

impl SyncFolderStore {
    pub fn new(root: impl Into<PathBuf>, host: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            host: host.into(),
        }
    }

    fn marker_path(&self) -> PathBuf {
        self.root.join(marker_name(&self.host))
    }

    /// Count regular files recursively under each path.
    fn file_count(paths: &[PathBuf]) -> u32 {
        let mut count = 0u32;
        for path in paths {
            for entry in WalkDir::new(path).into_iter().flatten() {
                if entry.file_type().is_file() {
                    count += 1;
                }
            }
        }
        count
    }

    /// Write `content` under the final name via a temp sibling plus rename,
    /// so watchers only ever observe a complete artifact.
    fn write_atomically(&self, file_name: &str, content: &[u8]) -> Result<PathBuf> {
        let dest = self.root.join(file_name);
        let tmp = self.root.join(format!("{file_name}.part"));

        std::fs::write(&tmp, content)
            .with_context(|| format!("write temp artifact failed: {}", tmp.display()))?;
        std::fs::rename(&tmp, &dest)
            .with_context(|| format!("publish artifact failed: {}", dest.display()))?;
        Ok(dest)
    }

    fn copy_folder_recursive(source: &Path, destination: &Path) -> std::io::Result<()> {
        std::fs::create_dir_all(destination)?;
        for entry in std::fs::read_dir(source)? {
            let entry = entry?;
            let dest_path = destination.join(entry.file_name());
            if entry.file_type()?.is_dir() {
                Self::copy_folder_recursive(&entry.path(), &dest_path)?;
            } else {
                std::fs::copy(entry.path(), dest_path)?;
            }
        }
        Ok(())
    }

    /// Delete a file or bundle directory. An entry that is already gone
    /// counts as deleted.
    fn delete_entry(path: &Path) {
        let result = if path.is_dir() {
            std::fs::remove_dir_all(path)
        } else {
            std::fs::remove_file(path)
        };
        match result {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "failed to delete entry"),
        }
    }

    /// Unpin an artifact's local copy. Bundles are unpinned file by file.
    fn unpin_entry(path: &Path) {
        if path.is_dir() {
            for entry in WalkDir::new(path).into_iter().flatten() {
                if entry.file_type().is_file() {
                    if let Err(e) = unpin_path(entry.path()) {
                        debug!(path = %entry.path().display(), error = %e, "unpin failed");
                    }
                }
            }
        } else if let Err(e) = unpin_path(path) {
            debug!(path = %path.display(), error = %e, "unpin failed");
        }
    }

    fn modified_ms(meta: &std::fs::Metadata) -> Option<u64> {
        meta.modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as u64)
    }
}

impl SyncFolderPort for SyncFolderStore {
    fn root(&self) -> &Path {
        &self.root
    }

    fn is_accessible(&self) -> bool {
        self.root.is_dir()
    }

    fn parse_entry(&self, path: &Path, filter: OriginFilter) -> Option<ArtifactName> {
        parse_artifact_name(path, &self.root, &self.host, filter)
    }

    fn allocate_next_beat(&self) -> Result<u64> {
        let entries = std::fs::read_dir(&self.root)
            .with_context(|| format!("read sync folder failed: {}", self.root.display()))?;

        let beats = entries.flatten().filter_map(|entry| {
            self.parse_entry(&entry.path(), OriginFilter::Any)
                .map(|name| name.beat)
        });
        Ok(next_beat(beats))
    }

    fn no_peers_receiving(&self, now_ms: u64) -> bool {
        let own_marker = marker_name(&self.host);

        // An unreadable folder reports no peers; the send path then skips
        // writing, which is the safe outcome either way.
        let entries = match std::fs::read_dir(&self.root) {
            Ok(e) => e,
            Err(_) => return true,
        };

        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().to_string();
            if is_presence_marker(&name) && name != own_marker {
                if let Ok(meta) = entry.metadata() {
                    if let Some(modified) = Self::modified_ms(&meta) {
                        if marker_is_fresh(modified, now_ms) {
                            return false;
                        }
                    }
                }
            }
        }

        true
    }

    fn write_presence_marker(&self, now_ms: u64) -> Result<()> {
        let path = self.marker_path();
        std::fs::write(&path, now_ms.to_string())
            .with_context(|| format!("write presence marker failed: {}", path.display()))
    }

    fn remove_presence_marker(&self) {
        let path = self.marker_path();
        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "failed to remove presence marker"),
        }
    }

    fn write_artifact(&self, beat: u64, payload: &ClipboardPayload) -> Result<PathBuf> {
        let dest = match payload {
            ClipboardPayload::Text(bundle) => {
                let json =
                    serde_json::to_string_pretty(bundle).context("serialize text bundle failed")?;
                self.write_atomically(
                    &format!("{beat}-{}{}", self.host, ContentKind::Text.marker()),
                    json.as_bytes(),
                )?
            }
            ClipboardPayload::Image(image) => self.write_atomically(
                &format!("{beat}-{}{}", self.host, ContentKind::Image.marker()),
                &image.png,
            )?,
            ClipboardPayload::Files(list) => {
                let sources: Vec<PathBuf> = list.paths.iter().map(PathBuf::from).collect();
                // The declared count is the readiness contract: receivers
                // wait until the bundle holds exactly this many files.
                let count = Self::file_count(&sources);
                let kind = ContentKind::Files { count };
                let dest = self
                    .root
                    .join(format!("{beat}-{}{}", self.host, kind.marker()));

                std::fs::create_dir(&dest)
                    .with_context(|| format!("create bundle dir failed: {}", dest.display()))?;

                for source in &sources {
                    let file_name = source.file_name().unwrap_or_default();
                    let full_dest = dest.join(file_name);
                    if source.is_dir() {
                        Self::copy_folder_recursive(source, &full_dest).with_context(|| {
                            format!("copy folder into bundle failed: {}", source.display())
                        })?;
                    } else {
                        std::fs::copy(source, &full_dest).with_context(|| {
                            format!("copy file into bundle failed: {}", source.display())
                        })?;
                    }
                }
                dest
            }
        };

        info!(path = %dest.display(), "clipboard written");
        Ok(dest)
    }

    fn read_artifact(&self, name: &ArtifactName) -> Result<ArtifactReadOutcome> {
        match name.kind {
            ContentKind::Text => {
                let content = std::fs::read_to_string(&name.path)
                    .with_context(|| format!("read text artifact failed: {}", name.path.display()))?;
                let bundle: TextBundle = serde_json::from_str(&content).with_context(|| {
                    format!("parse text artifact failed: {}", name.path.display())
                })?;
                Ok(ArtifactReadOutcome::Ready(ClipboardPayload::Text(bundle)))
            }
            ContentKind::Image => {
                let bytes = std::fs::read(&name.path).with_context(|| {
                    format!("read image artifact failed: {}", name.path.display())
                })?;
                Ok(ArtifactReadOutcome::Ready(ClipboardPayload::Image(
                    ImagePayload::from_png(bytes),
                )))
            }
            ContentKind::Files { count: expected } => {
                let present = Self::file_count(&[name.path.clone()]);
                if present != expected {
                    return Ok(ArtifactReadOutcome::NotReady { present, expected });
                }

                let entries = std::fs::read_dir(&name.path).with_context(|| {
                    format!("read bundle dir failed: {}", name.path.display())
                })?;
                let paths: Vec<String> = entries
                    .flatten()
                    .map(|e| e.path().to_string_lossy().to_string())
                    .collect();
                Ok(ArtifactReadOutcome::Ready(ClipboardPayload::Files(
                    FileListPayload::new(paths),
                )))
            }
        }
    }

    fn recursive_size_mb(&self, paths: &[String]) -> f64 {
        let mut total: u64 = 0;
        for path in paths {
            for entry in WalkDir::new(path).into_iter().flatten() {
                if entry.file_type().is_file() {
                    if let Ok(meta) = entry.metadata() {
                        total += meta.len();
                    }
                }
            }
        }
        total as f64 / (1024.0 * 1024.0)
    }

    fn sweep(&self, now_ms: u64) {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(e) => e,
            Err(e) => {
                warn!(folder = %self.root.display(), error = %e, "sweep could not read folder");
                return;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();

            let Some(parsed) = self.parse_entry(&path, OriginFilter::Any) else {
                // Markers are removed on shutdown, never swept.
                if is_presence_marker(&name) {
                    continue;
                }
                if is_legacy_artifact(&name) {
                    info!(path = %path.display(), "deleting artifact left by a previous version");
                    Self::delete_entry(&path);
                }
                continue;
            };

            let Ok(meta) = std::fs::metadata(&path) else {
                continue;
            };
            let Some(modified) = Self::modified_ms(&meta) else {
                continue;
            };
            let age_ms = now_ms.saturating_sub(modified);

            match action_for(parsed.origin, age_ms) {
                RetentionAction::Keep => {}
                RetentionAction::Delete => {
                    info!(path = %path.display(), "deleting expired artifact");
                    Self::delete_entry(&path);
                }
                RetentionAction::Unpin => Self::unpin_entry(&path),
            }
        }
    }
}
