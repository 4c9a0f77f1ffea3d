use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, info_span};

use dc_core::content::PayloadKind;
use dc_core::ports::{
    ArtifactReadOutcome, ClipboardPort, ClockPort, StatusPort, StatusSignal, SyncFolderPort,
};
use dc_core::protocol::{ArtifactName, ContentKind};
use dc_core::settings::Settings;
use dc_core::suppression::SyncCursors;

/// Apply a peer's artifact to the local clipboard.
///
/// Returns whether the clipboard was updated. A bundle still propagating,
/// a stale beat, a disabled kind, or content the clipboard already holds
/// all apply to nothing and are not errors.
pub struct ApplyArtifactUseCase {
    clipboard: Arc<dyn ClipboardPort>,
    folder: Arc<dyn SyncFolderPort>,
    clock: Arc<dyn ClockPort>,
    status: Arc<dyn StatusPort>,
}

impl ApplyArtifactUseCase {
    pub fn new(
        clipboard: Arc<dyn ClipboardPort>,
        folder: Arc<dyn SyncFolderPort>,
        clock: Arc<dyn ClockPort>,
        status: Arc<dyn StatusPort>,
    ) -> Self {
        Self {
            clipboard,
            folder,
            clock,
            status,
        }
    }

    pub fn execute(
        &self,
        name: &ArtifactName,
        settings: &Settings,
        cursors: &mut SyncCursors,
    ) -> Result<bool> {
        let _span = info_span!("usecase.apply_artifact", beat = name.beat).entered();

        let kind = match name.kind {
            ContentKind::Text => PayloadKind::Text,
            ContentKind::Image => PayloadKind::Image,
            ContentKind::Files { .. } => PayloadKind::Files,
        };
        if !settings.allows_receive(kind) {
            debug!(?kind, "receiving this kind is disabled");
            return Ok(false);
        }

        let payload = match self
            .folder
            .read_artifact(name)
            .with_context(|| format!("read artifact failed: {}", name.path.display()))?
        {
            ArtifactReadOutcome::Ready(payload) => payload,
            ArtifactReadOutcome::NotReady { present, expected } => {
                // the next folder event for this bundle retries
                info!(present, expected, "bundle not fully propagated yet");
                return Ok(false);
            }
        };

        if payload.is_empty() {
            debug!("artifact carries empty content");
            return Ok(false);
        }

        // If the clipboard already holds this content, writing it again
        // would only trigger another change event. A backend that cannot
        // even be read must not be written to either.
        let current = self
            .clipboard
            .snapshot()
            .context("snapshot clipboard before receive failed")?;
        if let Some(current) = current {
            if current.same_content(&payload) {
                debug!("clipboard already holds this content");
                return Ok(false);
            }
        }

        if cursors.is_stale(name.beat) {
            info!(
                last = cursors.last_beat_observed,
                "skipping artifact, a newer clipboard was already processed"
            );
            return Ok(false);
        }

        self.clipboard
            .write(&payload)
            .context("write received payload to clipboard failed")?;

        cursors.note_received(&payload, name.beat, self.clock.now_ms());
        self.status.signal(StatusSignal::Received);
        info!(beat = name.beat, path = %name.path.display(), "clipboard received");
        Ok(true)
    }
}
