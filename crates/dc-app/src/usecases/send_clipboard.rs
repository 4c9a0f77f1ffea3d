use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, info_span, warn};

use dc_core::ports::{ClipboardPort, ClockPort, StatusPort, StatusSignal, SyncFolderPort};
use dc_core::settings::Settings;
use dc_core::suppression::SyncCursors;
use dc_core::ClipboardPayload;

/// Largest file-list payload the send path will copy into the folder.
pub const MAX_FILES_SIZE_MB: f64 = 100.0;

/// Snapshot the local clipboard and publish it as an artifact.
///
/// Emits at most one artifact per call; all the reasons not to emit
/// (no live peers, disabled kind, suppression, size cap) are ordinary
/// outcomes, not errors.
pub struct SendClipboardUseCase {
    clipboard: Arc<dyn ClipboardPort>,
    folder: Arc<dyn SyncFolderPort>,
    clock: Arc<dyn ClockPort>,
    status: Arc<dyn StatusPort>,
}

impl SendClipboardUseCase {
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

    /// Returns the beat of the published artifact, or `None` when nothing
    /// was sent.
    pub fn execute(&self, settings: &Settings, cursors: &mut SyncCursors) -> Result<Option<u64>> {
        let _span = info_span!("usecase.send_clipboard").entered();
        let now_ms = self.clock.now_ms();

        if !settings.is_sending_anything() {
            return Ok(None);
        }

        if self.folder.no_peers_receiving(now_ms) {
            info!("no other host is receiving, skipping clipboard send");
            return Ok(None);
        }

        let Some(payload) = self
            .clipboard
            .snapshot()
            .context("snapshot clipboard for send failed")?
        else {
            debug!("clipboard holds no syncable content");
            return Ok(None);
        };

        if !settings.allows_send(payload.kind()) {
            debug!(kind = ?payload.kind(), "sending this kind is disabled");
            return Ok(None);
        }

        if let Some(veto) = cursors.send_veto(&payload, now_ms) {
            debug!(reason = ?veto, "send suppressed");
            return Ok(None);
        }

        if let ClipboardPayload::Files(list) = &payload {
            let size_mb = self.folder.recursive_size_mb(&list.paths);
            if size_mb > MAX_FILES_SIZE_MB {
                warn!(
                    size_mb = format!("{size_mb:.1}"),
                    "not sending clipboard files over the size cap"
                );
                return Ok(None);
            }
        }

        let beat = self
            .folder
            .allocate_next_beat()
            .context("allocate beat for send failed")?;
        let path = self
            .folder
            .write_artifact(beat, &payload)
            .context("write artifact for send failed")?;

        cursors.note_sent(&payload, beat, now_ms);
        self.status.signal(StatusSignal::Sent);
        info!(beat, path = %path.display(), "clipboard sent");
        Ok(Some(beat))
    }
}
