//! Duplicate and feedback-loop suppression
//!
//! All of the in-memory synchronization state a host carries: the highest
//! beat it has sent or received, and compact fingerprints of the last
//! payload sent and received per kind. This state is deliberately lossy:
//! losing it on restart only risks a few duplicate round-trips, never
//! incorrect ordering.

use crate::content::{ClipboardPayload, PayloadKind, TextBundle};

/// Quiet window after a clipboard-change trigger; the OS clipboard API can
/// fire several notifications for one user action.
pub const DEBOUNCE_MS: u64 = 500;

/// Window in which a payload equal to the last *received* one is an echo.
pub const FEEDBACK_WINDOW_MS: u64 = 5_000;

/// Window in which a payload equal to the last *sent* one is a redundant
/// resend.
pub const RESEND_WINDOW_MS: u64 = 10_000;

/// Why the send path refused to produce an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendVeto {
    Empty,
    /// Equal to content received within the feedback window: writing it
    /// back would echo it to its origin.
    EchoOfReceive,
    /// Equal to content sent within the resend window.
    RecentResend,
}

/// Compact fingerprint of a payload, enough to evaluate the kind's equality
/// predicate without retaining large buffers.
#[derive(Debug, Clone)]
enum Fingerprint {
    Text(TextBundle),
    ImageSha256(String),
    Files(Vec<String>),
}

impl Fingerprint {
    fn of(payload: &ClipboardPayload) -> Self {
        match payload {
            ClipboardPayload::Text(t) => Fingerprint::Text(t.clone()),
            ClipboardPayload::Image(i) => Fingerprint::ImageSha256(i.sha256.clone()),
            ClipboardPayload::Files(f) => {
                let mut paths = f.paths.clone();
                paths.sort();
                Fingerprint::Files(paths)
            }
        }
    }

    fn matches(&self, payload: &ClipboardPayload) -> bool {
        match (self, payload) {
            (Fingerprint::Text(a), ClipboardPayload::Text(b)) => a.matches(b),
            (Fingerprint::ImageSha256(a), ClipboardPayload::Image(b)) => *a == b.sha256,
            (Fingerprint::Files(a), ClipboardPayload::Files(b)) => {
                let mut paths = b.paths.clone();
                paths.sort();
                *a == paths
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
struct Stamp {
    fingerprint: Fingerprint,
    at_ms: u64,
}

#[derive(Debug, Clone, Default)]
struct KindStamps {
    text: Option<Stamp>,
    image: Option<Stamp>,
    files: Option<Stamp>,
}

impl KindStamps {
    fn slot(&mut self, kind: PayloadKind) -> &mut Option<Stamp> {
        match kind {
            PayloadKind::Text => &mut self.text,
            PayloadKind::Image => &mut self.image,
            PayloadKind::Files => &mut self.files,
        }
    }

    fn get(&self, kind: PayloadKind) -> Option<&Stamp> {
        match kind {
            PayloadKind::Text => self.text.as_ref(),
            PayloadKind::Image => self.image.as_ref(),
            PayloadKind::Files => self.files.as_ref(),
        }
    }

    fn record(&mut self, payload: &ClipboardPayload, at_ms: u64) {
        *self.slot(payload.kind()) = Some(Stamp {
            fingerprint: Fingerprint::of(payload),
            at_ms,
        });
    }

    fn matches_within(&self, payload: &ClipboardPayload, now_ms: u64, window_ms: u64) -> bool {
        self.get(payload.kind()).is_some_and(|stamp| {
            now_ms.saturating_sub(stamp.at_ms) < window_ms && stamp.fingerprint.matches(payload)
        })
    }
}

/// Per-session synchronization cursors. Not persisted.
#[derive(Debug, Clone, Default)]
pub struct SyncCursors {
    /// Highest beat this host has sent or received.
    pub last_beat_observed: Option<u64>,
    sent: KindStamps,
    received: KindStamps,
    last_trigger_ms: Option<u64>,
}

impl SyncCursors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a clipboard-change trigger and report whether it falls inside
    /// the debounce window of the previous one.
    pub fn debounce(&mut self, now_ms: u64) -> bool {
        let suppressed = self
            .last_trigger_ms
            .is_some_and(|last| now_ms.saturating_sub(last) < DEBOUNCE_MS);
        if !suppressed {
            self.last_trigger_ms = Some(now_ms);
        }
        suppressed
    }

    /// Evaluate the send-path suppression rules against a snapshot.
    pub fn send_veto(&self, payload: &ClipboardPayload, now_ms: u64) -> Option<SendVeto> {
        if payload.is_empty() {
            return Some(SendVeto::Empty);
        }
        if self
            .received
            .matches_within(payload, now_ms, FEEDBACK_WINDOW_MS)
        {
            return Some(SendVeto::EchoOfReceive);
        }
        if self.sent.matches_within(payload, now_ms, RESEND_WINDOW_MS) {
            return Some(SendVeto::RecentResend);
        }
        None
    }

    /// An incoming artifact is stale unless its beat is strictly newer than
    /// everything this host has sent or received.
    pub fn is_stale(&self, beat: u64) -> bool {
        self.last_beat_observed.is_some_and(|last| beat <= last)
    }

    pub fn note_sent(&mut self, payload: &ClipboardPayload, beat: u64, now_ms: u64) {
        self.sent.record(payload, now_ms);
        self.observe_beat(beat);
    }

    pub fn note_received(&mut self, payload: &ClipboardPayload, beat: u64, now_ms: u64) {
        self.received.record(payload, now_ms);
        self.observe_beat(beat);
    }

    fn observe_beat(&mut self, beat: u64) {
        self.last_beat_observed = Some(self.last_beat_observed.map_or(beat, |b| b.max(beat)));
    }
}
