/// Transient agent state surfaced to whatever UI is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusSignal {
    Working,
    Sent,
    Received,
    Suspended,
}

/// Notification surface for the surrounding UI (tray icon, logs).
///
/// Signals are fire-and-forget; the engine never depends on them.
pub trait StatusPort: Send + Sync {
    fn signal(&self, signal: StatusSignal);
}
