/// Wall-clock source, injected so policy windows are testable.
pub trait ClockPort: Send + Sync {
    /// Unix epoch milliseconds.
    fn now_ms(&self) -> u64;
}
