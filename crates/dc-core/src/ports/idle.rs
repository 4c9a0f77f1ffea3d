/// What the system idle probe reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleState {
    Active,
    /// The user has been idle for this many seconds.
    IdleFor(u64),
    /// The platform could not answer; treated as active so synchronization
    /// never suspends on a broken probe.
    Unknown,
}

/// System idle-duration query.
pub trait IdlePort: Send + Sync {
    fn idle_state(&self) -> IdleState;
}
