/// A long-lived helper process that mirrors the sync folder (rclone or a
/// similar client), run only while the session is active.
///
/// Starting is best-effort: the agent can still work against a folder an
/// external client keeps in sync, so failures surface through logs and
/// `check`, not as errors.
pub trait SyncCommandPort: Send + Sync {
    /// Spawn `command` unless a process is already running. Returns
    /// whether a new process was started.
    fn start(&self, command: &str) -> bool;

    /// Kill and reap the running process, if any.
    fn stop(&self);

    /// Exit code of a process that terminated since the last call.
    fn check(&self) -> Option<i32>;
}
