use tracing::warn;
use user_idle2::UserIdle;

use dc_core::ports::{IdlePort, IdleState};

/// System idle probe backed by the OS input-idle counter.
pub struct SystemIdleProbe;

impl IdlePort for SystemIdleProbe {
    fn idle_state(&self) -> IdleState {
        match UserIdle::get_time() {
            Ok(idle) => {
                let secs = idle.as_seconds();
                if secs == 0 {
                    IdleState::Active
                } else {
                    IdleState::IdleFor(secs)
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to query idle time");
                IdleState::Unknown
            }
        }
    }
}
