use tracing::info;

use dc_core::ports::{StatusPort, StatusSignal};

/// Status sink for headless runs: state transitions only go to the log.
pub struct LogStatus;

impl StatusPort for LogStatus {
    fn signal(&self, signal: StatusSignal) {
        info!(?signal, "session status");
    }
}
