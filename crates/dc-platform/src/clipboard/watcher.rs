use anyhow::{anyhow, Result};
use clipboard_rs::{ClipboardHandler, ClipboardWatcher, ClipboardWatcherContext, WatcherShutdown};
use tokio::sync::mpsc;
use tracing::debug;

use dc_core::ports::{ClipboardWatchPort, WatchGuard};

/// Forwards clipboard-changed events into the session channel.
struct ChangeForwarder {
    tx: mpsc::Sender<()>,
}

impl ClipboardHandler for ChangeForwarder {
    fn on_clipboard_change(&mut self) {
        // A full channel means a change is already pending; the debounce
        // collapses them anyway.
        if let Err(e) = self.tx.try_send(()) {
            debug!(error = %e, "dropped clipboard change event");
        }
    }
}

struct ClipboardWatchHandle {
    shutdown: Option<WatcherShutdown>,
}

impl WatchGuard for ClipboardWatchHandle {}

impl Drop for ClipboardWatchHandle {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            shutdown.stop();
        }
    }
}

pub struct ClipboardEventWatcher;

impl ClipboardWatchPort for ClipboardEventWatcher {
    fn watch(&self, tx: mpsc::Sender<()>) -> Result<Box<dyn WatchGuard>> {
        let mut ctx = ClipboardWatcherContext::new()
            .map_err(|e| anyhow!("create clipboard watcher failed: {e}"))?;

        let shutdown = ctx
            .add_handler(ChangeForwarder { tx })
            .get_shutdown_channel();

        // start_watch blocks until shutdown, so it gets its own thread
        std::thread::spawn(move || {
            ctx.start_watch();
        });

        Ok(Box::new(ClipboardWatchHandle {
            shutdown: Some(shutdown),
        }))
    }
}
