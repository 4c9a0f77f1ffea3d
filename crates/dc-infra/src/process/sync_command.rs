use std::io::{BufRead, BufReader, Read};
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;

use tracing::{error, info, warn};

use dc_core::ports::SyncCommandPort;

/// Runs the user-configured folder sync helper as a child process, with
/// its output folded into our log.
///
/// The command string is split with shell word rules, so quoted arguments
/// survive: `rclone bisync remote: "C:\Sync Folder"`.
#[derive(Default)]
pub struct SyncCommandRunner {
    child: Mutex<Option<Child>>,
}

impl SyncCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SyncCommandPort for SyncCommandRunner {
    fn start(&self, command: &str) -> bool {
        let Ok(mut slot) = self.child.lock() else {
            return false;
        };
        if command.is_empty() || slot.is_some() {
            return false;
        }

        let parts = match shell_words::split(command) {
            Ok(parts) => parts,
            Err(err) => {
                error!(command, "sync command does not parse: {err}");
                return false;
            }
        };
        let Some((program, args)) = parts.split_first() else {
            return false;
        };

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            const CREATE_NO_WINDOW: u32 = 0x0800_0000;
            cmd.creation_flags(CREATE_NO_WINDOW);
        }

        match cmd.spawn() {
            Ok(mut child) => {
                if let Some(stdout) = child.stdout.take() {
                    std::thread::spawn(move || forward_output(stdout, false));
                }
                if let Some(stderr) = child.stderr.take() {
                    std::thread::spawn(move || forward_output(stderr, true));
                }
                info!(command, pid = child.id(), "sync command started");
                *slot = Some(child);
                true
            }
            Err(err) => {
                error!(command, "failed to start sync command: {err}");
                false
            }
        }
    }

    fn stop(&self) {
        let Ok(mut slot) = self.child.lock() else {
            return;
        };
        if let Some(child) = slot.as_mut() {
            let _ = child.kill();
            let _ = child.wait();
            info!("sync command stopped");
        }
        *slot = None;
    }

    fn check(&self) -> Option<i32> {
        let Ok(mut slot) = self.child.lock() else {
            return None;
        };
        let child = slot.as_mut()?;
        match child.try_wait() {
            Ok(Some(status)) => {
                *slot = None;
                // killed by signal on unix
                Some(status.code().unwrap_or(-1))
            }
            Ok(None) => None,
            Err(err) => {
                warn!("could not poll sync command: {err}");
                None
            }
        }
    }
}

impl Drop for SyncCommandRunner {
    fn drop(&mut self) {
        self.stop();
    }
}

fn forward_output<R: Read>(pipe: R, is_stderr: bool) {
    for line in BufReader::new(pipe).lines().map_while(Result::ok) {
        if is_stderr {
            warn!("[sync-command] {line}");
        } else {
            info!("[sync-command] {line}");
        }
    }
}
