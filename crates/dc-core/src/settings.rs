//! Persisted agent settings

use serde::{Deserialize, Serialize};

use crate::content::PayloadKind;

pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// How incoming artifact files are detected in the sync folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WatchMode {
    /// Native OS file events. Some sync substrates update placeholder files
    /// without emitting them; polling is the fallback for those setups.
    #[default]
    Native,
    Polling,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "current_schema_version")]
    pub schema_version: u32,

    /// The user-chosen shared folder acting as transport. `None` means the
    /// agent cannot run.
    pub folder: Option<String>,

    pub send_texts: bool,
    pub send_images: bool,
    pub send_files: bool,
    pub receive_texts: bool,
    pub receive_images: bool,
    pub receive_files: bool,

    /// Whether the retention sweep runs.
    pub auto_cleanup: bool,

    #[serde(default)]
    pub watch_mode: WatchMode,

    /// Helper process that mirrors the sync folder (rclone or similar),
    /// started with the session and stopped with it. `None` when the
    /// folder is synchronized by an external client.
    #[serde(default)]
    pub sync_command: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            folder: None,
            send_texts: true,
            send_images: true,
            send_files: true,
            receive_texts: true,
            receive_images: true,
            receive_files: true,
            auto_cleanup: true,
            watch_mode: WatchMode::Native,
            sync_command: None,
        }
    }
}

impl Settings {
    pub fn is_sending_anything(&self) -> bool {
        self.send_texts || self.send_images || self.send_files
    }

    pub fn is_receiving_anything(&self) -> bool {
        self.receive_texts || self.receive_images || self.receive_files
    }

    pub fn allows_send(&self, kind: PayloadKind) -> bool {
        match kind {
            PayloadKind::Text => self.send_texts,
            PayloadKind::Image => self.send_images,
            PayloadKind::Files => self.send_files,
        }
    }

    pub fn allows_receive(&self, kind: PayloadKind) -> bool {
        match kind {
            PayloadKind::Text => self.receive_texts,
            PayloadKind::Image => self.receive_images,
            PayloadKind::Files => self.receive_files,
        }
    }
}

fn current_schema_version() -> u32 {
    CURRENT_SCHEMA_VERSION
}
