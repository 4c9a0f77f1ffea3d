//! # dc-core
//!
//! Core domain models and synchronization policies for driveclip.
//!
//! This crate contains pure business logic without any infrastructure
//! dependencies: the artifact naming protocol, the clipboard content model,
//! and the suppression, retention and presence policies that make
//! folder-mediated clipboard synchronization loop-free.

pub mod content;
pub mod ports;
pub mod presence;
pub mod protocol;
pub mod retention;
pub mod settings;
pub mod suppression;

// Re-export commonly used types at the crate root
pub use content::{ClipboardPayload, FileListPayload, ImagePayload, PayloadKind, TextBundle};
pub use protocol::{ArtifactName, ArtifactOrigin, ContentKind, OriginFilter};
pub use settings::{Settings, WatchMode};
pub use suppression::SyncCursors;
