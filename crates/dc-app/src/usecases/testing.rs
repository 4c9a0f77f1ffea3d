//! Hand-rolled fakes for the ports the use cases touch.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, Result};

use dc_core::content::TextBundle;
use dc_core::ports::{
    ArtifactReadOutcome, ClipboardPort, ClockPort, StatusPort, StatusSignal, SyncFolderPort,
};
use dc_core::protocol::{next_beat, parse_artifact_name, ArtifactName, OriginFilter};
use dc_core::ClipboardPayload;

pub fn text_payload(text: &str) -> ClipboardPayload {
    ClipboardPayload::Text(TextBundle {
        text: Some(text.to_string()),
        ..Default::default()
    })
}

#[derive(Default)]
pub struct FakeClipboard {
    snapshot: Mutex<Option<ClipboardPayload>>,
    snapshot_calls: AtomicU32,
    snapshot_fails: AtomicBool,
    written: Mutex<Vec<ClipboardPayload>>,
}

impl FakeClipboard {
    pub fn set_snapshot(&self, payload: Option<ClipboardPayload>) {
        *self.snapshot.lock().unwrap() = payload;
    }

    /// Make every subsequent `snapshot` fail, like a busy backend.
    pub fn fail_snapshots(&self) {
        self.snapshot_fails.store(true, Ordering::SeqCst);
    }

    pub fn snapshot_calls(&self) -> u32 {
        self.snapshot_calls.load(Ordering::SeqCst)
    }

    pub fn written(&self) -> Vec<ClipboardPayload> {
        self.written.lock().unwrap().clone()
    }
}

impl ClipboardPort for FakeClipboard {
    fn snapshot(&self) -> Result<Option<ClipboardPayload>> {
        self.snapshot_calls.fetch_add(1, Ordering::SeqCst);
        if self.snapshot_fails.load(Ordering::SeqCst) {
            return Err(anyhow!("clipboard backend unavailable"));
        }
        Ok(self.snapshot.lock().unwrap().clone())
    }

    fn write(&self, payload: &ClipboardPayload) -> Result<()> {
        self.written.lock().unwrap().push(payload.clone());
        // the written payload becomes the current clipboard
        *self.snapshot.lock().unwrap() = Some(payload.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeClock {
    now_ms: AtomicU64,
}

impl FakeClock {
    pub fn set_now_ms(&self, now_ms: u64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }
}

impl ClockPort for FakeClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct FakeStatus {
    signals: Mutex<Vec<StatusSignal>>,
}

impl FakeStatus {
    pub fn signals(&self) -> Vec<StatusSignal> {
        self.signals.lock().unwrap().clone()
    }
}

impl StatusPort for FakeStatus {
    fn signal(&self, signal: StatusSignal) {
        self.signals.lock().unwrap().push(signal);
    }
}

/// In-memory stand-in for the sync folder. Peers are "receiving" unless a
/// test says otherwise.
pub struct FakeFolder {
    root: PathBuf,
    host: String,
    beats: Mutex<Vec<u64>>,
    written: Mutex<Vec<(u64, ClipboardPayload)>>,
    outcomes: Mutex<HashMap<String, ArtifactReadOutcome>>,
    peers_receiving: AtomicBool,
    recursive_size_mb: Mutex<f64>,
    read_calls: AtomicU32,
    presence_writes: Mutex<Vec<u64>>,
    marker_present: AtomicBool,
    sweeps: Mutex<Vec<u64>>,
    accessible: AtomicBool,
}

impl Default for FakeFolder {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/sync"),
            host: "alpha".to_string(),
            beats: Mutex::new(Vec::new()),
            written: Mutex::new(Vec::new()),
            outcomes: Mutex::new(HashMap::new()),
            peers_receiving: AtomicBool::new(true),
            recursive_size_mb: Mutex::new(0.0),
            read_calls: AtomicU32::new(0),
            presence_writes: Mutex::new(Vec::new()),
            marker_present: AtomicBool::new(false),
            sweeps: Mutex::new(Vec::new()),
            accessible: AtomicBool::new(true),
        }
    }
}

impl FakeFolder {
    pub fn seed_beats(&self, beats: Vec<u64>) {
        *self.beats.lock().unwrap() = beats;
    }

    pub fn set_peers_receiving(&self, receiving: bool) {
        self.peers_receiving.store(receiving, Ordering::SeqCst);
    }

    pub fn set_recursive_size_mb(&self, size: f64) {
        *self.recursive_size_mb.lock().unwrap() = size;
    }

    pub fn set_accessible(&self, accessible: bool) {
        self.accessible.store(accessible, Ordering::SeqCst);
    }

    pub fn written(&self) -> Vec<(u64, ClipboardPayload)> {
        self.written.lock().unwrap().clone()
    }

    pub fn read_calls(&self) -> u32 {
        self.read_calls.load(Ordering::SeqCst)
    }

    pub fn presence_writes(&self) -> Vec<u64> {
        self.presence_writes.lock().unwrap().clone()
    }

    pub fn marker_present(&self) -> bool {
        self.marker_present.load(Ordering::SeqCst)
    }

    pub fn sweeps(&self) -> Vec<u64> {
        self.sweeps.lock().unwrap().clone()
    }

    /// Register an artifact under `file_name` and return its parsed name.
    pub fn seed_artifact(&self, file_name: &str, payload: ClipboardPayload) -> ArtifactName {
        let name = self.parsed(file_name);
        self.outcomes
            .lock()
            .unwrap()
            .insert(file_name.to_string(), ArtifactReadOutcome::Ready(payload));
        name
    }

    /// Register a bundle that is still propagating.
    pub fn seed_not_ready(&self, file_name: &str, present: u32, expected: u32) -> ArtifactName {
        let name = self.parsed(file_name);
        self.outcomes.lock().unwrap().insert(
            file_name.to_string(),
            ArtifactReadOutcome::NotReady { present, expected },
        );
        name
    }

    fn parsed(&self, file_name: &str) -> ArtifactName {
        parse_artifact_name(
            &self.root.join(file_name),
            &self.root,
            &self.host,
            OriginFilter::Any,
        )
        .unwrap_or_else(|| panic!("{file_name} is not a valid artifact name"))
    }
}

impl SyncFolderPort for FakeFolder {
    fn root(&self) -> &Path {
        &self.root
    }

    fn is_accessible(&self) -> bool {
        self.accessible.load(Ordering::SeqCst)
    }

    fn parse_entry(&self, path: &Path, filter: OriginFilter) -> Option<ArtifactName> {
        parse_artifact_name(path, &self.root, &self.host, filter)
    }

    fn allocate_next_beat(&self) -> Result<u64> {
        let seeded = self.beats.lock().unwrap().clone();
        let written = self.written.lock().unwrap();
        Ok(next_beat(
            seeded.into_iter().chain(written.iter().map(|(b, _)| *b)),
        ))
    }

    fn no_peers_receiving(&self, _now_ms: u64) -> bool {
        !self.peers_receiving.load(Ordering::SeqCst)
    }

    fn write_presence_marker(&self, now_ms: u64) -> Result<()> {
        self.presence_writes.lock().unwrap().push(now_ms);
        self.marker_present.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn remove_presence_marker(&self) {
        self.marker_present.store(false, Ordering::SeqCst);
    }

    fn write_artifact(&self, beat: u64, payload: &ClipboardPayload) -> Result<PathBuf> {
        self.written.lock().unwrap().push((beat, payload.clone()));
        Ok(self.root.join(format!("{beat}-{}", self.host)))
    }

    fn read_artifact(&self, name: &ArtifactName) -> Result<ArtifactReadOutcome> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        self.outcomes
            .lock()
            .unwrap()
            .get(&name.file_name())
            .cloned()
            .ok_or_else(|| anyhow!("no artifact registered for {}", name.file_name()))
    }

    fn recursive_size_mb(&self, _paths: &[String]) -> f64 {
        *self.recursive_size_mb.lock().unwrap()
    }

    fn sweep(&self, now_ms: u64) {
        self.sweeps.lock().unwrap().push(now_ms);
    }
}
