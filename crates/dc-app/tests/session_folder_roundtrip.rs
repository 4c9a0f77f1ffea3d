//! End-to-end: a session driving a real folder store in a temp directory.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::Result;
use tokio::sync::mpsc;

use dc_app::{SessionEvent, SyncSession, SyncSessionDeps};
use dc_core::content::TextBundle;
use dc_core::ports::{
    ClipboardPort, ClipboardWatchPort, ClockPort, FolderWatchPort, IdlePort, IdleState,
    StatusPort, StatusSignal, SyncCommandPort, WatchGuard,
};
use dc_core::settings::{Settings, WatchMode};
use dc_core::suppression::{DEBOUNCE_MS, FEEDBACK_WINDOW_MS};
use dc_core::ClipboardPayload;
use dc_infra::SyncFolderStore;

fn text_payload(text: &str) -> ClipboardPayload {
    ClipboardPayload::Text(TextBundle {
        text: Some(text.to_string()),
        ..Default::default()
    })
}

#[derive(Default)]
struct TestClipboard {
    current: Mutex<Option<ClipboardPayload>>,
    written: Mutex<Vec<ClipboardPayload>>,
}

impl TestClipboard {
    fn set(&self, payload: ClipboardPayload) {
        *self.current.lock().unwrap() = Some(payload);
    }

    fn written(&self) -> Vec<ClipboardPayload> {
        self.written.lock().unwrap().clone()
    }
}

impl ClipboardPort for TestClipboard {
    fn snapshot(&self) -> Result<Option<ClipboardPayload>> {
        Ok(self.current.lock().unwrap().clone())
    }

    fn write(&self, payload: &ClipboardPayload) -> Result<()> {
        self.written.lock().unwrap().push(payload.clone());
        *self.current.lock().unwrap() = Some(payload.clone());
        Ok(())
    }
}

/// Starts at the real wall clock so file mtimes in the temp folder line up,
/// then advances only when told to.
struct TestClock {
    now_ms: AtomicU64,
}

impl TestClock {
    fn new() -> Arc<Self> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis() as u64;
        Arc::new(Self {
            now_ms: AtomicU64::new(now),
        })
    }

    fn advance_ms(&self, delta: u64) {
        self.now_ms.fetch_add(delta, Ordering::SeqCst);
    }
}

impl ClockPort for TestClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

struct AlwaysActive;
impl IdlePort for AlwaysActive {
    fn idle_state(&self) -> IdleState {
        IdleState::Active
    }
}

struct DiscardStatus;
impl StatusPort for DiscardStatus {
    fn signal(&self, _signal: StatusSignal) {}
}

struct NoopGuard;
impl WatchGuard for NoopGuard {}

struct NullClipboardWatch;
impl ClipboardWatchPort for NullClipboardWatch {
    fn watch(&self, _tx: mpsc::Sender<()>) -> Result<Box<dyn WatchGuard>> {
        Ok(Box::new(NoopGuard))
    }
}

struct NullFolderWatch;
impl FolderWatchPort for NullFolderWatch {
    fn watch(
        &self,
        _folder: &Path,
        _mode: WatchMode,
        _tx: mpsc::Sender<PathBuf>,
    ) -> Result<Box<dyn WatchGuard>> {
        Ok(Box::new(NoopGuard))
    }
}

struct NoSyncCommand;
impl SyncCommandPort for NoSyncCommand {
    fn start(&self, _command: &str) -> bool {
        false
    }

    fn stop(&self) {}

    fn check(&self) -> Option<i32> {
        None
    }
}

struct Fixture {
    clipboard: Arc<TestClipboard>,
    clock: Arc<TestClock>,
    session: SyncSession,
}

fn fixture(folder: &Path) -> Fixture {
    let clipboard = Arc::new(TestClipboard::default());
    let clock = TestClock::new();
    let session = SyncSession::new(
        SyncSessionDeps {
            clipboard: clipboard.clone(),
            folder: Arc::new(SyncFolderStore::new(folder, "alpha")),
            clock: clock.clone(),
            idle: Arc::new(AlwaysActive),
            status: Arc::new(DiscardStatus),
            clipboard_watch: Arc::new(NullClipboardWatch),
            folder_watch: Arc::new(NullFolderWatch),
            sync_command: Arc::new(NoSyncCommand),
        },
        Settings::default(),
    );
    Fixture {
        clipboard,
        clock,
        session,
    }
}

fn own_artifacts(folder: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(folder)
        .unwrap()
        .flatten()
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|n| n.contains("-alpha."))
        .collect();
    names.sort();
    names
}

#[tokio::test(start_paused = true)]
async fn clipboard_change_publishes_an_artifact() {
    let dir = tempfile::tempdir().unwrap();
    // a live peer, otherwise the send path stays quiet
    std::fs::write(dir.path().join("beta.is-receiving.txt"), b"1").unwrap();

    let f = fixture(dir.path());
    f.clipboard.set(text_payload("hello"));

    let events = f.session.events();
    let run = tokio::spawn(f.session.run());
    events.send(SessionEvent::ClipboardChanged).await.unwrap();
    events.send(SessionEvent::Shutdown).await.unwrap();
    run.await.unwrap().unwrap();

    assert_eq!(own_artifacts(dir.path()), vec!["1-alpha.text.json"]);
    let body = std::fs::read_to_string(dir.path().join("1-alpha.text.json")).unwrap();
    let bundle: TextBundle = serde_json::from_str(&body).unwrap();
    assert_eq!(bundle.text.as_deref(), Some("hello"));
}

#[tokio::test(start_paused = true)]
async fn received_artifact_is_not_echoed_back() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("beta.is-receiving.txt"), b"1").unwrap();

    let artifact = dir.path().join("7-beta.text.json");
    std::fs::write(&artifact, r#"{"text":"from-peer"}"#).unwrap();

    let f = fixture(dir.path());
    let events = f.session.events();
    let run = tokio::spawn(f.session.run());

    events
        .send(SessionEvent::FolderEntryChanged(artifact))
        .await
        .unwrap();
    // paused-clock sleeps let the session drain the event, including its
    // own settle delays, before the test clock moves on
    tokio::time::sleep(Duration::from_secs(1)).await;

    // applying the artifact changed the clipboard, which fires a change
    // event on a real system; it must not produce an artifact of our own
    f.clock.advance_ms(DEBOUNCE_MS + 100);
    events.send(SessionEvent::ClipboardChanged).await.unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;

    // once the feedback window has passed, the same content is a genuine
    // new copy and goes out with a beat above the peer's
    f.clock.advance_ms(FEEDBACK_WINDOW_MS);
    events.send(SessionEvent::ClipboardChanged).await.unwrap();
    events.send(SessionEvent::Shutdown).await.unwrap();
    run.await.unwrap().unwrap();

    assert_eq!(f.clipboard.written(), vec![text_payload("from-peer")]);
    assert_eq!(own_artifacts(dir.path()), vec!["8-alpha.text.json"]);
}

#[tokio::test(start_paused = true)]
async fn nothing_is_sent_when_no_peer_is_receiving() {
    let dir = tempfile::tempdir().unwrap();

    let f = fixture(dir.path());
    f.clipboard.set(text_payload("hello"));

    let events = f.session.events();
    let run = tokio::spawn(f.session.run());
    events.send(SessionEvent::ClipboardChanged).await.unwrap();
    events.send(SessionEvent::Shutdown).await.unwrap();
    run.await.unwrap().unwrap();

    assert!(own_artifacts(dir.path()).is_empty());
}

#[tokio::test(start_paused = true)]
async fn replayed_artifact_is_applied_only_once() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("7-beta.text.json");
    std::fs::write(&artifact, r#"{"text":"from-peer"}"#).unwrap();

    let f = fixture(dir.path());
    let events = f.session.events();
    let run = tokio::spawn(f.session.run());

    events
        .send(SessionEvent::FolderEntryChanged(artifact.clone()))
        .await
        .unwrap();
    // the substrate often fires several events per download
    events
        .send(SessionEvent::FolderEntryChanged(artifact))
        .await
        .unwrap();
    events.send(SessionEvent::Shutdown).await.unwrap();
    run.await.unwrap().unwrap();

    assert_eq!(f.clipboard.written(), vec![text_payload("from-peer")]);
}
