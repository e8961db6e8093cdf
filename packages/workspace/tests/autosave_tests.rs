//! Debounce timing of the autosave controller, on tokio's paused clock

use async_trait::async_trait;
use inkpad_parser::{lines_to_content, ContentTree};
use inkpad_workspace::{AutosaveConfig, AutosaveController, AutosaveState, CommitError, NoteCommitter};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::{sleep, Instant};

#[derive(Debug, Clone)]
struct Commit {
    note_id: String,
    tree: ContentTree,
    at: Instant,
}

/// Records every commit attempt; optionally slow or failing
#[derive(Default)]
struct Recorder {
    attempts: Mutex<Vec<Commit>>,
    latency: Duration,
    fail: bool,
}

impl Recorder {
    fn slow(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn attempts(&self) -> Vec<Commit> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl NoteCommitter for Recorder {
    async fn commit(&self, note_id: &str, tree: ContentTree) -> Result<(), CommitError> {
        self.attempts.lock().unwrap().push(Commit {
            note_id: note_id.to_string(),
            tree,
            at: Instant::now(),
        });
        if !self.latency.is_zero() {
            sleep(self.latency).await;
        }
        if self.fail {
            return Err(CommitError::Failed("disk full".into()));
        }
        Ok(())
    }
}

fn edit(n: usize) -> ContentTree {
    lines_to_content(&format!("edit {n}"))
}

fn controller(config: AutosaveConfig, recorder: &Arc<Recorder>) -> AutosaveController {
    AutosaveController::new(config, recorder.clone())
}

#[tokio::test(start_paused = true)]
async fn test_rapid_edits_commit_once_after_the_last() {
    let recorder = Arc::new(Recorder::default());
    let autosave = controller(AutosaveConfig::default(), &recorder);
    autosave.bind(Some("note-1"));

    let mut last_edit = Instant::now();
    for n in 0..5 {
        if n > 0 {
            sleep(Duration::from_millis(500)).await;
        }
        last_edit = Instant::now();
        autosave.notify_change(edit(n));
        assert_eq!(autosave.state(), AutosaveState::Pending);
    }

    sleep(Duration::from_secs(10)).await;
    let attempts = recorder.attempts();
    assert_eq!(attempts.len(), 1);
    assert!(attempts[0].at >= last_edit + Duration::from_millis(2000));
    assert_eq!(attempts[0].note_id, "note-1");
    assert_eq!(attempts[0].tree, edit(4));
    assert_eq!(autosave.state(), AutosaveState::Idle);
    assert_eq!(autosave.commit_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_rebinding_cancels_pending_commit() {
    let recorder = Arc::new(Recorder::default());
    let autosave = controller(AutosaveConfig::default(), &recorder);

    autosave.bind(Some("note-a"));
    autosave.notify_change(edit(0));
    sleep(Duration::from_millis(500)).await;
    autosave.notify_change(edit(1));
    sleep(Duration::from_millis(500)).await;

    autosave.bind(Some("note-b"));
    assert_eq!(autosave.state(), AutosaveState::Idle);
    sleep(Duration::from_millis(500)).await;
    autosave.notify_change(edit(2));

    sleep(Duration::from_secs(10)).await;
    let attempts = recorder.attempts();
    assert!(attempts.iter().all(|commit| commit.note_id != "note-a"));
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].note_id, "note-b");
    assert_eq!(attempts[0].tree, edit(2));
}

#[tokio::test(start_paused = true)]
async fn test_failed_commit_is_not_retried() {
    let recorder = Arc::new(Recorder::failing());
    let autosave = controller(AutosaveConfig::default(), &recorder);
    autosave.bind(Some("note-1"));

    autosave.notify_change(edit(0));
    sleep(Duration::from_secs(30)).await;
    assert_eq!(recorder.attempts().len(), 1);
    assert_eq!(autosave.state(), AutosaveState::Idle);
    assert_eq!(autosave.commit_count(), 0);

    // The next edit starts a new window
    autosave.notify_change(edit(1));
    sleep(Duration::from_secs(3)).await;
    assert_eq!(recorder.attempts().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_fire_too_soon_after_commit_is_dropped() {
    let recorder = Arc::new(Recorder::default());
    let config = AutosaveConfig {
        delay_ms: 100,
        min_spacing_ms: 1000,
    };
    let autosave = controller(config, &recorder);
    autosave.bind(Some("note-1"));

    autosave.notify_change(edit(0));
    sleep(Duration::from_millis(150)).await;
    assert_eq!(recorder.attempts().len(), 1);

    // Fires 100ms later, well inside the spacing window
    autosave.notify_change(edit(1));
    sleep(Duration::from_secs(3)).await;
    assert_eq!(recorder.attempts().len(), 1);
    assert_eq!(autosave.state(), AutosaveState::Idle);

    autosave.notify_change(edit(2));
    sleep(Duration::from_millis(150)).await;
    let attempts = recorder.attempts();
    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts[1].tree, edit(2));
}

#[tokio::test(start_paused = true)]
async fn test_fire_during_slow_commit_is_dropped() {
    let recorder = Arc::new(Recorder::slow(Duration::from_secs(5)));
    let autosave = controller(AutosaveConfig::default(), &recorder);
    autosave.bind(Some("note-1"));

    autosave.notify_change(edit(0));
    sleep(Duration::from_millis(2500)).await;
    assert_eq!(autosave.state(), AutosaveState::Saving);

    // Scheduled while saving; its timer fires before the commit completes
    autosave.notify_change(edit(1));
    sleep(Duration::from_secs(10)).await;

    assert_eq!(recorder.attempts().len(), 1);
    assert_eq!(autosave.commit_count(), 1);
    assert_eq!(autosave.state(), AutosaveState::Idle);
}
