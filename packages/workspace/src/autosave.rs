//! # Autosave Controller
//!
//! Trailing-debounce commits of the open note.
//!
//! ```text
//!        notify_change            timer fires            commit done
//! Idle ────────────────▶ Pending ─────────────▶ Saving ─────────────▶ Idle
//!                  ▲        │
//!                  └────────┘ notify_change (reschedule)
//! ```
//!
//! Every change cancels the scheduled commit and schedules a new one `delay`
//! later. When the timer fires the commit goes ahead only if `min_spacing`
//! has passed since the last completed commit and no commit is in flight;
//! otherwise the fire is dropped and the next change starts a new window.
//! Failed commits are logged and not retried.
//!
//! Timers are tokio tasks. Each schedule carries a generation number;
//! rebinding or rescheduling bumps it and aborts the old task, so a stale
//! timer can never commit.

use crate::error::CommitError;
use async_trait::async_trait;
use inkpad_parser::ContentTree;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutosaveConfig {
    /// Quiet period after the last change before committing
    pub delay_ms: u64,
    /// Minimum time between two completed commits
    pub min_spacing_ms: u64,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            delay_ms: 2000,
            min_spacing_ms: 1000,
        }
    }
}

impl AutosaveConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn min_spacing(&self) -> Duration {
        Duration::from_millis(self.min_spacing_ms)
    }
}

/// Where committed notes go
#[async_trait]
pub trait NoteCommitter: Send + Sync {
    async fn commit(&self, note_id: &str, tree: ContentTree) -> Result<(), CommitError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutosaveState {
    Idle,
    Pending,
    Saving,
}

#[derive(Debug, Default)]
struct Inner {
    note_id: Option<String>,
    latest: Option<ContentTree>,
    generation: u64,
    timer: Option<JoinHandle<()>>,
    saving: bool,
    last_commit: Option<Instant>,
    commits: usize,
}

impl Inner {
    fn cancel_timer(&mut self) {
        self.generation += 1;
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

pub struct AutosaveController {
    config: AutosaveConfig,
    committer: Arc<dyn NoteCommitter>,
    inner: Arc<Mutex<Inner>>,
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

impl AutosaveController {
    pub fn new(config: AutosaveConfig, committer: Arc<dyn NoteCommitter>) -> Self {
        Self {
            config,
            committer,
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    pub fn config(&self) -> &AutosaveConfig {
        &self.config
    }

    /// Switch to another note. Any commit scheduled for the previous note is
    /// cancelled before this returns.
    pub fn bind(&self, note_id: Option<&str>) {
        let mut inner = lock(&self.inner);
        inner.cancel_timer();
        inner.latest = None;
        inner.note_id = note_id.map(str::to_string);
        debug!(note_id = ?note_id, "Autosave bound");
    }

    pub fn bound_note(&self) -> Option<String> {
        lock(&self.inner).note_id.clone()
    }

    /// Record a changed tree and restart the debounce window.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn notify_change(&self, tree: ContentTree) {
        let mut inner = lock(&self.inner);
        if inner.note_id.is_none() {
            return;
        }
        inner.cancel_timer();
        inner.latest = Some(tree);

        let generation = inner.generation;
        let delay = self.config.delay();
        let task = FireTask {
            inner: Arc::clone(&self.inner),
            committer: Arc::clone(&self.committer),
            min_spacing: self.config.min_spacing(),
            generation,
        };
        inner.timer = Some(tokio::spawn(async move {
            sleep(delay).await;
            task.fire().await;
        }));
    }

    /// Commit `tree` right away, cancelling any scheduled commit
    pub async fn save_now(&self, tree: ContentTree) -> Result<(), CommitError> {
        let note_id = {
            let mut inner = lock(&self.inner);
            let note_id = inner.note_id.clone().ok_or(CommitError::NotBound)?;
            if inner.saving {
                return Err(CommitError::InFlight);
            }
            inner.cancel_timer();
            inner.saving = true;
            note_id
        };

        let result = commit(self.committer.as_ref(), &note_id, tree).await;
        finish(&self.inner, &result);
        result
    }

    pub fn state(&self) -> AutosaveState {
        let inner = lock(&self.inner);
        if inner.saving {
            AutosaveState::Saving
        } else if inner.timer.is_some() {
            AutosaveState::Pending
        } else {
            AutosaveState::Idle
        }
    }

    /// Successful commits so far
    pub fn commit_count(&self) -> usize {
        lock(&self.inner).commits
    }
}

impl Drop for AutosaveController {
    fn drop(&mut self) {
        lock(&self.inner).cancel_timer();
    }
}

struct FireTask {
    inner: Arc<Mutex<Inner>>,
    committer: Arc<dyn NoteCommitter>,
    min_spacing: Duration,
    generation: u64,
}

impl FireTask {
    async fn fire(self) {
        let (note_id, tree) = {
            let mut inner = lock(&self.inner);
            if inner.generation != self.generation {
                return;
            }
            // From here on the commit must not be aborted by a reschedule
            inner.timer = None;

            if inner.saving {
                debug!("Commit still in flight, dropping autosave");
                return;
            }
            let since_last = inner.last_commit.map(|last| last.elapsed());
            if since_last.is_some_and(|elapsed| elapsed < self.min_spacing) {
                debug!(?since_last, "Too soon after last commit, dropping autosave");
                return;
            }
            let (Some(note_id), Some(tree)) = (inner.note_id.clone(), inner.latest.clone()) else {
                return;
            };
            inner.saving = true;
            (note_id, tree)
        };

        let result = commit(self.committer.as_ref(), &note_id, tree).await;
        finish(&self.inner, &result);
    }
}

#[instrument(skip(committer, tree))]
async fn commit(
    committer: &dyn NoteCommitter,
    note_id: &str,
    tree: ContentTree,
) -> Result<(), CommitError> {
    let result = committer.commit(note_id, tree).await;
    match &result {
        Ok(()) => info!("Note saved"),
        Err(e) => warn!(error = %e, "Saving note failed"),
    }
    result
}

fn finish(inner: &Mutex<Inner>, result: &Result<(), CommitError>) {
    let mut inner = lock(inner);
    inner.saving = false;
    inner.last_commit = Some(Instant::now());
    if result.is_ok() {
        inner.commits += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        commits: Mutex<Vec<(String, Instant)>>,
    }

    #[async_trait]
    impl NoteCommitter for Recorder {
        async fn commit(&self, note_id: &str, _tree: ContentTree) -> Result<(), CommitError> {
            self.commits
                .lock()
                .unwrap()
                .push((note_id.to_string(), Instant::now()));
            Ok(())
        }
    }

    fn controller() -> (AutosaveController, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let controller = AutosaveController::new(AutosaveConfig::default(), recorder.clone());
        (controller, recorder)
    }

    #[test]
    fn test_config_defaults_and_wire_form() {
        let config: AutosaveConfig = serde_json::from_str(r#"{"delayMs": 500}"#).unwrap();
        assert_eq!(config.delay(), Duration::from_millis(500));
        assert_eq!(config.min_spacing_ms, 1000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbound_changes_are_ignored() {
        let (controller, recorder) = controller();
        controller.notify_change(ContentTree::with_empty_paragraph());
        assert_eq!(controller.state(), AutosaveState::Idle);

        sleep(Duration::from_secs(5)).await;
        assert!(recorder.commits.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_state_moves_through_pending() {
        let (controller, _recorder) = controller();
        controller.bind(Some("note-1"));
        controller.notify_change(ContentTree::with_empty_paragraph());
        assert_eq!(controller.state(), AutosaveState::Pending);

        sleep(Duration::from_millis(2500)).await;
        assert_eq!(controller.state(), AutosaveState::Idle);
        assert_eq!(controller.commit_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_now_cancels_pending_timer() {
        let (controller, recorder) = controller();
        controller.bind(Some("note-1"));
        controller.notify_change(ContentTree::with_empty_paragraph());

        controller
            .save_now(ContentTree::with_empty_paragraph())
            .await
            .unwrap();
        sleep(Duration::from_secs(5)).await;
        assert_eq!(recorder.commits.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_save_now_requires_binding() {
        let (controller, _recorder) = controller();
        assert_eq!(
            controller.save_now(ContentTree::new()).await,
            Err(CommitError::NotBound)
        );
    }
}
