use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::draft::{ApplicationDraft, SectionUpdate};
use super::state::{IntakeState, SubmissionError};
use super::store::DraftStore;

/// Shared intake state that publishes a revision on every mutation.
pub struct IntakeSession<S> {
    state: Arc<Mutex<IntakeState<S>>>,
    revisions: watch::Sender<u64>,
}

impl<S> IntakeSession<S>
where
    S: DraftStore + 'static,
{
    pub fn new(state: IntakeState<S>) -> Self {
        let (revisions, _) = watch::channel(state.revision());
        Self {
            state: Arc::new(Mutex::new(state)),
            revisions,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, IntakeState<S>> {
        self.state.lock().expect("intake state mutex poisoned")
    }

    pub fn update_section(&self, update: SectionUpdate) {
        let revision = {
            let mut state = self.lock();
            state.update_section(update);
            state.revision()
        };
        self.revisions.send_replace(revision);
    }

    pub fn clear(&self) {
        let revision = {
            let mut state = self.lock();
            state.clear();
            state.revision()
        };
        self.revisions.send_replace(revision);
    }

    pub fn persist(&self) {
        self.lock().persist();
    }

    pub fn snapshot(&self) -> ApplicationDraft {
        self.lock().draft().clone()
    }

    pub fn is_dirty(&self) -> bool {
        self.lock().is_dirty()
    }

    pub fn submit<T, E, F>(&self, submitter: F) -> Result<T, SubmissionError<E>>
    where
        E: std::fmt::Display,
        F: FnOnce(&ApplicationDraft) -> Result<T, E>,
    {
        let (result, revision) = {
            let mut state = self.lock();
            let result = state.submit(submitter);
            (result, state.revision())
        };
        self.revisions.send_replace(revision);
        result
    }

    /// Persists the draft once `quiet` passes without a further change.
    ///
    /// The task ends when the session is dropped, flushing any pending edit first.
    pub fn spawn_autosave(&self, quiet: Duration) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        let revisions = self.revisions.subscribe();
        tokio::spawn(autosave_loop(state, revisions, quiet))
    }
}

async fn autosave_loop<S: DraftStore + 'static>(
    state: Arc<Mutex<IntakeState<S>>>,
    mut revisions: watch::Receiver<u64>,
    quiet: Duration,
) {
    while revisions.changed().await.is_ok() {
        loop {
            match tokio::time::timeout(quiet, revisions.changed()).await {
                Ok(Ok(())) => continue,
                Ok(Err(_)) => {
                    flush(&state).await;
                    return;
                }
                Err(_) => break,
            }
        }
        flush(&state).await;
    }
    debug!("intake session closed; autosave stopped");
}

/// Store writes are blocking I/O under the state lock, so they run on the blocking pool.
async fn flush<S: DraftStore + 'static>(state: &Arc<Mutex<IntakeState<S>>>) {
    let state = Arc::clone(state);
    if let Err(err) = tokio::task::spawn_blocking(move || persist_pending(&state)).await {
        warn!(error = %err, "autosave flush did not complete");
    }
}

fn persist_pending<S: DraftStore>(state: &Mutex<IntakeState<S>>) {
    let mut state = state.lock().expect("intake state mutex poisoned");
    if state.persist_if_dirty() {
        debug!(revision = state.revision(), "autosaved draft");
    }
}
