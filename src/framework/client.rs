use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, warn};

use crate::framework::actor::SubmissionRequest;
use crate::framework::orchestrator::{RunEvent, RunOutcome};
use crate::framework::SubmissionError;
use crate::model::{DraftResource, ProgressState};

/// Most events a single run can emit: one progress update per step plus the
/// terminal outcome. A run channel at least this large never blocks the
/// actor, whether or not anyone reads it.
pub const MAX_EVENTS_PER_RUN: usize = 4;

/// Cloneable handle for starting runs on a [`SubmissionActor`](crate::framework::SubmissionActor).
#[derive(Clone)]
pub struct SubmissionClient {
    /// Channel to send requests to the actor.
    sender: mpsc::Sender<SubmissionRequest>,
    /// Set while a run is in flight. Shared with the actor, which clears it.
    active: Arc<AtomicBool>,
    /// Source of run ids, shared by every clone.
    next_run: Arc<AtomicU64>,
    /// Size of each run's event channel, never below [`MAX_EVENTS_PER_RUN`].
    event_capacity: usize,
}

impl SubmissionClient {
    pub fn new(
        sender: mpsc::Sender<SubmissionRequest>,
        active: Arc<AtomicBool>,
        event_capacity: usize,
    ) -> Self {
        Self {
            sender,
            active,
            next_run: Arc::new(AtomicU64::new(1)),
            event_capacity: event_capacity.max(MAX_EVENTS_PER_RUN),
        }
    }

    /// Starts a run for `draft`.
    ///
    /// Fails with [`SubmissionError::RunAlreadyActive`] while another run on
    /// the same actor has not yet published its terminal event. The draft is
    /// consumed either way.
    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn start_run(&self, draft: DraftResource) -> Result<RunHandle, SubmissionError> {
        if self
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("Rejected start while a run is active");
            return Err(SubmissionError::RunAlreadyActive);
        }

        let run_id = self.next_run.fetch_add(1, Ordering::SeqCst);
        let (events, receiver) = mpsc::channel(self.event_capacity);
        let (respond_to, response) = oneshot::channel();
        info!(run_id, "Sending start_run to actor");

        let sent = self
            .sender
            .send(SubmissionRequest::StartRun {
                run_id,
                draft,
                events,
                respond_to,
            })
            .await;
        if sent.is_err() {
            self.active.store(false, Ordering::SeqCst);
            return Err(SubmissionError::ActorClosed);
        }
        match response.await {
            Ok(result) => result?,
            Err(_) => {
                self.active.store(false, Ordering::SeqCst);
                return Err(SubmissionError::ActorDropped);
            }
        }

        debug!(run_id, "Run accepted");
        Ok(RunHandle { run_id, receiver })
    }

    /// Upper bound on buffered events per run.
    pub fn event_capacity(&self) -> usize {
        self.event_capacity
    }

    /// True from a successful `start_run` until its terminal event is sent.
    pub fn is_run_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

/// Receiving end of one run's progress stream.
///
/// Dropping the handle does not stop the run.
#[derive(Debug)]
pub struct RunHandle {
    /// Id assigned by the client that started the run.
    run_id: u64,
    /// Progress updates followed by exactly one terminal outcome.
    receiver: mpsc::Receiver<RunEvent>,
}

impl RunHandle {
    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    /// Next event, or `None` once the terminal event has been consumed.
    pub async fn recv(&mut self) -> Option<RunEvent> {
        self.receiver.recv().await
    }

    /// Waits for the terminal outcome, skipping progress updates.
    pub async fn finish(self) -> Result<RunOutcome, SubmissionError> {
        self.finish_with_progress().await.map(|(_, outcome)| outcome)
    }

    /// Waits for the terminal outcome and returns every progress update
    /// seen along the way, in order.
    pub async fn finish_with_progress(
        mut self,
    ) -> Result<(Vec<ProgressState>, RunOutcome), SubmissionError> {
        let mut progress = Vec::new();
        while let Some(event) = self.receiver.recv().await {
            match event {
                RunEvent::Progress(state) => progress.push(state),
                RunEvent::Finished(outcome) => return Ok((progress, outcome)),
            }
        }
        Err(SubmissionError::ActorDropped)
    }
}
