use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, info_span, Instrument};

use crate::framework::orchestrator::{execute_run, RunEvent};
use crate::framework::{Collaborators, SubmissionClient, SubmissionError};
use crate::model::DraftResource;

/// Type alias for the one-shot response channel used by the actor.
pub type Response<T> = oneshot::Sender<Result<T, SubmissionError>>;

/// Messages accepted by [`SubmissionActor`].
#[derive(Debug)]
pub enum SubmissionRequest {
    StartRun {
        run_id: u64,
        draft: DraftResource,
        events: mpsc::Sender<RunEvent>,
        respond_to: Response<()>,
    },
}

/// Executes submission runs one after another.
///
/// The actor owns no per-run state between messages: everything a run needs
/// arrives with its request, and the collaborators are injected into
/// [`run`](Self::run). The only thing shared with clients is the active flag.
pub struct SubmissionActor {
    /// Channel to receive requests from clients.
    receiver: mpsc::Receiver<SubmissionRequest>,
    /// Run-active flag shared with every [`SubmissionClient`].
    active: Arc<AtomicBool>,
}

impl SubmissionActor {
    /// Creates the actor and its client. `event_capacity` sizes the
    /// per-run progress channel handed out by the client; values below
    /// [`MAX_EVENTS_PER_RUN`](crate::framework::MAX_EVENTS_PER_RUN) are
    /// raised to it so an unread handle cannot stall a run.
    pub fn new(buffer_size: usize, event_capacity: usize) -> (Self, SubmissionClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let active = Arc::new(AtomicBool::new(false));
        let actor = Self {
            receiver,
            active: active.clone(),
        };
        let client = SubmissionClient::new(sender, active, event_capacity);
        (actor, client)
    }

    /// Runs the event loop until every client is dropped.
    pub async fn run(mut self, context: Collaborators) {
        info!("Submission actor started");
        let mut completed = 0u64;

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                SubmissionRequest::StartRun {
                    run_id,
                    draft,
                    events,
                    respond_to,
                } => {
                    debug!(run_id, title = %draft.title, with_asset = draft.has_asset(), "StartRun");
                    let _ = respond_to.send(Ok(()));

                    let outcome = execute_run(draft, &context, &events)
                        .instrument(info_span!("submission_run", run_id))
                        .await;

                    // Observers woken by the terminal event must already see
                    // the orchestrator as idle.
                    self.active.store(false, Ordering::SeqCst);
                    let _ = events.send(RunEvent::Finished(outcome)).await;
                    completed += 1;
                }
            }
        }

        self.active.store(false, Ordering::SeqCst);
        info!(completed, "Shutdown");
    }
}
