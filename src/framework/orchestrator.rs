//! # Submission Run
//!
//! The forward-only workflow behind every submission:
//!
//! ```text
//! Idle -> Creating -> (Uploading -> Patching)? -> Done | Failed
//! ```
//!
//! - A failure while `Creating` is a full failure: nothing was stored.
//! - A failure while `Uploading` or `Patching` is a partial success: the
//!   resource exists without its asset, and the failure carries its id.
//! - Nothing is retried or rolled back.
//!
//! A [`ProgressState`] is published before each working state. The total is
//! fixed when the run starts (1 without an asset, 3 with one).

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::framework::{Collaborators, RunFailure, StepError};
use crate::model::{AssetReference, DraftResource, ProgressState, RunStep};

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Creating,
    Uploading,
    Patching,
    Done,
    Failed,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Done | RunState::Failed)
    }
}

impl From<RunStep> for RunState {
    fn from(step: RunStep) -> Self {
        match step {
            RunStep::Creating => RunState::Creating,
            RunStep::Uploading => RunState::Uploading,
            RunStep::Patching => RunState::Patching,
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Idle => "idle",
            RunState::Creating => "creating",
            RunState::Uploading => "uploading",
            RunState::Patching => "patching",
            RunState::Done => "done",
            RunState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Terminal result of one run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Done {
        resource_id: String,
        asset: Option<AssetReference>,
    },
    Failed(RunFailure),
}

impl RunOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self, RunOutcome::Done { .. })
    }

    pub fn resource_id(&self) -> Option<&str> {
        match self {
            RunOutcome::Done { resource_id, .. } => Some(resource_id),
            RunOutcome::Failed(failure) => failure.resource_id(),
        }
    }

    pub fn failure(&self) -> Option<&RunFailure> {
        match self {
            RunOutcome::Done { .. } => None,
            RunOutcome::Failed(failure) => Some(failure),
        }
    }

    pub fn state(&self) -> RunState {
        match self {
            RunOutcome::Done { .. } => RunState::Done,
            RunOutcome::Failed(_) => RunState::Failed,
        }
    }
}

/// Messages delivered to the holder of a [`RunHandle`](crate::framework::RunHandle).
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    Progress(ProgressState),
    Finished(RunOutcome),
}

/// Owns the progress counter of a single run.
///
/// The step index only moves forward, one at a time, and never past the
/// total fixed at construction.
#[derive(Debug)]
pub struct ProgressTracker {
    total: u8,
    step: u8,
    state: RunState,
}

impl ProgressTracker {
    pub fn for_draft(draft: &DraftResource) -> Self {
        Self::new(if draft.has_asset() { 3 } else { 1 })
    }

    pub fn new(total: u8) -> Self {
        Self {
            total,
            step: 0,
            state: RunState::Idle,
        }
    }

    pub fn total(&self) -> u8 {
        self.total
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Moves into `next` and returns the snapshot to publish, or `None`
    /// once the run has used up its steps or already terminated.
    pub fn advance(&mut self, next: RunStep) -> Option<ProgressState> {
        if self.state.is_terminal() || self.step >= self.total {
            return None;
        }
        self.step += 1;
        self.state = next.into();
        Some(ProgressState {
            step: self.step,
            total: self.total,
            current: next,
            label: next.label(),
        })
    }

    pub fn finish(&mut self, outcome: &RunOutcome) {
        self.state = outcome.state();
    }
}

/// Drives one draft through the collaborators, publishing progress on
/// `events`. Returns the terminal outcome without publishing it; the caller
/// decides when the run stops counting as active.
///
/// Progress sends ignore a closed channel: a dropped handle does not cancel
/// the run.
pub async fn execute_run(
    draft: DraftResource,
    collaborators: &Collaborators,
    events: &mpsc::Sender<RunEvent>,
) -> RunOutcome {
    let mut tracker = ProgressTracker::for_draft(&draft);
    let outcome = drive(draft, collaborators, events, &mut tracker).await;
    tracker.finish(&outcome);
    match &outcome {
        RunOutcome::Done { resource_id, asset } => {
            info!(%resource_id, with_asset = asset.is_some(), "Run done");
        }
        RunOutcome::Failed(failure) => {
            warn!(
                resource_id = failure.resource_id().unwrap_or(""),
                partial = failure.is_partial(),
                error = %failure.error(),
                "Run failed"
            );
        }
    }
    outcome
}

async fn drive(
    draft: DraftResource,
    collaborators: &Collaborators,
    events: &mpsc::Sender<RunEvent>,
    tracker: &mut ProgressTracker,
) -> RunOutcome {
    let (fields, asset) = draft.into_parts();

    publish(events, tracker, RunStep::Creating).await;
    debug!(?fields, "Creating resource");
    let resource_id = match collaborators.creator.create_resource(fields).await {
        Ok(outcome) => match outcome.valid_id().map(str::to_string) {
            Some(id) => id,
            None if !outcome.field_errors.is_empty() => {
                return full_failure(StepError::validation(outcome.field_errors));
            }
            None => {
                return full_failure(StepError::transport(
                    "malformed response: created resource has no identifier",
                ));
            }
        },
        Err(error) => return full_failure(error),
    };
    info!(%resource_id, "Resource created");

    let Some(asset) = asset else {
        return RunOutcome::Done {
            resource_id,
            asset: None,
        };
    };

    publish(events, tracker, RunStep::Uploading).await;
    debug!(%resource_id, ?asset, "Uploading asset");
    let reference = match collaborators.uploader.upload_asset(asset).await {
        Ok(reference) => reference,
        Err(error) => return partial(resource_id, RunStep::Uploading, error),
    };
    info!(%resource_id, url = %reference.url, "Asset uploaded");

    publish(events, tracker, RunStep::Patching).await;
    if let Err(error) = collaborators
        .patcher
        .patch_resource(&resource_id, &reference.url)
        .await
    {
        return partial(resource_id, RunStep::Patching, error);
    }
    info!(%resource_id, "Resource patched");

    RunOutcome::Done {
        resource_id,
        asset: Some(reference),
    }
}

async fn publish(events: &mpsc::Sender<RunEvent>, tracker: &mut ProgressTracker, step: RunStep) {
    if let Some(progress) = tracker.advance(step) {
        info!(step = progress.step, total = progress.total, current = %step, "Progress");
        let _ = events.send(RunEvent::Progress(progress)).await;
    }
}

fn full_failure(error: StepError) -> RunOutcome {
    RunOutcome::Failed(RunFailure::FullFailure { error })
}

fn partial(resource_id: String, step: RunStep, error: StepError) -> RunOutcome {
    RunOutcome::Failed(RunFailure::PartialSuccess {
        resource_id,
        step,
        error,
    })
}
