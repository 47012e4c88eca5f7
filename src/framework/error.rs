use std::fmt;

use crate::model::{FieldError, RunStep};

/// Shown for transport failures in place of the raw cause.
pub const GENERIC_TRANSPORT_MESSAGE: &str =
    "Could not reach the server. Please try again later.";

/// Failure of a single collaborator step.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum StepError {
    #[error("validation failed: {}", join_fields(.fields))]
    Validation { fields: Vec<FieldError> },
    #[error("upload failed: {message}")]
    Upload { message: String },
    #[error("transport error: {message}")]
    Transport { message: String },
}

impl StepError {
    pub fn validation(fields: Vec<FieldError>) -> Self {
        StepError::Validation { fields }
    }

    pub fn upload(message: impl Into<String>) -> Self {
        StepError::Upload {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        StepError::Transport {
            message: message.into(),
        }
    }

    /// Text fit for the person at the keyboard. Field errors and upload
    /// messages pass through; transport causes stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            StepError::Validation { fields } => join_fields(fields),
            StepError::Upload { message } => message.clone(),
            StepError::Transport { .. } => GENERIC_TRANSPORT_MESSAGE.to_string(),
        }
    }

    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            StepError::Validation { fields } => fields,
            _ => &[],
        }
    }
}

fn join_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Why a run ended in `Failed`.
#[derive(Debug, Clone, PartialEq)]
pub enum RunFailure {
    /// Step 1 failed; nothing exists on the backend.
    FullFailure { error: StepError },
    /// The resource was created but the asset step did not complete.
    PartialSuccess {
        resource_id: String,
        step: RunStep,
        error: StepError,
    },
}

impl RunFailure {
    pub fn error(&self) -> &StepError {
        match self {
            RunFailure::FullFailure { error } | RunFailure::PartialSuccess { error, .. } => error,
        }
    }

    /// Identifier of the resource left behind, if any.
    pub fn resource_id(&self) -> Option<&str> {
        match self {
            RunFailure::FullFailure { .. } => None,
            RunFailure::PartialSuccess { resource_id, .. } => Some(resource_id),
        }
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, RunFailure::PartialSuccess { .. })
    }
}

impl fmt::Display for RunFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunFailure::FullFailure { error } => write!(f, "submission failed: {error}"),
            RunFailure::PartialSuccess {
                resource_id,
                step,
                error,
            } => write!(
                f,
                "post {resource_id} was saved but the featured image failed while {step}: {error}"
            ),
        }
    }
}

/// Errors raised by the actor plumbing rather than by a step.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("A submission is already in progress")]
    RunAlreadyActive,
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
}
