//! Submission workflow engine.
//!
//! # Main Components
//!
//! - [`SubmissionActor`] - Tokio task that executes runs one at a time
//! - [`SubmissionClient`] - Cloneable handle for starting runs
//! - [`RunHandle`] - Progress stream and terminal outcome of one run
//! - [`ResourceCreator`], [`AssetUploader`], [`ResourcePatcher`] - the backend seams
//! - [`StepError`], [`RunFailure`], [`SubmissionError`] - error types
//!
//! # Testing
//!
//! See the [`mock`] module for a scripted backend.

pub mod actor;
pub mod client;
pub mod collaborators;
pub mod error;
pub mod mock;
pub mod orchestrator;

pub use actor::*;
pub use client::*;
pub use collaborators::*;
pub use error::*;
pub use orchestrator::*;
