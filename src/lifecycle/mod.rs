//! Runtime wiring: configuration, tracing, and the [`SubmissionSystem`]
//! that starts and stops the actor.

pub mod config;
pub mod submission_system;
pub mod tracing;

pub use config::*;
pub use submission_system::*;
pub use self::tracing::*;
