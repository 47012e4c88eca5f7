//! # CMS Submission
//!
//! > **Create a blog post, upload its featured image, attach the image.**
//!
//! This crate drives the admin panel's post submission against a CMS REST
//! backend. The workflow is three dependent steps where each one needs the
//! previous result:
//!
//! ```text
//! Idle -> Creating -> (Uploading -> Patching)? -> Done | Failed
//! ```
//!
//! ## 🏗️ Design
//!
//! ### A run is an actor message
//! [`SubmissionActor`](framework::SubmissionActor) is a Tokio task that takes
//! one `StartRun` at a time. Callers hold a cloneable
//! [`SubmissionClient`](framework::SubmissionClient) and get a
//! [`RunHandle`](framework::RunHandle) streaming progress and the final
//! [`RunOutcome`](framework::RunOutcome). A second start while a run is in
//! flight is rejected with `RunAlreadyActive`.
//!
//! ### Partial success is a value
//! Once the post exists, a failed upload or patch does not roll it back. The
//! run ends in [`RunFailure::PartialSuccess`](framework::RunFailure) carrying
//! the post id, so the caller can retry the image with
//! [`BlogClient::upload_images`](clients::BlogClient::upload_images) and
//! [`BlogClient::set_featured_image`](clients::BlogClient::set_featured_image).
//!
//! ### Collaborators are injected
//! The three steps sit behind [`ResourceCreator`](framework::ResourceCreator),
//! [`AssetUploader`](framework::AssetUploader) and
//! [`ResourcePatcher`](framework::ResourcePatcher). They are passed to
//! `run()`, so the same actor runs against HTTP in production and against
//! [`MockBackend`](framework::mock::MockBackend) in tests.
//!
//! ## 🗺️ Module Tour
//!
//! - [`framework`]: the actor, its client, the run state machine, the mock.
//! - [`clients`]: typed REST clients (admin blog, public blog, dashboard, leads).
//! - [`model`]: drafts, outcomes, progress, and backend resources.
//! - [`validation`]: lead form checks.
//! - [`lifecycle`]: config, tracing, and [`SubmissionSystem`](lifecycle::SubmissionSystem).
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! CMS_API_URL=http://localhost:5000 CMS_AUTH_TOKEN=... \
//!     RUST_LOG=info cargo run -- draft.json cover.jpg
//! ```

pub mod clients;
pub mod framework;
pub mod lifecycle;
pub mod model;
pub mod validation;
