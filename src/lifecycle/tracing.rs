//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter whose
//! level comes from `RUST_LOG`.
//!
//! ```bash
//! # Run transitions and HTTP outcomes
//! RUST_LOG=info cargo run -- draft.json
//!
//! # Full payloads (fields sent, files attached)
//! RUST_LOG=debug cargo run -- draft.json cover.jpg
//!
//! # Only the workflow engine
//! RUST_LOG=cms_submission::framework=debug cargo run -- draft.json
//! ```
//!
//! ## What Gets Traced
//!
//! - **Actor lifecycle**: start, shutdown, and how many runs completed
//! - **Run transitions**: each progress step with `step` / `total`, the
//!   created `resource_id`, and the terminal outcome
//! - **HTTP calls**: one span per client method, response status, rejections
//!
//! A run with an image at `RUST_LOG=info`:
//!
//! ```text
//! INFO start_run: Sending start_run to actor title=Buying in Ikoyi
//! INFO submission_run: Progress step=1 total=3 current=creating
//! INFO submission_run:create_post: Post created post_id=665f1c...
//! INFO submission_run: Resource created resource_id=665f1c...
//! INFO submission_run: Progress step=2 total=3 current=uploading
//! INFO submission_run:upload_images: Images uploaded uploaded=1
//! INFO submission_run: Progress step=3 total=3 current=patching
//! INFO submission_run: Run done resource_id=665f1c... with_asset=true
//! ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
