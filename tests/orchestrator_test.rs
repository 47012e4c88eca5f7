use std::time::Duration;

use cms_submission::framework::mock::{Call, Gate, MockBackend};
use cms_submission::framework::{
    RunFailure, RunOutcome, StepError, SubmissionActor, SubmissionClient, SubmissionError,
    MAX_EVENTS_PER_RUN,
};
use cms_submission::model::{DraftResource, FieldError, LocalAsset, RunStep, SubmissionOutcome};

/// Real actor, scripted backend.
fn start(mock: &MockBackend) -> (SubmissionClient, tokio::task::JoinHandle<()>) {
    let (actor, client) = SubmissionActor::new(8, 16);
    let handle = tokio::spawn(actor.run(mock.collaborators()));
    (client, handle)
}

fn draft() -> DraftResource {
    DraftResource::new("Buying in Ikoyi", "What to check before you sign.")
        .with_excerpt("A checklist")
        .with_category("cat_1")
}

fn draft_with_image() -> DraftResource {
    draft().with_asset(LocalAsset::new("cover.jpg", "image/jpeg", vec![7u8; 64]))
}

async fn wait_until_idle(client: &SubmissionClient) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while client.is_run_active() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("run did not finish");
}

#[tokio::test]
async fn test_run_without_asset_has_single_step() {
    let mock = MockBackend::new();
    mock.expect_create().return_ok("post_123");
    let (client, actor) = start(&mock);

    let handle = client.start_run(draft()).await.unwrap();
    let (progress, outcome) = handle.finish_with_progress().await.unwrap();

    assert_eq!(progress.len(), 1);
    assert_eq!((progress[0].step, progress[0].total), (1, 1));
    assert_eq!(progress[0].current, RunStep::Creating);
    assert_eq!(
        outcome,
        RunOutcome::Done {
            resource_id: "post_123".into(),
            asset: None
        }
    );
    assert_eq!(mock.upload_calls(), 0);
    assert_eq!(mock.patch_calls(), 0);
    mock.verify();

    drop(client);
    actor.await.unwrap();
}

#[tokio::test]
async fn test_run_without_asset_fails_fully_on_transport_error() {
    let mock = MockBackend::new();
    mock.expect_create()
        .return_err(StepError::transport("connection refused"));
    let (client, _actor) = start(&mock);

    let (progress, outcome) = client
        .start_run(draft())
        .await
        .unwrap()
        .finish_with_progress()
        .await
        .unwrap();

    assert_eq!(progress.len(), 1);
    let failure = outcome.failure().unwrap();
    assert!(!failure.is_partial());
    assert_eq!(
        failure.error().user_message(),
        "Could not reach the server. Please try again later."
    );
    mock.verify();
}

#[tokio::test]
async fn test_run_with_asset_reports_three_steps() {
    let mock = MockBackend::new();
    mock.expect_create().return_ok("post_123");
    mock.expect_upload().return_ok("https://cdn/x.jpg");
    mock.expect_patch().return_ok();
    let (client, _actor) = start(&mock);

    let (progress, outcome) = client
        .start_run(draft_with_image())
        .await
        .unwrap()
        .finish_with_progress()
        .await
        .unwrap();

    let steps: Vec<(u8, u8)> = progress.iter().map(|p| (p.step, p.total)).collect();
    assert_eq!(steps, vec![(1, 3), (2, 3), (3, 3)]);
    let labels: Vec<&str> = progress.iter().map(|p| p.label).collect();
    assert_eq!(
        labels,
        vec![
            "Creating blog post...",
            "Uploading featured image...",
            "Updating post with featured image..."
        ]
    );

    assert!(outcome.is_done());
    assert_eq!(outcome.resource_id(), Some("post_123"));
    match outcome {
        RunOutcome::Done { asset: Some(asset), .. } => assert_eq!(asset.url, "https://cdn/x.jpg"),
        other => panic!("unexpected outcome: {other:?}"),
    }

    let calls = mock.calls();
    assert!(matches!(&calls[0], Call::Create(fields) if fields.categories == vec!["cat_1".to_string()]));
    assert_eq!(
        calls[1],
        Call::Upload {
            filename: "cover.jpg".into(),
            len: 64
        }
    );
    assert_eq!(
        calls[2],
        Call::Patch {
            resource_id: "post_123".into(),
            asset_url: "https://cdn/x.jpg".into()
        }
    );
    mock.verify();
}

#[tokio::test]
async fn test_validation_failure_stops_before_upload() {
    let mock = MockBackend::new();
    mock.expect_create()
        .return_err(StepError::validation(vec![FieldError::new("title", "required")]));
    let (client, _actor) = start(&mock);

    let (progress, outcome) = client
        .start_run(draft_with_image())
        .await
        .unwrap()
        .finish_with_progress()
        .await
        .unwrap();

    assert_eq!(progress.len(), 1);
    assert_eq!(progress[0].total, 3);
    assert_eq!(
        outcome,
        RunOutcome::Failed(RunFailure::FullFailure {
            error: StepError::validation(vec![FieldError::new("title", "required")])
        })
    );
    assert_eq!(mock.upload_calls(), 0);
    assert_eq!(mock.patch_calls(), 0);
    mock.verify();
}

#[tokio::test]
async fn test_rejected_outcome_is_a_validation_failure() {
    let mock = MockBackend::new();
    mock.expect_create()
        .return_outcome(SubmissionOutcome::rejected(vec![FieldError::new("title", "required")]));
    let (client, _actor) = start(&mock);

    let outcome = client.start_run(draft_with_image()).await.unwrap().finish().await.unwrap();

    let failure = outcome.failure().unwrap();
    assert_eq!(failure.error().field_errors(), &[FieldError::new("title", "required")]);
    assert_eq!(mock.upload_calls(), 0);
}

#[tokio::test]
async fn test_blank_identifier_never_reaches_upload() {
    let mock = MockBackend::new();
    mock.expect_create().return_outcome(SubmissionOutcome::created(""));
    let (client, _actor) = start(&mock);

    let outcome = client.start_run(draft_with_image()).await.unwrap().finish().await.unwrap();

    match outcome {
        RunOutcome::Failed(RunFailure::FullFailure {
            error: StepError::Transport { message },
        }) => assert!(message.contains("malformed response")),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(mock.upload_calls(), 0);
    mock.verify();
}

#[tokio::test]
async fn test_upload_failure_is_partial_success() {
    let mock = MockBackend::new();
    mock.expect_create().return_ok("post_123");
    mock.expect_upload().return_err(StepError::upload("file too large"));
    let (client, _actor) = start(&mock);

    let (progress, outcome) = client
        .start_run(draft_with_image())
        .await
        .unwrap()
        .finish_with_progress()
        .await
        .unwrap();

    assert_eq!(progress.len(), 2);
    assert_eq!(
        outcome,
        RunOutcome::Failed(RunFailure::PartialSuccess {
            resource_id: "post_123".into(),
            step: RunStep::Uploading,
            error: StepError::upload("file too large"),
        })
    );
    assert_eq!(outcome.resource_id(), Some("post_123"));
    assert_eq!(mock.patch_calls(), 0);
    mock.verify();
}

#[tokio::test]
async fn test_patch_failure_is_partial_success() {
    let mock = MockBackend::new();
    mock.expect_create().return_ok("post_123");
    mock.expect_upload().return_ok("https://cdn/x.jpg");
    mock.expect_patch()
        .return_err(StepError::transport("502 Bad Gateway"));
    let (client, _actor) = start(&mock);

    let (progress, outcome) = client
        .start_run(draft_with_image())
        .await
        .unwrap()
        .finish_with_progress()
        .await
        .unwrap();

    assert_eq!(progress.len(), 3);
    match outcome {
        RunOutcome::Failed(RunFailure::PartialSuccess {
            resource_id, step, ..
        }) => {
            assert_eq!(resource_id, "post_123");
            assert_eq!(step, RunStep::Patching);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    mock.verify();
}

#[tokio::test]
async fn test_finished_run_accepts_a_fresh_draft() {
    let mock = MockBackend::new();
    mock.expect_create().return_ok("post_1");
    mock.expect_create().return_ok("post_2");
    mock.expect_upload().return_ok("https://cdn/two.jpg");
    mock.expect_patch().return_ok();
    let (client, _actor) = start(&mock);

    let first = client.start_run(draft()).await.unwrap();
    let first_id = first.run_id();
    assert_eq!(first.finish().await.unwrap().resource_id(), Some("post_1"));
    assert!(!client.is_run_active());

    let second = client.start_run(draft_with_image()).await.unwrap();
    assert_ne!(second.run_id(), first_id);
    let (progress, outcome) = second.finish_with_progress().await.unwrap();
    assert_eq!(progress[0].step, 1);
    assert_eq!(progress[0].total, 3);
    assert_eq!(outcome.resource_id(), Some("post_2"));
    mock.verify();
}

#[tokio::test]
async fn test_run_active_flag_and_concurrent_start() {
    let mock = MockBackend::new();
    let gate = Gate::new();
    mock.expect_create().gated(&gate).return_ok("post_123");
    let (client, _actor) = start(&mock);

    assert!(!client.is_run_active());
    let handle = client.start_run(draft()).await.unwrap();
    assert!(client.is_run_active());

    gate.entered().await;
    assert!(client.is_run_active());

    let other = client.clone();
    assert_eq!(
        other.start_run(draft()).await.unwrap_err(),
        SubmissionError::RunAlreadyActive
    );

    gate.release();
    let outcome = handle.finish().await.unwrap();
    assert!(outcome.is_done());
    // Cleared before the terminal event went out.
    assert!(!client.is_run_active());
    mock.verify();
}

#[tokio::test]
async fn test_dropped_handle_does_not_cancel_run() {
    let mock = MockBackend::new();
    let gate = Gate::new();
    mock.expect_create().gated(&gate).return_ok("post_123");
    mock.expect_upload().return_ok("https://cdn/x.jpg");
    mock.expect_patch().return_ok();
    let (client, _actor) = start(&mock);

    let handle = client.start_run(draft_with_image()).await.unwrap();
    gate.entered().await;
    drop(handle);
    gate.release();

    wait_until_idle(&client).await;
    assert_eq!(mock.calls().len(), 3);
    mock.verify();
}

#[tokio::test]
async fn test_unread_handle_does_not_stall_run() {
    let mock = MockBackend::new();
    mock.expect_create().return_ok("post_123");
    mock.expect_upload().return_ok("https://cdn/x.jpg");
    mock.expect_patch().return_ok();

    // Smallest requested capacity; the client raises it to fit a whole run.
    let (actor, client) = SubmissionActor::new(8, 1);
    assert_eq!(client.event_capacity(), MAX_EVENTS_PER_RUN);
    let _actor = tokio::spawn(actor.run(mock.collaborators()));

    let handle = client.start_run(draft_with_image()).await.unwrap();
    wait_until_idle(&client).await;
    assert_eq!(mock.calls().len(), 3);
    mock.verify();

    // Every event is still waiting in the channel.
    let (progress, outcome) = handle.finish_with_progress().await.unwrap();
    assert_eq!(progress.len(), 3);
    assert!(outcome.is_done());
}

#[tokio::test]
async fn test_start_after_actor_stopped() {
    let mock = MockBackend::new();
    let (actor, client) = SubmissionActor::new(8, 16);
    drop(actor);

    assert_eq!(
        client.start_run(draft()).await.unwrap_err(),
        SubmissionError::ActorClosed
    );
    assert!(!client.is_run_active());
    mock.verify();
}
