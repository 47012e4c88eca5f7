//! # Mock Backend
//!
//! Stand-in for the three collaborators, for testing the actor without HTTP.
//!
//! Queue the responses you expect in order, hand the backend to the actor,
//! then call [`MockBackend::verify`] to check every expectation was consumed
//! and no unexpected call arrived.
//!
//! ```ignore
//! let mock = MockBackend::new();
//! mock.expect_create().return_ok("post_123");
//! mock.expect_upload().return_err(StepError::upload("file too large"));
//!
//! let context = mock.collaborators();
//! // run the actor with `context`...
//! mock.verify();
//! ```
//!
//! A response can be held back with a [`Gate`] to observe the actor while a
//! step is in flight.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::framework::{AssetUploader, Collaborators, ResourceCreator, ResourcePatcher, StepError};
use crate::model::{AssetReference, LocalAsset, ResourceFields, SubmissionOutcome};

/// A call the backend received, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create(ResourceFields),
    Upload { filename: String, len: usize },
    Patch { resource_id: String, asset_url: String },
}

enum Expectation {
    Create(Result<SubmissionOutcome, StepError>),
    Upload(Result<AssetReference, StepError>),
    Patch(Result<(), StepError>),
}

struct Queued {
    expectation: Expectation,
    gate: Option<Gate>,
}

/// Holds a response until released. `entered` fires once the call arrives.
#[derive(Clone, Default)]
pub struct Gate {
    entered: Arc<Notify>,
    release: Arc<Notify>,
}

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves once the gated call has reached the backend.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    /// Lets the gated call return.
    pub fn release(&self) {
        self.release.notify_one();
    }

    async fn pass(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }
}

#[derive(Default)]
struct State {
    expectations: VecDeque<Queued>,
    calls: Vec<Call>,
    unexpected: Vec<String>,
}

/// Scripted implementation of all three collaborator traits.
#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<State>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context for [`SubmissionActor::run`](crate::framework::SubmissionActor::run)
    /// backed by this mock.
    pub fn collaborators(&self) -> Collaborators {
        Collaborators::from_backend(Arc::new(self.clone()))
    }

    pub fn expect_create(&self) -> CreateExpectationBuilder {
        CreateExpectationBuilder {
            state: self.state.clone(),
            gate: None,
        }
    }

    pub fn expect_upload(&self) -> UploadExpectationBuilder {
        UploadExpectationBuilder {
            state: self.state.clone(),
            gate: None,
        }
    }

    pub fn expect_patch(&self) -> PatchExpectationBuilder {
        PatchExpectationBuilder {
            state: self.state.clone(),
            gate: None,
        }
    }

    /// Every call received so far.
    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn upload_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::Upload { .. }))
    }

    pub fn patch_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::Patch { .. }))
    }

    fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.state.lock().unwrap().calls.iter().filter(|c| pred(c)).count()
    }

    /// Panics if an expectation is left over or a call had no expectation.
    pub fn verify(&self) {
        let state = self.state.lock().unwrap();
        if !state.unexpected.is_empty() {
            panic!("Unexpected calls: {:?}", state.unexpected);
        }
        if !state.expectations.is_empty() {
            panic!(
                "Not all expectations were met. {} remaining",
                state.expectations.len()
            );
        }
    }

    /// Records `call` and pops the next expectation.
    fn take(&self, call: Call) -> Option<Queued> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        state.expectations.pop_front()
    }

    fn mismatch(&self, call: &str) -> StepError {
        self.state.lock().unwrap().unexpected.push(call.to_string());
        StepError::transport(format!("mock: unexpected {call} call"))
    }
}

#[async_trait]
impl ResourceCreator for MockBackend {
    async fn create_resource(&self, fields: ResourceFields) -> Result<SubmissionOutcome, StepError> {
        match self.take(Call::Create(fields)) {
            Some(Queued {
                expectation: Expectation::Create(response),
                gate,
            }) => {
                if let Some(gate) = gate {
                    gate.pass().await;
                }
                response
            }
            _ => Err(self.mismatch("create")),
        }
    }
}

#[async_trait]
impl AssetUploader for MockBackend {
    async fn upload_asset(&self, asset: LocalAsset) -> Result<AssetReference, StepError> {
        let call = Call::Upload {
            filename: asset.filename.clone(),
            len: asset.len(),
        };
        match self.take(call) {
            Some(Queued {
                expectation: Expectation::Upload(response),
                gate,
            }) => {
                if let Some(gate) = gate {
                    gate.pass().await;
                }
                response
            }
            _ => Err(self.mismatch("upload")),
        }
    }
}

#[async_trait]
impl ResourcePatcher for MockBackend {
    async fn patch_resource(&self, resource_id: &str, asset_url: &str) -> Result<(), StepError> {
        let call = Call::Patch {
            resource_id: resource_id.to_string(),
            asset_url: asset_url.to_string(),
        };
        match self.take(call) {
            Some(Queued {
                expectation: Expectation::Patch(response),
                gate,
            }) => {
                if let Some(gate) = gate {
                    gate.pass().await;
                }
                response
            }
            _ => Err(self.mismatch("patch")),
        }
    }
}

fn push(state: &Arc<Mutex<State>>, expectation: Expectation, gate: Option<Gate>) {
    state
        .lock()
        .unwrap()
        .expectations
        .push_back(Queued { expectation, gate });
}

/// Builder for `create_resource` expectations.
pub struct CreateExpectationBuilder {
    state: Arc<Mutex<State>>,
    gate: Option<Gate>,
}

impl CreateExpectationBuilder {
    /// Holds the response until `gate` is released.
    pub fn gated(mut self, gate: &Gate) -> Self {
        self.gate = Some(gate.clone());
        self
    }

    /// Creation succeeds with `resource_id`.
    pub fn return_ok(self, resource_id: impl Into<String>) {
        self.return_outcome(SubmissionOutcome::created(resource_id));
    }

    /// Returns `outcome` as-is, including odd shapes like a blank id.
    pub fn return_outcome(self, outcome: SubmissionOutcome) {
        push(&self.state, Expectation::Create(Ok(outcome)), self.gate);
    }

    pub fn return_err(self, error: StepError) {
        push(&self.state, Expectation::Create(Err(error)), self.gate);
    }
}

/// Builder for `upload_asset` expectations.
pub struct UploadExpectationBuilder {
    state: Arc<Mutex<State>>,
    gate: Option<Gate>,
}

impl UploadExpectationBuilder {
    pub fn gated(mut self, gate: &Gate) -> Self {
        self.gate = Some(gate.clone());
        self
    }

    /// Upload succeeds; the reference is derived from `url`.
    pub fn return_ok(self, url: impl Into<String>) {
        let url = url.into();
        let filename = url.rsplit('/').next().unwrap_or_default().to_string();
        self.return_reference(AssetReference {
            public_id: format!("blog/{filename}"),
            filename,
            url,
        });
    }

    pub fn return_reference(self, reference: AssetReference) {
        push(&self.state, Expectation::Upload(Ok(reference)), self.gate);
    }

    pub fn return_err(self, error: StepError) {
        push(&self.state, Expectation::Upload(Err(error)), self.gate);
    }
}

/// Builder for `patch_resource` expectations.
pub struct PatchExpectationBuilder {
    state: Arc<Mutex<State>>,
    gate: Option<Gate>,
}

impl PatchExpectationBuilder {
    pub fn gated(mut self, gate: &Gate) -> Self {
        self.gate = Some(gate.clone());
        self
    }

    pub fn return_ok(self) {
        push(&self.state, Expectation::Patch(Ok(())), self.gate);
    }

    pub fn return_err(self, error: StepError) {
        push(&self.state, Expectation::Patch(Err(error)), self.gate);
    }
}
