//! The three backend operations a submission run is composed of.
//!
//! Each trait is object safe so the actor can hold `Arc<dyn ..>` and tests
//! can swap the HTTP implementation for [`MockBackend`](crate::framework::mock::MockBackend).

use std::sync::Arc;

use async_trait::async_trait;

use crate::framework::StepError;
use crate::model::{AssetReference, LocalAsset, ResourceFields, SubmissionOutcome};

/// Submits the primary fields and returns the created identifier.
#[async_trait]
pub trait ResourceCreator: Send + Sync {
    async fn create_resource(&self, fields: ResourceFields) -> Result<SubmissionOutcome, StepError>;
}

/// Uploads one binary asset.
#[async_trait]
pub trait AssetUploader: Send + Sync {
    async fn upload_asset(&self, asset: LocalAsset) -> Result<AssetReference, StepError>;
}

/// Attaches an uploaded asset to an existing resource.
#[async_trait]
pub trait ResourcePatcher: Send + Sync {
    async fn patch_resource(&self, resource_id: &str, asset_url: &str) -> Result<(), StepError>;
}

/// Runtime context injected into [`SubmissionActor::run`](crate::framework::SubmissionActor::run).
#[derive(Clone)]
pub struct Collaborators {
    pub creator: Arc<dyn ResourceCreator>,
    pub uploader: Arc<dyn AssetUploader>,
    pub patcher: Arc<dyn ResourcePatcher>,
}

impl Collaborators {
    pub fn new(
        creator: Arc<dyn ResourceCreator>,
        uploader: Arc<dyn AssetUploader>,
        patcher: Arc<dyn ResourcePatcher>,
    ) -> Self {
        Self {
            creator,
            uploader,
            patcher,
        }
    }

    /// Uses one backend for all three steps.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: ResourceCreator + AssetUploader + ResourcePatcher + 'static,
    {
        Self {
            creator: backend.clone(),
            uploader: backend.clone(),
            patcher: backend,
        }
    }
}
