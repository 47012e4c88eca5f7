use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::clients::{ApiClient, ApiError};
use crate::framework::{AssetUploader, ResourceCreator, ResourcePatcher, StepError};
use crate::model::{
    AssetReference, BlogCategory, BlogPost, CategoryInput, FilePage, LocalAsset, PageQuery,
    PostPage, PostUpdate, ResourceFields, RunStep, SubmissionOutcome,
};

/// Only the identifier of a freshly created post. The rest of the document
/// varies with how much the backend populated.
#[derive(Deserialize)]
struct CreatedPost {
    #[serde(rename = "_id")]
    id: String,
}

#[derive(Deserialize)]
struct UploadedFiles {
    #[serde(default)]
    files: Vec<AssetReference>,
}

/// Admin client for posts, categories and uploads. Every call needs a
/// session.
///
/// Also serves as the HTTP backend of a submission run: create maps to
/// [`create_post_id`](Self::create_post_id), upload to a single-file
/// [`upload_images`](Self::upload_images), and patch to an
/// [`update_post`](Self::update_post) that sets `featuredImage`.
#[derive(Clone)]
pub struct BlogClient {
    api: ApiClient,
}

impl BlogClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    #[instrument(skip(self, fields), fields(title = %fields.title))]
    pub async fn create_post(&self, fields: &ResourceFields) -> Result<BlogPost, ApiError> {
        debug!(?fields, "create_post called");
        let request = self.api.authorized(self.api.post("admin/blog/posts"))?.json(fields);
        let post: BlogPost = self.api.data(request, "Failed to create blog post").await?;
        info!(post_id = %post.id, "Post created");
        Ok(post)
    }

    /// Creates a post and reads back only its identifier, so a created post
    /// is never mistaken for a failure because of the shape of its other
    /// fields.
    #[instrument(skip(self, fields), fields(title = %fields.title))]
    pub async fn create_post_id(&self, fields: &ResourceFields) -> Result<String, ApiError> {
        let request = self.api.authorized(self.api.post("admin/blog/posts"))?.json(fields);
        let created: CreatedPost = self.api.data(request, "Failed to create blog post").await?;
        info!(post_id = %created.id, "Post created");
        Ok(created.id)
    }

    #[instrument(skip(self, update))]
    pub async fn update_post(&self, id: &str, update: &PostUpdate) -> Result<BlogPost, ApiError> {
        debug!(?update, "update_post called");
        let url = self.api.url_with_segments("admin/blog/posts", &[id])?;
        let request = self.api.authorized(self.api.put_url(url))?.json(update);
        self.api.data(request, "Failed to update blog post").await
    }

    #[instrument(skip(self))]
    pub async fn delete_post(&self, id: &str) -> Result<(), ApiError> {
        let url = self.api.url_with_segments("admin/blog/posts", &[id])?;
        let request = self.api.authorized(self.api.delete_url(url))?;
        self.api.check(request, "Failed to delete blog post").await?;
        info!("Post deleted");
        Ok(())
    }

    /// All posts, drafts included.
    #[instrument(skip(self))]
    pub async fn list_admin_posts(&self, query: &PageQuery) -> Result<PostPage, ApiError> {
        let request = self
            .api
            .authorized(self.api.get("admin/blog/posts"))?
            .query(&query.pairs());
        self.api.data(request, "Failed to fetch blog posts").await
    }

    /// Uploads `assets` in one multipart request under the `images` field.
    #[instrument(skip(self, assets), fields(count = assets.len()))]
    pub async fn upload_images(
        &self,
        assets: Vec<LocalAsset>,
    ) -> Result<Vec<AssetReference>, ApiError> {
        let mut form = Form::new();
        for asset in assets {
            debug!(?asset, "Adding file");
            let LocalAsset {
                filename,
                content_type,
                bytes,
                ..
            } = asset;
            let part = Part::bytes(bytes)
                .file_name(filename.clone())
                .mime_str(&content_type)
                .map_err(|_| {
                    ApiError::InvalidAsset(format!(
                        "{filename}: unsupported content type {content_type:?}"
                    ))
                })?;
            form = form.part("images", part);
        }
        let request = self.api.authorized(self.api.post("upload/image"))?.multipart(form);
        let uploaded: UploadedFiles = self.api.data(request, "Failed to upload images").await?;
        info!(uploaded = uploaded.files.len(), "Images uploaded");
        Ok(uploaded.files)
    }

    /// `kind` is the upload folder, `images` in the admin panel.
    #[instrument(skip(self))]
    pub async fn list_uploaded_files(
        &self,
        kind: &str,
        page: u32,
        limit: u32,
    ) -> Result<FilePage, ApiError> {
        let request = self.api.authorized(self.api.get("upload/files"))?.query(&[
            ("type", kind.to_string()),
            ("page", page.to_string()),
            ("limit", limit.to_string()),
        ]);
        self.api.data(request, "Failed to fetch uploaded files").await
    }

    #[instrument(skip(self))]
    pub async fn delete_uploaded_file(&self, public_id: &str) -> Result<(), ApiError> {
        let url = self.api.url_with_segments("upload", &[public_id])?;
        let request = self.api.authorized(self.api.delete_url(url))?;
        self.api.check(request, "Failed to delete file").await
    }

    /// Dedicated featured-image endpoint of the upload service.
    #[instrument(skip(self))]
    pub async fn set_featured_image(&self, id: &str, image_url: &str) -> Result<BlogPost, ApiError> {
        let url = self
            .api
            .url_with_segments("upload/blog", &[id, "featured-image"])?;
        let request = self
            .api
            .authorized(self.api.put_url(url))?
            .json(&serde_json::json!({ "imageUrl": image_url }));
        self.api.data(request, "Failed to update featured image").await
    }

    #[instrument(skip(self, input))]
    pub async fn create_category(&self, input: &CategoryInput) -> Result<BlogCategory, ApiError> {
        debug!(?input, "create_category called");
        let request = self
            .api
            .authorized(self.api.post("admin/blog/categories"))?
            .json(input);
        self.api.data(request, "Failed to create blog category").await
    }

    #[instrument(skip(self, input))]
    pub async fn update_category(
        &self,
        id: &str,
        input: &CategoryInput,
    ) -> Result<BlogCategory, ApiError> {
        let url = self.api.url_with_segments("admin/blog/categories", &[id])?;
        let request = self.api.authorized(self.api.put_url(url))?.json(input);
        self.api.data(request, "Failed to update blog category").await
    }

    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: &str) -> Result<(), ApiError> {
        let url = self.api.url_with_segments("admin/blog/categories", &[id])?;
        let request = self.api.authorized(self.api.delete_url(url))?;
        self.api.check(request, "Failed to delete blog category").await
    }
}

#[async_trait]
impl ResourceCreator for BlogClient {
    async fn create_resource(&self, fields: ResourceFields) -> Result<SubmissionOutcome, StepError> {
        match self.create_post_id(&fields).await {
            Ok(id) => Ok(SubmissionOutcome::created(id)),
            Err(ApiError::Api { details, .. }) if !details.is_empty() => {
                Ok(SubmissionOutcome::rejected(details))
            }
            Err(e) => Err(e.into_step_error(RunStep::Creating)),
        }
    }
}

#[async_trait]
impl AssetUploader for BlogClient {
    async fn upload_asset(&self, asset: LocalAsset) -> Result<AssetReference, StepError> {
        let files = self
            .upload_images(vec![asset])
            .await
            .map_err(|e| e.into_step_error(RunStep::Uploading))?;
        files
            .into_iter()
            .next()
            .ok_or_else(|| StepError::transport("malformed response: upload returned no files"))
    }
}

#[async_trait]
impl ResourcePatcher for BlogClient {
    async fn patch_resource(&self, resource_id: &str, asset_url: &str) -> Result<(), StepError> {
        self.update_post(resource_id, &PostUpdate::featured_image(asset_url))
            .await
            .map(|_| ())
            .map_err(|e| e.into_step_error(RunStep::Patching))
    }
}
