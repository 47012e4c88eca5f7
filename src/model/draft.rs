use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::FieldError;

/// Publication state of a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostStatus::Draft => write!(f, "draft"),
            PostStatus::Published => write!(f, "published"),
        }
    }
}

/// Optional SEO overrides entered alongside a post. All free text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<String>,
}

/// A binary asset held locally until the post exists on the backend.
///
/// `preview` is whatever ephemeral reference the UI uses to show the file
/// before upload (an object URL, a temp path). It is never sent anywhere.
#[derive(Clone, PartialEq, Eq)]
pub struct LocalAsset {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub preview: Option<String>,
}

impl LocalAsset {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
            preview: None,
        }
    }

    pub fn with_preview(mut self, preview: impl Into<String>) -> Self {
        self.preview = Some(preview.into());
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// Payload bytes stay out of logs.
impl fmt::Debug for LocalAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalAsset")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .field("preview", &self.preview)
            .finish()
    }
}

/// The user's in-progress post before submission.
///
/// A draft is moved into [`SubmissionClient::start_run`](crate::framework::SubmissionClient::start_run),
/// so each run starts from a freshly supplied value and nothing leaks between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftResource {
    pub title: String,
    pub body: String,
    pub excerpt: Option<String>,
    pub category: Option<String>,
    pub status: PostStatus,
    pub seo: SeoFields,
    pub asset: Option<LocalAsset>,
}

impl DraftResource {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    pub fn with_excerpt(mut self, excerpt: impl Into<String>) -> Self {
        self.excerpt = Some(excerpt.into());
        self
    }

    pub fn with_category(mut self, category_id: impl Into<String>) -> Self {
        self.category = Some(category_id.into());
        self
    }

    pub fn with_status(mut self, status: PostStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_seo(mut self, seo: SeoFields) -> Self {
        self.seo = seo;
        self
    }

    pub fn with_asset(mut self, asset: LocalAsset) -> Self {
        self.asset = Some(asset);
        self
    }

    pub fn has_asset(&self) -> bool {
        self.asset.is_some()
    }

    /// Local pre-submit check: title and body must be non-blank.
    ///
    /// The backend remains authoritative; this only catches what the form can
    /// catch without a round trip.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() {
            errors.push(FieldError::new("title", "Title is required"));
        }
        if self.body.trim().is_empty() {
            errors.push(FieldError::new("content", "Content is required"));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// The fields sent to the Resource Creator, minus the asset.
    pub fn fields(&self) -> ResourceFields {
        ResourceFields {
            title: self.title.clone(),
            content: self.body.clone(),
            excerpt: self.excerpt.clone(),
            categories: self.category.iter().cloned().collect(),
            status: self.status,
            seo_title: self.seo.title.clone(),
            seo_description: self.seo.description.clone(),
            seo_keywords: self.seo.keywords.clone(),
        }
    }

    /// Splits the draft into the submittable fields and the held asset.
    pub fn into_parts(self) -> (ResourceFields, Option<LocalAsset>) {
        let fields = self.fields();
        (fields, self.asset)
    }
}

/// Wire payload for post creation. Mirrors the backend's camelCase schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceFields {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub status: PostStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seo_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seo_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seo_keywords: Option<String>,
}
