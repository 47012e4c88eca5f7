//! Submits one post from the command line.
//!
//! ```text
//! cms-submit <draft.json> [image]
//! ```
//!
//! The draft file holds `title`, `body` and optionally `excerpt`,
//! `category`, `status`, `seoTitle`, `seoDescription`, `seoKeywords`.

use std::path::Path;

use anyhow::{bail, Context};
use serde::Deserialize;
use tracing::{error, info, warn};

use cms_submission::framework::{RunEvent, RunOutcome};
use cms_submission::lifecycle::{setup_tracing, AppConfig, SubmissionSystem};
use cms_submission::model::{DraftResource, LocalAsset, PostStatus, SeoFields};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DraftFile {
    title: String,
    body: String,
    excerpt: Option<String>,
    category: Option<String>,
    #[serde(default)]
    status: PostStatus,
    seo_title: Option<String>,
    seo_description: Option<String>,
    seo_keywords: Option<String>,
}

impl DraftFile {
    fn into_draft(self) -> DraftResource {
        let mut draft = DraftResource::new(self.title, self.body)
            .with_status(self.status)
            .with_seo(SeoFields {
                title: self.seo_title,
                description: self.seo_description,
                keywords: self.seo_keywords,
            });
        if let Some(excerpt) = self.excerpt {
            draft = draft.with_excerpt(excerpt);
        }
        if let Some(category) = self.category {
            draft = draft.with_category(category);
        }
        draft
    }
}

fn content_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

fn load_asset(path: &Path) -> anyhow::Result<LocalAsset> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();
    Ok(LocalAsset::new(filename, content_type(path), bytes)
        .with_preview(path.display().to_string()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_tracing();

    let mut args = std::env::args().skip(1);
    let Some(draft_path) = args.next() else {
        bail!("usage: cms-submit <draft.json> [image]");
    };
    let image_path = args.next();

    let config = AppConfig::from_env()?;
    let raw = std::fs::read_to_string(&draft_path).with_context(|| format!("reading {draft_path}"))?;
    let file: DraftFile = serde_json::from_str(&raw).with_context(|| format!("parsing {draft_path}"))?;
    let mut draft = file.into_draft();
    if let Some(image) = image_path {
        draft = draft.with_asset(load_asset(Path::new(&image))?);
    }

    if let Err(fields) = draft.validate() {
        for field in &fields {
            error!(%field, "Draft is incomplete");
        }
        bail!("draft has {} invalid field(s)", fields.len());
    }

    let system = SubmissionSystem::new(&config, config.session())?;
    if config.auth_token.is_none() {
        warn!("CMS_AUTH_TOKEN is not set; the backend will reject the post");
    }

    let mut handle = system.submission_client.start_run(draft).await?;
    let mut outcome = None;
    while let Some(event) = handle.recv().await {
        match event {
            RunEvent::Progress(progress) => info!(percent = progress.percent(), "{progress}"),
            RunEvent::Finished(result) => outcome = Some(result),
        }
    }
    drop(handle);

    system.shutdown().await.map_err(anyhow::Error::msg)?;

    match outcome {
        Some(RunOutcome::Done { resource_id, asset }) => {
            info!(%resource_id, image = asset.map(|a| a.url).unwrap_or_default(), "Post saved");
            Ok(())
        }
        Some(RunOutcome::Failed(failure)) => {
            error!(detail = %failure.error(), "{}", failure.error().user_message());
            bail!("{failure}")
        }
        None => bail!("submission actor stopped before finishing the run"),
    }
}
