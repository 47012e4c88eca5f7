use tracing::instrument;

use crate::clients::{ApiClient, ApiError};
use crate::model::{BlogCategory, BlogPost, PageQuery, PostPage};

/// Read-only access to published posts. No session needed.
#[derive(Clone)]
pub struct PublicBlogClient {
    api: ApiClient,
}

impl PublicBlogClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    #[instrument(skip(self))]
    pub async fn list_posts(&self, query: &PageQuery) -> Result<PostPage, ApiError> {
        let request = self.api.get("blog/posts").query(&query.pairs());
        self.api.data(request, "Failed to fetch blog posts").await
    }

    #[instrument(skip(self))]
    pub async fn get_post(&self, slug: &str) -> Result<BlogPost, ApiError> {
        let url = self.api.url_with_segments("blog/posts", &[slug])?;
        let request = self.api.get_url(url);
        self.api.data(request, "Failed to fetch blog post").await
    }

    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<BlogCategory>, ApiError> {
        self.api
            .data(self.api.get("blog/categories"), "Failed to fetch categories")
            .await
    }

    #[instrument(skip(self))]
    pub async fn posts_by_category(
        &self,
        category_slug: &str,
        page: u32,
        limit: u32,
    ) -> Result<PostPage, ApiError> {
        let url = self
            .api
            .url_with_segments("blog/posts/category", &[category_slug])?;
        let request = self
            .api
            .get_url(url)
            .query(&PageQuery::page(page, limit).pairs());
        self.api
            .data(request, "Failed to fetch posts by category")
            .await
    }
}
