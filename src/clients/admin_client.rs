use tracing::instrument;

use crate::clients::{ApiClient, ApiError};
use crate::model::{DashboardStats, PageQuery, SubmissionPage, SubscriberPage};

/// Dashboard views over leads and content counts.
#[derive(Clone)]
pub struct AdminClient {
    api: ApiClient,
}

impl AdminClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    #[instrument(skip(self))]
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        let request = self.api.authorized(self.api.get("admin/dashboard/stats"))?;
        self.api
            .data(request, "Failed to fetch dashboard stats")
            .await
    }

    #[instrument(skip(self))]
    pub async fn contact_submissions(&self, page: u32, limit: u32) -> Result<SubmissionPage, ApiError> {
        let request = self
            .api
            .authorized(self.api.get("admin/submissions"))?
            .query(&PageQuery::page(page, limit).pairs());
        self.api.data(request, "Failed to fetch submissions").await
    }

    #[instrument(skip(self))]
    pub async fn newsletter_subscribers(
        &self,
        page: u32,
        limit: u32,
    ) -> Result<SubscriberPage, ApiError> {
        let request = self
            .api
            .authorized(self.api.get("admin/subscribers"))?
            .query(&PageQuery::page(page, limit).pairs());
        self.api.data(request, "Failed to fetch subscribers").await
    }
}
