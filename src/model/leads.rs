//! Lead capture payloads and the admin views over them.

use serde::{Deserialize, Serialize};

use crate::model::Pagination;

pub const NEWSLETTER_SOURCE: &str = "website_footer";
pub const CONTACT_SOURCE: &str = "contact_page";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewsletterSubscription {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl NewsletterSubscription {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            source: Some(NEWSLETTER_SOURCE.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContactFormData {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Backend acknowledgement for a lead submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub message: String,
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    New,
    Read,
    Replied,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
    #[serde(default)]
    pub source: Option<String>,
    pub status: SubmissionStatus,
    #[serde(default)]
    pub assigned_to: Option<String>,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterSubscriber {
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub subscribed_at: Option<String>,
    #[serde(default)]
    pub unsubscribed_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubmissionPage {
    #[serde(default)]
    pub submissions: Vec<ContactSubmission>,
    #[serde(default)]
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubscriberPage {
    #[serde(default)]
    pub subscribers: Vec<NewsletterSubscriber>,
    #[serde(default)]
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BlogCounts {
    pub total: u64,
    pub published: u64,
    pub draft: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SubmissionCounts {
    pub total: u64,
    pub new: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SubscriberCounts {
    pub total: u64,
    pub active: u64,
}

/// Counters shown on the admin dashboard landing tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DashboardStats {
    pub blog: BlogCounts,
    pub submissions: SubmissionCounts,
    pub newsletter: SubscriberCounts,
}
