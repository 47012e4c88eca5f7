//! Blog resources as the backend returns them.

use serde::{Deserialize, Serialize};

use crate::model::PostStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogAuthor {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Category as embedded in a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// Posts can also be archived server side, which drafts never are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoredStatus {
    Draft,
    Published,
    Archived,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub author: Option<BlogAuthor>,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    #[serde(default)]
    pub categories: Vec<CategoryRef>,
    #[serde(default)]
    pub status: Option<StoredStatus>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub read_time: Option<u32>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub seo_title: Option<String>,
    #[serde(default)]
    pub seo_description: Option<String>,
    #[serde(default)]
    pub seo_keywords: Option<String>,
    #[serde(default)]
    pub view_count: Option<u64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Partial update for an existing post. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PostStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seo_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seo_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seo_keywords: Option<String>,
}

impl PostUpdate {
    pub fn featured_image(url: impl Into<String>) -> Self {
        Self {
            featured_image: Some(url.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogCategory {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

pub const DEFAULT_CATEGORY_COLOR: &str = "#3B82F6";

/// Create/update payload for a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl CategoryInput {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            description: None,
            color: Some(DEFAULT_CATEGORY_COLOR.to_string()),
        }
    }
}

/// Pagination block. The backend names the counters per collection
/// (`totalPosts`, `totalSubmissions`, ...) and the public endpoints use
/// `page` instead of `currentPage`, so every field is lenient.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pagination {
    #[serde(alias = "page")]
    pub current_page: u32,
    pub total_pages: u32,
    #[serde(alias = "totalPosts", alias = "totalSubmissions", alias = "totalSubscribers")]
    pub total: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PostPage {
    #[serde(default)]
    pub posts: Vec<BlogPost>,
    #[serde(default)]
    pub pagination: Pagination,
}

/// Files stored by the upload service. Entries are passed through untyped;
/// the backend does not commit to a schema for them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FilePage {
    #[serde(default)]
    pub files: Vec<serde_json::Value>,
    #[serde(default)]
    pub pagination: Pagination,
}

/// Query for paged listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            search: None,
        }
    }
}

impl PageQuery {
    pub fn page(page: u32, limit: u32) -> Self {
        Self {
            page,
            limit,
            search: None,
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Query-string pairs; an empty search term is omitted.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        pairs
    }
}
