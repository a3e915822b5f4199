//! Wire models: request binding and response rendering.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::pagination::Page;
use crate::domain::entities::ArticleRecord;
use crate::util::timezone::localized_rfc3339;

use super::format::OutputFormat;

#[derive(Debug, Deserialize, Validate)]
pub struct ListArticlesQuery {
    #[validate(required, range(min = 1))]
    pub page: Option<i64>,
    #[validate(required, range(min = 1, max = 500))]
    pub items_per_page: Option<i64>,
    pub author: Option<String>,
    pub query: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateArticleRequest {
    #[validate(required, length(min = 1))]
    pub author: Option<String>,
    #[validate(required, length(min = 1))]
    pub title: Option<String>,
    #[validate(required, length(min = 1))]
    pub body: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateArticleRequest {
    #[validate(required, range(min = 1))]
    pub id: Option<i64>,
    #[validate(required, length(min = 1))]
    pub author: Option<String>,
    #[validate(required, length(min = 1))]
    pub title: Option<String>,
    #[validate(required, length(min = 1))]
    pub body: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct DeleteArticleRequest {
    #[validate(required, range(min = 1))]
    pub id: Option<i64>,
}

/// One article on the wire. Timestamps are rendered in the caller's
/// requested timezone.
#[derive(Debug, Serialize)]
pub struct ArticleResponse {
    pub id: i64,
    pub author: String,
    pub title: String,
    pub body: String,
    pub created_at: String,
    pub updated_at: String,
}

impl ArticleResponse {
    pub fn render(article: &ArticleRecord, format: OutputFormat) -> Self {
        Self {
            id: article.id,
            author: article.author.clone(),
            title: article.title.clone(),
            body: article.body.clone(),
            created_at: localized_rfc3339(article.created_at, format.timezone),
            updated_at: localized_rfc3339(article.updated_at, format.timezone),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ArticleListResponse {
    pub items: Vec<ArticleResponse>,
    pub total_items: u64,
    pub total_pages: u64,
}

impl ArticleListResponse {
    pub fn render(page: &Page<ArticleRecord>, format: OutputFormat) -> Self {
        Self {
            items: page
                .items
                .iter()
                .map(|article| ArticleResponse::render(article, format))
                .collect(),
            total_items: page.total_items,
            total_pages: page.total_pages,
        }
    }
}
