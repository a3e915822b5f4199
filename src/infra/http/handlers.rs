//! Article operation handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use validator::Validate;

use crate::application::pagination::PageRequest;
use crate::application::repos::{ArticleFilter, CreateArticleParams, UpdateArticleParams};

use super::HttpState;
use super::error::{ApiError, codes};
use super::format::OutputFormat;
use super::models::{
    ArticleListResponse, ArticleResponse, CreateArticleRequest, DeleteArticleRequest,
    ListArticlesQuery, UpdateArticleRequest,
};

pub async fn list_articles(
    State(state): State<HttpState>,
    headers: HeaderMap,
    Query(query): Query<ListArticlesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    query
        .validate()
        .map_err(|errors| ApiError::validation(&errors))?;
    let format = OutputFormat::from_headers(&headers);

    let page = PageRequest::new(
        query.page.unwrap_or_default(),
        query.items_per_page.unwrap_or_default(),
    )
    .map_err(|err| ApiError::bad_request(err.to_string()))?;
    let filter = ArticleFilter::new(query.author, query.query);

    let result = state
        .articles
        .list(&filter, page)
        .await
        .map_err(|err| ApiError::from_article_error(err, codes::LIST_FAILED))?;

    Ok(Json(ArticleListResponse::render(&result, format)))
}

pub async fn view_article(
    State(state): State<HttpState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let format = OutputFormat::from_headers(&headers);

    let article = state
        .articles
        .view(id)
        .await
        .map_err(|err| ApiError::from_article_error(err, codes::VIEW_FAILED))?;

    Ok(Json(ArticleResponse::render(&article, format)))
}

pub async fn create_article(
    State(state): State<HttpState>,
    headers: HeaderMap,
    Json(payload): Json<CreateArticleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|errors| ApiError::validation(&errors))?;
    let format = OutputFormat::from_headers(&headers);

    let params = CreateArticleParams {
        author: payload.author.unwrap_or_default(),
        title: payload.title.unwrap_or_default(),
        body: payload.body.unwrap_or_default(),
    };

    let article = state
        .articles
        .create(params)
        .await
        .map_err(|err| ApiError::from_article_error(err, codes::CREATE_FAILED))?;

    Ok((
        StatusCode::CREATED,
        Json(ArticleResponse::render(&article, format)),
    ))
}

pub async fn update_article(
    State(state): State<HttpState>,
    headers: HeaderMap,
    Json(payload): Json<UpdateArticleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|errors| ApiError::validation(&errors))?;
    let format = OutputFormat::from_headers(&headers);

    let id = payload.id.unwrap_or_default();
    let params = UpdateArticleParams {
        author: payload.author.unwrap_or_default(),
        title: payload.title.unwrap_or_default(),
        body: payload.body.unwrap_or_default(),
    };

    let article = state
        .articles
        .update(id, params)
        .await
        .map_err(|err| ApiError::from_article_error(err, codes::UPDATE_FAILED))?;

    Ok(Json(ArticleResponse::render(&article, format)))
}

pub async fn delete_article(
    State(state): State<HttpState>,
    Json(payload): Json<DeleteArticleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|errors| ApiError::validation(&errors))?;

    state
        .articles
        .delete(payload.id.unwrap_or_default())
        .await
        .map_err(|err| ApiError::from_article_error(err, codes::DELETE_FAILED))?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn health(State(state): State<HttpState>) -> Result<impl IntoResponse, ApiError> {
    state.db.health_check().await.map_err(|err| {
        ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::UNAVAILABLE,
            err.to_string(),
        )
    })?;
    Ok(StatusCode::NO_CONTENT)
}
