use std::collections::BTreeMap;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use validator::ValidationErrors;

use crate::application::articles::ArticleError;
use crate::application::error::ErrorReport;
use crate::application::repos::RepoError;

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorMessage,
}

pub mod codes {
    pub const BAD_REQUEST: &str = "bad_request";
    pub const VALIDATION: &str = "validation_error";
    pub const NOT_FOUND: &str = "not_found";
    pub const LIST_FAILED: &str = "list_failed";
    pub const VIEW_FAILED: &str = "view_failed";
    pub const CREATE_FAILED: &str = "create_failed";
    pub const UPDATE_FAILED: &str = "update_failed";
    pub const DELETE_FAILED: &str = "delete_failed";
    pub const UNAVAILABLE: &str = "unavailable";
}

/// Wire envelope for failures. `code` and the per-field rule codes in
/// `fields` are stable machine keys; translating them into prose is the
/// localization collaborator's job.
#[derive(Debug, Serialize)]
pub struct ApiErrorMessage {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, Vec<String>>>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    fields: Option<BTreeMap<String, Vec<String>>>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            fields: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::BAD_REQUEST, message)
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, codes::NOT_FOUND, "article not found")
    }

    /// Per-field rule codes from a failed validation pass.
    pub fn validation(errors: &ValidationErrors) -> Self {
        let mut fields = BTreeMap::new();
        for (field, violations) in errors.field_errors() {
            let rules: Vec<String> = violations
                .iter()
                .map(|violation| violation.code.to_string())
                .collect();
            fields.insert(field.to_string(), rules);
        }
        Self {
            status: StatusCode::BAD_REQUEST,
            code: codes::VALIDATION,
            message: "request validation failed".to_string(),
            fields: Some(fields),
        }
    }

    /// Map a service failure onto the wire. `code` names the operation
    /// that failed so store trouble stays distinguishable per endpoint.
    pub fn from_article_error(error: ArticleError, code: &'static str) -> Self {
        match error {
            ArticleError::NotFound => Self::not_found(),
            ArticleError::EmptyField { field } => {
                let mut fields = BTreeMap::new();
                fields.insert(field.to_string(), vec!["required".to_string()]);
                Self {
                    status: StatusCode::BAD_REQUEST,
                    code: codes::VALIDATION,
                    message: "request validation failed".to_string(),
                    fields: Some(fields),
                }
            }
            ArticleError::Pagination(err) => Self::bad_request(err.to_string()),
            ArticleError::Repo(err) => Self::from_repo_error(&err, code),
        }
    }

    fn from_repo_error(error: &RepoError, code: &'static str) -> Self {
        match error {
            RepoError::NotFound => Self::not_found(),
            RepoError::Timeout => {
                Self::new(StatusCode::SERVICE_UNAVAILABLE, code, "operation failed")
            }
            RepoError::InvalidInput { .. } => {
                Self::new(StatusCode::BAD_REQUEST, code, "operation failed")
            }
            RepoError::Persistence(_) | RepoError::Integrity { .. } => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, code, "operation failed")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: ApiErrorMessage {
                code: self.code.to_string(),
                message: self.message.clone(),
                fields: self.fields,
            },
        };
        let mut response = (self.status, Json(body)).into_response();
        // Attach a structured report so the logging middleware can emit
        // rich diagnostics without exposing them to the client.
        ErrorReport::from_message(
            "infra::http",
            self.status,
            format!("{}: {}", self.code, self.message),
        )
        .attach(&mut response);
        response
    }
}
