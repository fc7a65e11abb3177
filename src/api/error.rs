use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::error::LeagueError;

/// Error returned by HTTP handlers, rendered as `{ "error", "details" }`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request body was missing a field or was not valid JSON.
    #[error("{0}")]
    BadRequest(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// A batch run or query failed before producing a result.
    #[error("{context}: {source}")]
    League {
        context: &'static str,
        source: LeagueError,
    },
}

impl ApiError {
    pub fn league(context: &'static str) -> impl FnOnce(LeagueError) -> Self {
        move |source| ApiError::League { context, source }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

fn league_status(err: &LeagueError) -> StatusCode {
    match err {
        LeagueError::MissingSession { .. }
        | LeagueError::MissingCredentials
        | LeagueError::Http { .. }
        | LeagueError::UnexpectedStatus { .. }
        | LeagueError::ResponseBody { .. }
        | LeagueError::ElementNotFound { .. } => StatusCode::BAD_GATEWAY,
        LeagueError::Selector(_)
        | LeagueError::ClientBuild(_)
        | LeagueError::Database(_)
        | LeagueError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "Invalid request".to_string(), msg.clone()),
            ApiError::NotFound { .. } => (StatusCode::NOT_FOUND, "Not found".to_string(), self.to_string()),
            ApiError::League { context, source } => {
                let status = league_status(source);
                if source.is_auth_failure() {
                    tracing::error!(error = %source, "fantasy surfer authentication failed");
                } else {
                    tracing::error!(error = %source, context, "request failed");
                }
                (status, context.to_string(), source.to_string())
            }
        };

        (status, axum::Json(json!({ "error": error, "details": details }))).into_response()
    }
}
