//! Failure causes and their JSON envelope.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use thiserror::Error;

use userhub_infra::StoreError;

/// Every way a request can fail, one variant per client-visible cause.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Invalid JSON")]
    InvalidJson,

    #[error("Name and email are required")]
    MissingFields,

    #[error("Name and email must be non-empty strings")]
    InvalidFields,

    #[error("No data provided")]
    NoData,

    #[error("page and limit must be positive integers")]
    InvalidPagination,

    #[error("Email already exists")]
    EmailExists,

    #[error("User not found")]
    UserNotFound,

    #[error("Not found")]
    RouteNotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Detail is logged, never sent to the client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidJson
            | ApiError::MissingFields
            | ApiError::InvalidFields
            | ApiError::NoData
            | ApiError::InvalidPagination
            | ApiError::EmailExists => StatusCode::BAD_REQUEST,
            ApiError::UserNotFound | ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message placed in the failure envelope.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::UserNotFound,
            StoreError::EmailTaken => ApiError::EmailExists,
            StoreError::Unavailable(_) | StoreError::Backend(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match &self {
            ApiError::Internal(detail) => tracing::error!(error = %detail, "request failed"),
            other => tracing::debug!(reason = %other, "request rejected"),
        }
        json_error(self.status(), self.public_message())
    }
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "success": false,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_distinct_causes() {
        assert_eq!(ApiError::from(StoreError::NotFound), ApiError::UserNotFound);
        assert_eq!(ApiError::from(StoreError::EmailTaken), ApiError::EmailExists);
        assert!(matches!(
            ApiError::from(StoreError::Unavailable("pool closed".into())),
            ApiError::Internal(_)
        ));
    }

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(ApiError::InvalidJson.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::EmailExists.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::UserNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::MethodNotAllowed.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            ApiError::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_detail_is_not_exposed() {
        let err = ApiError::Internal("password authentication failed for user postgres".into());
        assert_eq!(err.public_message(), "Internal server error");
        assert_eq!(ApiError::NoData.public_message(), "No data provided");
    }
}
