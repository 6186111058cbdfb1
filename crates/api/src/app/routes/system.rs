use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::app::errors::ApiError;
use crate::app::services::AppServices;

const SERVICE_NAME: &str = "userhub-api";

/// Liveness/info message.
pub async fn hello(Extension(services): Extension<Arc<AppServices>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Hello from userhub!",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "environment": services.settings().environment.as_str(),
    }))
}

/// Health probe: healthy only when the store answers.
pub async fn health(Extension(services): Extension<Arc<AppServices>>) -> impl IntoResponse {
    let store = services.store();
    match store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "healthy",
                "service": SERVICE_NAME,
                "store": store.backend(),
            })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "status": "unhealthy",
                    "service": SERVICE_NAME,
                    "store": store.backend(),
                })),
            )
        }
    }
}

pub async fn not_found() -> ApiError {
    ApiError::RouteNotFound
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
