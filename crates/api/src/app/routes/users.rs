//! CRUD handlers for `/api/users/...`.
//!
//! Each handler validates input, issues one store call, and wraps the result
//! in the success envelope. Failures are `ApiError`s.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Extension, Path, Query},
    http::StatusCode,
    response::Response,
};

use userhub_core::{PageRequest, UserId};

use crate::app::dto::{self, ListUsersQuery, UserListResponse, UserResponse};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

/// Non-integer path ids could never name a row.
fn parse_user_id(raw: &str) -> Result<UserId, ApiError> {
    raw.parse().map_err(|_| ApiError::UserNotFound)
}

#[tracing::instrument(skip(services, query))]
pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<ListUsersQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query.map_err(|_| ApiError::InvalidPagination)?;
    let request = PageRequest::parse(
        query.page.as_deref(),
        query.limit.as_deref(),
        services.settings().max_page_size,
    )
    .map_err(|_| ApiError::InvalidPagination)?;

    let page = services.store().list(request).await?;
    Ok(dto::json_data(StatusCode::OK, UserListResponse::from(page)))
}

#[tracing::instrument(skip(services))]
pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(user_id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_user_id(&user_id)?;
    let user = services
        .store()
        .get(id)
        .await?
        .ok_or(ApiError::UserNotFound)?;
    Ok(dto::json_data(StatusCode::OK, UserResponse::from(user)))
}

#[tracing::instrument(skip(services, body))]
pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let new_user = dto::new_user_from_body(dto::parse_json_body(&body)?)?;
    let user = services.store().insert(new_user).await?;

    tracing::info!(user_id = %user.id, "user created");
    Ok(dto::json_data(StatusCode::CREATED, UserResponse::from(user)))
}

#[tracing::instrument(skip(services, body))]
pub async fn update_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(user_id): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let id = parse_user_id(&user_id)?;

    // Existence first: an unknown id is 404 whatever the body says.
    if services.store().get(id).await?.is_none() {
        return Err(ApiError::UserNotFound);
    }

    let patch = dto::patch_from_body(dto::parse_json_body(&body)?)?;
    let user = services.store().update(id, patch).await?;

    tracing::info!(user_id = %user.id, "user updated");
    Ok(dto::json_data(StatusCode::OK, UserResponse::from(user)))
}

#[tracing::instrument(skip(services))]
pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(user_id): Path<String>,
) -> Result<Response, ApiError> {
    let id = parse_user_id(&user_id)?;
    let user = services.store().delete(id).await?;

    tracing::info!(user_id = %user.id, "user deleted");
    Ok(dto::json_message(
        StatusCode::OK,
        format!("User {} deleted successfully", user.name),
    ))
}
