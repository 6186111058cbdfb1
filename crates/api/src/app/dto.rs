use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use userhub_core::{NewUser, Page, User, UserPatch};

use crate::app::errors::ApiError;

// -------------------------
// Request DTOs
// -------------------------

/// Raw list query; values stay strings so bad input becomes a 400, not a
/// rejected extractor.
#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Decoded request body for create/update.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonBody {
    /// `null` or `{}`.
    Empty,
    Object(Map<String, Value>),
}

/// Decode a request body: anything that is not a JSON object (or `null`)
/// is "Invalid JSON".
pub fn parse_json_body(bytes: &[u8]) -> Result<JsonBody, ApiError> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Null) => Ok(JsonBody::Empty),
        Ok(Value::Object(map)) if map.is_empty() => Ok(JsonBody::Empty),
        Ok(Value::Object(map)) => Ok(JsonBody::Object(map)),
        Ok(_) | Err(_) => Err(ApiError::InvalidJson),
    }
}

/// Build a `NewUser` from a create body. Both fields must be non-empty strings.
pub fn new_user_from_body(body: JsonBody) -> Result<NewUser, ApiError> {
    let map = match body {
        JsonBody::Empty => return Err(ApiError::MissingFields),
        JsonBody::Object(map) => map,
    };

    let name = map.get("name").and_then(Value::as_str).unwrap_or_default();
    let email = map.get("email").and_then(Value::as_str).unwrap_or_default();

    NewUser::new(name, email).map_err(|_| ApiError::MissingFields)
}

/// Build a `UserPatch` from an update body. Unknown keys are ignored; supplied
/// `name`/`email` must be non-empty strings.
pub fn patch_from_body(body: JsonBody) -> Result<UserPatch, ApiError> {
    let map = match body {
        JsonBody::Empty => return Err(ApiError::NoData),
        JsonBody::Object(map) => map,
    };

    let field = |key: &str| -> Result<Option<String>, ApiError> {
        match map.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(ApiError::InvalidFields),
        }
    };

    UserPatch::new(field("name")?, field("email")?).map_err(|_| ApiError::InvalidFields)
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.get(),
            name: user.name,
            email: user.email,
            created_at: iso8601(user.created_at),
            updated_at: iso8601(user.updated_at),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserListResponse {
    pub total: u64,
    pub page: u64,
    pub limit: u32,
    pub items: Vec<UserResponse>,
}

impl From<Page<User>> for UserListResponse {
    fn from(page: Page<User>) -> Self {
        let page = page.map(UserResponse::from);
        Self {
            total: page.total,
            page: page.page,
            limit: page.limit,
            items: page.items,
        }
    }
}

/// `2024-05-01T10:20:30.123456+00:00`
pub fn iso8601(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, false)
}

// -------------------------
// Success envelopes
// -------------------------

pub fn json_data(status: StatusCode, data: impl Serialize) -> axum::response::Response {
    (
        status,
        axum::Json(serde_json::json!({
            "success": true,
            "data": data,
        })),
    )
        .into_response()
}

pub fn json_message(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        axum::Json(serde_json::json!({
            "success": true,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn body(value: Value) -> JsonBody {
        parse_json_body(value.to_string().as_bytes()).unwrap()
    }

    #[test]
    fn malformed_or_non_object_bodies_are_invalid_json() {
        for raw in ["", "{", "not json", "[1,2]", "\"str\"", "42"] {
            assert_eq!(parse_json_body(raw.as_bytes()), Err(ApiError::InvalidJson), "{raw:?}");
        }
    }

    #[test]
    fn null_and_empty_object_are_empty() {
        assert_eq!(parse_json_body(b"null"), Ok(JsonBody::Empty));
        assert_eq!(parse_json_body(b"{}"), Ok(JsonBody::Empty));
    }

    #[test]
    fn create_requires_non_empty_string_fields() {
        assert!(new_user_from_body(body(json!({"name": "A", "email": "a@example.com"}))).is_ok());

        for v in [
            json!({"name": "A"}),
            json!({"email": "a@example.com"}),
            json!({"name": "", "email": "a@example.com"}),
            json!({"name": "A", "email": null}),
            json!({"name": 7, "email": "a@example.com"}),
        ] {
            assert_eq!(new_user_from_body(body(v.clone())), Err(ApiError::MissingFields), "{v}");
        }
        assert_eq!(new_user_from_body(JsonBody::Empty), Err(ApiError::MissingFields));
    }

    #[test]
    fn patch_takes_only_supplied_fields() {
        let patch = patch_from_body(body(json!({"name": "B", "nickname": "x"}))).unwrap();
        assert_eq!(patch.name.as_deref(), Some("B"));
        assert_eq!(patch.email, None);

        assert_eq!(patch_from_body(JsonBody::Empty), Err(ApiError::NoData));
        assert_eq!(
            patch_from_body(body(json!({"email": ""}))),
            Err(ApiError::InvalidFields)
        );
        assert_eq!(
            patch_from_body(body(json!({"name": null}))),
            Err(ApiError::InvalidFields)
        );
    }

    #[test]
    fn timestamps_render_with_micros_and_offset() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 10, 20, 30).unwrap()
            + chrono::Duration::microseconds(123_456);
        assert_eq!(iso8601(ts), "2024-05-01T10:20:30.123456+00:00");
    }
}
