use axum::{
    routing::{delete, get, post, put, MethodRouter},
    Router,
};

pub mod system;
pub mod users;

/// Router for every endpoint. Paths keep their trailing slash.
pub fn router() -> Router {
    Router::new()
        .route("/", json_405(get(system::hello)))
        .route("/health/", json_405(get(system::health)))
        .route("/api/users/", json_405(get(users::list_users)))
        .route("/api/users/create/", json_405(post(users::create_user)))
        .route("/api/users/:user_id/", json_405(get(users::get_user)))
        .route("/api/users/:user_id/update/", json_405(put(users::update_user)))
        .route("/api/users/:user_id/delete/", json_405(delete(users::delete_user)))
}

/// Known path, unsupported method: answer with the failure envelope.
fn json_405(route: MethodRouter) -> MethodRouter {
    route.fallback(system::method_not_allowed)
}
