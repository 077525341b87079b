pub mod auth;
pub mod authors;
pub mod convert;
pub mod error;
pub mod extract;
pub mod haikus;
pub mod middleware;
pub mod password;
pub mod validation;
pub mod votes;

use axum::{
    Json, Router,
    routing::{delete, get, post, put},
};
use serde_json::{Value, json};

use crate::auth::AppState;
use crate::error::ApiError;

/// Builds every route. Protected routes sit behind `require_auth`, which
/// rejects the request before the handler runs. It is a route layer, so an
/// unsupported method still gets 405 rather than 401.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/haiku", get(haikus::missing_id).delete(haikus::missing_id))
        .route("/haiku/{id}", get(haikus::get_haiku))
        .route(
            "/allHaikus",
            get(haikus::list_haikus).post(haikus::list_haikus),
        )
        .route("/author", put(authors::register))
        .route("/registerAuthor", post(authors::register))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/haiku", put(haikus::put_haiku))
        .route("/haiku/{id}", delete(haikus::delete_haiku))
        .route("/vote", post(votes::post_vote))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ))
        .with_state(state);

    Router::new().merge(public_routes).merge(protected_routes)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Runs blocking store or hashing work off the async runtime.
pub(crate) async fn run_blocking<F, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("spawn_blocking join error: {e}")))?
}
