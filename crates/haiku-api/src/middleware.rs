use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::auth::{AppState, Authentication, authenticate};
use crate::error::ApiError;
use crate::run_blocking;

/// Authenticates the `Authorization` header on every protected route and
/// stores the `Author` as a request extension. Any failure ends the request
/// here; the handler never runs.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(ApiError::Unauthenticated)?
        .to_str()
        .map_err(|_| ApiError::MalformedCredentials)?
        .to_owned();

    let outcome = run_blocking(move || authenticate(&state.db, &state.hasher, &header)).await?;

    match outcome {
        Authentication::Authenticated(author) => {
            req.extensions_mut().insert(author);
            Ok(next.run(req).await)
        }
        Authentication::Unauthenticated => Err(ApiError::Unauthenticated),
    }
}
