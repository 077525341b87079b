use axum::{Json, extract::State, response::IntoResponse};
use tracing::info;

use haiku_types::api::{RegisterAuthorRequest, RegisterAuthorResponse};

use crate::auth::{AppState, RegistrationPolicy};
use crate::error::ApiError;
use crate::extract::ValidJson;
use crate::password::check_strength;
use crate::run_blocking;
use crate::validation::{check_required, is_profane, parse_email, valid_username};

/// PUT /author (and POST /registerAuthor)
pub async fn register(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<RegisterAuthorRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = validate_registration(&req, &state.registration)?;

    // Hashing and the insert are both blocking
    let author = run_blocking(move || {
        let password_hash = state.hasher.hash(&req.password)?;
        Ok(state
            .db
            .create_author(&req.username, &password_hash, email.as_deref())?)
    })
    .await?;

    info!("Registered author '{}' (id {})", author.username, author.id);

    Ok(Json(RegisterAuthorResponse {
        username: author.username,
        email: author.email.unwrap_or_default(),
    }))
}

/// Runs every check that must pass before anything is hashed or written.
/// Returns the normalised email address, if one was given.
pub fn validate_registration(
    req: &RegisterAuthorRequest,
    policy: &RegistrationPolicy,
) -> Result<Option<String>, ApiError> {
    let mut required = vec![("username", req.username.as_str()), ("password", req.password.as_str())];
    if policy.require_email {
        required.push(("email", req.email.as_str()));
    }
    check_required(&required)?;

    if !valid_username(&req.username) {
        return Err(ApiError::Validation(
            "illegal characters detected in 'username' field. Alphanumeric characters and '-', '_' allowed"
                .to_string(),
        ));
    }

    if is_profane(&req.username) {
        return Err(ApiError::Validation(
            "profanity detected in 'username' field".to_string(),
        ));
    }

    let email = if req.email.trim().is_empty() {
        None
    } else {
        Some(parse_email(&req.email).ok_or_else(|| {
            ApiError::Validation(
                "request body field 'email' must be a standard email address".to_string(),
            )
        })?)
    };

    check_strength(&req.password, policy.min_password_entropy)?;

    Ok(email)
}
