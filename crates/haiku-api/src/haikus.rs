use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::{debug, info};

use haiku_types::api::{
    DeleteHaikuResponse, HaikuResponse, ListHaikusRequest, ListHaikusResponse, PutHaikuRequest,
};
use haiku_types::models::Author;

use crate::auth::AppState;
use crate::convert::haiku_from_row;
use crate::error::ApiError;
use crate::extract::ValidJson;
use crate::run_blocking;
use crate::validation::{check_page, check_required, parse_id};

/// PUT /haiku. The authenticated author becomes the owner.
pub async fn put_haiku(
    State(state): State<AppState>,
    Extension(author): Extension<Author>,
    ValidJson(req): ValidJson<PutHaikuRequest>,
) -> Result<impl IntoResponse, ApiError> {
    check_required(&[("text", req.text.as_str())])?;

    let author_id = author.id;
    let row = run_blocking(move || Ok(state.db.insert_haiku(&req.text, &req.tags, author_id)?)).await?;

    info!("Author {} posted haiku {}", author_id, row.id);
    Ok(Json(HaikuResponse {
        haiku: haiku_from_row(row),
    }))
}

/// GET /haiku/{id}
pub async fn get_haiku(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id, "haiku id")?;

    let row = run_blocking(move || Ok(state.db.get_haiku(id)?))
        .await?
        .ok_or_else(|| ApiError::NotFound("haiku not found!".to_string()))?;

    Ok(Json(HaikuResponse {
        haiku: haiku_from_row(row),
    }))
}

/// POST /allHaikus. The body is optional; an empty one means defaults.
pub async fn list_haikus(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let req = if body.iter().all(u8::is_ascii_whitespace) {
        ListHaikusRequest::default()
    } else {
        serde_json::from_slice::<ListHaikusRequest>(&body).map_err(|e| {
            ApiError::Validation(format!(
                "'limit' and 'skip' must be numbers: {e}"
            ))
        })?
    };
    let (limit, skip) = check_page(req.limit, req.skip)?;

    let rows = run_blocking(move || Ok(state.db.list_haikus(limit, skip)?)).await?;
    debug!("Listed {} haikus (limit {}, skip {})", rows.len(), limit, skip);

    Ok(Json(ListHaikusResponse {
        haikus: rows.into_iter().map(haiku_from_row).collect(),
    }))
}

/// DELETE /haiku/{id}. Only the owner's delete touches a row. Someone
/// else's haiku looks exactly like a missing one.
pub async fn delete_haiku(
    State(state): State<AppState>,
    Extension(author): Extension<Author>,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&raw_id, "haiku id")?;

    let author_id = author.id;
    let deleted = run_blocking(move || Ok(state.db.delete_haiku(id, author_id)?)).await?;
    if !deleted {
        return Err(ApiError::NotFound(format!("haiku with ID '{raw_id}' not found")));
    }

    info!("Author {} deleted haiku {}", author_id, id);
    Ok(Json(DeleteHaikuResponse { haiku_id: id }))
}

/// GET /haiku and DELETE /haiku without an id.
pub async fn missing_id() -> ApiError {
    ApiError::Validation("haiku id parameter required: /haiku/{id}".to_string())
}
