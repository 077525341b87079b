use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::info;

use haiku_db::Database;
use haiku_db::models::VoteChange;
use haiku_types::api::{VoteRequest, VoteResponse};
use haiku_types::models::Author;
use haiku_types::votes::{VoteDirection, VoteOutcome};

use crate::auth::AppState;
use crate::convert::vote_from_row;
use crate::error::ApiError;
use crate::extract::ValidJson;
use crate::run_blocking;
use crate::validation::parse_id;

/// Resolves a vote request against the stored vote for `(author_id, haiku_id)`.
///
/// | stored | requested | result |
/// |---|---|---|
/// | none | neutral | `InvalidDirection` |
/// | some | neutral | `Removed` |
/// | none | up/down | `Created` |
/// | opposite | up/down | `Updated` |
/// | same | up/down | `Unchanged` |
///
/// Each branch is a single atomic store call; the unique constraint on the
/// pair keeps concurrent first votes down to one row.
pub fn reconcile(
    db: &Database,
    author_id: i64,
    haiku_id: i64,
    direction: VoteDirection,
) -> Result<VoteOutcome, ApiError> {
    let Some(upvoted) = direction.upvoted() else {
        return match db.remove_vote(author_id, haiku_id)? {
            Some(_) => Ok(VoteOutcome::Removed),
            None => Err(ApiError::InvalidDirection),
        };
    };

    let (row, change) = db.upsert_vote(author_id, haiku_id, upvoted)?;
    let vote = vote_from_row(row);

    Ok(match change {
        VoteChange::Inserted => VoteOutcome::Created(vote),
        VoteChange::Flipped => VoteOutcome::Updated(vote),
        VoteChange::Unchanged => VoteOutcome::Unchanged(vote),
    })
}

/// POST /vote
pub async fn post_vote(
    State(state): State<AppState>,
    Extension(author): Extension<Author>,
    ValidJson(req): ValidJson<VoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let haiku_id = parse_id(&req.haiku_id, "'haikuId'")?;
    let direction = VoteDirection::try_from(req.direction).map_err(|value| {
        ApiError::Validation(format!(
            "vote 'direction' must be -1, 0 or 1, got {value}"
        ))
    })?;

    let author_id = author.id;
    let outcome =
        run_blocking(move || reconcile(&state.db, author_id, haiku_id, direction)).await?;

    match outcome.vote() {
        Some(vote) => {
            info!(
                "Author {} voted on haiku {} (upvoted: {})",
                author_id, haiku_id, vote.upvoted
            );
            Ok(Json(VoteResponse { vote_id: vote.id }).into_response())
        }
        None => {
            info!("Author {} removed their vote on haiku {}", author_id, haiku_id);
            Ok(StatusCode::NO_CONTENT.into_response())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Database, i64, i64) {
        let db = Database::open_in_memory().unwrap();
        let author = db.create_author("alice", "h", None).unwrap().id;
        let haiku = db.insert_haiku("old pond", "", author).unwrap().id;
        (db, author, haiku)
    }

    fn stored(db: &Database, author: i64, haiku: i64) -> Option<bool> {
        db.get_vote(author, haiku).unwrap().map(|v| v.upvoted)
    }

    #[test]
    fn neutral_without_vote_is_rejected() {
        let (db, author, haiku) = setup();
        let err = reconcile(&db, author, haiku, VoteDirection::Neutral).unwrap_err();
        assert!(matches!(err, ApiError::InvalidDirection));
        assert_eq!(stored(&db, author, haiku), None);
    }

    #[test]
    fn up_then_up_is_idempotent() {
        let (db, author, haiku) = setup();

        let first = reconcile(&db, author, haiku, VoteDirection::Up).unwrap();
        let second = reconcile(&db, author, haiku, VoteDirection::Up).unwrap();

        let created = match first {
            VoteOutcome::Created(vote) => vote,
            other => panic!("expected Created, got {other:?}"),
        };
        assert_eq!(second, VoteOutcome::Unchanged(created));
        assert_eq!(stored(&db, author, haiku), Some(true));
    }

    #[test]
    fn up_then_down_flips() {
        let (db, author, haiku) = setup();

        reconcile(&db, author, haiku, VoteDirection::Up).unwrap();
        let outcome = reconcile(&db, author, haiku, VoteDirection::Down).unwrap();

        assert!(matches!(&outcome, VoteOutcome::Updated(v) if !v.upvoted));
        assert_eq!(stored(&db, author, haiku), Some(false));
    }

    #[test]
    fn up_then_neutral_removes_then_rejects() {
        let (db, author, haiku) = setup();

        reconcile(&db, author, haiku, VoteDirection::Up).unwrap();
        assert_eq!(
            reconcile(&db, author, haiku, VoteDirection::Neutral).unwrap(),
            VoteOutcome::Removed
        );
        assert_eq!(stored(&db, author, haiku), None);

        let err = reconcile(&db, author, haiku, VoteDirection::Neutral).unwrap_err();
        assert!(matches!(err, ApiError::InvalidDirection));
    }

    #[test]
    fn vote_on_missing_haiku() {
        let (db, author, _) = setup();
        let err = reconcile(&db, author, 404, VoteDirection::Up).unwrap_err();
        assert!(matches!(err, ApiError::ReferenceViolation));
    }
}
