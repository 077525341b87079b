use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use regex::Regex;

use crate::error::ApiError;
use crate::validation::required_field_error;

/// `Json` whose rejections come back in the `{"errors": [...]}` envelope.
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::InvalidBody(vec![describe_rejection(&rejection)])),
        }
    }
}

fn describe_rejection(rejection: &JsonRejection) -> String {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            "request body must be JSON ('Content-Type: application/json')".to_string()
        }
        JsonRejection::JsonDataError(_) => describe_data_error(&rejection.body_text()),
        _ => "request body is not valid JSON".to_string(),
    }
}

/// Turns serde's `missing field `text`` into the message clients already
/// handle; other shape errors pass through without axum's prefix.
fn describe_data_error(text: &str) -> String {
    let missing = Regex::new(r"missing field `([^`]+)`")
        .ok()
        .and_then(|regex| regex.captures(text).map(|caps| caps[1].to_string()));

    match missing {
        Some(field) => required_field_error(&field),
        None => text
            .split_once(": ")
            .map_or(text, |(_, detail)| detail)
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_is_rewritten() {
        let text = "Failed to deserialize the JSON body into the target type: missing field `text` at line 1 column 2";
        assert_eq!(
            describe_data_error(text),
            "request body requires a non-zero length 'text' field"
        );
    }

    #[test]
    fn other_data_errors_lose_prefix() {
        let text = "Failed to deserialize the JSON body into the target type: direction: invalid type: string \"up\", expected i64 at line 1 column 20";
        assert_eq!(
            describe_data_error(text),
            "direction: invalid type: string \"up\", expected i64 at line 1 column 20"
        );
    }
}
