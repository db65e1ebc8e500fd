use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Request-level error taxonomy. Every variant maps to an HTTP status and a
/// `{"detail": "<message>"}` body.
///
/// Client errors (bad team code, unknown game, missing upstream stats) are
/// kept distinct from `ModelUnavailable`, which reflects a deployment
/// precondition rather than bad input.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Game not found")]
    GameNotFound,

    #[error("Team not found: {0}")]
    TeamNotFound(String),

    #[error("{0}")]
    InvalidInput(String),

    /// Required per-team statistics are absent from the model bundle.
    /// Names the offending team(s) so the client can tell which side is bad.
    #[error("Missing stats for teams: {}", .0.join(", "))]
    MissingStats(Vec<String>),

    #[error("Model not loaded. Run the train-model binary first.")]
    ModelUnavailable,

    /// Every fallback tier failed; only then does a provider outage surface.
    #[error("Upstream data source unavailable: {0}")]
    Upstream(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::GameNotFound => StatusCode::NOT_FOUND,
            ApiError::TeamNotFound(_) | ApiError::InvalidInput(_) | ApiError::MissingStats(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::ModelUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_400_class() {
        assert_eq!(ApiError::TeamNotFound("XXX".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::MissingStats(vec!["LAL".into()]).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::GameNotFound.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn model_unavailable_is_a_server_error() {
        assert_eq!(
            ApiError::ModelUnavailable.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn missing_stats_names_every_offending_team() {
        let err = ApiError::MissingStats(vec!["LAL".into(), "BOS".into()]);
        let msg = err.to_string();
        assert!(msg.contains("LAL") && msg.contains("BOS"), "{}", msg);
    }
}
