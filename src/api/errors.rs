use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use thiserror::Error;

use crate::store::StoreError;

/// Errors a handler can answer with. Each kind maps to one status code and
/// an `{"error": ...}` envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("the requested resource could not be found")]
    NotFound,

    #[error("unable to update the record due to an edit conflict, please try again")]
    EditConflict,

    /// Field name to the first rule it broke
    #[error("failed validation")]
    FailedValidation(HashMap<String, String>),

    #[error("the server encountered a problem and could not process your request")]
    Internal(#[source] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::EditConflict => StatusCode::CONFLICT,
            ApiError::FailedValidation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound,
            StoreError::EditConflict => ApiError::EditConflict,
            StoreError::Storage(e) => ApiError::Internal(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            ApiError::FailedValidation(errors) => json!({ "error": errors }),
            ApiError::Internal(cause) => {
                // The cause stays in the log, the client gets the generic message
                log::error!("{}: {:#}", self, cause);
                json!({ "error": self.to_string() })
            }
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

/// Wrap `payload` under `key`, e.g. `{"school": {...}}`
pub fn envelope<T: Serialize>(key: &str, payload: &T) -> Result<Json<Value>, ApiError> {
    let value = serde_json::to_value(payload).map_err(|e| ApiError::Internal(e.into()))?;
    Ok(Json(json!({ key: value })))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_store_errors_stay_distinct() {
        assert!(matches!(ApiError::from(StoreError::NotFound), ApiError::NotFound));
        assert!(matches!(
            ApiError::from(StoreError::EditConflict),
            ApiError::EditConflict
        ));
        assert!(matches!(
            ApiError::from(StoreError::Storage(anyhow::anyhow!("connection reset"))),
            ApiError::Internal(_)
        ));
    }

    #[tokio::test]
    async fn test_status_codes_and_bodies() {
        let response = ApiError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await["error"],
            "the requested resource could not be found"
        );

        let response = ApiError::EditConflict.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = ApiError::BadRequest("body must not be empty".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "body must not be empty");
    }

    #[tokio::test]
    async fn test_validation_body_lists_every_field() {
        let errors = HashMap::from([
            ("name".to_string(), "must be provided".to_string()),
            ("mode".to_string(), "must contain at least 1 entry".to_string()),
        ]);
        let response = ApiError::FailedValidation(errors).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["error"]["name"], "must be provided");
        assert_eq!(body["error"]["mode"], "must contain at least 1 entry");
    }

    #[tokio::test]
    async fn test_internal_error_hides_cause() {
        let response =
            ApiError::Internal(anyhow::anyhow!("password authentication failed")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(
            body["error"],
            "the server encountered a problem and could not process your request"
        );
    }

    #[test]
    fn test_envelope_wraps_under_key() {
        let Json(value) = envelope("message", &"school successfully deleted").unwrap();
        assert_eq!(value, json!({ "message": "school successfully deleted" }));
    }
}
