use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{request::Parts, HeaderMap},
    Json,
};
use serde::de::DeserializeOwned;

use crate::api::errors::ApiError;
use crate::model::SchoolId;

pub const EXPECTED_VERSION_HEADER: &str = "x-expected-version";

/// Positive integer id taken from the `:id` path segment.
///
/// Anything else is answered with 404 before a handler touches storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdParam(pub SchoolId);

#[async_trait]
impl<S> FromRequestParts<S> for IdParam
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::NotFound)?;

        parse_id(&raw).map(IdParam).ok_or(ApiError::NotFound)
    }
}

fn parse_id(raw: &str) -> Option<SchoolId> {
    raw.parse::<SchoolId>().ok().filter(|id| *id >= 1)
}

/// JSON request body whose rejections use the API error envelope
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
        }
    }
}

/// Optional `X-Expected-Version` header sent with updates
pub fn expected_version(headers: &HeaderMap) -> Result<Option<i32>, ApiError> {
    let Some(value) = headers.get(EXPECTED_VERSION_HEADER) else {
        return Ok(None);
    };

    value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse::<i32>().ok())
        .map(Some)
        .ok_or_else(|| {
            ApiError::BadRequest(format!(
                "{} header must be an integer",
                EXPECTED_VERSION_HEADER
            ))
        })
}
