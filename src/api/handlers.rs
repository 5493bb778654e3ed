use axum::{
    extract::State,
    http::{header::LOCATION, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Json},
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::api::errors::{envelope, ApiError};
use crate::api::extract::{expected_version, IdParam, JsonBody};
use crate::logic::Validator;
use crate::model::{validate_new_school, validate_school, NewSchool, UpdateSchool};
use crate::store::{SchoolStore, StoreError};

/// State shared by every handler
#[derive(Debug)]
pub struct AppState<S> {
    pub store: S,
    pub environment: String,
}

pub type SharedState<S> = Arc<AppState<S>>;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub environment: String,
    pub version: String,
}

pub async fn healthcheck<S: SchoolStore>(
    State(app): State<SharedState<S>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "available".to_string(),
        environment: app.environment.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn create_school<S: SchoolStore>(
    State(app): State<SharedState<S>>,
    JsonBody(input): JsonBody<NewSchool>,
) -> Result<impl IntoResponse, ApiError> {
    let mut v = Validator::new();
    validate_new_school(&mut v, &input);
    if !v.valid() {
        return Err(ApiError::FailedValidation(v.into_errors()));
    }

    let school = app.store.insert_school(input).await?;
    log::info!("Created school {} ({})", school.id, school.name);

    let mut headers = HeaderMap::new();
    let location =
        HeaderValue::from_str(&school.location()).map_err(|e| ApiError::Internal(e.into()))?;
    headers.insert(LOCATION, location);

    Ok((StatusCode::CREATED, headers, envelope("school", &school)?))
}

pub async fn show_school<S: SchoolStore>(
    State(app): State<SharedState<S>>,
    IdParam(id): IdParam,
) -> Result<Json<Value>, ApiError> {
    let school = app.store.get_school(id).await?;
    envelope("school", &school)
}

/// Partial update: only fields present in the body change, and the write
/// is rejected if the school changed since it was read.
pub async fn update_school<S: SchoolStore>(
    State(app): State<SharedState<S>>,
    IdParam(id): IdParam,
    headers: HeaderMap,
    JsonBody(input): JsonBody<UpdateSchool>,
) -> Result<Json<Value>, ApiError> {
    let mut school = app.store.get_school(id).await?;

    if let Some(expected) = expected_version(&headers)? {
        if expected != school.version {
            log::warn!(
                "Edit conflict on school {}: expected version {}, found {}",
                id,
                expected,
                school.version
            );
            return Err(ApiError::EditConflict);
        }
    }

    school.apply(input);

    let mut v = Validator::new();
    validate_school(&mut v, &school);
    if !v.valid() {
        return Err(ApiError::FailedValidation(v.into_errors()));
    }

    let school = app.store.update_school(&school).await.map_err(|e| {
        if matches!(e, StoreError::EditConflict) {
            log::warn!("Edit conflict on school {} at version {}", id, school.version);
        }
        ApiError::from(e)
    })?;
    log::info!("Updated school {} to version {}", school.id, school.version);

    envelope("school", &school)
}

pub async fn delete_school<S: SchoolStore>(
    State(app): State<SharedState<S>>,
    IdParam(id): IdParam,
) -> Result<Json<Value>, ApiError> {
    app.store.delete_school(id).await?;
    log::info!("Deleted school {}", id);

    envelope("message", &"school successfully deleted")
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
