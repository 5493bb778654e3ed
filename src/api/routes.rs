use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;

use crate::api::handlers::{self, AppState, SharedState};
use crate::store::SchoolStore;

pub fn create_router<S: SchoolStore + 'static>() -> Router<SharedState<S>> {
    Router::new()
        // Health check
        .route("/v1/healthcheck", get(handlers::healthcheck::<S>))
        // Schools
        .route("/v1/schools", post(handlers::create_school::<S>))
        .route(
            "/v1/schools/:id",
            get(handlers::show_school::<S>)
                .patch(handlers::update_school::<S>)
                .delete(handlers::delete_school::<S>),
        )
        .fallback(handlers::not_found)
}

/// Router with state and the request timeout applied, ready to serve
pub fn build_app<S: SchoolStore + 'static>(
    store: S,
    environment: &str,
    request_timeout: Duration,
) -> Router {
    let state = Arc::new(AppState {
        store,
        environment: environment.to_string(),
    });

    create_router()
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}
