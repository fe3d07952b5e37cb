//! Route table and HTTP middleware stack.

mod common;
mod students;

pub use common::common_routes;
pub use students::student_routes;

use crate::error::AppError;
use crate::handlers::common::{method_not_allowed, route_not_found};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    response::{IntoResponse, Response},
    Router,
};
use std::any::Any;
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

pub const BODY_LIMIT_BYTES: usize = 1024 * 1024;

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    AppError::internal("Internal server error.", detail).into_response()
}

/// Full application: probes at the root, students under `/api/students`, envelope 404 for the rest.
/// A known path with the wrong method gets an envelope 405.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .nest("/api/students", student_routes(state))
        .fallback(route_not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(CorsLayer::permissive()),
        )
}
