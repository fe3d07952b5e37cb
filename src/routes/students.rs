//! Student routes, nested under `/api/students`.
//! Static segments (`/check-roll`, `/list`) take priority over `/:id`.

use crate::handlers::students::{check_roll, create, delete as delete_handler, list, read, update};
use crate::state::AppState;
use axum::{
    routing::{delete, get, post, put},
    Router,
};

pub fn student_routes(state: AppState) -> Router {
    Router::new()
        .route("/check-roll", get(check_roll))
        .route("/list", get(list))
        .route("/:id", get(read))
        .route("/create", post(create))
        .route("/update/:id", put(update))
        .route("/delete/:id", delete(delete_handler))
        .with_state(state)
}
