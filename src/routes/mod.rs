// Route definitions

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::AppState;

mod tools;

pub fn create_router(app_state: AppState) -> Router {
    // Tool listing and invocation
    let api_router = Router::new()
        .route("/tools", get(tools::list_tools))
        .route("/tools/:name", post(tools::call_tool))
        .with_state(app_state);

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest("/api", api_router)
        .layer(TraceLayer::new_for_http())
}
