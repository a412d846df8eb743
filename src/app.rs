use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/moods", post(handlers::submit_mood))
        .route("/today", get(handlers::today))
        .route("/api/today", get(handlers::get_today))
        .route("/api/moods", post(handlers::create_mood))
        .with_state(state)
}
