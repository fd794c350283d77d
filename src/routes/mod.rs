use axum::Router;

use crate::AppState;

mod health;
mod index;
mod status;

// ---

pub fn router(state: AppState) -> Router {
    // ---
    Router::new()
        .merge(status::router())
        .merge(index::router())
        .merge(health::router())
        .with_state(state)
}
