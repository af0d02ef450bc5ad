use axum::Router;

use crate::AppState;

mod health;
mod identify;
mod plants;

// ---

pub fn router(state: AppState) -> Router {
    // ---
    Router::new()
        .merge(identify::router())
        .merge(plants::router())
        .merge(health::router())
        .with_state(state)
}
