use axum::{Router, routing::get};

use super::handlers::health;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
