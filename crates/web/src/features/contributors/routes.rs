use axum::{
    Router,
    routing::{get, put},
};

use super::handlers::{create_contributor, delete_contributor, list_contributors, update_contributor};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/entries/:id/contributors",
            get(list_contributors).post(create_contributor),
        )
        .route(
            "/contributors/:id",
            put(update_contributor).delete(delete_contributor),
        )
}
