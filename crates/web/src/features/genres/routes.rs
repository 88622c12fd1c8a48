use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use super::handlers::{create_genre, delete_genre, list_genres, update_genre};
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let admin = Router::new()
        .route("/admin/genres", post(create_genre))
        .route("/admin/genres/:id", put(update_genre).delete(delete_genre))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    Router::new().route("/genres", get(list_genres)).merge(admin)
}
