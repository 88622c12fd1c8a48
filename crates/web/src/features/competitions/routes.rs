use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use super::handlers::{
    create_competition, delete_competition, get_competition, list_competitions, update_competition,
};
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let admin = Router::new()
        .route("/admin/competitions", post(create_competition))
        .route(
            "/admin/competitions/:id",
            put(update_competition).delete(delete_competition),
        )
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    Router::new()
        .route("/competitions", get(list_competitions))
        .route("/competitions/:id", get(get_competition))
        .merge(admin)
}
