use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use super::handlers::{
    create_entry, delete_entry, get_entry, list_entries, set_entry_status, update_entry,
};
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let admin = Router::new()
        .route("/admin/entries/:id/status", put(set_entry_status))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    Router::new()
        .route("/competitions/:id/entries", get(list_entries))
        .route("/entries", post(create_entry))
        .route(
            "/entries/:id",
            get(get_entry).put(update_entry).delete(delete_entry),
        )
        .merge(admin)
}
