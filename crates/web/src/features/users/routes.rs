use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use super::handlers::{create_user, get_me, issue_token, update_user};
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let admin = Router::new()
        .route("/admin/users", post(create_user))
        .route("/admin/users/:id", put(update_user))
        .route("/admin/users/:id/token", post(issue_token))
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    Router::new().route("/users/me", get(get_me)).merge(admin)
}
