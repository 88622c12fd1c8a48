use axum::{
    Router,
    routing::{get, put},
};

use super::handlers::{create_vote, delete_vote, list_votes, update_vote};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/votes", get(list_votes).post(create_vote))
        .route("/votes/:id", put(update_vote).delete(delete_vote))
}
