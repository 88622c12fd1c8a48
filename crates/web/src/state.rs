use axum::extract::FromRef;
use storage::Database;

use crate::jwt::JwtKeys;
use crate::middleware::auth::ApiKeys;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub api_keys: ApiKeys,
    pub jwt: JwtKeys,
}

impl FromRef<AppState> for Database {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}
