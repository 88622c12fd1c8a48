use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use std::collections::HashSet;
use storage::domain::policy::{Actor, UserActor};
use storage::error::StorageError;
use storage::models::User;
use storage::repository::user::UserRepository;

use crate::error::WebError;
use crate::state::AppState;

#[derive(Clone)]
pub struct ApiKeys {
    keys: HashSet<String>,
}

impl ApiKeys {
    pub fn from_comma_separated(keys_str: &str) -> Self {
        let keys = keys_str
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        Self { keys }
    }

    pub fn is_valid(&self, key: &str) -> bool {
        self.keys.contains(key)
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, WebError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(Some)
        .ok_or(WebError::Unauthorized)
}

/// Whoever is making the request. Requests without credentials are
/// anonymous; invalid credentials are rejected outright.
pub struct Caller {
    pub actor: Actor,
    pub user: Option<User>,
}

impl Caller {
    async fn resolve(state: &AppState, headers: &HeaderMap) -> Result<Self, WebError> {
        let Some(token) = bearer_token(headers)? else {
            return Ok(Self {
                actor: Actor::Anonymous,
                user: None,
            });
        };

        if state.api_keys.is_valid(token) {
            return Ok(Self {
                actor: Actor::Admin,
                user: None,
            });
        }

        let claims = state.jwt.verify(token).map_err(|e| {
            tracing::warn!("Rejected bearer token: {}", e);
            WebError::Unauthorized
        })?;

        let user = match UserRepository::new(state.db.pool()).find_by_id(claims.sub).await {
            Ok(user) => user,
            Err(StorageError::NotFound) => return Err(WebError::Unauthorized),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            actor: Actor::User(UserActor {
                user_id: user.user_id,
                role: user.role,
                is_staff: user.is_staff,
            }),
            user: Some(user),
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        Self::resolve(&state, &parts.headers).await
    }
}

/// A caller authenticated as a user account (not an API key).
pub struct AuthUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Caller::from_request_parts(parts, state)
            .await?
            .user
            .map(AuthUser)
            .ok_or(WebError::Unauthorized)
    }
}

/// Gate for `/admin` routes: admin API keys and staff users only.
pub async fn require_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, WebError> {
    let caller = Caller::resolve(&state, request.headers()).await?;

    match caller.actor {
        Actor::Anonymous => Err(WebError::Unauthorized),
        actor if actor.is_privileged() => Ok(next.run(request).await),
        _ => {
            tracing::warn!("Non-staff user attempted an admin operation");
            Err(WebError::Forbidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_api_keys_parsing() {
        let keys = ApiKeys::from_comma_separated(" alpha, beta ,,");
        assert!(keys.is_valid("alpha"));
        assert!(keys.is_valid("beta"));
        assert!(!keys.is_valid(""));
        assert!(!keys.is_valid("gamma"));
    }

    #[test]
    fn test_empty_api_keys_accept_nothing() {
        let keys = ApiKeys::from_comma_separated("");
        assert!(!keys.is_valid(""));
    }

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert!(matches!(bearer_token(&headers), Ok(None)));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert!(matches!(bearer_token(&headers), Ok(Some("abc"))));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(matches!(bearer_token(&headers), Err(WebError::Unauthorized)));
    }
}
