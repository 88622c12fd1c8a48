use chrono::{DateTime, Utc};
use sqlx::PgPool;
use storage::{
    dto::user::{CreateUserRequest, TokenResponse, UpdateUserRequest},
    error::Result,
    models::User,
    repository::user::UserRepository,
};
use uuid::Uuid;

use crate::error::{WebError, WebResult};
use crate::jwt::JwtKeys;

pub async fn create_user(pool: &PgPool, request: &CreateUserRequest) -> Result<User> {
    let user = UserRepository::new(pool).create(request).await?;
    tracing::info!(username = %user.username, role = ?user.role, "User created");
    Ok(user)
}

pub async fn update_user(pool: &PgPool, id: Uuid, request: &UpdateUserRequest) -> Result<User> {
    UserRepository::new(pool).update(id, request).await
}

/// Issue a bearer token for an existing user.
pub async fn issue_token(
    pool: &PgPool,
    keys: &JwtKeys,
    id: Uuid,
    now: DateTime<Utc>,
) -> WebResult<TokenResponse> {
    let user = UserRepository::new(pool).find_by_id(id).await?;

    let (token, expires_at) = keys
        .sign(user.user_id, now)
        .map_err(|e| WebError::InternalServerError(e.to_string()))?;

    tracing::info!(username = %user.username, %expires_at, "Token issued");
    Ok(TokenResponse { token, expires_at })
}
