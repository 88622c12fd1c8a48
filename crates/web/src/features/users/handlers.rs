use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use storage::{
    Database,
    dto::user::{CreateUserRequest, TokenResponse, UpdateUserRequest},
    models::User,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::jwt::JwtKeys;
use crate::middleware::auth::AuthUser;

use super::services;

#[utoipa::path(
    get,
    path = "/api/users/me",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "The authenticated user", body = User),
        (status = 401, description = "Unauthorized")
    ),
    tag = "users"
)]
pub async fn get_me(AuthUser(user): AuthUser) -> Json<User> {
    Json(user)
}

#[utoipa::path(
    post,
    path = "/api/admin/users",
    request_body = CreateUserRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Username already exists")
    ),
    tag = "users"
)]
pub async fn create_user(
    State(db): State<Database>,
    Json(req): Json<CreateUserRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let user = services::create_user(db.pool(), &req).await?;

    Ok((StatusCode::CREATED, Json(user)).into_response())
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{id}",
    params(
        ("id" = Uuid, Path, description = "User id")
    ),
    request_body = UpdateUserRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn update_user(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<User>, WebError> {
    req.validate()?;

    let user = services::update_user(db.pool(), id, &req).await?;

    Ok(Json(user))
}

#[utoipa::path(
    post,
    path = "/api/admin/users/{id}/token",
    params(
        ("id" = Uuid, Path, description = "User id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Bearer token issued", body = TokenResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn issue_token(
    State(db): State<Database>,
    State(keys): State<JwtKeys>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    let token = services::issue_token(db.pool(), &keys, id, Utc::now()).await?;

    Ok((StatusCode::CREATED, Json(token)).into_response())
}
