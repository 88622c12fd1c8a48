use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use storage::{
    Database,
    dto::vote::{CastVoteRequest, UpdateVoteRequest},
    models::Vote,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::middleware::auth::{AuthUser, Caller};

use super::services;

#[utoipa::path(
    get,
    path = "/api/votes",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Votes cast by the caller", body = Vec<Vote>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "votes"
)]
pub async fn list_votes(
    State(db): State<Database>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<Vote>>, WebError> {
    let votes = services::list_own_votes(db.pool(), &user).await?;

    Ok(Json(votes))
}

#[utoipa::path(
    post,
    path = "/api/votes",
    request_body = CastVoteRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Vote cast; entry scores recomputed", body = Vote),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Entry not found")
    ),
    tag = "votes"
)]
pub async fn create_vote(
    State(db): State<Database>,
    AuthUser(user): AuthUser,
    Json(req): Json<CastVoteRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let vote = services::cast_vote(db.pool(), &user, &req, Utc::now()).await?;

    Ok((StatusCode::CREATED, Json(vote)).into_response())
}

#[utoipa::path(
    put,
    path = "/api/votes/{id}",
    params(
        ("id" = Uuid, Path, description = "Vote id")
    ),
    request_body = UpdateVoteRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Vote updated; entry scores recomputed", body = Vote),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Vote belongs to someone else"),
        (status = 404, description = "Vote not found")
    ),
    tag = "votes"
)]
pub async fn update_vote(
    State(db): State<Database>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateVoteRequest>,
) -> Result<Json<Vote>, WebError> {
    req.validate()?;

    let vote = services::update_vote(db.pool(), &caller.actor, id, &req, Utc::now()).await?;

    Ok(Json(vote))
}

#[utoipa::path(
    delete,
    path = "/api/votes/{id}",
    params(
        ("id" = Uuid, Path, description = "Vote id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Vote deleted; entry scores recomputed"),
        (status = 403, description = "Vote belongs to someone else"),
        (status = 404, description = "Vote not found")
    ),
    tag = "votes"
)]
pub async fn delete_vote(
    State(db): State<Database>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    services::delete_vote(db.pool(), &caller.actor, id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
