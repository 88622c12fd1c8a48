use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use storage::{
    Database,
    dto::contributor::{CreateContributorRequest, UpdateContributorRequest},
    models::Contributor,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::middleware::auth::Caller;

use super::services;

#[utoipa::path(
    get,
    path = "/api/entries/{id}/contributors",
    params(
        ("id" = Uuid, Path, description = "Entry id")
    ),
    responses(
        (status = 200, description = "Contributors of the entry", body = Vec<Contributor>),
        (status = 403, description = "Entry not visible to the caller"),
        (status = 404, description = "Entry not found")
    ),
    tag = "contributors"
)]
pub async fn list_contributors(
    State(db): State<Database>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Contributor>>, WebError> {
    let contributors = services::list_contributors(db.pool(), &caller.actor, id, Utc::now()).await?;

    Ok(Json(contributors))
}

#[utoipa::path(
    post,
    path = "/api/entries/{id}/contributors",
    params(
        ("id" = Uuid, Path, description = "Entry id")
    ),
    request_body = CreateContributorRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Contributor added", body = Contributor),
        (status = 400, description = "Validation error or competition locked down"),
        (status = 403, description = "Caller does not own the entry"),
        (status = 404, description = "Entry not found"),
        (status = 409, description = "User already contributes to the entry")
    ),
    tag = "contributors"
)]
pub async fn create_contributor(
    State(db): State<Database>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateContributorRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let contributor = services::add_contributor(db.pool(), &caller.actor, id, &req, Utc::now()).await?;

    Ok((StatusCode::CREATED, Json(contributor)).into_response())
}

#[utoipa::path(
    put,
    path = "/api/contributors/{id}",
    params(
        ("id" = Uuid, Path, description = "Contributor id")
    ),
    request_body = UpdateContributorRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Contributor updated", body = Contributor),
        (status = 400, description = "Validation error or competition locked down"),
        (status = 403, description = "Not allowed to change this contributor"),
        (status = 404, description = "Contributor not found")
    ),
    tag = "contributors"
)]
pub async fn update_contributor(
    State(db): State<Database>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateContributorRequest>,
) -> Result<Json<Contributor>, WebError> {
    req.validate()?;

    let contributor =
        services::update_contributor(db.pool(), &caller.actor, id, &req, Utc::now()).await?;

    Ok(Json(contributor))
}

#[utoipa::path(
    delete,
    path = "/api/contributors/{id}",
    params(
        ("id" = Uuid, Path, description = "Contributor id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Contributor removed"),
        (status = 400, description = "Competition locked down"),
        (status = 403, description = "Not allowed to remove this contributor"),
        (status = 404, description = "Contributor not found")
    ),
    tag = "contributors"
)]
pub async fn delete_contributor(
    State(db): State<Database>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    services::delete_contributor(db.pool(), &caller.actor, id, Utc::now()).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
