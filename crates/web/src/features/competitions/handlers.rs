use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use storage::{
    Database,
    dto::{
        common::PaginatedResponse,
        competition::{CompetitionFilter, CompetitionRequest, CompetitionResponse},
    },
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::middleware::auth::Caller;

use super::services;

#[utoipa::path(
    get,
    path = "/api/competitions",
    params(CompetitionFilter),
    responses(
        (status = 200, description = "Competitions visible to the caller", body = PaginatedResponse<CompetitionResponse>),
        (status = 400, description = "Invalid query parameters")
    ),
    tag = "competitions"
)]
pub async fn list_competitions(
    State(db): State<Database>,
    caller: Caller,
    Query(filter): Query<CompetitionFilter>,
) -> Result<Response, WebError> {
    let pagination = filter.pagination();
    pagination.validate().map_err(WebError::BadRequest)?;

    let (competitions, total_items) =
        services::list_competitions(db.pool(), &caller.actor, &filter, Utc::now()).await?;

    let response = PaginatedResponse::new(
        competitions,
        pagination.page,
        pagination.page_size,
        total_items,
    );

    Ok(Json(response).into_response())
}

#[utoipa::path(
    get,
    path = "/api/competitions/{id}",
    params(
        ("id" = Uuid, Path, description = "Competition id")
    ),
    responses(
        (status = 200, description = "Competition found", body = CompetitionResponse),
        (status = 403, description = "Competition not visible to the caller"),
        (status = 404, description = "Competition not found")
    ),
    tag = "competitions"
)]
pub async fn get_competition(
    State(db): State<Database>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<CompetitionResponse>, WebError> {
    let competition = services::get_competition(db.pool(), &caller.actor, id, Utc::now()).await?;

    Ok(Json(competition))
}

#[utoipa::path(
    post,
    path = "/api/admin/competitions",
    request_body = CompetitionRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Competition created successfully", body = CompetitionResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Name already exists")
    ),
    tag = "competitions"
)]
pub async fn create_competition(
    State(db): State<Database>,
    Json(req): Json<CompetitionRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let competition = services::save_competition(db.pool(), None, &req, Utc::now()).await?;

    Ok((StatusCode::CREATED, Json(competition)).into_response())
}

#[utoipa::path(
    put,
    path = "/api/admin/competitions/{id}",
    params(
        ("id" = Uuid, Path, description = "Competition id")
    ),
    request_body = CompetitionRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Competition updated successfully", body = CompetitionResponse),
        (status = 400, description = "Validation error or competition locked down"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Competition not found"),
        (status = 409, description = "Name already exists")
    ),
    tag = "competitions"
)]
pub async fn update_competition(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(req): Json<CompetitionRequest>,
) -> Result<Json<CompetitionResponse>, WebError> {
    req.validate()?;

    let competition = services::save_competition(db.pool(), Some(id), &req, Utc::now()).await?;

    Ok(Json(competition))
}

#[utoipa::path(
    delete,
    path = "/api/admin/competitions/{id}",
    params(
        ("id" = Uuid, Path, description = "Competition id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Competition deleted successfully"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Competition not found"),
        (status = 409, description = "Competition has entries")
    ),
    tag = "competitions"
)]
pub async fn delete_competition(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    services::delete_competition(db.pool(), id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
