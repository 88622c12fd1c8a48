use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use storage::{
    Database,
    dto::entry::{CreateEntryRequest, EntryFilter, EntryStatusRequest, UpdateEntryRequest},
    models::Entry,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;
use crate::middleware::auth::{AuthUser, Caller};

use super::services;

#[utoipa::path(
    get,
    path = "/api/competitions/{id}/entries",
    params(
        ("id" = Uuid, Path, description = "Competition id"),
        EntryFilter
    ),
    responses(
        (status = 200, description = "Entries visible to the caller", body = Vec<Entry>),
        (status = 403, description = "Competition not visible to the caller"),
        (status = 404, description = "Competition not found")
    ),
    tag = "entries"
)]
pub async fn list_entries(
    State(db): State<Database>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Query(filter): Query<EntryFilter>,
) -> Result<Json<Vec<Entry>>, WebError> {
    let entries = services::list_entries(db.pool(), &caller.actor, id, &filter, Utc::now()).await?;

    Ok(Json(entries))
}

#[utoipa::path(
    get,
    path = "/api/entries/{id}",
    params(
        ("id" = Uuid, Path, description = "Entry id")
    ),
    responses(
        (status = 200, description = "Entry found", body = Entry),
        (status = 403, description = "Entry not visible to the caller"),
        (status = 404, description = "Entry not found")
    ),
    tag = "entries"
)]
pub async fn get_entry(
    State(db): State<Database>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Entry>, WebError> {
    let entry = services::get_entry(db.pool(), &caller.actor, id, Utc::now()).await?;

    Ok(Json(entry))
}

#[utoipa::path(
    post,
    path = "/api/entries",
    request_body = CreateEntryRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Entry registered; the caller owns it", body = Entry),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Competition not found")
    ),
    tag = "entries"
)]
pub async fn create_entry(
    State(db): State<Database>,
    AuthUser(user): AuthUser,
    Json(req): Json<CreateEntryRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let entry = services::register_entry(db.pool(), &user, &req, Utc::now()).await?;

    Ok((StatusCode::CREATED, Json(entry)).into_response())
}

#[utoipa::path(
    put,
    path = "/api/entries/{id}",
    params(
        ("id" = Uuid, Path, description = "Entry id")
    ),
    request_body = UpdateEntryRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Entry updated successfully", body = Entry),
        (status = 400, description = "Validation error or competition locked down"),
        (status = 403, description = "Caller does not own the entry"),
        (status = 404, description = "Entry not found")
    ),
    tag = "entries"
)]
pub async fn update_entry(
    State(db): State<Database>,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateEntryRequest>,
) -> Result<Json<Entry>, WebError> {
    req.validate()?;

    let entry = services::update_entry(db.pool(), &caller.actor, id, &req, Utc::now()).await?;

    Ok(Json(entry))
}

#[utoipa::path(
    delete,
    path = "/api/entries/{id}",
    params(
        ("id" = Uuid, Path, description = "Entry id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Entry deleted successfully"),
        (status = 400, description = "Competition locked down"),
        (status = 403, description = "Caller does not own the entry"),
        (status = 404, description = "Entry not found")
    ),
    tag = "entries"
)]
pub async fn delete_entry(
    State(db): State<Database>,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    services::delete_entry(db.pool(), &caller.actor, id, Utc::now()).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

#[utoipa::path(
    put,
    path = "/api/admin/entries/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Entry id")
    ),
    request_body = EntryStatusRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Entry status changed", body = Entry),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Entry not found")
    ),
    tag = "entries"
)]
pub async fn set_entry_status(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(req): Json<EntryStatusRequest>,
) -> Result<Json<Entry>, WebError> {
    req.validate()?;

    let entry = services::set_entry_status(db.pool(), id, &req).await?;

    Ok(Json(entry))
}
