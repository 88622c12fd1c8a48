use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{Database, dto::genre::GenreRequest, models::Genre};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;

use super::services;

#[utoipa::path(
    get,
    path = "/api/genres",
    responses(
        (status = 200, description = "List all genres", body = Vec<Genre>)
    ),
    tag = "genres"
)]
pub async fn list_genres(State(db): State<Database>) -> Result<Json<Vec<Genre>>, WebError> {
    let genres = services::list_genres(db.pool()).await?;
    Ok(Json(genres))
}

#[utoipa::path(
    post,
    path = "/api/admin/genres",
    request_body = GenreRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Genre created successfully", body = Genre),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Name already exists")
    ),
    tag = "genres"
)]
pub async fn create_genre(
    State(db): State<Database>,
    Json(req): Json<GenreRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let genre = services::create_genre(db.pool(), &req).await?;

    Ok((StatusCode::CREATED, Json(genre)).into_response())
}

#[utoipa::path(
    put,
    path = "/api/admin/genres/{id}",
    params(
        ("id" = Uuid, Path, description = "Genre id")
    ),
    request_body = GenreRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Genre updated successfully", body = Genre),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Genre not found"),
        (status = 409, description = "Name already exists")
    ),
    tag = "genres"
)]
pub async fn update_genre(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(req): Json<GenreRequest>,
) -> Result<Json<Genre>, WebError> {
    req.validate()?;

    let genre = services::update_genre(db.pool(), id, &req).await?;

    Ok(Json(genre))
}

#[utoipa::path(
    delete,
    path = "/api/admin/genres/{id}",
    params(
        ("id" = Uuid, Path, description = "Genre id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Genre deleted successfully"),
        (status = 404, description = "Genre not found"),
        (status = 409, description = "Genre still has competitions")
    ),
    tag = "genres"
)]
pub async fn delete_genre(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    services::delete_genre(db.pool(), id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
