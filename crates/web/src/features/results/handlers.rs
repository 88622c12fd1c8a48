use axum::{Json, extract::State};
use storage::{Database, dto::results::CompetitionResults};

use crate::error::WebError;

use super::services;

#[utoipa::path(
    get,
    path = "/api/results",
    responses(
        (status = 200, description = "Qualified entries of published creative competitions, best score first", body = Vec<CompetitionResults>)
    ),
    tag = "results"
)]
pub async fn list_results(State(db): State<Database>) -> Result<Json<Vec<CompetitionResults>>, WebError> {
    let results = services::list_results(db.pool()).await?;

    Ok(Json(results))
}
