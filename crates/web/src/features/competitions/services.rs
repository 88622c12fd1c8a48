use chrono::{DateTime, Utc};
use sqlx::PgPool;
use storage::{
    domain::policy::{Action, Actor, Resource, authorize, listable_visibilities},
    dto::competition::{CompetitionFilter, CompetitionRequest, CompetitionResponse},
    error::Result,
    repository::competition::CompetitionRepository,
    services::competitions,
};
use uuid::Uuid;

/// Competitions `actor` may see, with their lifecycle evaluated at `now`.
pub async fn list_competitions(
    pool: &PgPool,
    actor: &Actor,
    filter: &CompetitionFilter,
    now: DateTime<Utc>,
) -> Result<(Vec<CompetitionResponse>, i64)> {
    let repo = CompetitionRepository::new(pool);
    let visibilities = listable_visibilities(actor);

    let (competitions, total_items) = repo.list(filter, visibilities.as_deref()).await?;

    let mut responses = Vec::with_capacity(competitions.len());
    for competition in competitions {
        let entries_count = repo.entries_count(competition.competition_id).await?;
        responses.push(CompetitionResponse::new(competition, entries_count, now));
    }

    Ok((responses, total_items))
}

pub async fn get_competition(
    pool: &PgPool,
    actor: &Actor,
    id: Uuid,
    now: DateTime<Utc>,
) -> Result<CompetitionResponse> {
    let repo = CompetitionRepository::new(pool);
    let competition = repo.find_by_id(id).await?;

    authorize(actor, Resource::Competition(competition.facts()), Action::View).require()?;

    let entries_count = repo.entries_count(id).await?;
    Ok(CompetitionResponse::new(competition, entries_count, now))
}

pub async fn save_competition(
    pool: &PgPool,
    id: Option<Uuid>,
    request: &CompetitionRequest,
    now: DateTime<Utc>,
) -> Result<CompetitionResponse> {
    let competition = competitions::save(pool, id, request, now).await?;
    let entries_count = CompetitionRepository::new(pool)
        .entries_count(competition.competition_id)
        .await?;

    Ok(CompetitionResponse::new(competition, entries_count, now))
}

pub async fn delete_competition(pool: &PgPool, id: Uuid) -> Result<()> {
    CompetitionRepository::new(pool).delete(id).await?;
    tracing::info!(competition_id = %id, "Competition deleted");
    Ok(())
}
