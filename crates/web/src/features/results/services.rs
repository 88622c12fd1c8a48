use sqlx::PgPool;
use storage::{
    dto::results::CompetitionResults,
    error::Result,
    models::GenreCategory,
    repository::{competition::CompetitionRepository, entry::EntryRepository},
};

/// Standings of every published creative competition.
pub async fn list_results(pool: &PgPool) -> Result<Vec<CompetitionResults>> {
    let competitions = CompetitionRepository::new(pool)
        .list_published_by_category(GenreCategory::Creative)
        .await?;
    let entries = EntryRepository::new(pool);

    let mut results = Vec::with_capacity(competitions.len());
    for (competition, genre) in competitions {
        results.push(CompetitionResults {
            entries: entries.results(competition.competition_id).await?,
            competition_id: competition.competition_id,
            name: competition.name,
            genre,
            scoring_complete: competition.scoring_complete,
        });
    }

    Ok(results)
}
