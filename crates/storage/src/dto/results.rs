use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ResultEntry {
    pub entry_id: Uuid,
    pub title: String,
    pub entry_order: i16,
    pub score: i32,
    /// Display name of the owning contributor.
    pub owner: Option<String>,
}

/// Final standings of one published creative competition.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompetitionResults {
    pub competition_id: Uuid,
    pub name: String,
    pub genre: String,
    pub scoring_complete: bool,
    pub entries: Vec<ResultEntry>,
}
