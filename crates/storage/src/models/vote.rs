use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// A 1-5 score given by one user to one entry. `jury` is derived from the
/// voter's role when the vote is written.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Vote {
    pub vote_id: Uuid,
    pub entry_id: Uuid,
    pub user_id: Uuid,
    pub score: i16,
    pub jury: bool,
    pub created_at: DateTime<Utc>,
}
