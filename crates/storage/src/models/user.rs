use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type,
)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum UserRole {
    #[default]
    Mortal = 1,
    Participant = 2,
    Jury = 3,
    Crew = 4,
    Anon = 5,
}

impl UserRole {
    /// Votes cast by this role count towards the jury pool.
    pub fn casts_jury_votes(&self) -> bool {
        matches!(self, Self::Jury)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub user_id: Uuid,
    pub username: String,
    pub display_name: String,
    pub role: UserRole,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
}
