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
pub enum EntryStatus {
    #[default]
    Draft = 1,
    New = 2,
    Qualified = 3,
    Disqualified = 4,
    NotPreselected = 5,
    InvalidFile = 6,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Entry {
    pub entry_id: Uuid,
    pub competition_id: Uuid,
    pub title: String,
    pub status: EntryStatus,
    pub status_comment: Option<String>,
    pub extra_info: Option<String>,
    pub entry_order: i16,
    pub crew_msg: Option<String>,
    pub screen_msg: Option<String>,
    pub vote_msg: Option<String>,
    pub comment: Option<String>,
    /// Derived from votes; only ever written by the score aggregator.
    pub score: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
