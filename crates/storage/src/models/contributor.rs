use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Contributor {
    pub contributor_id: Uuid,
    pub entry_id: Uuid,
    pub user_id: Uuid,
    pub extra_info: Option<String>,
    pub is_owner: bool,
}
