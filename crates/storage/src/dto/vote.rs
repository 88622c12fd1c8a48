use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CastVoteRequest {
    pub entry_id: Uuid,

    #[validate(range(min = 1, max = 5, message = "A number between 1 and 5"))]
    pub score: i16,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateVoteRequest {
    #[validate(range(min = 1, max = 5, message = "A number between 1 and 5"))]
    pub score: i16,
}
