use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::EntryStatus;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateEntryRequest {
    pub competition_id: Uuid,

    #[validate(length(min = 1, max = 45, message = "Title must be between 1 and 45 characters"))]
    pub title: String,

    pub extra_info: Option<String>,

    pub crew_msg: Option<String>,

    #[validate(length(max = 100))]
    pub screen_msg: Option<String>,

    pub vote_msg: Option<String>,

    pub comment: Option<String>,
}

/// Fields an entry owner may edit. Status, order and score are crew-only.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateEntryRequest {
    #[validate(length(min = 1, max = 45, message = "Title must be between 1 and 45 characters"))]
    pub title: String,

    pub extra_info: Option<String>,

    pub crew_msg: Option<String>,

    #[validate(length(max = 100))]
    pub screen_msg: Option<String>,

    pub vote_msg: Option<String>,

    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct EntryStatusRequest {
    pub status: EntryStatus,

    pub status_comment: Option<String>,

    #[validate(range(min = 1, max = 99, message = "Order must be between 1 and 99"))]
    pub entry_order: Option<i16>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EntryFilter {
    pub status: Option<EntryStatus>,
}
