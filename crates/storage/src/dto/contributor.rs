use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateContributorRequest {
    pub user_id: Uuid,

    #[validate(length(max = 64))]
    pub extra_info: Option<String>,

    /// Promoting a contributor to owner demotes the previous owner.
    #[serde(default)]
    pub is_owner: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateContributorRequest {
    #[validate(length(max = 64))]
    pub extra_info: Option<String>,

    /// Omitted keeps the stored flag. Only the current owner may change it.
    #[serde(default)]
    pub is_owner: Option<bool>,
}

impl UpdateContributorRequest {
    /// Whether applying this request flips the contributor's owner flag.
    pub fn changes_ownership(&self, currently_owner: bool) -> bool {
        self.is_owner.is_some_and(|requested| requested != currently_owner)
    }
}
