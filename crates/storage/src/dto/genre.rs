use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::GenreCategory;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct GenreRequest {
    #[serde(default)]
    pub category: GenreCategory,

    #[validate(length(min = 1, max = 50, message = "Name must be between 1 and 50 characters"))]
    pub name: String,
}
