use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::UserRole;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 150, message = "Username must be between 1 and 150 characters"))]
    pub username: String,

    #[serde(default)]
    #[validate(length(max = 150))]
    pub display_name: String,

    #[serde(default)]
    pub role: UserRole,

    #[serde(default)]
    pub is_staff: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(max = 150))]
    pub display_name: String,

    pub role: UserRole,

    #[serde(default)]
    pub is_staff: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}
