use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::user::{CreateUserRequest, UpdateUserRequest};
use crate::error::{Result, StorageError};
use crate::models::User;

const COLUMNS: &str = "user_id, username, display_name, role, is_staff, created_at";

pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<User> {
        sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE user_id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(StorageError::NotFound)
    }

    pub async fn create(&self, req: &CreateUserRequest) -> Result<User> {
        let display_name = if req.display_name.trim().is_empty() {
            req.username.as_str()
        } else {
            req.display_name.as_str()
        };

        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, display_name, role, is_staff)
            VALUES ($1, $2, $3, $4)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(&req.username)
        .bind(display_name)
        .bind(req.role)
        .bind(req.is_staff)
        .fetch_one(self.pool)
        .await
        .map_err(|e| StorageError::from(e).on_constraint("Username already exists"))
    }

    pub async fn update(&self, id: Uuid, req: &UpdateUserRequest) -> Result<User> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET display_name = $2, role = $3, is_staff = $4
            WHERE user_id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&req.display_name)
        .bind(req.role)
        .bind(req.is_staff)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }
}
