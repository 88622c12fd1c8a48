use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Competition is locked down pending stage show")]
    Locked,

    #[error("Permission denied")]
    Forbidden,
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23505")
        )
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23503")
        )
    }

    /// Turn unique/foreign-key violations into a `ConstraintViolation`
    /// carrying `message`, leaving every other error untouched.
    pub fn on_constraint(self, message: &str) -> Self {
        if self.is_unique_violation() || self.is_foreign_key_violation() {
            StorageError::ConstraintViolation(message.to_string())
        } else {
            self
        }
    }
}
