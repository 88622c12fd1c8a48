use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::genre::GenreRequest;
use crate::error::{Result, StorageError};
use crate::models::Genre;

pub struct GenreRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> GenreRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Genre>> {
        let genres = sqlx::query_as::<_, Genre>(
            "SELECT genre_id, category, name FROM genres ORDER BY category, name",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(genres)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Genre> {
        sqlx::query_as::<_, Genre>("SELECT genre_id, category, name FROM genres WHERE genre_id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(StorageError::NotFound)
    }

    pub async fn create(&self, req: &GenreRequest) -> Result<Genre> {
        sqlx::query_as::<_, Genre>(
            r#"
            INSERT INTO genres (category, name)
            VALUES ($1, $2)
            RETURNING genre_id, category, name
            "#,
        )
        .bind(req.category)
        .bind(&req.name)
        .fetch_one(self.pool)
        .await
        .map_err(|e| StorageError::from(e).on_constraint("Genre name already exists"))
    }

    pub async fn update(&self, id: Uuid, req: &GenreRequest) -> Result<Genre> {
        sqlx::query_as::<_, Genre>(
            r#"
            UPDATE genres SET category = $2, name = $3
            WHERE genre_id = $1
            RETURNING genre_id, category, name
            "#,
        )
        .bind(id)
        .bind(req.category)
        .bind(&req.name)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| StorageError::from(e).on_constraint("Genre name already exists"))?
        .ok_or(StorageError::NotFound)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM genres WHERE genre_id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| {
                StorageError::from(e).on_constraint("This Genre has competitions and cannot be deleted!")
            })?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}
