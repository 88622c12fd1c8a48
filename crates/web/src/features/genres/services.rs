use sqlx::PgPool;
use storage::{
    dto::genre::GenreRequest, error::Result, models::Genre, repository::genre::GenreRepository,
};
use uuid::Uuid;

pub async fn list_genres(pool: &PgPool) -> Result<Vec<Genre>> {
    GenreRepository::new(pool).list().await
}

pub async fn create_genre(pool: &PgPool, request: &GenreRequest) -> Result<Genre> {
    let genre = GenreRepository::new(pool).create(request).await?;
    tracing::info!(genre = %genre.name, "Genre created");
    Ok(genre)
}

pub async fn update_genre(pool: &PgPool, id: Uuid, request: &GenreRequest) -> Result<Genre> {
    GenreRepository::new(pool).update(id, request).await
}

pub async fn delete_genre(pool: &PgPool, id: Uuid) -> Result<()> {
    GenreRepository::new(pool).delete(id).await
}
