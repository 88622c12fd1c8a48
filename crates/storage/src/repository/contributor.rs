use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::Contributor;

const COLUMNS: &str = "contributor_id, entry_id, user_id, extra_info, is_owner";
const DUPLICATE: &str = "This user is already a contributor to selected entry!";

pub struct ContributorRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContributorRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_by_entry(&self, entry_id: Uuid) -> Result<Vec<Contributor>> {
        let contributors = sqlx::query_as::<_, Contributor>(&format!(
            "SELECT {COLUMNS} FROM contributors WHERE entry_id = $1 ORDER BY is_owner DESC, contributor_id"
        ))
        .bind(entry_id)
        .fetch_all(self.pool)
        .await?;

        Ok(contributors)
    }

    /// Every contributor of every entry in a competition.
    pub async fn list_by_competition(&self, competition_id: Uuid) -> Result<Vec<Contributor>> {
        let contributors = sqlx::query_as::<_, Contributor>(
            r#"
            SELECT ct.contributor_id, ct.entry_id, ct.user_id, ct.extra_info, ct.is_owner
            FROM contributors ct
            INNER JOIN entries e ON e.entry_id = ct.entry_id
            WHERE e.competition_id = $1
            "#,
        )
        .bind(competition_id)
        .fetch_all(self.pool)
        .await?;

        Ok(contributors)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Contributor> {
        sqlx::query_as::<_, Contributor>(&format!(
            "SELECT {COLUMNS} FROM contributors WHERE contributor_id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    pub async fn is_contributor(&self, entry_id: Uuid, user_id: Uuid) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM contributors WHERE entry_id = $1 AND user_id = $2)",
        )
        .bind(entry_id)
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM contributors WHERE contributor_id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }

    /// Clear the owner flag on every other contributor of the entry.
    pub async fn demote_owner(conn: &mut PgConnection, entry_id: Uuid, keep: Option<Uuid>) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE contributors SET is_owner = FALSE
            WHERE entry_id = $1 AND is_owner AND ($2::UUID IS NULL OR contributor_id <> $2)
            "#,
        )
        .bind(entry_id)
        .bind(keep)
        .execute(conn)
        .await?;

        Ok(())
    }

    pub async fn insert(
        conn: &mut PgConnection,
        entry_id: Uuid,
        user_id: Uuid,
        extra_info: Option<&str>,
        is_owner: bool,
    ) -> Result<Contributor> {
        sqlx::query_as::<_, Contributor>(&format!(
            r#"
            INSERT INTO contributors (entry_id, user_id, extra_info, is_owner)
            VALUES ($1, $2, $3, $4)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(entry_id)
        .bind(user_id)
        .bind(extra_info)
        .bind(is_owner)
        .fetch_one(conn)
        .await
        .map_err(|e| StorageError::from(e).on_constraint(DUPLICATE))
    }

    pub async fn update(
        conn: &mut PgConnection,
        id: Uuid,
        extra_info: Option<&str>,
        is_owner: Option<bool>,
    ) -> Result<Contributor> {
        sqlx::query_as::<_, Contributor>(&format!(
            r#"
            UPDATE contributors SET extra_info = $2, is_owner = COALESCE($3, is_owner)
            WHERE contributor_id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(extra_info)
        .bind(is_owner)
        .fetch_optional(conn)
        .await?
        .ok_or(StorageError::NotFound)
    }
}
