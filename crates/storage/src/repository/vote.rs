use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::domain::scoring::VoteTally;
use crate::error::{Result, StorageError};
use crate::models::Vote;

const COLUMNS: &str = "vote_id, entry_id, user_id, score, jury, created_at";

pub struct VoteRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> VoteRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Vote>> {
        let votes = sqlx::query_as::<_, Vote>(&format!(
            "SELECT {COLUMNS} FROM votes WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(votes)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Vote> {
        sqlx::query_as::<_, Vote>(&format!("SELECT {COLUMNS} FROM votes WHERE vote_id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(StorageError::NotFound)
    }

    pub async fn find_by_entry_and_user(&self, entry_id: Uuid, user_id: Uuid) -> Result<Option<Vote>> {
        let vote = sqlx::query_as::<_, Vote>(&format!(
            "SELECT {COLUMNS} FROM votes WHERE entry_id = $1 AND user_id = $2"
        ))
        .bind(entry_id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(vote)
    }

    pub async fn insert(
        conn: &mut PgConnection,
        entry_id: Uuid,
        user_id: Uuid,
        score: i16,
        jury: bool,
    ) -> Result<Vote> {
        sqlx::query_as::<_, Vote>(&format!(
            r#"
            INSERT INTO votes (entry_id, user_id, score, jury)
            VALUES ($1, $2, $3, $4)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(entry_id)
        .bind(user_id)
        .bind(score)
        .bind(jury)
        .fetch_one(conn)
        .await
        .map_err(|e| StorageError::from(e).on_constraint("User has already voted on this entry!"))
    }

    pub async fn update_score(conn: &mut PgConnection, id: Uuid, score: i16) -> Result<Vote> {
        sqlx::query_as::<_, Vote>(&format!(
            "UPDATE votes SET score = $2 WHERE vote_id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(score)
        .fetch_optional(conn)
        .await?
        .ok_or(StorageError::NotFound)
    }

    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM votes WHERE vote_id = $1")
            .bind(id)
            .execute(conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }

    /// All four score sums for `entry_id` in one consistent snapshot.
    pub async fn tally(conn: &mut PgConnection, entry_id: Uuid) -> Result<VoteTally> {
        let tally = sqlx::query_as::<_, VoteTally>(
            r#"
            SELECT
                COALESCE(SUM(v.score) FILTER (WHERE NOT v.jury AND v.entry_id = $1), 0)::BIGINT AS mortal_self,
                COALESCE(SUM(v.score) FILTER (WHERE v.jury AND v.entry_id = $1), 0)::BIGINT AS jury_self,
                COALESCE(SUM(v.score) FILTER (WHERE NOT v.jury), 0)::BIGINT AS mortal_sum,
                COALESCE(SUM(v.score) FILTER (WHERE v.jury), 0)::BIGINT AS jury_sum
            FROM votes v
            INNER JOIN entries e ON e.entry_id = v.entry_id
            WHERE e.competition_id = (SELECT competition_id FROM entries WHERE entry_id = $1)
            "#,
        )
        .bind(entry_id)
        .fetch_one(conn)
        .await?;

        Ok(tally)
    }
}
