use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::dto::entry::{CreateEntryRequest, EntryStatusRequest, UpdateEntryRequest};
use crate::dto::results::ResultEntry;
use crate::error::{Result, StorageError};
use crate::models::{Entry, EntryStatus};

const COLUMNS: &str = r#"
    e.entry_id, e.competition_id, e.title, e.status, e.status_comment, e.extra_info,
    e.entry_order, e.crew_msg, e.screen_msg, e.vote_msg, e.comment, e.score,
    e.created_at, e.updated_at
"#;

/// A draft entry together with the contributor facts the status
/// progression looks at.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DraftEntry {
    pub entry_id: Uuid,
    pub title: String,
    pub competition_name: String,
    pub autoqualify: bool,
    pub extra_info_required: bool,
    pub contributors: i64,
    pub contributors_missing_extra_info: i64,
}

pub struct EntryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> EntryRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_by_competition(
        &self,
        competition_id: Uuid,
        status: Option<EntryStatus>,
    ) -> Result<Vec<Entry>> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {COLUMNS} FROM entries e WHERE e.competition_id = "
        ));
        query.push_bind(competition_id);

        if let Some(status) = status {
            query.push(" AND e.status = ");
            query.push_bind(status);
        }

        query.push(" ORDER BY e.entry_order, e.created_at");

        let entries = query.build_query_as::<Entry>().fetch_all(self.pool).await?;
        Ok(entries)
    }

    /// Qualified entries of a competition, best score first.
    pub async fn results(&self, competition_id: Uuid) -> Result<Vec<ResultEntry>> {
        let entries = sqlx::query_as::<_, ResultEntry>(
            r#"
            SELECT e.entry_id, e.title, e.entry_order, e.score, u.display_name AS owner
            FROM entries e
            LEFT JOIN contributors ct ON ct.entry_id = e.entry_id AND ct.is_owner
            LEFT JOIN users u ON u.user_id = ct.user_id
            WHERE e.competition_id = $1 AND e.status = $2
            ORDER BY e.score DESC, e.entry_order
            "#,
        )
        .bind(competition_id)
        .bind(EntryStatus::Qualified)
        .fetch_all(self.pool)
        .await?;

        Ok(entries)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Entry> {
        sqlx::query_as::<_, Entry>(&format!("SELECT {COLUMNS} FROM entries e WHERE e.entry_id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(StorageError::NotFound)
    }

    pub async fn update(&self, id: Uuid, req: &UpdateEntryRequest) -> Result<Entry> {
        sqlx::query_as::<_, Entry>(&format!(
            r#"
            UPDATE entries AS e
            SET title = $2, extra_info = $3, crew_msg = $4, screen_msg = $5,
                vote_msg = $6, comment = $7, updated_at = NOW()
            WHERE e.entry_id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&req.title)
        .bind(&req.extra_info)
        .bind(&req.crew_msg)
        .bind(&req.screen_msg)
        .bind(&req.vote_msg)
        .bind(&req.comment)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    /// Crew-side status change. The order is left alone when not given.
    pub async fn set_status(&self, id: Uuid, req: &EntryStatusRequest) -> Result<Entry> {
        sqlx::query_as::<_, Entry>(&format!(
            r#"
            UPDATE entries AS e
            SET status = $2, status_comment = $3,
                entry_order = COALESCE($4, e.entry_order), updated_at = NOW()
            WHERE e.entry_id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(req.status)
        .bind(&req.status_comment)
        .bind(req.entry_order)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    /// Move an entry from `from` to `to`, only if it is still in `from`.
    pub async fn advance_status(&self, id: Uuid, from: EntryStatus, to: EntryStatus) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE entries SET status = $3, updated_at = NOW() WHERE entry_id = $1 AND status = $2",
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list_drafts(&self) -> Result<Vec<DraftEntry>> {
        let drafts = sqlx::query_as::<_, DraftEntry>(
            r#"
            SELECT
                e.entry_id,
                e.title,
                c.name AS competition_name,
                c.autoqualify,
                COALESCE(BTRIM(c.contributor_extra), '') <> '' AS extra_info_required,
                COUNT(ct.contributor_id) AS contributors,
                COUNT(ct.contributor_id) FILTER (
                    WHERE COALESCE(BTRIM(ct.extra_info), '') = ''
                ) AS contributors_missing_extra_info
            FROM entries e
            INNER JOIN competitions c ON c.competition_id = e.competition_id
            LEFT JOIN contributors ct ON ct.entry_id = e.entry_id
            WHERE e.status = $1
            GROUP BY e.entry_id, e.title, c.name, c.autoqualify, c.contributor_extra
            ORDER BY c.name, e.created_at
            "#,
        )
        .bind(EntryStatus::Draft)
        .fetch_all(self.pool)
        .await?;

        Ok(drafts)
    }

    /// Votes on the entry go with it; the caller rescores the competition.
    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM entries WHERE entry_id = $1")
            .bind(id)
            .execute(conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }

    /// Insert inside the caller's transaction; the owner contributor is
    /// written alongside.
    pub async fn insert(conn: &mut PgConnection, req: &CreateEntryRequest) -> Result<Entry> {
        let entry = sqlx::query_as::<_, Entry>(&format!(
            r#"
            INSERT INTO entries AS e (competition_id, title, extra_info, crew_msg, screen_msg, vote_msg, comment)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(req.competition_id)
        .bind(&req.title)
        .bind(&req.extra_info)
        .bind(&req.crew_msg)
        .bind(&req.screen_msg)
        .bind(&req.vote_msg)
        .bind(&req.comment)
        .fetch_one(conn)
        .await?;

        Ok(entry)
    }

    pub async fn set_score(conn: &mut PgConnection, id: Uuid, score: i32) -> Result<()> {
        sqlx::query("UPDATE entries SET score = $2 WHERE entry_id = $1")
            .bind(id)
            .bind(score)
            .execute(conn)
            .await?;

        Ok(())
    }

    pub async fn ids_in_competition(conn: &mut PgConnection, competition_id: Uuid) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>("SELECT entry_id FROM entries WHERE competition_id = $1")
            .bind(competition_id)
            .fetch_all(conn)
            .await?;

        Ok(ids)
    }
}
