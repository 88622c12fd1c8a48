use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::lifecycle::CompetitionState;
use crate::dto::competition::{CompetitionFilter, CompetitionRequest};
use crate::error::{Result, StorageError};
use crate::models::{Competition, GenreCategory, Visibility};

const COLUMNS: &str = r#"
    c.competition_id, c.genre_id, c.name, c.brief_description, c.description, c.rules,
    c.published, c.visibility, c.featured, c.autoqualify, c.rsvp, c.report_win_loss,
    c.participant_limit, c.team_min, c.team_max, c.contributor_extra,
    c.header_image, c.header_credit, c.sponsor_name, c.external_url_info, c.external_url_login,
    c.register_time_start, c.register_time_end, c.run_time_start, c.run_time_end,
    c.vote_time_start, c.vote_time_end, c.show_prestart_lock, c.show_time_start, c.show_time_end,
    c.state, c.scoring_complete, c.created_at, c.updated_at
"#;

const HAS_ENTRIES: &str = "This Competition has entries and cannot be deleted!";
const NAME_TAKEN: &str = "Competition name already exists";

pub struct CompetitionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CompetitionRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Filtered, paginated list ordered by run start, newest first.
    ///
    /// With `visibilities` set, only published competitions at one of
    /// those levels are returned.
    pub async fn list(
        &self,
        filter: &CompetitionFilter,
        visibilities: Option<&[Visibility]>,
    ) -> Result<(Vec<Competition>, i64)> {
        let pagination = filter.pagination();

        let mut count = QueryBuilder::new(
            "SELECT COUNT(*) FROM competitions c INNER JOIN genres g ON g.genre_id = c.genre_id WHERE 1=1",
        );
        push_filters(&mut count, filter, visibilities);
        let total_items = count.build_query_scalar::<i64>().fetch_one(self.pool).await?;

        let mut query = QueryBuilder::new(format!(
            "SELECT {COLUMNS} FROM competitions c INNER JOIN genres g ON g.genre_id = c.genre_id WHERE 1=1"
        ));
        push_filters(&mut query, filter, visibilities);
        query.push(" ORDER BY c.run_time_start DESC, c.name LIMIT ");
        query.push_bind(i64::from(pagination.limit()));
        query.push(" OFFSET ");
        query.push_bind(i64::from(pagination.offset()));

        let competitions = query
            .build_query_as::<Competition>()
            .fetch_all(self.pool)
            .await?;

        Ok((competitions, total_items))
    }

    /// Every competition, for the state sweep.
    pub async fn list_all(&self) -> Result<Vec<Competition>> {
        let competitions = sqlx::query_as::<_, Competition>(&format!(
            "SELECT {COLUMNS} FROM competitions c ORDER BY c.run_time_start"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(competitions)
    }

    pub async fn list_published_by_category(&self, category: GenreCategory) -> Result<Vec<(Competition, String)>> {
        #[derive(sqlx::FromRow)]
        struct Row {
            #[sqlx(flatten)]
            competition: Competition,
            genre_name: String,
        }

        let rows = sqlx::query_as::<_, Row>(&format!(
            r#"
            SELECT {COLUMNS}, g.name AS genre_name
            FROM competitions c
            INNER JOIN genres g ON g.genre_id = c.genre_id
            WHERE c.published AND g.category = $1
            ORDER BY g.name, c.name
            "#
        ))
        .bind(category)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| (row.competition, row.genre_name)).collect())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Competition> {
        sqlx::query_as::<_, Competition>(&format!(
            "SELECT {COLUMNS} FROM competitions c WHERE c.competition_id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::NotFound)
    }

    pub async fn entries_count(&self, id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM entries WHERE competition_id = $1")
            .bind(id)
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    /// Insert a competition. `req` is expected to be validated and rounded.
    pub async fn create(&self, req: &CompetitionRequest, state: CompetitionState) -> Result<Competition> {
        let (run_start, run_end) = run_window(req)?;

        let mut query = QueryBuilder::<Postgres>::new(
            r#"
            INSERT INTO competitions AS c (
                genre_id, name, brief_description, description, rules,
                published, visibility, featured, autoqualify, rsvp, report_win_loss,
                participant_limit, team_min, team_max, contributor_extra,
                header_image, header_credit, sponsor_name, external_url_info, external_url_login,
                register_time_start, register_time_end, run_time_start, run_time_end,
                vote_time_start, vote_time_end, show_prestart_lock, show_time_start, show_time_end,
                state
            )
            "#,
        );
        query.push_values([req], |mut row, req| {
            row.push_bind(req.genre_id)
                .push_bind(&req.name)
                .push_bind(&req.brief_description)
                .push_bind(&req.description)
                .push_bind(&req.rules)
                .push_bind(req.published)
                .push_bind(req.visibility)
                .push_bind(req.featured)
                .push_bind(req.autoqualify)
                .push_bind(req.rsvp)
                .push_bind(req.report_win_loss)
                .push_bind(req.participant_limit)
                .push_bind(req.team_min)
                .push_bind(req.team_max)
                .push_bind(&req.contributor_extra)
                .push_bind(&req.header_image)
                .push_bind(&req.header_credit)
                .push_bind(&req.sponsor_name)
                .push_bind(&req.external_url_info)
                .push_bind(&req.external_url_login)
                .push_bind(req.register_time_start)
                .push_bind(req.register_time_end)
                .push_bind(run_start)
                .push_bind(run_end)
                .push_bind(req.vote_time_start)
                .push_bind(req.vote_time_end)
                .push_bind(req.show_prestart_lock)
                .push_bind(req.show_time_start)
                .push_bind(req.show_time_end)
                .push_bind(state);
        });
        query.push(format!(" RETURNING {COLUMNS}"));

        query
            .build_query_as::<Competition>()
            .fetch_one(self.pool)
            .await
            .map_err(|e| StorageError::from(e).on_constraint(NAME_TAKEN))
    }

    pub async fn update(
        &self,
        id: Uuid,
        req: &CompetitionRequest,
        state: CompetitionState,
    ) -> Result<Competition> {
        let (run_start, run_end) = run_window(req)?;

        let mut query = QueryBuilder::<Postgres>::new("UPDATE competitions AS c SET ");
        let mut set = query.separated(", ");
        set.push("genre_id = ").push_bind_unseparated(req.genre_id);
        set.push("name = ").push_bind_unseparated(&req.name);
        set.push("brief_description = ").push_bind_unseparated(&req.brief_description);
        set.push("description = ").push_bind_unseparated(&req.description);
        set.push("rules = ").push_bind_unseparated(&req.rules);
        set.push("published = ").push_bind_unseparated(req.published);
        set.push("visibility = ").push_bind_unseparated(req.visibility);
        set.push("featured = ").push_bind_unseparated(req.featured);
        set.push("autoqualify = ").push_bind_unseparated(req.autoqualify);
        set.push("rsvp = ").push_bind_unseparated(req.rsvp);
        set.push("report_win_loss = ").push_bind_unseparated(req.report_win_loss);
        set.push("participant_limit = ").push_bind_unseparated(req.participant_limit);
        set.push("team_min = ").push_bind_unseparated(req.team_min);
        set.push("team_max = ").push_bind_unseparated(req.team_max);
        set.push("contributor_extra = ").push_bind_unseparated(&req.contributor_extra);
        set.push("header_image = ").push_bind_unseparated(&req.header_image);
        set.push("header_credit = ").push_bind_unseparated(&req.header_credit);
        set.push("sponsor_name = ").push_bind_unseparated(&req.sponsor_name);
        set.push("external_url_info = ").push_bind_unseparated(&req.external_url_info);
        set.push("external_url_login = ").push_bind_unseparated(&req.external_url_login);
        set.push("register_time_start = ").push_bind_unseparated(req.register_time_start);
        set.push("register_time_end = ").push_bind_unseparated(req.register_time_end);
        set.push("run_time_start = ").push_bind_unseparated(run_start);
        set.push("run_time_end = ").push_bind_unseparated(run_end);
        set.push("vote_time_start = ").push_bind_unseparated(req.vote_time_start);
        set.push("vote_time_end = ").push_bind_unseparated(req.vote_time_end);
        set.push("show_prestart_lock = ").push_bind_unseparated(req.show_prestart_lock);
        set.push("show_time_start = ").push_bind_unseparated(req.show_time_start);
        set.push("show_time_end = ").push_bind_unseparated(req.show_time_end);
        set.push("state = ").push_bind_unseparated(state);
        set.push("updated_at = NOW()");
        query.push(" WHERE c.competition_id = ");
        query.push_bind(id);
        query.push(format!(" RETURNING {COLUMNS}"));

        query
            .build_query_as::<Competition>()
            .fetch_optional(self.pool)
            .await
            .map_err(|e| StorageError::from(e).on_constraint(NAME_TAKEN))?
            .ok_or(StorageError::NotFound)
    }

    /// Persist a state computed by the sweep. Returns false if the row is gone.
    pub async fn save_state(&self, id: Uuid, state: CompetitionState) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE competitions SET state = $2, updated_at = NOW() WHERE competition_id = $1",
        )
        .bind(id)
        .bind(state)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if self.entries_count(id).await? > 0 {
            return Err(StorageError::ConstraintViolation(HAS_ENTRIES.to_string()));
        }

        let result = sqlx::query("DELETE FROM competitions WHERE competition_id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| StorageError::from(e).on_constraint(HAS_ENTRIES))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }

    /// Row-lock the competition until the caller's transaction ends.
    /// Score writes take it first so each rescoring tallies every vote
    /// committed before it.
    pub async fn lock(conn: &mut PgConnection, id: Uuid) -> Result<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1 FROM competitions WHERE competition_id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await?
            .ok_or(StorageError::NotFound)?;

        Ok(())
    }
}

fn push_filters(
    query: &mut QueryBuilder<'_, Postgres>,
    filter: &CompetitionFilter,
    visibilities: Option<&[Visibility]>,
) {
    if let Some(visibilities) = visibilities {
        let codes: Vec<i16> = visibilities.iter().map(|v| *v as i16).collect();
        query.push(" AND c.published AND c.visibility = ANY(");
        query.push_bind(codes);
        query.push(")");
    }

    if let Some(genre_id) = filter.genre_id {
        query.push(" AND c.genre_id = ");
        query.push_bind(genre_id);
    }

    if let Some(category) = filter.category {
        query.push(" AND g.category = ");
        query.push_bind(category);
    }

    if let Some(state) = filter.state {
        query.push(" AND c.state = ");
        query.push_bind(state);
    }

    if let Some(published) = filter.published {
        query.push(" AND c.published = ");
        query.push_bind(published);
    }

    if let Some(featured) = filter.featured {
        query.push(" AND c.featured = ");
        query.push_bind(featured);
    }
}

fn run_window(req: &CompetitionRequest) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    match (req.run_time_start, req.run_time_end) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(StorageError::ConstraintViolation(
            "Competition run time is required".to_string(),
        )),
    }
}
