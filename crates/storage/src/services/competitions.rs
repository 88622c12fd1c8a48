use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::lifecycle::{Boundaries, CompetitionState, compute_state, round_down_to_minute};
use crate::domain::validation::{ensure_unlocked, validate_competition};
use crate::dto::competition::CompetitionRequest;
use crate::error::{Result, StorageError};
use crate::models::Competition;
use crate::repository::competition::CompetitionRepository;

/// Copy of `req` with every timestamp truncated to the minute.
pub fn rounded(req: &CompetitionRequest) -> CompetitionRequest {
    let round = |ts: Option<DateTime<Utc>>| ts.map(round_down_to_minute);

    CompetitionRequest {
        register_time_start: round(req.register_time_start),
        register_time_end: round(req.register_time_end),
        run_time_start: round(req.run_time_start),
        run_time_end: round(req.run_time_end),
        vote_time_start: round(req.vote_time_start),
        vote_time_end: round(req.vote_time_end),
        show_prestart_lock: round(req.show_prestart_lock),
        show_time_start: round(req.show_time_start),
        show_time_end: round(req.show_time_end),
        ..req.clone()
    }
}

/// State the schedule in `req` puts the competition in at `now`.
pub fn scheduled_state(req: &CompetitionRequest, now: DateTime<Utc>) -> Option<CompetitionState> {
    let (start, end) = req.run_time_start.zip(req.run_time_end)?;
    let boundaries = Boundaries::new(start, end)
        .with_registration(req.register_time_start, req.register_time_end)
        .with_voting(req.vote_time_start, req.vote_time_end)
        .with_show(req.show_time_start, req.show_time_end);

    Some(compute_state(&boundaries, now))
}

/// Validate, round and persist a competition, storing the state its
/// schedule yields at `now`. `id` selects update over create.
pub async fn save(
    pool: &PgPool,
    id: Option<Uuid>,
    req: &CompetitionRequest,
    now: DateTime<Utc>,
) -> Result<Competition> {
    let repo = CompetitionRepository::new(pool);

    if let Some(id) = id {
        let existing = repo.find_by_id(id).await?;
        ensure_unlocked(existing.show_prestart_lock, existing.show_time_end, now)?;
    }

    validate_competition(&req.draft(), id.is_none(), now)?;

    let req = rounded(req);
    let state = scheduled_state(&req, now).ok_or_else(|| {
        StorageError::ConstraintViolation("Competition run time is required".to_string())
    })?;

    let competition = match id {
        Some(id) => repo.update(id, &req, state).await?,
        None => repo.create(&req, state).await?,
    };

    tracing::info!(
        competition = %competition.name,
        state = ?competition.state,
        "Competition saved"
    );

    Ok(competition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Visibility;

    fn ts(value: &str) -> DateTime<Utc> {
        value.parse().expect("valid RFC 3339 timestamp")
    }

    fn request() -> CompetitionRequest {
        CompetitionRequest {
            genre_id: Uuid::new_v4(),
            name: "Demo".to_string(),
            brief_description: None,
            description: None,
            rules: None,
            published: true,
            visibility: Visibility::Public,
            featured: false,
            autoqualify: false,
            rsvp: false,
            report_win_loss: false,
            participant_limit: 0,
            team_min: 0,
            team_max: 0,
            contributor_extra: None,
            header_image: None,
            header_credit: None,
            sponsor_name: None,
            external_url_info: None,
            external_url_login: None,
            register_time_start: Some(ts("2030-06-01T08:00:42Z")),
            register_time_end: Some(ts("2030-06-01T10:00:00Z")),
            run_time_start: Some(ts("2030-06-01T10:00:59.999Z")),
            run_time_end: Some(ts("2030-06-01T12:00:00Z")),
            vote_time_start: None,
            vote_time_end: None,
            show_prestart_lock: None,
            show_time_start: None,
            show_time_end: None,
        }
    }

    #[test]
    fn test_rounded_drops_seconds_and_keeps_other_fields() {
        let req = rounded(&request());
        assert_eq!(req.register_time_start, Some(ts("2030-06-01T08:00:00Z")));
        assert_eq!(req.run_time_start, Some(ts("2030-06-01T10:00:00Z")));
        assert_eq!(req.run_time_end, Some(ts("2030-06-01T12:00:00Z")));
        assert_eq!(req.vote_time_start, None);
        assert_eq!(req.name, "Demo");
        assert!(req.published);
    }

    #[test]
    fn test_scheduled_state_follows_the_clock() {
        let req = request();
        assert_eq!(scheduled_state(&req, ts("2030-06-01T07:00:00Z")), Some(CompetitionState::New));
        assert_eq!(scheduled_state(&req, ts("2030-06-01T09:00:00Z")), Some(CompetitionState::RegOpen));
        assert_eq!(scheduled_state(&req, ts("2030-06-01T11:00:00Z")), Some(CompetitionState::Run));
        assert_eq!(scheduled_state(&req, ts("2030-06-01T13:00:00Z")), Some(CompetitionState::Fin));
    }

    #[test]
    fn test_scheduled_state_needs_a_run_window() {
        let req = CompetitionRequest {
            run_time_end: None,
            ..request()
        };
        assert_eq!(scheduled_state(&req, ts("2030-06-01T09:00:00Z")), None);
    }
}
