use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::lifecycle::{self, Boundaries, CompetitionState};
use crate::domain::policy::CompetitionFacts;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type,
)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum Visibility {
    #[default]
    Public = 1,
    Crew = 2,
    Hidden = 3,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Competition {
    pub competition_id: Uuid,
    pub genre_id: Uuid,
    pub name: String,
    pub brief_description: Option<String>,
    pub description: Option<String>,
    pub rules: Option<String>,
    pub published: bool,
    pub visibility: Visibility,
    pub featured: bool,
    pub autoqualify: bool,
    pub rsvp: bool,
    pub report_win_loss: bool,
    pub participant_limit: i16,
    pub team_min: i16,
    pub team_max: i16,
    pub contributor_extra: Option<String>,
    pub header_image: Option<String>,
    pub header_credit: Option<String>,
    pub sponsor_name: Option<String>,
    pub external_url_info: Option<String>,
    pub external_url_login: Option<String>,
    pub register_time_start: Option<DateTime<Utc>>,
    pub register_time_end: Option<DateTime<Utc>>,
    pub run_time_start: DateTime<Utc>,
    pub run_time_end: DateTime<Utc>,
    pub vote_time_start: Option<DateTime<Utc>>,
    pub vote_time_end: Option<DateTime<Utc>>,
    pub show_prestart_lock: Option<DateTime<Utc>>,
    pub show_time_start: Option<DateTime<Utc>>,
    pub show_time_end: Option<DateTime<Utc>>,
    /// Last state persisted by a write or the state sweep.
    pub state: CompetitionState,
    pub scoring_complete: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Competition {
    pub fn boundaries(&self) -> Boundaries {
        Boundaries::new(self.run_time_start, self.run_time_end)
            .with_registration(self.register_time_start, self.register_time_end)
            .with_voting(self.vote_time_start, self.vote_time_end)
            .with_show(self.show_time_start, self.show_time_end)
    }

    pub fn compute_state(&self, now: DateTime<Utc>) -> CompetitionState {
        lifecycle::compute_state(&self.boundaries(), now)
    }

    pub fn next_state(&self) -> CompetitionState {
        lifecycle::compute_next_state(&self.boundaries(), self.state)
    }

    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        lifecycle::is_locked(self.show_prestart_lock, self.show_time_end, now)
    }

    /// Registration is a phase of its own once it has a start time.
    pub fn registration_configured(&self) -> bool {
        self.register_time_start.is_some()
    }

    /// Contributors must fill `extra_info` when the competition asks for it.
    pub fn extra_info_required(&self) -> bool {
        self.contributor_extra
            .as_deref()
            .is_some_and(|label| !label.trim().is_empty())
    }

    pub fn facts(&self) -> CompetitionFacts {
        CompetitionFacts {
            visibility: self.visibility,
            published: self.published,
        }
    }
}
