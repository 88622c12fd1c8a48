use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::common::PaginationParams;
use crate::domain::lifecycle::CompetitionState;
use crate::domain::validation::CompetitionDraft;
use crate::models::{Competition, GenreCategory, Visibility};

/// Payload for creating or replacing a competition.
///
/// `state` is deliberately absent: it is always derived from the timestamps.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CompetitionRequest {
    pub genre_id: Uuid,

    #[validate(length(min = 1, max = 50, message = "Name must be between 1 and 50 characters"))]
    pub name: String,

    #[validate(length(max = 40))]
    pub brief_description: Option<String>,

    pub description: Option<String>,

    pub rules: Option<String>,

    #[serde(default)]
    pub published: bool,

    #[serde(default)]
    pub visibility: Visibility,

    #[serde(default)]
    pub featured: bool,

    #[serde(default)]
    pub autoqualify: bool,

    #[serde(default)]
    pub rsvp: bool,

    #[serde(default)]
    pub report_win_loss: bool,

    #[serde(default)]
    #[validate(range(min = 0, message = "Participant limit cannot be negative"))]
    pub participant_limit: i16,

    #[serde(default)]
    #[validate(range(min = 0, max = 20))]
    pub team_min: i16,

    #[serde(default)]
    #[validate(range(min = 0, max = 20))]
    pub team_max: i16,

    #[validate(length(max = 50))]
    pub contributor_extra: Option<String>,

    #[validate(url)]
    pub header_image: Option<String>,

    #[validate(length(max = 64))]
    pub header_credit: Option<String>,

    #[validate(length(max = 50))]
    pub sponsor_name: Option<String>,

    #[validate(url)]
    pub external_url_info: Option<String>,

    #[validate(url)]
    pub external_url_login: Option<String>,

    pub register_time_start: Option<DateTime<Utc>>,
    pub register_time_end: Option<DateTime<Utc>>,
    pub run_time_start: Option<DateTime<Utc>>,
    pub run_time_end: Option<DateTime<Utc>>,
    pub vote_time_start: Option<DateTime<Utc>>,
    pub vote_time_end: Option<DateTime<Utc>>,
    pub show_prestart_lock: Option<DateTime<Utc>>,
    pub show_time_start: Option<DateTime<Utc>>,
    pub show_time_end: Option<DateTime<Utc>>,
}

impl CompetitionRequest {
    pub fn draft(&self) -> CompetitionDraft<'_> {
        CompetitionDraft {
            register_time_start: self.register_time_start,
            register_time_end: self.register_time_end,
            run_time_start: self.run_time_start,
            run_time_end: self.run_time_end,
            vote_time_start: self.vote_time_start,
            vote_time_end: self.vote_time_end,
            show_prestart_lock: self.show_prestart_lock,
            show_time_start: self.show_time_start,
            show_time_end: self.show_time_end,
            team_min: Some(self.team_min),
            team_max: Some(self.team_max),
            header_image: self.header_image.as_deref(),
            header_credit: self.header_credit.as_deref(),
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CompetitionFilter {
    pub genre_id: Option<Uuid>,
    pub category: Option<GenreCategory>,
    pub state: Option<CompetitionState>,
    pub published: Option<bool>,
    pub featured: Option<bool>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl CompetitionFilter {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.page_size)
    }
}

/// Competition as returned by the API, with its lifecycle evaluated at
/// request time.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CompetitionResponse {
    #[serde(flatten)]
    pub competition: Competition,
    pub next_state: CompetitionState,
    pub is_locked: bool,
    pub entries_count: i64,
}

impl CompetitionResponse {
    pub fn new(mut competition: Competition, entries_count: i64, now: DateTime<Utc>) -> Self {
        competition.state = competition.compute_state(now);
        let next_state = competition.next_state();
        let is_locked = competition.is_locked(now);
        Self {
            competition,
            next_state,
            is_locked,
            entries_count,
        }
    }
}
