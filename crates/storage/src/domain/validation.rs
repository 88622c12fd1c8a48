use std::borrow::Cow;

use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

use super::lifecycle::{CompetitionState, is_locked};
use crate::error::{Result, StorageError};
use crate::models::EntryStatus;

pub const LOCKED_MESSAGE: &str =
    "This competition is currently locked down pending stage show, and no edits are permitted.";

fn reject(errors: &mut ValidationErrors, field: &'static str, code: &'static str, message: impl Into<Cow<'static, str>>) {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    errors.add(field, error);
}

fn into_result(errors: ValidationErrors) -> std::result::Result<(), ValidationErrors> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_set(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

/// Everything the competition write path checks before saving.
#[derive(Debug, Clone, Default)]
pub struct CompetitionDraft<'a> {
    pub register_time_start: Option<DateTime<Utc>>,
    pub register_time_end: Option<DateTime<Utc>>,
    pub run_time_start: Option<DateTime<Utc>>,
    pub run_time_end: Option<DateTime<Utc>>,
    pub vote_time_start: Option<DateTime<Utc>>,
    pub vote_time_end: Option<DateTime<Utc>>,
    pub show_prestart_lock: Option<DateTime<Utc>>,
    pub show_time_start: Option<DateTime<Utc>>,
    pub show_time_end: Option<DateTime<Utc>>,
    pub team_min: Option<i16>,
    pub team_max: Option<i16>,
    pub header_image: Option<&'a str>,
    pub header_credit: Option<&'a str>,
}

pub fn validate_competition(
    draft: &CompetitionDraft<'_>,
    is_new: bool,
    now: DateTime<Utc>,
) -> std::result::Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let d = draft;

    if d.run_time_start.is_none() {
        reject(&mut errors, "run_time_start", "required", "Competition start time is required");
    }
    if d.run_time_end.is_none() {
        reject(&mut errors, "run_time_end", "required", "Competition end time is required");
    }

    let ordered_pairs = [
        (
            d.register_time_start,
            d.register_time_end,
            "register_time_end",
            "Registration end time must be after registration start time",
        ),
        (
            d.run_time_start,
            d.run_time_end,
            "run_time_end",
            "Competition end time must be after competition start time",
        ),
        (
            d.vote_time_start,
            d.vote_time_end,
            "vote_time_end",
            "Voting end time must be after voting start time",
        ),
        (
            d.show_time_start,
            d.show_time_end,
            "show_time_end",
            "Show end time must be after show start time",
        ),
    ];
    for (start, end, field, message) in ordered_pairs {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                reject(&mut errors, field, "invalid_range", message);
            }
        }
    }

    if let Some(lock) = d.show_prestart_lock {
        if d.show_time_start.is_none() && d.show_time_end.is_none() {
            reject(
                &mut errors,
                "show_prestart_lock",
                "show_required",
                "Pre-show lockdown start can only be set if Showtime start and end is also set.",
            );
        }
        if d.run_time_end.is_some_and(|run_end| lock < run_end) {
            reject(
                &mut errors,
                "show_prestart_lock",
                "before_run_end",
                "Pre-show lockdown start cannot be before competition run time has ended.",
            );
        }
    }

    if is_new {
        let starts = [
            (d.register_time_start, "register_time_start", "Registration start time cannot be in the past"),
            (d.run_time_start, "run_time_start", "Competition start time cannot be in the past"),
            (d.vote_time_start, "vote_time_start", "Voting start time cannot be in the past"),
            (d.show_time_start, "show_time_start", "Show start time cannot be in the past"),
        ];
        for (start, field, message) in starts {
            if start.is_some_and(|start| start < now) {
                reject(&mut errors, field, "in_the_past", message);
            }
        }
    }

    if let (Some(_), Some(register_end), Some(run_start)) =
        (d.register_time_start, d.register_time_end, d.run_time_start)
    {
        if register_end > run_start {
            reject(
                &mut errors,
                "register_time_end",
                "overlaps_run",
                "Pre-registration must be finished before Competition run time starts",
            );
        }
    }

    if let (Some(vote_start), Some(_), Some(run_end)) =
        (d.vote_time_start, d.vote_time_end, d.run_time_end)
    {
        if vote_start < run_end {
            reject(
                &mut errors,
                "vote_time_start",
                "overlaps_run",
                "Voting cannot open until Competition has ended",
            );
        }
    }

    let team_min = d.team_min.filter(|n| *n > 0);
    let team_max = d.team_max.filter(|n| *n > 0);
    match (team_min, team_max) {
        (Some(_), None) => reject(&mut errors, "team_max", "required", "Please also fill out Maximum Team Size"),
        (None, Some(_)) => reject(&mut errors, "team_min", "required", "Please also fill out Minimum Team Size"),
        (Some(min), Some(max)) if min > max => reject(
            &mut errors,
            "team_max",
            "too_small",
            "Maximum Team Size cannot be smaller than the minimum size",
        ),
        _ => {}
    }

    if is_set(d.header_image) && !is_set(d.header_credit) {
        reject(&mut errors, "header_credit", "required", "Please add credit for the header image");
    }

    into_result(errors)
}

/// Competition facts needed to accept a new entry.
#[derive(Debug, Clone, Copy)]
pub struct RegistrationContext {
    pub published: bool,
    pub participant_limit: i16,
    pub entries_count: i64,
    pub registration_configured: bool,
    pub state: CompetitionState,
}

pub fn validate_entry_registration(ctx: &RegistrationContext) -> std::result::Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if !ctx.published {
        reject(
            &mut errors,
            "competition",
            "unpublished",
            "This competition is not currently available for entry registrations!",
        );
    }

    if ctx.participant_limit > 0 && ctx.entries_count >= i64::from(ctx.participant_limit) {
        reject(&mut errors, "competition", "full", "This competition is currently full!");
    }

    let open_state = if ctx.registration_configured {
        CompetitionState::RegOpen
    } else {
        CompetitionState::Run
    };
    if ctx.state != open_state {
        reject(
            &mut errors,
            "competition",
            "registration_closed",
            "Registrations are closed for this competition!",
        );
    }

    into_result(errors)
}

#[derive(Debug, Clone, Copy)]
pub struct ContributorContext<'a> {
    pub already_contributor: bool,
    pub entry_status: EntryStatus,
    pub extra_info_required: bool,
    pub extra_info: Option<&'a str>,
}

pub fn validate_contributor(ctx: &ContributorContext<'_>) -> std::result::Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if ctx.already_contributor {
        reject(
            &mut errors,
            "user",
            "duplicate",
            "This user is already a contributor to selected entry!",
        );
    }

    let past_registration = !matches!(ctx.entry_status, EntryStatus::Draft | EntryStatus::New);
    if past_registration && ctx.extra_info_required && !is_set(ctx.extra_info) {
        reject(
            &mut errors,
            "extra_info",
            "required",
            "Extra info is required in this competition",
        );
    }

    into_result(errors)
}

/// An owner cannot drop their own flag; ownership moves by promoting
/// another contributor, which demotes the previous owner.
pub fn validate_owner_flag(currently_owner: bool, requested: Option<bool>) -> std::result::Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if currently_owner && requested == Some(false) {
        reject(
            &mut errors,
            "is_owner",
            "owner_required",
            "An entry must have an owner. Promote another contributor instead",
        );
    }

    into_result(errors)
}

#[derive(Debug, Clone, Copy)]
pub struct VoteContext {
    pub score: i16,
    pub state: CompetitionState,
    pub voter_is_contributor: bool,
    /// Another vote by the same user on the same entry, if any.
    pub existing_vote: Option<Uuid>,
}

pub const MIN_VOTE_SCORE: i16 = 1;
pub const MAX_VOTE_SCORE: i16 = 5;

pub fn validate_vote(ctx: &VoteContext) -> std::result::Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if !(MIN_VOTE_SCORE..=MAX_VOTE_SCORE).contains(&ctx.score) {
        reject(&mut errors, "score", "range", "A number between 1 and 5");
    }

    if let Some(existing) = ctx.existing_vote {
        reject(
            &mut errors,
            "entry",
            "duplicate",
            format!(
                "User has already voted on this entry! (ID: {existing}) Please update existing vote object instead of creating a new."
            ),
        );
    }

    if ctx.state != CompetitionState::Vote {
        reject(&mut errors, "entry", "voting_closed", "It is not possible to vote in this entry now");
    }

    if ctx.voter_is_contributor {
        reject(&mut errors, "user", "contributor", "You cannot vote on entries you have contributed to");
    }

    into_result(errors)
}

/// Reject edits while the pre-show lock-down is active.
pub fn ensure_unlocked(
    show_prestart_lock: Option<DateTime<Utc>>,
    show_time_end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<()> {
    if is_locked(show_prestart_lock, show_time_end, now) {
        return Err(StorageError::Locked);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(value: &str) -> DateTime<Utc> {
        value.parse().expect("valid RFC 3339 timestamp")
    }

    fn at(hour: u32) -> Option<DateTime<Utc>> {
        Some(ts(&format!("2030-06-01T{hour:02}:00:00Z")))
    }

    fn now() -> DateTime<Utc> {
        ts("2030-06-01T00:30:00Z")
    }

    fn draft() -> CompetitionDraft<'static> {
        CompetitionDraft {
            register_time_start: at(1),
            register_time_end: at(2),
            run_time_start: at(3),
            run_time_end: at(5),
            vote_time_start: at(6),
            vote_time_end: at(7),
            show_prestart_lock: at(8),
            show_time_start: at(9),
            show_time_end: at(10),
            team_min: Some(1),
            team_max: Some(4),
            header_image: Some("https://example.org/header.png"),
            header_credit: Some("Photographer"),
        }
    }

    fn fields(errors: &ValidationErrors) -> Vec<String> {
        let mut fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|field| field.to_string())
            .collect();
        fields.sort();
        fields
    }

    #[test]
    fn test_valid_competition_passes() {
        assert!(validate_competition(&draft(), true, now()).is_ok());
    }

    #[test]
    fn test_reversed_windows_are_rejected() {
        let d = CompetitionDraft {
            register_time_start: at(2),
            register_time_end: at(1),
            vote_time_start: at(7),
            vote_time_end: at(6),
            show_prestart_lock: None,
            show_time_start: at(10),
            show_time_end: at(9),
            ..draft()
        };
        let errors = validate_competition(&d, false, now()).unwrap_err();
        assert_eq!(fields(&errors), vec!["register_time_end", "show_time_end", "vote_time_end"]);
    }

    #[test]
    fn test_run_window_is_required() {
        let d = CompetitionDraft {
            run_time_start: None,
            run_time_end: None,
            ..draft()
        };
        let errors = validate_competition(&d, false, now()).unwrap_err();
        assert!(errors.field_errors().contains_key("run_time_start"));
        assert!(errors.field_errors().contains_key("run_time_end"));
    }

    #[test]
    fn test_new_competition_cannot_start_in_the_past() {
        let late = ts("2030-06-01T04:00:00Z");
        let errors = validate_competition(&draft(), true, late).unwrap_err();
        assert_eq!(fields(&errors), vec!["register_time_start", "run_time_start"]);

        assert!(validate_competition(&draft(), false, late).is_ok());
    }

    #[test]
    fn test_registration_must_end_before_run() {
        let d = CompetitionDraft {
            register_time_end: at(4),
            ..draft()
        };
        let errors = validate_competition(&d, false, now()).unwrap_err();
        assert_eq!(fields(&errors), vec!["register_time_end"]);
    }

    #[test]
    fn test_voting_must_open_after_run() {
        let d = CompetitionDraft {
            vote_time_start: at(4),
            ..draft()
        };
        let errors = validate_competition(&d, false, now()).unwrap_err();
        assert_eq!(fields(&errors), vec!["vote_time_start"]);
    }

    #[test]
    fn test_lockdown_rules() {
        let without_show = CompetitionDraft {
            show_time_start: None,
            show_time_end: None,
            ..draft()
        };
        let errors = validate_competition(&without_show, false, now()).unwrap_err();
        assert_eq!(fields(&errors), vec!["show_prestart_lock"]);

        let too_early = CompetitionDraft {
            show_prestart_lock: at(4),
            ..draft()
        };
        let errors = validate_competition(&too_early, false, now()).unwrap_err();
        assert_eq!(fields(&errors), vec!["show_prestart_lock"]);
    }

    #[test]
    fn test_team_sizes() {
        let only_min = CompetitionDraft {
            team_max: None,
            ..draft()
        };
        assert_eq!(
            fields(&validate_competition(&only_min, false, now()).unwrap_err()),
            vec!["team_max"]
        );

        let only_max = CompetitionDraft {
            team_min: Some(0),
            ..draft()
        };
        assert_eq!(
            fields(&validate_competition(&only_max, false, now()).unwrap_err()),
            vec!["team_min"]
        );

        let inverted = CompetitionDraft {
            team_min: Some(5),
            team_max: Some(2),
            ..draft()
        };
        assert_eq!(
            fields(&validate_competition(&inverted, false, now()).unwrap_err()),
            vec!["team_max"]
        );
    }

    #[test]
    fn test_header_image_needs_credit() {
        let d = CompetitionDraft {
            header_credit: Some("  "),
            ..draft()
        };
        assert_eq!(
            fields(&validate_competition(&d, false, now()).unwrap_err()),
            vec!["header_credit"]
        );
    }

    fn registration() -> RegistrationContext {
        RegistrationContext {
            published: true,
            participant_limit: 0,
            entries_count: 12,
            registration_configured: true,
            state: CompetitionState::RegOpen,
        }
    }

    #[test]
    fn test_entry_registration() {
        assert!(validate_entry_registration(&registration()).is_ok());

        let unpublished = RegistrationContext {
            published: false,
            ..registration()
        };
        assert!(validate_entry_registration(&unpublished).is_err());

        let full = RegistrationContext {
            participant_limit: 12,
            ..registration()
        };
        assert!(validate_entry_registration(&full).is_err());
    }

    #[test]
    fn test_registration_window_depends_on_configuration() {
        let running = RegistrationContext {
            state: CompetitionState::Run,
            ..registration()
        };
        assert!(validate_entry_registration(&running).is_err());

        let open_during_run = RegistrationContext {
            registration_configured: false,
            ..running
        };
        assert!(validate_entry_registration(&open_during_run).is_ok());
    }

    #[test]
    fn test_contributor_rules() {
        let ctx = ContributorContext {
            already_contributor: false,
            entry_status: EntryStatus::Draft,
            extra_info_required: true,
            extra_info: None,
        };
        assert!(validate_contributor(&ctx).is_ok());

        let qualified = ContributorContext {
            entry_status: EntryStatus::Qualified,
            ..ctx
        };
        assert_eq!(fields(&validate_contributor(&qualified).unwrap_err()), vec!["extra_info"]);

        let duplicate = ContributorContext {
            already_contributor: true,
            ..ctx
        };
        assert_eq!(fields(&validate_contributor(&duplicate).unwrap_err()), vec!["user"]);
    }

    #[test]
    fn test_owner_flag() {
        assert!(validate_owner_flag(true, None).is_ok());
        assert!(validate_owner_flag(true, Some(true)).is_ok());
        assert!(validate_owner_flag(false, Some(true)).is_ok());
        assert!(validate_owner_flag(false, Some(false)).is_ok());
        assert_eq!(fields(&validate_owner_flag(true, Some(false)).unwrap_err()), vec!["is_owner"]);
    }

    fn vote() -> VoteContext {
        VoteContext {
            score: 4,
            state: CompetitionState::Vote,
            voter_is_contributor: false,
            existing_vote: None,
        }
    }

    #[test]
    fn test_vote_accepted_while_voting_is_open() {
        assert!(validate_vote(&vote()).is_ok());
    }

    #[test]
    fn test_vote_rejections() {
        for score in [0, 6] {
            let ctx = VoteContext { score, ..vote() };
            assert_eq!(fields(&validate_vote(&ctx).unwrap_err()), vec!["score"]);
        }

        for state in CompetitionState::ALL {
            if state == CompetitionState::Vote {
                continue;
            }
            let ctx = VoteContext { state, ..vote() };
            assert_eq!(fields(&validate_vote(&ctx).unwrap_err()), vec!["entry"]);
        }

        let contributor = VoteContext {
            voter_is_contributor: true,
            ..vote()
        };
        assert_eq!(fields(&validate_vote(&contributor).unwrap_err()), vec!["user"]);
    }

    #[test]
    fn test_second_vote_names_the_first() {
        let existing = Uuid::new_v4();
        let ctx = VoteContext {
            existing_vote: Some(existing),
            ..vote()
        };
        let errors = validate_vote(&ctx).unwrap_err();
        let field_errors = errors.field_errors();
        let message = field_errors["entry"][0]
            .message
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_default();
        assert!(message.contains(&existing.to_string()));
    }

    #[test]
    fn test_ensure_unlocked() {
        let now = ts("2030-06-01T09:00:00Z");
        assert!(ensure_unlocked(None, at(10), now).is_ok());
        assert!(matches!(ensure_unlocked(at(8), at(10), now), Err(StorageError::Locked)));
    }
}
