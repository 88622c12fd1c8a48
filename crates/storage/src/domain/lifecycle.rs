use std::fmt;

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle phase of a competition.
///
/// Variants are declared in the order the phases occur, so `Ord` follows
/// the timeline. `RegClose` (registration over, run not started) and
/// `Closed` (run over, voting or show still ahead) are separate phases.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
    sqlx::Type,
)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum CompetitionState {
    New = 1,
    RegOpen = 2,
    RegClose = 3,
    Run = 4,
    Closed = 5,
    Vote = 6,
    VoteClosed = 7,
    Show = 8,
    Fin = 9,
}

impl CompetitionState {
    pub const ALL: [CompetitionState; 9] = [
        Self::New,
        Self::RegOpen,
        Self::RegClose,
        Self::Run,
        Self::Closed,
        Self::Vote,
        Self::VoteClosed,
        Self::Show,
        Self::Fin,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::New => "New",
            Self::RegOpen => "Registration open",
            Self::RegClose => "Registration closed",
            Self::Run => "Running",
            Self::Closed => "Closed",
            Self::Vote => "Voting open",
            Self::VoteClosed => "Voting closed",
            Self::Show => "Showtime",
            Self::Fin => "Finished",
        }
    }
}

impl fmt::Display for CompetitionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The configured timestamp windows of a competition.
///
/// The run window is mandatory; every other window may be partially or
/// completely absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundaries {
    pub register_start: Option<DateTime<Utc>>,
    pub register_end: Option<DateTime<Utc>>,
    pub run_start: DateTime<Utc>,
    pub run_end: DateTime<Utc>,
    pub vote_start: Option<DateTime<Utc>>,
    pub vote_end: Option<DateTime<Utc>>,
    pub show_start: Option<DateTime<Utc>>,
    pub show_end: Option<DateTime<Utc>>,
}

impl Boundaries {
    pub fn new(run_start: DateTime<Utc>, run_end: DateTime<Utc>) -> Self {
        Self {
            register_start: None,
            register_end: None,
            run_start,
            run_end,
            vote_start: None,
            vote_end: None,
            show_start: None,
            show_end: None,
        }
    }

    pub fn with_registration(
        mut self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Self {
        self.register_start = start;
        self.register_end = end;
        self
    }

    pub fn with_voting(mut self, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        self.vote_start = start;
        self.vote_end = end;
        self
    }

    pub fn with_show(mut self, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        self.show_start = start;
        self.show_end = end;
        self
    }
}

/// Gaps between phases of this many seconds or less are not a phase of
/// their own.
pub const TRANSITION_EPSILON_SECS: i64 = 1;

fn before(now: DateTime<Utc>, ts: Option<DateTime<Utc>>) -> bool {
    ts.is_some_and(|ts| now < ts)
}

fn within(now: DateTime<Utc>, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> bool {
    matches!((start, end), (Some(start), Some(end)) if start < now && now < end)
}

fn is_new(b: &Boundaries, now: DateTime<Utc>) -> bool {
    before(now, b.register_start) || (b.register_start.is_none() && now < b.run_start)
}

fn is_reg_open(b: &Boundaries, now: DateTime<Utc>) -> bool {
    within(now, b.register_start, b.register_end)
}

fn is_reg_close(b: &Boundaries, now: DateTime<Utc>) -> bool {
    within(now, b.register_end, Some(b.run_start))
}

fn is_run(b: &Boundaries, now: DateTime<Utc>) -> bool {
    within(now, Some(b.run_start), Some(b.run_end))
}

fn is_vote(b: &Boundaries, now: DateTime<Utc>) -> bool {
    within(now, b.vote_start, b.vote_end)
}

fn is_vote_closed(b: &Boundaries, now: DateTime<Utc>) -> bool {
    within(now, b.vote_end, b.show_start)
}

fn is_show(b: &Boundaries, now: DateTime<Utc>) -> bool {
    within(now, b.show_start, b.show_end)
}

fn is_closed(b: &Boundaries, now: DateTime<Utc>) -> bool {
    b.run_end < now && (before(now, b.vote_start) || before(now, b.show_start))
}

type Rule = fn(&Boundaries, DateTime<Utc>) -> bool;

/// Ordered decision list; the first matching rule wins, `Fin` otherwise.
const STATE_RULES: [(Rule, CompetitionState); 8] = [
    (is_new, CompetitionState::New),
    (is_reg_open, CompetitionState::RegOpen),
    (is_reg_close, CompetitionState::RegClose),
    (is_run, CompetitionState::Run),
    (is_vote, CompetitionState::Vote),
    (is_vote_closed, CompetitionState::VoteClosed),
    (is_show, CompetitionState::Show),
    (is_closed, CompetitionState::Closed),
];

/// Select the lifecycle state of a competition at `now`.
pub fn compute_state(boundaries: &Boundaries, now: DateTime<Utc>) -> CompetitionState {
    STATE_RULES
        .iter()
        .find(|(rule, _)| rule(boundaries, now))
        .map(|(_, state)| *state)
        .unwrap_or(CompetitionState::Fin)
}

#[derive(Debug, Clone, Copy)]
enum Guard {
    Always,
    RegistrationConfigured,
    GapBeforeRun,
    GapAfterRun,
    VotingConfigured,
    ShowConfigured,
    GapBeforeShow,
}

fn gap_exceeds_epsilon(from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
    to.signed_duration_since(from).num_seconds() > TRANSITION_EPSILON_SECS
}

impl Guard {
    fn holds(self, b: &Boundaries) -> bool {
        match self {
            Self::Always => true,
            Self::RegistrationConfigured => b.register_start.is_some(),
            Self::GapBeforeRun => b
                .register_end
                .is_some_and(|end| gap_exceeds_epsilon(end, b.run_start)),
            // the gap that matters is the one before whichever phase comes next
            Self::GapAfterRun => b
                .vote_start
                .or(b.show_start)
                .is_some_and(|next| gap_exceeds_epsilon(b.run_end, next)),
            Self::VotingConfigured => b.vote_start.is_some(),
            Self::ShowConfigured => b.show_start.is_some(),
            Self::GapBeforeShow => matches!(
                (b.vote_end, b.show_start),
                (Some(end), Some(start)) if gap_exceeds_epsilon(end, start)
            ),
        }
    }
}

type Transition = (Guard, CompetitionState);

/// Successor table keyed by the current state. Guards are tried in order;
/// a row with no satisfied guard falls through to `Fin`.
const TRANSITIONS: [(CompetitionState, &[Transition]); 9] = [
    (
        CompetitionState::New,
        &[
            (Guard::RegistrationConfigured, CompetitionState::RegOpen),
            (Guard::Always, CompetitionState::Run),
        ],
    ),
    (
        CompetitionState::RegOpen,
        &[
            (Guard::GapBeforeRun, CompetitionState::RegClose),
            (Guard::Always, CompetitionState::Run),
        ],
    ),
    (
        CompetitionState::RegClose,
        &[(Guard::Always, CompetitionState::Run)],
    ),
    (
        CompetitionState::Run,
        &[
            (Guard::GapAfterRun, CompetitionState::Closed),
            (Guard::VotingConfigured, CompetitionState::Vote),
            (Guard::ShowConfigured, CompetitionState::Show),
        ],
    ),
    (
        CompetitionState::Closed,
        &[
            (Guard::VotingConfigured, CompetitionState::Vote),
            (Guard::ShowConfigured, CompetitionState::Show),
        ],
    ),
    (
        CompetitionState::Vote,
        &[
            (Guard::GapBeforeShow, CompetitionState::VoteClosed),
            (Guard::ShowConfigured, CompetitionState::Show),
        ],
    ),
    (
        CompetitionState::VoteClosed,
        &[(Guard::ShowConfigured, CompetitionState::Show)],
    ),
    (CompetitionState::Show, &[]),
    (CompetitionState::Fin, &[]),
];

/// The state that follows `state` for the configured boundaries.
pub fn compute_next_state(boundaries: &Boundaries, state: CompetitionState) -> CompetitionState {
    TRANSITIONS
        .iter()
        .find(|(from, _)| *from == state)
        .and_then(|(_, transitions)| {
            transitions
                .iter()
                .find(|(guard, _)| guard.holds(boundaries))
        })
        .map(|(_, to)| *to)
        .unwrap_or(CompetitionState::Fin)
}

/// Pre-show lock-down: edits are blocked strictly between the lock
/// timestamp and the end of the show.
pub fn is_locked(
    lock: Option<DateTime<Utc>>,
    show_end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    match (lock, show_end) {
        (Some(lock), Some(show_end)) => lock < now && now < show_end,
        (Some(lock), None) => lock < now,
        (None, _) => false,
    }
}

/// Drop seconds and sub-seconds.
pub fn round_down_to_minute(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.with_second(0)
        .and_then(|ts| ts.with_nanosecond(0))
        .unwrap_or(ts)
}
