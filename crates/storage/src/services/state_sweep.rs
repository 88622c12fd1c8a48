//! Periodic re-evaluation of every competition's lifecycle state.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::lifecycle::CompetitionState;
use crate::error::Result;
use crate::repository::competition::CompetitionRepository;

/// What happens to voter access to qualified entries when a state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoterAccess {
    Unchanged,
    Opened,
    Withdrawn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepStep {
    pub stored: CompetitionState,
    pub computed: CompetitionState,
    pub voter_access: VoterAccess,
}

impl SweepStep {
    pub fn changed(&self) -> bool {
        self.stored != self.computed
    }
}

pub fn plan(stored: CompetitionState, computed: CompetitionState) -> SweepStep {
    let was_voting = stored == CompetitionState::Vote;
    let is_voting = computed == CompetitionState::Vote;

    let voter_access = match (was_voting, is_voting) {
        (false, true) => VoterAccess::Opened,
        (true, false) => VoterAccess::Withdrawn,
        _ => VoterAccess::Unchanged,
    };

    SweepStep {
        stored,
        computed,
        voter_access,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub checked: usize,
    pub updated: usize,
    pub voting_opened: usize,
    pub voting_closed: usize,
}

impl SweepReport {
    fn record(&mut self, step: &SweepStep, published: bool) {
        self.checked += 1;
        if step.changed() {
            self.updated += 1;
        }
        if published {
            match step.voter_access {
                VoterAccess::Opened => self.voting_opened += 1,
                VoterAccess::Withdrawn => self.voting_closed += 1,
                VoterAccess::Unchanged => {}
            }
        }
    }
}

/// Recompute the state of every competition at `now` and persist the ones
/// that drifted.
pub async fn run(pool: &PgPool, now: DateTime<Utc>) -> Result<SweepReport> {
    let repo = CompetitionRepository::new(pool);
    let mut report = SweepReport::default();

    for competition in repo.list_all().await? {
        let step = plan(competition.state, competition.compute_state(now));

        if step.changed() {
            repo.save_state(competition.competition_id, step.computed).await?;
            tracing::info!(
                competition = %competition.name,
                from = %step.stored,
                to = %step.computed,
                "New state set"
            );
        } else {
            tracing::info!(
                competition = %competition.name,
                state = %step.stored,
                "State already correct"
            );
        }

        if competition.published {
            match step.voter_access {
                VoterAccess::Opened => tracing::info!(
                    competition = %competition.name,
                    "Qualified entries are now visible to voters"
                ),
                VoterAccess::Withdrawn => tracing::info!(
                    competition = %competition.name,
                    "Qualified entries are no longer visible to voters"
                ),
                VoterAccess::Unchanged => {}
            }
        }

        report.record(&step, competition.published);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use CompetitionState::*;

    #[test]
    fn test_plan_unchanged_state() {
        let step = plan(Run, Run);
        assert!(!step.changed());
        assert_eq!(step.voter_access, VoterAccess::Unchanged);

        let step = plan(Vote, Vote);
        assert!(!step.changed());
        assert_eq!(step.voter_access, VoterAccess::Unchanged);
    }

    #[test]
    fn test_plan_entering_and_leaving_vote() {
        assert_eq!(plan(Closed, Vote).voter_access, VoterAccess::Opened);
        assert_eq!(plan(Run, Vote).voter_access, VoterAccess::Opened);
        assert_eq!(plan(Vote, VoteClosed).voter_access, VoterAccess::Withdrawn);
        assert_eq!(plan(Vote, Fin).voter_access, VoterAccess::Withdrawn);
        assert_eq!(plan(RegOpen, Run).voter_access, VoterAccess::Unchanged);
    }

    #[test]
    fn test_report_counts_access_changes_only_for_published() {
        let mut report = SweepReport::default();
        report.record(&plan(Run, Run), true);
        report.record(&plan(Closed, Vote), true);
        report.record(&plan(Closed, Vote), false);
        report.record(&plan(Vote, Show), true);

        assert_eq!(
            report,
            SweepReport {
                checked: 4,
                updated: 3,
                voting_opened: 1,
                voting_closed: 1,
            }
        );
    }
}
