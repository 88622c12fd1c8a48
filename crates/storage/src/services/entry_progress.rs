//! Moves draft entries forward once their contributor list is complete.

use sqlx::PgPool;

use crate::error::Result;
use crate::models::EntryStatus;
use crate::repository::entry::{DraftEntry, EntryRepository};

/// Contributor facts that decide whether a draft can leave Draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DraftFacts {
    pub status: EntryStatus,
    pub contributors: i64,
    pub extra_info_required: bool,
    pub contributors_missing_extra_info: i64,
    pub autoqualify: bool,
}

impl From<&DraftEntry> for DraftFacts {
    fn from(draft: &DraftEntry) -> Self {
        Self {
            status: EntryStatus::Draft,
            contributors: draft.contributors,
            extra_info_required: draft.extra_info_required,
            contributors_missing_extra_info: draft.contributors_missing_extra_info,
            autoqualify: draft.autoqualify,
        }
    }
}

impl DraftFacts {
    fn contributors_valid(&self) -> bool {
        self.contributors >= 1 && !(self.extra_info_required && self.contributors_missing_extra_info > 0)
    }
}

/// Status a draft moves to, or `None` if it stays where it is.
pub fn next_status(facts: &DraftFacts) -> Option<EntryStatus> {
    if facts.status != EntryStatus::Draft || !facts.contributors_valid() {
        return None;
    }

    if facts.autoqualify {
        Some(EntryStatus::Qualified)
    } else {
        Some(EntryStatus::New)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressReport {
    pub checked: usize,
    pub qualified: usize,
    pub new: usize,
}

pub async fn run(pool: &PgPool) -> Result<ProgressReport> {
    let repo = EntryRepository::new(pool);
    let mut report = ProgressReport::default();

    for draft in repo.list_drafts().await? {
        report.checked += 1;

        let Some(status) = next_status(&DraftFacts::from(&draft)) else {
            tracing::info!(
                entry = %draft.title,
                competition = %draft.competition_name,
                "Entry was not updated"
            );
            continue;
        };

        if !repo.advance_status(draft.entry_id, EntryStatus::Draft, status).await? {
            tracing::warn!(entry = %draft.title, "Entry left Draft while the sweep was running");
            continue;
        }

        match status {
            EntryStatus::Qualified => report.qualified += 1,
            _ => report.new += 1,
        }
        tracing::info!(
            entry = %draft.title,
            competition = %draft.competition_name,
            ?status,
            "Entry progressed from Draft"
        );
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> DraftFacts {
        DraftFacts {
            status: EntryStatus::Draft,
            contributors: 1,
            extra_info_required: false,
            contributors_missing_extra_info: 1,
            autoqualify: false,
        }
    }

    #[test]
    fn test_valid_draft_becomes_new() {
        assert_eq!(next_status(&draft()), Some(EntryStatus::New));
    }

    #[test]
    fn test_autoqualify_skips_new() {
        let facts = DraftFacts {
            autoqualify: true,
            ..draft()
        };
        assert_eq!(next_status(&facts), Some(EntryStatus::Qualified));
    }

    #[test]
    fn test_draft_without_contributors_stays() {
        let facts = DraftFacts {
            contributors: 0,
            ..draft()
        };
        assert_eq!(next_status(&facts), None);
    }

    #[test]
    fn test_missing_extra_info_blocks_progress_only_when_required() {
        let required = DraftFacts {
            extra_info_required: true,
            ..draft()
        };
        assert_eq!(next_status(&required), None);

        let filled = DraftFacts {
            contributors_missing_extra_info: 0,
            ..required
        };
        assert_eq!(next_status(&filled), Some(EntryStatus::New));
    }

    #[test]
    fn test_non_draft_entries_are_left_alone() {
        for status in [EntryStatus::New, EntryStatus::Qualified, EntryStatus::Disqualified] {
            let facts = DraftFacts { status, ..draft() };
            assert_eq!(next_status(&facts), None);
        }
    }
}
