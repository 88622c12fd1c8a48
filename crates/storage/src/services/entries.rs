//! Entry and contributor write paths.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::validation::{
    ContributorContext, RegistrationContext, ensure_unlocked, validate_contributor,
    validate_entry_registration, validate_owner_flag,
};
use crate::dto::contributor::{CreateContributorRequest, UpdateContributorRequest};
use crate::dto::entry::{CreateEntryRequest, UpdateEntryRequest};
use crate::error::Result;
use crate::models::{Competition, Contributor, Entry};
use crate::repository::competition::CompetitionRepository;
use crate::repository::contributor::ContributorRepository;
use crate::repository::entry::EntryRepository;

use super::scoring;

/// Register a new entry; `owner` becomes its owning contributor.
pub async fn register(pool: &PgPool, owner: Uuid, req: &CreateEntryRequest, now: DateTime<Utc>) -> Result<Entry> {
    let competitions = CompetitionRepository::new(pool);
    let competition = competitions.find_by_id(req.competition_id).await?;
    let entries_count = competitions.entries_count(competition.competition_id).await?;

    validate_entry_registration(&RegistrationContext {
        published: competition.published,
        participant_limit: competition.participant_limit,
        entries_count,
        registration_configured: competition.registration_configured(),
        state: competition.compute_state(now),
    })?;

    let mut tx = pool.begin().await?;
    let entry = EntryRepository::insert(&mut tx, req).await?;
    ContributorRepository::insert(&mut tx, entry.entry_id, owner, None, true).await?;
    tx.commit().await?;

    tracing::info!(entry_id = %entry.entry_id, competition = %competition.name, "Entry registered");
    Ok(entry)
}

pub async fn update(pool: &PgPool, entry: &Entry, req: &UpdateEntryRequest, now: DateTime<Utc>) -> Result<Entry> {
    let competition = competition_of(pool, entry).await?;
    ensure_unlocked(competition.show_prestart_lock, competition.show_time_end, now)?;

    EntryRepository::new(pool).update(entry.entry_id, req).await
}

/// Delete an entry. Its votes cascade away, which shifts the competition
/// pools, so the remaining entries are rescored in the same transaction.
pub async fn delete(pool: &PgPool, entry: &Entry, now: DateTime<Utc>) -> Result<()> {
    let competition = competition_of(pool, entry).await?;
    ensure_unlocked(competition.show_prestart_lock, competition.show_time_end, now)?;

    let mut tx = pool.begin().await?;
    CompetitionRepository::lock(&mut tx, entry.competition_id).await?;
    EntryRepository::delete(&mut tx, entry.entry_id).await?;
    let rescored = scoring::recompute_competition_scores(&mut tx, entry.competition_id).await?;
    tx.commit().await?;

    tracing::info!(entry_id = %entry.entry_id, competition = %competition.name, rescored, "Entry deleted");
    Ok(())
}

pub async fn add_contributor(
    pool: &PgPool,
    entry: &Entry,
    req: &CreateContributorRequest,
    now: DateTime<Utc>,
) -> Result<Contributor> {
    let competition = competition_of(pool, entry).await?;
    ensure_unlocked(competition.show_prestart_lock, competition.show_time_end, now)?;

    let already_contributor = ContributorRepository::new(pool)
        .is_contributor(entry.entry_id, req.user_id)
        .await?;
    validate_contributor(&ContributorContext {
        already_contributor,
        entry_status: entry.status,
        extra_info_required: competition.extra_info_required(),
        extra_info: req.extra_info.as_deref(),
    })?;

    let mut tx = pool.begin().await?;
    if req.is_owner {
        ContributorRepository::demote_owner(&mut tx, entry.entry_id, None).await?;
    }
    let contributor = ContributorRepository::insert(
        &mut tx,
        entry.entry_id,
        req.user_id,
        req.extra_info.as_deref(),
        req.is_owner,
    )
    .await?;
    tx.commit().await?;

    Ok(contributor)
}

/// Update a contributor. Promoting a contributor hands ownership over from
/// the previous owner in the same transaction; an omitted `is_owner` keeps
/// the stored flag.
pub async fn update_contributor(
    pool: &PgPool,
    entry: &Entry,
    contributor: &Contributor,
    req: &UpdateContributorRequest,
    now: DateTime<Utc>,
) -> Result<Contributor> {
    let competition = competition_of(pool, entry).await?;
    ensure_unlocked(competition.show_prestart_lock, competition.show_time_end, now)?;

    validate_contributor(&ContributorContext {
        already_contributor: false,
        entry_status: entry.status,
        extra_info_required: competition.extra_info_required(),
        extra_info: req.extra_info.as_deref(),
    })?;
    validate_owner_flag(contributor.is_owner, req.is_owner)?;

    let mut tx = pool.begin().await?;
    if req.changes_ownership(contributor.is_owner) {
        ContributorRepository::demote_owner(&mut tx, entry.entry_id, Some(contributor.contributor_id)).await?;
    }
    let updated = ContributorRepository::update(
        &mut tx,
        contributor.contributor_id,
        req.extra_info.as_deref(),
        req.is_owner,
    )
    .await?;
    tx.commit().await?;

    Ok(updated)
}

pub async fn remove_contributor(pool: &PgPool, entry: &Entry, contributor: &Contributor, now: DateTime<Utc>) -> Result<()> {
    let competition = competition_of(pool, entry).await?;
    ensure_unlocked(competition.show_prestart_lock, competition.show_time_end, now)?;

    ContributorRepository::new(pool).delete(contributor.contributor_id).await
}

async fn competition_of(pool: &PgPool, entry: &Entry) -> Result<Competition> {
    CompetitionRepository::new(pool)
        .find_by_id(entry.competition_id)
        .await
}
