use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use storage::{
    domain::policy::{Action, Actor, EntryFacts, Resource, authorize},
    dto::entry::{CreateEntryRequest, EntryFilter, EntryStatusRequest, UpdateEntryRequest},
    error::Result,
    models::{Competition, Contributor, Entry, User},
    repository::{
        competition::CompetitionRepository, contributor::ContributorRepository,
        entry::EntryRepository,
    },
    services::entries,
};
use uuid::Uuid;

fn entry_facts<'a>(
    entry: &Entry,
    competition: &Competition,
    contributors: &'a [Uuid],
    owner: Option<Uuid>,
    now: DateTime<Utc>,
) -> EntryFacts<'a> {
    EntryFacts {
        state: competition.compute_state(now),
        status: entry.status,
        owner,
        contributors,
    }
}

/// An entry loaded together with everything its access rules depend on.
pub struct EntryAccess {
    pub entry: Entry,
    pub competition: Competition,
    pub contributors: Vec<Contributor>,
}

impl EntryAccess {
    pub async fn load(pool: &PgPool, entry_id: Uuid) -> Result<Self> {
        let entry = EntryRepository::new(pool).find_by_id(entry_id).await?;
        let competition = CompetitionRepository::new(pool)
            .find_by_id(entry.competition_id)
            .await?;
        let contributors = ContributorRepository::new(pool)
            .list_by_entry(entry_id)
            .await?;

        Ok(Self {
            entry,
            competition,
            contributors,
        })
    }

    pub fn owner(&self) -> Option<Uuid> {
        self.contributors
            .iter()
            .find(|c| c.is_owner)
            .map(|c| c.user_id)
    }

    pub fn authorize(&self, actor: &Actor, action: Action, now: DateTime<Utc>) -> Result<()> {
        let user_ids: Vec<Uuid> = self.contributors.iter().map(|c| c.user_id).collect();
        let facts = entry_facts(&self.entry, &self.competition, &user_ids, self.owner(), now);

        authorize(actor, Resource::Entry(facts), action).require()
    }
}

/// Entries of a competition that `actor` is allowed to see.
pub async fn list_entries(
    pool: &PgPool,
    actor: &Actor,
    competition_id: Uuid,
    filter: &EntryFilter,
    now: DateTime<Utc>,
) -> Result<Vec<Entry>> {
    let competition = CompetitionRepository::new(pool)
        .find_by_id(competition_id)
        .await?;
    authorize(actor, Resource::Competition(competition.facts()), Action::View).require()?;

    let entries = EntryRepository::new(pool)
        .list_by_competition(competition_id, filter.status)
        .await?;
    if actor.is_privileged() {
        return Ok(entries);
    }

    let mut by_entry: HashMap<Uuid, Vec<Contributor>> = HashMap::new();
    for contributor in ContributorRepository::new(pool)
        .list_by_competition(competition_id)
        .await?
    {
        by_entry.entry(contributor.entry_id).or_default().push(contributor);
    }

    let visible = entries
        .into_iter()
        .filter(|entry| {
            let contributors = by_entry.get(&entry.entry_id).map(Vec::as_slice).unwrap_or(&[]);
            let user_ids: Vec<Uuid> = contributors.iter().map(|c| c.user_id).collect();
            let owner = contributors.iter().find(|c| c.is_owner).map(|c| c.user_id);
            let facts = entry_facts(entry, &competition, &user_ids, owner, now);
            authorize(actor, Resource::Entry(facts), Action::View).is_allowed()
        })
        .collect();

    Ok(visible)
}

pub async fn get_entry(pool: &PgPool, actor: &Actor, id: Uuid, now: DateTime<Utc>) -> Result<Entry> {
    let access = EntryAccess::load(pool, id).await?;
    access.authorize(actor, Action::View, now)?;
    Ok(access.entry)
}

pub async fn register_entry(
    pool: &PgPool,
    user: &User,
    request: &CreateEntryRequest,
    now: DateTime<Utc>,
) -> Result<Entry> {
    entries::register(pool, user.user_id, request, now).await
}

pub async fn update_entry(
    pool: &PgPool,
    actor: &Actor,
    id: Uuid,
    request: &UpdateEntryRequest,
    now: DateTime<Utc>,
) -> Result<Entry> {
    let access = EntryAccess::load(pool, id).await?;
    access.authorize(actor, Action::Change, now)?;

    entries::update(pool, &access.entry, request, now).await
}

pub async fn delete_entry(pool: &PgPool, actor: &Actor, id: Uuid, now: DateTime<Utc>) -> Result<()> {
    let access = EntryAccess::load(pool, id).await?;
    access.authorize(actor, Action::Delete, now)?;

    entries::delete(pool, &access.entry, now).await
}

pub async fn set_entry_status(pool: &PgPool, id: Uuid, request: &EntryStatusRequest) -> Result<Entry> {
    let entry = EntryRepository::new(pool).set_status(id, request).await?;
    tracing::info!(entry_id = %id, status = ?entry.status, "Entry status changed");
    Ok(entry)
}
