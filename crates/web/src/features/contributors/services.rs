use chrono::{DateTime, Utc};
use sqlx::PgPool;
use storage::{
    domain::policy::{Action, Actor, ContributorFacts, Resource, authorize, authorize_ownership_change},
    dto::contributor::{CreateContributorRequest, UpdateContributorRequest},
    error::Result,
    models::Contributor,
    repository::contributor::ContributorRepository,
    services::entries,
};
use uuid::Uuid;

use crate::features::entries::services::EntryAccess;

/// Contributors are listed to whoever can see the entry itself.
pub async fn list_contributors(
    pool: &PgPool,
    actor: &Actor,
    entry_id: Uuid,
    now: DateTime<Utc>,
) -> Result<Vec<Contributor>> {
    let access = EntryAccess::load(pool, entry_id).await?;
    access.authorize(actor, Action::View, now)?;
    Ok(access.contributors)
}

pub async fn add_contributor(
    pool: &PgPool,
    actor: &Actor,
    entry_id: Uuid,
    request: &CreateContributorRequest,
    now: DateTime<Utc>,
) -> Result<Contributor> {
    let access = EntryAccess::load(pool, entry_id).await?;
    let facts = ContributorFacts {
        user_id: request.user_id,
        entry_owner: access.owner(),
    };
    authorize(actor, Resource::Contributor(facts), Action::Create).require()?;

    let contributor = entries::add_contributor(pool, &access.entry, request, now).await?;
    tracing::info!(entry_id = %entry_id, user_id = %contributor.user_id, "Contributor added");
    Ok(contributor)
}

async fn load_for(
    pool: &PgPool,
    actor: &Actor,
    id: Uuid,
    action: Action,
) -> Result<(Contributor, EntryAccess)> {
    let contributor = ContributorRepository::new(pool).find_by_id(id).await?;
    let access = EntryAccess::load(pool, contributor.entry_id).await?;

    let facts = ContributorFacts {
        user_id: contributor.user_id,
        entry_owner: access.owner(),
    };
    authorize(actor, Resource::Contributor(facts), action).require()?;

    Ok((contributor, access))
}

pub async fn update_contributor(
    pool: &PgPool,
    actor: &Actor,
    id: Uuid,
    request: &UpdateContributorRequest,
    now: DateTime<Utc>,
) -> Result<Contributor> {
    let (contributor, access) = load_for(pool, actor, id, Action::Change).await?;
    if request.changes_ownership(contributor.is_owner) {
        let facts = ContributorFacts {
            user_id: contributor.user_id,
            entry_owner: access.owner(),
        };
        authorize_ownership_change(actor, facts).require()?;
    }

    entries::update_contributor(pool, &access.entry, &contributor, request, now).await
}

pub async fn delete_contributor(pool: &PgPool, actor: &Actor, id: Uuid, now: DateTime<Utc>) -> Result<()> {
    let (contributor, access) = load_for(pool, actor, id, Action::Delete).await?;

    entries::remove_contributor(pool, &access.entry, &contributor, now).await
}
