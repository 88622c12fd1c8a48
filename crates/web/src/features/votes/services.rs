use chrono::{DateTime, Utc};
use sqlx::PgPool;
use storage::{
    domain::policy::{Action, Actor, Resource, authorize},
    dto::vote::{CastVoteRequest, UpdateVoteRequest},
    error::Result,
    models::{User, Vote},
    repository::vote::VoteRepository,
    services::votes,
};
use uuid::Uuid;

pub async fn list_own_votes(pool: &PgPool, user: &User) -> Result<Vec<Vote>> {
    VoteRepository::new(pool).list_by_user(user.user_id).await
}

pub async fn cast_vote(pool: &PgPool, user: &User, request: &CastVoteRequest, now: DateTime<Utc>) -> Result<Vote> {
    votes::cast_vote(pool, user, request, now).await
}

async fn load_for(pool: &PgPool, actor: &Actor, id: Uuid, action: Action) -> Result<Vote> {
    let vote = VoteRepository::new(pool).find_by_id(id).await?;
    authorize(actor, Resource::Vote { voter: vote.user_id }, action).require()?;
    Ok(vote)
}

pub async fn update_vote(
    pool: &PgPool,
    actor: &Actor,
    id: Uuid,
    request: &UpdateVoteRequest,
    now: DateTime<Utc>,
) -> Result<Vote> {
    let vote = load_for(pool, actor, id, Action::Change).await?;
    votes::update_vote(pool, &vote, request, now).await
}

pub async fn delete_vote(pool: &PgPool, actor: &Actor, id: Uuid) -> Result<()> {
    let vote = load_for(pool, actor, id, Action::Delete).await?;
    votes::delete_vote(pool, &vote).await
}
