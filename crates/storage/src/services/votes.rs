use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::validation::{VoteContext, validate_vote};
use crate::dto::vote::{CastVoteRequest, UpdateVoteRequest};
use crate::error::Result;
use crate::models::{User, Vote};
use crate::repository::competition::CompetitionRepository;
use crate::repository::contributor::ContributorRepository;
use crate::repository::entry::EntryRepository;
use crate::repository::vote::VoteRepository;

use super::scoring;

async fn vote_context(
    pool: &PgPool,
    entry_id: Uuid,
    voter: Uuid,
    score: i16,
    exclude: Option<Uuid>,
    now: DateTime<Utc>,
) -> Result<(VoteContext, Uuid)> {
    let entry = EntryRepository::new(pool).find_by_id(entry_id).await?;
    let competition = CompetitionRepository::new(pool)
        .find_by_id(entry.competition_id)
        .await?;

    let voter_is_contributor = ContributorRepository::new(pool)
        .is_contributor(entry_id, voter)
        .await?;
    let existing_vote = VoteRepository::new(pool)
        .find_by_entry_and_user(entry_id, voter)
        .await?
        .map(|vote| vote.vote_id)
        .filter(|id| Some(*id) != exclude);

    let ctx = VoteContext {
        score,
        state: competition.compute_state(now),
        voter_is_contributor,
        existing_vote,
    };

    Ok((ctx, competition.competition_id))
}

/// Record a vote and rescore the competition in one transaction. The jury
/// flag comes from the voter's role at the time of voting.
///
/// Every vote write holds the competition row lock while rescoring, so
/// concurrent writers in one competition are serialized.
pub async fn cast_vote(pool: &PgPool, voter: &User, req: &CastVoteRequest, now: DateTime<Utc>) -> Result<Vote> {
    let (ctx, competition_id) = vote_context(pool, req.entry_id, voter.user_id, req.score, None, now).await?;
    validate_vote(&ctx)?;

    let mut tx = pool.begin().await?;
    CompetitionRepository::lock(&mut tx, competition_id).await?;
    let vote = VoteRepository::insert(
        &mut tx,
        req.entry_id,
        voter.user_id,
        req.score,
        voter.role.casts_jury_votes(),
    )
    .await?;
    scoring::recompute_competition_scores(&mut tx, competition_id).await?;
    tx.commit().await?;

    tracing::info!(vote_id = %vote.vote_id, entry_id = %vote.entry_id, jury = vote.jury, "Vote cast");
    Ok(vote)
}

/// Change the score of an existing vote. Entry and voter stay fixed.
pub async fn update_vote(pool: &PgPool, vote: &Vote, req: &UpdateVoteRequest, now: DateTime<Utc>) -> Result<Vote> {
    let (ctx, competition_id) =
        vote_context(pool, vote.entry_id, vote.user_id, req.score, Some(vote.vote_id), now).await?;
    validate_vote(&ctx)?;

    let mut tx = pool.begin().await?;
    CompetitionRepository::lock(&mut tx, competition_id).await?;
    let updated = VoteRepository::update_score(&mut tx, vote.vote_id, req.score).await?;
    scoring::recompute_competition_scores(&mut tx, competition_id).await?;
    tx.commit().await?;

    tracing::info!(vote_id = %updated.vote_id, score = updated.score, "Vote updated");
    Ok(updated)
}

pub async fn delete_vote(pool: &PgPool, vote: &Vote) -> Result<()> {
    let entry = EntryRepository::new(pool).find_by_id(vote.entry_id).await?;

    let mut tx = pool.begin().await?;
    CompetitionRepository::lock(&mut tx, entry.competition_id).await?;
    VoteRepository::delete(&mut tx, vote.vote_id).await?;
    scoring::recompute_competition_scores(&mut tx, entry.competition_id).await?;
    tx.commit().await?;

    tracing::info!(vote_id = %vote.vote_id, "Vote deleted");
    Ok(())
}
