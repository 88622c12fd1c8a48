use sqlx::PgConnection;
use uuid::Uuid;

use crate::domain::scoring::votesum;
use crate::error::Result;
use crate::repository::entry::EntryRepository;
use crate::repository::vote::VoteRepository;

/// Tally, score and persist one entry inside the caller's transaction.
pub async fn recompute_entry_score(conn: &mut PgConnection, entry_id: Uuid) -> Result<i32> {
    let tally = VoteRepository::tally(conn, entry_id).await?;
    let score = votesum(&tally);
    EntryRepository::set_score(conn, entry_id, score).await?;

    tracing::debug!(%entry_id, ?tally, score, "Entry score recomputed");
    Ok(score)
}

/// Rescore every entry of a competition. The jury weighting depends on
/// competition-wide sums, so one vote moves every entry's score.
pub async fn recompute_competition_scores(conn: &mut PgConnection, competition_id: Uuid) -> Result<usize> {
    let entry_ids = EntryRepository::ids_in_competition(conn, competition_id).await?;
    for entry_id in &entry_ids {
        recompute_entry_score(conn, *entry_id).await?;
    }

    Ok(entry_ids.len())
}
