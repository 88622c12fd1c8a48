mod common;

use common::{at, competition, competition_request, entry, user};
use sqlx::PgPool;
use storage::domain::{CompetitionState, VoteTally, compute_state, votesum};
use storage::dto::contributor::{CreateContributorRequest, UpdateContributorRequest};
use storage::dto::vote::CastVoteRequest;
use storage::error::StorageError;
use storage::models::{Entry, UserRole};
use storage::repository::{
    competition::CompetitionRepository, contributor::ContributorRepository, entry::EntryRepository,
    vote::VoteRepository,
};
use storage::services::{competitions, entries, votes};
use uuid::Uuid;

async fn score_of(pool: &PgPool, entry: &Entry) -> i32 {
    EntryRepository::new(pool).find_by_id(entry.entry_id).await.unwrap().score
}

async fn tally(pool: &PgPool, entry: &Entry) -> VoteTally {
    let mut conn = pool.acquire().await.unwrap();
    VoteRepository::tally(&mut conn, entry.entry_id).await.unwrap()
}

async fn vote(pool: &PgPool, voter: &storage::models::User, entry: &Entry, score: i16) {
    let req = CastVoteRequest {
        entry_id: entry.entry_id,
        score,
    };
    votes::cast_vote(pool, voter, &req, at("13:00")).await.unwrap();
}

#[sqlx::test(migrations = "./migrations")]
async fn saved_competition_stores_state_computed_at_save_time(pool: PgPool) {
    let created = competition(&pool).await;
    assert_eq!(created.state, CompetitionState::New);
    assert_eq!(created.state, compute_state(&created.boundaries(), at("08:00")));

    let req = competition_request(created.genre_id, "Oldskool");
    let updated = competitions::save(&pool, Some(created.competition_id), &req, at("11:00"))
        .await
        .unwrap();
    assert_eq!(updated.state, CompetitionState::Run);

    let stored = CompetitionRepository::new(&pool)
        .find_by_id(created.competition_id)
        .await
        .unwrap();
    assert_eq!(stored.state, compute_state(&stored.boundaries(), at("11:00")));
}

#[sqlx::test(migrations = "./migrations")]
async fn saved_timestamps_are_rounded_to_the_minute(pool: PgPool) {
    let created = competition(&pool).await;
    let mut req = competition_request(created.genre_id, "Oldskool");
    req.run_time_end = Some("2030-06-01T11:59:42Z".parse().unwrap());

    let updated = competitions::save(&pool, Some(created.competition_id), &req, at("09:00"))
        .await
        .unwrap();
    assert_eq!(updated.run_time_end, at("11:59"));
}

#[sqlx::test(migrations = "./migrations")]
async fn competition_with_entries_cannot_be_deleted(pool: PgPool) {
    let competition = competition(&pool).await;
    let owner = user(&pool, "owner", UserRole::Participant).await;
    let entry = entry(&pool, &competition, &owner, "First").await;
    let repo = CompetitionRepository::new(&pool);

    let result = repo.delete(competition.competition_id).await;
    assert!(matches!(result, Err(StorageError::ConstraintViolation(_))));

    entries::delete(&pool, &entry, at("11:30")).await.unwrap();
    repo.delete(competition.competition_id).await.unwrap();
    assert!(matches!(
        repo.find_by_id(competition.competition_id).await,
        Err(StorageError::NotFound)
    ));
}

#[sqlx::test(migrations = "./migrations")]
async fn tally_splits_entry_and_competition_sums(pool: PgPool) {
    let competition = competition(&pool).await;
    let alice = user(&pool, "alice", UserRole::Participant).await;
    let bob = user(&pool, "bob", UserRole::Participant).await;
    let first = entry(&pool, &competition, &alice, "First").await;
    let second = entry(&pool, &competition, &bob, "Second").await;

    let mortal_a = user(&pool, "mortal_a", UserRole::Mortal).await;
    let mortal_b = user(&pool, "mortal_b", UserRole::Mortal).await;
    let jury = user(&pool, "jury", UserRole::Jury).await;
    vote(&pool, &mortal_a, &first, 5).await;
    vote(&pool, &mortal_b, &second, 5).await;
    vote(&pool, &jury, &second, 4).await;

    assert_eq!(
        tally(&pool, &first).await,
        VoteTally {
            mortal_self: 5,
            jury_self: 0,
            mortal_sum: 10,
            jury_sum: 4,
        }
    );
    assert_eq!(
        tally(&pool, &second).await,
        VoteTally {
            mortal_self: 5,
            jury_self: 4,
            mortal_sum: 10,
            jury_sum: 4,
        }
    );

    assert_eq!(score_of(&pool, &first).await, 5);
    assert_eq!(score_of(&pool, &second).await, 9);
}

#[sqlx::test(migrations = "./migrations")]
async fn second_vote_on_the_same_entry_is_rejected(pool: PgPool) {
    let competition = competition(&pool).await;
    let owner = user(&pool, "owner", UserRole::Participant).await;
    let first = entry(&pool, &competition, &owner, "First").await;
    let voter = user(&pool, "voter", UserRole::Mortal).await;
    vote(&pool, &voter, &first, 3).await;

    let again = CastVoteRequest {
        entry_id: first.entry_id,
        score: 5,
    };
    let result = votes::cast_vote(&pool, &voter, &again, at("13:00")).await;
    assert!(matches!(result, Err(StorageError::Validation(_))));

    // the unique index backs the check when two requests race past it
    let mut tx = pool.begin().await.unwrap();
    let result = VoteRepository::insert(&mut tx, first.entry_id, voter.user_id, 5, false).await;
    assert!(matches!(result, Err(StorageError::ConstraintViolation(_))));
}

#[sqlx::test(migrations = "./migrations")]
async fn deleting_an_entry_rescores_the_rest(pool: PgPool) {
    let competition = competition(&pool).await;
    let alice = user(&pool, "alice", UserRole::Participant).await;
    let bob = user(&pool, "bob", UserRole::Participant).await;
    let first = entry(&pool, &competition, &alice, "First").await;
    let second = entry(&pool, &competition, &bob, "Second").await;

    vote(&pool, &user(&pool, "mortal_a", UserRole::Mortal).await, &first, 5).await;
    vote(&pool, &user(&pool, "mortal_b", UserRole::Mortal).await, &second, 5).await;
    vote(&pool, &user(&pool, "jury", UserRole::Jury).await, &second, 4).await;
    assert_eq!(score_of(&pool, &second).await, 9);

    entries::delete(&pool, &first, at("13:30")).await.unwrap();

    // the mortal pool shrinks from 10 to 5: 5 + 4 * (5 / 0.7 * 0.3) / 4 = 7.14
    assert_eq!(score_of(&pool, &second).await, 7);
    assert_eq!(
        score_of(&pool, &second).await,
        votesum(&tally(&pool, &second).await)
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn concurrent_votes_leave_consistent_scores(pool: PgPool) {
    let competition = competition(&pool).await;
    let alice = user(&pool, "alice", UserRole::Participant).await;
    let bob = user(&pool, "bob", UserRole::Participant).await;
    let first = entry(&pool, &competition, &alice, "First").await;
    let second = entry(&pool, &competition, &bob, "Second").await;

    let mut voters = Vec::new();
    for i in 0..6 {
        let role = if i % 3 == 0 { UserRole::Jury } else { UserRole::Mortal };
        voters.push(user(&pool, &format!("voter{i}"), role).await);
    }

    let handles: Vec<_> = voters
        .into_iter()
        .enumerate()
        .map(|(i, voter)| {
            let target = if i % 2 == 0 { &first } else { &second };
            let req = CastVoteRequest {
                entry_id: target.entry_id,
                score: (i % 5 + 1) as i16,
            };
            let pool = pool.clone();
            tokio::spawn(async move { votes::cast_vote(&pool, &voter, &req, at("13:00")).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    for entry in [&first, &second] {
        assert_eq!(score_of(&pool, entry).await, votesum(&tally(&pool, entry).await));
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn locking_an_unknown_competition_is_not_found(pool: PgPool) {
    let mut tx = pool.begin().await.unwrap();
    let result = CompetitionRepository::lock(&mut tx, Uuid::new_v4()).await;
    assert!(matches!(result, Err(StorageError::NotFound)));
}

async fn owners(pool: &PgPool, entry: &Entry) -> Vec<Uuid> {
    ContributorRepository::new(pool)
        .list_by_entry(entry.entry_id)
        .await
        .unwrap()
        .into_iter()
        .filter(|c| c.is_owner)
        .map(|c| c.user_id)
        .collect()
}

#[sqlx::test(migrations = "./migrations")]
async fn contributor_update_without_owner_flag_keeps_ownership(pool: PgPool) {
    let competition = competition(&pool).await;
    let owner = user(&pool, "owner", UserRole::Participant).await;
    let entry = entry(&pool, &competition, &owner, "First").await;
    let contributor = ContributorRepository::new(&pool)
        .list_by_entry(entry.entry_id)
        .await
        .unwrap()
        .remove(0);

    let req: UpdateContributorRequest =
        serde_json::from_value(serde_json::json!({ "extra_info": "Handle: owner" })).unwrap();
    let updated = entries::update_contributor(&pool, &entry, &contributor, &req, at("11:30"))
        .await
        .unwrap();

    assert!(updated.is_owner);
    assert_eq!(updated.extra_info.as_deref(), Some("Handle: owner"));
    assert_eq!(owners(&pool, &entry).await, vec![owner.user_id]);
}

#[sqlx::test(migrations = "./migrations")]
async fn promoting_a_contributor_demotes_the_previous_owner(pool: PgPool) {
    let competition = competition(&pool).await;
    let owner = user(&pool, "owner", UserRole::Participant).await;
    let member = user(&pool, "member", UserRole::Participant).await;
    let entry = entry(&pool, &competition, &owner, "First").await;

    let added = entries::add_contributor(
        &pool,
        &entry,
        &CreateContributorRequest {
            user_id: member.user_id,
            extra_info: None,
            is_owner: false,
        },
        at("11:10"),
    )
    .await
    .unwrap();

    let promote = UpdateContributorRequest {
        extra_info: None,
        is_owner: Some(true),
    };
    entries::update_contributor(&pool, &entry, &added, &promote, at("11:20"))
        .await
        .unwrap();

    assert_eq!(owners(&pool, &entry).await, vec![member.user_id]);
}

#[sqlx::test(migrations = "./migrations")]
async fn owner_cannot_drop_their_own_flag(pool: PgPool) {
    let competition = competition(&pool).await;
    let owner = user(&pool, "owner", UserRole::Participant).await;
    let entry = entry(&pool, &competition, &owner, "First").await;
    let contributor = ContributorRepository::new(&pool)
        .list_by_entry(entry.entry_id)
        .await
        .unwrap()
        .remove(0);

    let demote = UpdateContributorRequest {
        extra_info: None,
        is_owner: Some(false),
    };
    let result = entries::update_contributor(&pool, &entry, &contributor, &demote, at("11:30")).await;

    assert!(matches!(result, Err(StorageError::Validation(_))));
    assert_eq!(owners(&pool, &entry).await, vec![owner.user_id]);
}
