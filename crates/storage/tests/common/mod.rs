//! Fixtures shared by the database tests.
//!
//! Schedule used throughout, all on 2030-06-01: run 10:00-12:00, voting
//! 12:00-14:00, no registration phase.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use storage::dto::competition::CompetitionRequest;
use storage::dto::entry::CreateEntryRequest;
use storage::dto::genre::GenreRequest;
use storage::dto::user::CreateUserRequest;
use storage::models::{Competition, Entry, Genre, GenreCategory, User, UserRole};
use storage::repository::{genre::GenreRepository, user::UserRepository};
use storage::services::{competitions, entries};
use uuid::Uuid;

pub fn at(time: &str) -> DateTime<Utc> {
    format!("2030-06-01T{time}:00Z").parse().unwrap()
}

pub async fn genre(pool: &PgPool) -> Genre {
    GenreRepository::new(pool)
        .create(&GenreRequest {
            category: GenreCategory::Creative,
            name: "Demo".to_string(),
        })
        .await
        .unwrap()
}

pub async fn user(pool: &PgPool, username: &str, role: UserRole) -> User {
    UserRepository::new(pool)
        .create(&CreateUserRequest {
            username: username.to_string(),
            display_name: username.to_string(),
            role,
            is_staff: false,
        })
        .await
        .unwrap()
}

pub fn competition_request(genre_id: Uuid, name: &str) -> CompetitionRequest {
    serde_json::from_value(json!({
        "genre_id": genre_id,
        "name": name,
        "published": true,
        "run_time_start": "2030-06-01T10:00:00Z",
        "run_time_end": "2030-06-01T12:00:00Z",
        "vote_time_start": "2030-06-01T12:00:00Z",
        "vote_time_end": "2030-06-01T14:00:00Z",
    }))
    .unwrap()
}

/// A published competition saved before its run starts.
pub async fn competition(pool: &PgPool) -> Competition {
    let genre = genre(pool).await;
    competitions::save(pool, None, &competition_request(genre.genre_id, "Oldskool"), at("08:00"))
        .await
        .unwrap()
}

/// Register an entry while the competition runs; `owner` becomes its owner.
pub async fn entry(pool: &PgPool, competition: &Competition, owner: &User, title: &str) -> Entry {
    let req = CreateEntryRequest {
        competition_id: competition.competition_id,
        title: title.to_string(),
        extra_info: None,
        crew_msg: None,
        screen_msg: None,
        vote_msg: None,
        comment: None,
    };
    entries::register(pool, owner.user_id, &req, at("11:00")).await.unwrap()
}
