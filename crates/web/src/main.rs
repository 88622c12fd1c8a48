use anyhow::Context;
use storage::Database;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod app;
mod config;
mod error;
mod features;
mod jwt;
mod middleware;
mod state;

use config::Config;
use features::{competitions, contributors, entries, genres, health, results, users, votes};
use jwt::JwtKeys;
use middleware::auth::ApiKeys;
use state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::handlers::health,
        genres::handlers::list_genres,
        genres::handlers::create_genre,
        genres::handlers::update_genre,
        genres::handlers::delete_genre,
        competitions::handlers::list_competitions,
        competitions::handlers::get_competition,
        competitions::handlers::create_competition,
        competitions::handlers::update_competition,
        competitions::handlers::delete_competition,
        entries::handlers::list_entries,
        entries::handlers::get_entry,
        entries::handlers::create_entry,
        entries::handlers::update_entry,
        entries::handlers::delete_entry,
        entries::handlers::set_entry_status,
        contributors::handlers::list_contributors,
        contributors::handlers::create_contributor,
        contributors::handlers::update_contributor,
        contributors::handlers::delete_contributor,
        votes::handlers::list_votes,
        votes::handlers::create_vote,
        votes::handlers::update_vote,
        votes::handlers::delete_vote,
        results::handlers::list_results,
        users::handlers::get_me,
        users::handlers::create_user,
        users::handlers::update_user,
        users::handlers::issue_token,
    ),
    components(
        schemas(
            storage::domain::lifecycle::CompetitionState,
            storage::dto::common::PaginationMeta,
            storage::dto::competition::CompetitionRequest,
            storage::dto::competition::CompetitionResponse,
            storage::dto::genre::GenreRequest,
            storage::dto::entry::CreateEntryRequest,
            storage::dto::entry::UpdateEntryRequest,
            storage::dto::entry::EntryStatusRequest,
            storage::dto::contributor::CreateContributorRequest,
            storage::dto::contributor::UpdateContributorRequest,
            storage::dto::vote::CastVoteRequest,
            storage::dto::vote::UpdateVoteRequest,
            storage::dto::user::CreateUserRequest,
            storage::dto::user::UpdateUserRequest,
            storage::dto::user::TokenResponse,
            storage::dto::results::ResultEntry,
            storage::dto::results::CompetitionResults,
            storage::models::Competition,
            storage::models::Visibility,
            storage::models::Genre,
            storage::models::GenreCategory,
            storage::models::Entry,
            storage::models::EntryStatus,
            storage::models::Contributor,
            storage::models::Vote,
            storage::models::User,
            storage::models::UserRole,
        )
    ),
    tags(
        (name = "health", description = "Service health"),
        (name = "genres", description = "Competition genres"),
        (name = "competitions", description = "Competitions and their lifecycle"),
        (name = "entries", description = "Entries submitted to competitions"),
        (name = "contributors", description = "Entry contributors"),
        (name = "votes", description = "Voting on qualified entries"),
        (name = "results", description = "Published competition results"),
        (name = "users", description = "User accounts and tokens"),
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("API Key or JWT")
                        .build(),
                ),
            )
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting competition API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    tracing::info!(
        "Connecting to database at: {}",
        config
            .database_url
            .split('@')
            .next_back()
            .unwrap_or("unknown")
    );
    let db = Database::new(&config.database_url)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations");
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    let state = AppState {
        db,
        api_keys: ApiKeys::from_comma_separated(&config.api_keys),
        jwt: JwtKeys::new(&config.jwt_secret, config.jwt_ttl_hours),
    };

    let app = app::router(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let bind_address = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {bind_address}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
