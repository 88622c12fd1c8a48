use std::time::Duration;

use chrono::Utc;
use clap::{Parser, Subcommand};
use storage::Database;
use storage::services::{entry_progress, state_sweep};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "jobs")]
#[command(about = "Periodic maintenance jobs for the competition backend", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Persist the time-derived state of every competition.
    UpdateCompetitionStates {
        /// Keep running, sweeping again every N seconds.
        #[arg(long, value_name = "SECONDS", value_parser = clap::value_parser!(u64).range(1..))]
        watch: Option<u64>,
    },
    /// Move draft entries on to New or Qualified once they have contributors
    /// and every contributor has filled in any extra info the competition asks for.
    EntryStatusProgress,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("jobs={},storage={}", log_level, log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Connecting to database...");
    let db = Database::new(&cli.database_url).await?;
    db.run_migrations().await?;

    match cli.command {
        Commands::UpdateCompetitionStates { watch: None } => {
            update_competition_states(&db).await?;
        }
        Commands::UpdateCompetitionStates {
            watch: Some(seconds),
        } => {
            let mut interval = tokio::time::interval(Duration::from_secs(seconds));
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        // keep watching after a failed sweep
                        if let Err(e) = update_competition_states(&db).await {
                            tracing::error!("Competition state sweep failed: {}", e);
                        }
                    }
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Interrupted, stopping");
                        break;
                    }
                }
            }
        }
        Commands::EntryStatusProgress => {
            entry_status_progress(&db).await?;
        }
    }

    Ok(())
}

async fn update_competition_states(db: &Database) -> storage::error::Result<()> {
    let started = Utc::now();
    tracing::info!("=== Starting at {}", started);

    let report = state_sweep::run(db.pool(), started).await?;
    tracing::info!(
        "Checked {} competitions, updated {} (voting opened: {}, voting closed: {})",
        report.checked,
        report.updated,
        report.voting_opened,
        report.voting_closed
    );

    tracing::info!("=== Finished at {}", Utc::now());
    Ok(())
}

async fn entry_status_progress(db: &Database) -> storage::error::Result<()> {
    tracing::info!("=== Starting at {}", Utc::now());

    let report = entry_progress::run(db.pool()).await?;
    tracing::info!(
        "Checked {} draft entries: {} qualified, {} new",
        report.checked,
        report.qualified,
        report.new
    );

    tracing::info!("=== Finished at {}", Utc::now());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DB: &str = "--database-url=postgres://localhost/compo";

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_state_sweep() {
        let cli = Cli::try_parse_from(["jobs", DB, "update-competition-states"]).unwrap();
        assert_eq!(
            cli.command,
            Commands::UpdateCompetitionStates { watch: None }
        );
        assert!(!cli.verbose);

        let cli = Cli::try_parse_from([
            "jobs",
            DB,
            "-v",
            "update-competition-states",
            "--watch",
            "60",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Commands::UpdateCompetitionStates { watch: Some(60) }
        );
        assert!(cli.verbose);
    }

    #[test]
    fn test_parse_entry_progress() {
        let cli = Cli::try_parse_from(["jobs", DB, "entry-status-progress"]).unwrap();
        assert_eq!(cli.command, Commands::EntryStatusProgress);
        assert_eq!(cli.database_url, "postgres://localhost/compo");
    }

    #[test]
    fn test_rejects_zero_watch_interval() {
        assert!(
            Cli::try_parse_from(["jobs", DB, "update-competition-states", "--watch", "0"])
                .is_err()
        );
    }
}
