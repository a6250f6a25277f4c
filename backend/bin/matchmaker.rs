use anyhow::Result;
use chrono::Duration;
use clap::Parser;
use cupid::db::{DatabaseConfig, PgMatchStore, PgUserStore};
use cupid::{EngineConfig, MatchEngine, get_db_pool, utils};
use std::sync::Arc;
use tracing::{info, warn};

/// Run one matching pass from the command line.
///
/// The same pass the /api/admin/do_match endpoint triggers, for operators
/// and cron jobs that bypass the HTTP surface.
#[derive(Debug, Parser)]
#[command(name = "matchmaker")]
struct Args {
    /// Override the match ttl in hours
    #[arg(long)]
    ttl_hours: Option<i64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    utils::init_logging();

    let args = Args::parse();

    info!("💘 Starting Cupid matchmaker pass...");

    let db_config = DatabaseConfig::from_env()?;
    let pool = get_db_pool(&db_config).await?;

    let users = Arc::new(PgUserStore::new(pool.clone()));
    let matches = Arc::new(PgMatchStore::new(pool));

    let mut engine_config = EngineConfig::default();
    if let Some(hours) = args.ttl_hours {
        engine_config.match_ttl = Duration::hours(hours);
    }

    let engine = MatchEngine::new(users, matches, engine_config);
    let report = engine.run_pass().await?;

    info!(
        "✅ Pass complete: {} matches expired, {} committed",
        report.expired,
        report.total_matched()
    );
    for cohort in &report.cohorts {
        match &cohort.error {
            Some(error) => warn!(
                "pool {}: {} eligible, {} edges, {} matched, abandoned: {error}",
                cohort.pool, cohort.eligible, cohort.edges, cohort.matched
            ),
            None => info!(
                "pool {}: {} eligible, {} edges, {} matched",
                cohort.pool, cohort.eligible, cohort.edges, cohort.matched
            ),
        }
    }

    if report.has_errors() {
        std::process::exit(1);
    }
    Ok(())
}
