mod history;
mod outreach;
mod prospects;
mod rules;
mod search;
mod stats;

use clap::{Parser, Subcommand};
use prospector_core::AppConfig;
use sqlx::PgPool;
use tracing_subscriber::EnvFilter;

use crate::history::HistoryCommands;
use crate::outreach::OutreachCommands;
use crate::prospects::ProspectsCommands;
use crate::rules::RulesCommands;
use crate::search::SearchTarget;
use crate::stats::StatsCommands;

#[derive(Debug, Parser)]
#[command(name = "prospector")]
#[command(about = "Find, score, and track independent used-car dealers")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database utilities
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Search ZIP codes or a map point for independent dealers
    Search {
        /// ZIP codes to search (up to three)
        #[arg(
            long = "zip",
            num_args = 1..=3,
            required_unless_present = "lat",
            conflicts_with_all = ["lat", "lng"]
        )]
        zips: Vec<String>,
        /// Latitude of a map point to search around
        #[arg(long, requires = "lng", allow_negative_numbers = true)]
        lat: Option<f64>,
        /// Longitude of a map point to search around
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lng: Option<f64>,
        /// Classify and print without writing to the database
        #[arg(long)]
        dry_run: bool,
        /// Maximum number of ranked rows to print
        #[arg(long, default_value = "25")]
        limit: usize,
    },
    /// Manage stored prospects
    Prospects {
        #[command(subcommand)]
        command: ProspectsCommands,
    },
    /// Log and review outreach
    Outreach {
        #[command(subcommand)]
        command: OutreachCommands,
    },
    /// CRM analytics
    Stats {
        #[command(subcommand)]
        command: StatsCommands,
    },
    /// Past searches
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
    /// Classification rule files
    Rules {
        #[command(subcommand)]
        command: RulesCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = prospector_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("prospector: run `prospector --help` for available commands");
        return Ok(());
    };

    match command {
        Commands::Rules { command } => rules::run_rules(&config, command),
        Commands::Search {
            zips,
            lat,
            lng,
            dry_run,
            limit,
        } => {
            let target = match (lat, lng) {
                (Some(lat), Some(lng)) => SearchTarget::Point { lat, lng },
                _ => SearchTarget::Zips(zips),
            };
            let pool = if dry_run {
                None
            } else {
                Some(connect(&config).await?)
            };
            search::run_search(pool.as_ref(), &config, &target, limit).await
        }
        Commands::Db { command } => {
            let pool = connect(&config).await?;
            run_db(&pool, command).await
        }
        Commands::Prospects { command } => {
            let pool = connect(&config).await?;
            prospects::run_prospects(&pool, command).await
        }
        Commands::Outreach { command } => {
            let pool = connect(&config).await?;
            outreach::run_outreach(&pool, command).await
        }
        Commands::Stats { command } => {
            let pool = connect(&config).await?;
            stats::run_stats(&pool, command).await
        }
        Commands::History { command } => {
            let pool = connect(&config).await?;
            history::run_history(&pool, command).await
        }
    }
}

async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    let pool_config = prospector_db::PoolConfig::from_app_config(config);
    let pool = prospector_db::connect_pool(&config.database_url, pool_config).await?;
    Ok(pool)
}

async fn run_db(pool: &PgPool, command: DbCommands) -> anyhow::Result<()> {
    match command {
        DbCommands::Ping => {
            prospector_db::health_check(pool).await?;
            println!("database ok");
        }
        DbCommands::Migrate => {
            let applied = prospector_db::run_migrations(pool).await?;
            println!("applied {applied} migration(s)");
        }
    }
    Ok(())
}

/// Shorten `text` to `max` characters, marking the cut with `...`.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let kept: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        text.to_string()
    }
}

/// Render an optional value, or an em dash when absent.
fn or_dash<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "\u{2014}".to_string(), |v| v.to_string())
}

#[cfg(test)]
mod tests;
