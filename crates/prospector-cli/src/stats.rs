use clap::Subcommand;
use prospector_db::CountByKey;
use sqlx::PgPool;

use crate::or_dash;

/// Sub-commands available under `stats`.
#[derive(Debug, Subcommand)]
pub enum StatsCommands {
    /// Prospect totals and status breakdown
    Prospects,
    /// Outreach volume by channel and outcome
    Communications {
        #[arg(long, default_value = "30")]
        days: i32,
    },
    /// Prospect counts and averages per searched ZIP code
    Territories,
}

pub(crate) async fn run_stats(pool: &PgPool, command: StatsCommands) -> anyhow::Result<()> {
    match command {
        StatsCommands::Prospects => {
            let stats = prospector_db::prospect_stats(pool).await?;
            println!("total:          {}", stats.total);
            println!("contacted:      {}", stats.contacted);
            println!("visited:        {}", stats.visited);
            println!("high priority:  {}", stats.high_priority);
            println!(
                "average score:  {}",
                or_dash(stats.average_score.map(|s| format!("{s:.1}")))
            );
            print_breakdown("by status", &stats.by_status);
        }
        StatsCommands::Communications { days } => {
            let stats = prospector_db::communication_stats(pool, days).await?;
            println!("last {} day(s): {} communication(s)", stats.days, stats.total);
            print_breakdown("by channel", &stats.by_channel);
            print_breakdown("by outcome", &stats.by_status);
        }
        StatsCommands::Territories => {
            let rows = prospector_db::territory_stats(pool).await?;
            if rows.is_empty() {
                println!("no territories yet; run `search` first");
                return Ok(());
            }
            println!(
                "{:<8}{:<11}{:<11}{:<12}VISITED",
                "ZIP", "PROSPECTS", "AVG SCORE", "AVG RATING"
            );
            for row in &rows {
                println!(
                    "{:<8}{:<11}{:<11}{:<12}{}",
                    row.zip_code,
                    row.prospect_count,
                    or_dash(row.average_score.map(|s| format!("{s:.1}"))),
                    or_dash(row.average_rating.map(|r| format!("{r:.1}"))),
                    row.visited_count
                );
            }
        }
    }
    Ok(())
}

fn print_breakdown(title: &str, counts: &[CountByKey]) {
    if counts.is_empty() {
        return;
    }
    println!("{title}:");
    for c in counts {
        println!("  {:<14}{}", c.key, c.count);
    }
}
