use clap::Subcommand;
use sqlx::PgPool;

use crate::{or_dash, truncate};

/// Sub-commands available under `history`.
#[derive(Debug, Subcommand)]
pub enum HistoryCommands {
    /// Recent searches, newest first
    List {
        #[arg(long, default_value = "20")]
        limit: i64,
    },
    /// One search with the prospects it found
    Show { id: i64 },
    /// Delete a search record (prospects are kept)
    Delete { id: i64 },
}

pub(crate) async fn run_history(pool: &PgPool, command: HistoryCommands) -> anyhow::Result<()> {
    match command {
        HistoryCommands::List { limit } => {
            let rows = prospector_db::list_searches(pool, limit).await?;
            if rows.is_empty() {
                println!("no searches recorded yet");
                return Ok(());
            }
            println!(
                "{:<6}{:<18}{:<20}{:<7}{:<6}{:<10}SECS",
                "ID", "WHEN", "ZIP CODES", "FOUND", "NEW", "EXAMINED"
            );
            for s in &rows {
                println!(
                    "{:<6}{:<18}{:<20}{:<7}{:<6}{:<10}{}",
                    s.id,
                    s.created_at.format("%Y-%m-%d %H:%M").to_string(),
                    s.zip_codes.join(","),
                    s.total_found,
                    s.new_prospects,
                    s.candidates_examined,
                    or_dash(s.duration_seconds.map(|d| format!("{d:.1}")))
                );
            }
        }
        HistoryCommands::Show { id } => {
            let search = prospector_db::get_search(pool, id)
                .await
                .map_err(|e| anyhow::anyhow!("search {id}: {e}"))?;
            println!(
                "search #{} on {} for {}",
                search.id,
                search.created_at.format("%Y-%m-%d %H:%M"),
                search.zip_codes.join(", ")
            );
            println!(
                "found {} ({} new, {} already known) from {} candidates",
                search.total_found,
                search.new_prospects,
                search.duplicate_prospects,
                search.candidates_examined
            );
            println!("filters: {}", search.filter_counters);

            let results = prospector_db::list_search_results(pool, id).await?;
            if results.is_empty() {
                return Ok(());
            }
            println!();
            println!(
                "{:<7}{:<7}{:<8}{:<5}{:<11}NAME",
                "ID", "SCORE", "MILES", "NEW", "STATUS"
            );
            for r in &results {
                println!(
                    "{:<7}{:<7}{:<8}{:<5}{:<11}{}",
                    r.prospect_id,
                    r.score_at_time,
                    or_dash(r.distance_miles.map(|d| format!("{d:.1}"))),
                    if r.was_new { "yes" } else { "no" },
                    r.prospect_status,
                    truncate(&r.prospect_name, 40)
                );
            }
        }
        HistoryCommands::Delete { id } => {
            prospector_db::delete_search(pool, id)
                .await
                .map_err(|e| anyhow::anyhow!("search {id}: {e}"))?;
            println!("deleted search {id}");
        }
    }
    Ok(())
}
