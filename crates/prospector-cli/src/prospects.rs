//! `prospects` subcommands: list, inspect, and update stored prospects.

use clap::Subcommand;
use prospector_core::{Priority, ProspectStatus};
use prospector_db::{ContactUpdate, ProspectFilter, ProspectRow};
use sqlx::PgPool;

use crate::{or_dash, truncate};

/// Sub-commands available under `prospects`.
#[derive(Debug, Subcommand)]
pub enum ProspectsCommands {
    /// List prospects, best score first
    List {
        /// Filter by status (prospect, contacted, qualified, visited, dnc)
        #[arg(long)]
        status: Option<ProspectStatus>,
        /// Filter by priority (high, standard, low)
        #[arg(long)]
        priority: Option<Priority>,
        /// Filter by visit flag (true or false)
        #[arg(long)]
        visited: Option<bool>,
        /// Filter by the ZIP code the prospect was found in
        #[arg(long)]
        zip: Option<String>,
        /// Maximum number of prospects to show
        #[arg(long, default_value = "50")]
        limit: i64,
    },
    /// Show one prospect with its outreach history
    Show { id: i64 },
    /// Search name, address, and contact person
    Find {
        query: String,
        #[arg(long, default_value = "50")]
        limit: i64,
    },
    /// Set the CRM status
    Status { id: i64, status: ProspectStatus },
    /// Override the computed priority
    Priority {
        id: i64,
        #[arg(required_unless_present = "clear")]
        priority: Option<Priority>,
        /// Drop the override so the next search recomputes it
        #[arg(long, conflicts_with = "priority")]
        clear: bool,
    },
    /// Replace the sales notes (an empty string clears them)
    Notes { id: i64, text: String },
    /// Mark a prospect visited
    Visited {
        id: i64,
        /// Clear the visit flag instead
        #[arg(long)]
        undo: bool,
    },
    /// Update contact details (an empty value clears a field)
    Contact {
        id: i64,
        #[arg(long)]
        person: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        website: Option<String>,
    },
    /// Delete prospects with their outreach history
    Delete {
        #[arg(required = true, num_args = 1..)]
        ids: Vec<i64>,
    },
}

pub(crate) async fn run_prospects(pool: &PgPool, command: ProspectsCommands) -> anyhow::Result<()> {
    match command {
        ProspectsCommands::List {
            status,
            priority,
            visited,
            zip,
            limit,
        } => {
            let filter = ProspectFilter {
                status,
                priority,
                visited,
                source_zip: zip,
                limit,
            };
            let rows = prospector_db::list_prospects(pool, &filter).await?;
            print_table(&rows, "no prospects match; run `search` first");
        }
        ProspectsCommands::Show { id } => run_show(pool, id).await?,
        ProspectsCommands::Find { query, limit } => {
            let rows = prospector_db::search_prospects(pool, &query, limit).await?;
            print_table(&rows, &format!("no prospects match '{query}'"));
        }
        ProspectsCommands::Status { id, status } => {
            prospector_db::update_prospect_status(pool, id, status).await?;
            println!("prospect {id}: status set to {status}");
        }
        ProspectsCommands::Priority {
            id,
            priority,
            clear,
        } => {
            let priority = if clear { None } else { priority };
            prospector_db::override_prospect_priority(pool, id, priority).await?;
            match priority {
                Some(p) => println!("prospect {id}: priority overridden to {p}"),
                None => println!("prospect {id}: priority override cleared"),
            }
        }
        ProspectsCommands::Notes { id, text } => {
            prospector_db::update_prospect_notes(pool, id, &text).await?;
            println!("prospect {id}: notes updated");
        }
        ProspectsCommands::Visited { id, undo } => {
            prospector_db::mark_prospect_visited(pool, id, !undo).await?;
            println!(
                "prospect {id}: {}",
                if undo { "visit cleared" } else { "marked visited" }
            );
        }
        ProspectsCommands::Contact {
            id,
            person,
            email,
            title,
            phone,
            website,
        } => {
            let update = ContactUpdate {
                contact_person: person,
                contact_email: email,
                contact_title: title,
                phone,
                website,
            };
            if update.is_empty() {
                anyhow::bail!("nothing to update; pass at least one of --person, --email, --title, --phone, --website");
            }
            prospector_db::update_prospect_contact(pool, id, &update).await?;
            println!("prospect {id}: contact details updated");
        }
        ProspectsCommands::Delete { ids } => {
            let deleted = prospector_db::delete_prospects(pool, &ids).await?;
            println!("deleted {deleted} of {} prospect(s)", ids.len());
        }
    }
    Ok(())
}

async fn run_show(pool: &PgPool, id: i64) -> anyhow::Result<()> {
    let p = prospector_db::get_prospect(pool, id)
        .await
        .map_err(|e| anyhow::anyhow!("prospect {id}: {e}"))?;

    println!("{} (#{})", p.name, p.id);
    println!("  place id:   {}", p.place_id);
    println!("  address:    {}", or_dash(p.address.as_deref()));
    println!("  phone:      {}", or_dash(p.phone.as_deref()));
    println!("  website:    {}", or_dash(p.website.as_deref()));
    println!(
        "  rating:     {} ({} reviews)",
        or_dash(p.rating.map(|r| format!("{r:.1}"))),
        p.review_count.unwrap_or(0)
    );
    println!(
        "  score:      {}  priority: {}{}",
        p.score,
        p.priority,
        if p.priority_overridden { " (override)" } else { "" }
    );
    println!("  status:     {}", p.status);
    println!(
        "  found in:   {} at {} mi",
        or_dash(p.source_zip.as_deref()),
        or_dash(p.distance_miles.map(|d| format!("{d:.1}")))
    );
    println!(
        "  visited:    {}",
        p.first_visited_at.map_or_else(
            || "no".to_string(),
            |t| format!("first on {}", t.format("%Y-%m-%d"))
        )
    );
    println!(
        "  contact:    {} / {} / {}",
        or_dash(p.contact_person.as_deref()),
        or_dash(p.contact_title.as_deref()),
        or_dash(p.contact_email.as_deref())
    );
    if let Some(notes) = &p.notes {
        println!("  notes:      {notes}");
    }

    let comms = prospector_db::list_prospect_communications(pool, id).await?;
    println!();
    if comms.is_empty() {
        println!("no outreach logged yet");
        return Ok(());
    }
    println!("{:<18}{:<8}{:<10}{:<12}SUBJECT", "WHEN", "CHANNEL", "DIRECTION", "OUTCOME");
    for c in &comms {
        println!(
            "{:<18}{:<8}{:<10}{:<12}{}",
            c.created_at.format("%Y-%m-%d %H:%M").to_string(),
            c.channel,
            c.direction,
            or_dash(c.status.as_deref()),
            truncate(c.subject.as_deref().unwrap_or(""), 40)
        );
    }
    Ok(())
}

fn print_table(rows: &[ProspectRow], empty_message: &str) {
    if rows.is_empty() {
        println!("{empty_message}");
        return;
    }
    println!(
        "{:<7}{:<7}{:<10}{:<11}{:<7}{:<8}{:<38}PHONE",
        "ID", "SCORE", "PRIORITY", "STATUS", "ZIP", "MILES", "NAME"
    );
    for p in rows {
        println!(
            "{:<7}{:<7}{:<10}{:<11}{:<7}{:<8}{:<38}{}",
            p.id,
            p.score,
            p.priority,
            p.status,
            or_dash(p.source_zip.as_deref()),
            or_dash(p.distance_miles.map(|d| format!("{d:.1}"))),
            truncate(&p.name, 36),
            or_dash(p.phone.as_deref()),
        );
    }
}
