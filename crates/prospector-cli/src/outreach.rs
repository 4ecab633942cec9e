//! `outreach` subcommands: log contact attempts, review them, and render
//! message templates for a prospect.

use clap::Subcommand;
use prospector_core::{
    email_templates, find_template, render_template, sms_templates, template_vars_for, Channel,
    Direction, MessageTemplate, TemplateKind,
};
use prospector_db::{NewCommunication, ProspectRow};
use sqlx::PgPool;

use crate::{or_dash, truncate};

/// Sub-commands available under `outreach`.
#[derive(Debug, Subcommand)]
pub enum OutreachCommands {
    /// Record a call, email, SMS, visit, or note
    Log {
        /// Prospect id
        id: i64,
        /// call, email, sms, visit, or note
        #[arg(long)]
        channel: Channel,
        /// outbound or inbound
        #[arg(long, default_value = "outbound")]
        direction: Direction,
        /// Outcome, e.g. sent, answered, no_answer
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        message: Option<String>,
        /// What the prospect said back
        #[arg(long)]
        response: Option<String>,
        /// Fill subject and message from a built-in template (email and sms only)
        #[arg(long, conflicts_with = "message")]
        template: Option<String>,
    },
    /// Outreach history for one prospect
    History { id: i64 },
    /// Outreach across all prospects
    Recent {
        #[arg(long, default_value = "7")]
        days: i32,
    },
    /// List built-in message templates
    Templates,
    /// Render a template for a prospect without logging it
    Render {
        /// Prospect id
        id: i64,
        /// email or sms
        #[arg(long)]
        kind: TemplateKind,
        #[arg(long)]
        template: String,
    },
}

pub(crate) async fn run_outreach(pool: &PgPool, command: OutreachCommands) -> anyhow::Result<()> {
    match command {
        OutreachCommands::Log {
            id,
            channel,
            direction,
            status,
            subject,
            message,
            response,
            template,
        } => {
            let mut entry = NewCommunication::new(id, channel);
            entry.direction = direction;
            entry.status = status;
            entry.subject = subject;
            entry.message = message;
            entry.response = response;

            if let Some(template_id) = template {
                let kind = template_kind_for(channel)?;
                let prospect = prospector_db::get_prospect(pool, id)
                    .await
                    .map_err(|e| anyhow::anyhow!("prospect {id}: {e}"))?;
                let (rendered_subject, body) =
                    render_for(find_template(kind, &template_id)?, &prospect);
                entry.subject = entry.subject.or(rendered_subject);
                entry.message = Some(body);
            }

            let row = prospector_db::log_communication(pool, &entry)
                .await
                .map_err(|e| anyhow::anyhow!("prospect {id}: {e}"))?;
            println!("logged {} #{} for prospect {id}", row.channel, row.id);
        }
        OutreachCommands::History { id } => {
            let rows = prospector_db::list_prospect_communications(pool, id).await?;
            if rows.is_empty() {
                println!("no outreach logged for prospect {id}");
                return Ok(());
            }
            println!(
                "{:<18}{:<8}{:<10}{:<12}MESSAGE",
                "WHEN", "CHANNEL", "DIRECTION", "OUTCOME"
            );
            for c in &rows {
                let text = c.subject.as_deref().or(c.message.as_deref()).unwrap_or("");
                println!(
                    "{:<18}{:<8}{:<10}{:<12}{}",
                    c.created_at.format("%Y-%m-%d %H:%M").to_string(),
                    c.channel,
                    c.direction,
                    or_dash(c.status.as_deref()),
                    truncate(text, 50)
                );
                if let Some(response) = &c.response {
                    println!("{:<48}reply: {}", "", truncate(response, 50));
                }
            }
        }
        OutreachCommands::Recent { days } => {
            let rows = prospector_db::list_recent_communications(pool, days).await?;
            if rows.is_empty() {
                println!("no outreach in the last {days} day(s)");
                return Ok(());
            }
            println!(
                "{:<18}{:<8}{:<12}{:<7}PROSPECT",
                "WHEN", "CHANNEL", "OUTCOME", "ID"
            );
            for c in &rows {
                println!(
                    "{:<18}{:<8}{:<12}{:<7}{}",
                    c.created_at.format("%Y-%m-%d %H:%M").to_string(),
                    c.channel,
                    or_dash(c.status.as_deref()),
                    c.prospect_id,
                    truncate(&c.prospect_name, 40)
                );
            }
        }
        OutreachCommands::Templates => {
            println!("{:<7}{:<10}{:<24}DESCRIPTION", "KIND", "ID", "NAME");
            for t in email_templates().iter().chain(sms_templates()) {
                println!(
                    "{:<7}{:<10}{:<24}{}",
                    t.kind.to_string(),
                    t.id,
                    t.name,
                    t.description
                );
            }
        }
        OutreachCommands::Render { id, kind, template } => {
            let prospect = prospector_db::get_prospect(pool, id)
                .await
                .map_err(|e| anyhow::anyhow!("prospect {id}: {e}"))?;
            let (subject, body) = render_for(find_template(kind, &template)?, &prospect);
            if let Some(subject) = subject {
                println!("Subject: {subject}");
                println!();
            }
            println!("{body}");
        }
    }
    Ok(())
}

fn template_kind_for(channel: Channel) -> anyhow::Result<TemplateKind> {
    match channel {
        Channel::Email => Ok(TemplateKind::Email),
        Channel::Sms => Ok(TemplateKind::Sms),
        other => anyhow::bail!("templates are only available for email and sms, not {other}"),
    }
}

/// Render subject and body with the prospect's placeholders filled in.
fn render_for(template: &MessageTemplate, prospect: &ProspectRow) -> (Option<String>, String) {
    let vars = template_vars_for(
        &prospect.name,
        prospect.contact_person.as_deref(),
        prospect.address.as_deref(),
    );
    (
        template.subject.map(|s| render_template(s, &vars)),
        render_template(template.body, &vars),
    )
}
