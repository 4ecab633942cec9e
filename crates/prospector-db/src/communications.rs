//! Database operations for the `communications` outreach log.

use chrono::{DateTime, Utc};
use prospector_core::{Channel, Direction, ProspectStatus};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `communications` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommunicationRow {
    pub id: i64,
    pub public_id: Uuid,
    pub prospect_id: i64,
    pub channel: String,
    pub direction: String,
    /// Free-form outcome, e.g. `sent`, `answered`, `no_answer`.
    pub status: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
    pub response: Option<String>,
    pub external_id: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A communication joined with the prospect's name, for cross-prospect feeds.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecentCommunicationRow {
    pub id: i64,
    pub prospect_id: i64,
    pub prospect_name: String,
    pub channel: String,
    pub direction: String,
    pub status: Option<String>,
    pub subject: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for [`log_communication`].
#[derive(Debug, Clone)]
pub struct NewCommunication {
    pub prospect_id: i64,
    pub channel: Channel,
    pub direction: Direction,
    pub status: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
    pub response: Option<String>,
    pub external_id: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl NewCommunication {
    /// An outbound entry with no content; fill the optional fields as needed.
    #[must_use]
    pub fn new(prospect_id: i64, channel: Channel) -> Self {
        Self {
            prospect_id,
            channel,
            direction: Direction::Outbound,
            status: None,
            subject: None,
            message: None,
            response: None,
            external_id: None,
            scheduled_at: None,
            completed_at: None,
        }
    }
}

const COMMUNICATION_COLUMNS: &str = "id, public_id, prospect_id, channel, direction, status, \
     subject, message, response, external_id, scheduled_at, completed_at, created_at";

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Logs a communication.
///
/// Outreach channels (everything except `note`) also move a prospect still
/// in `prospect` status to `contacted`. Both writes share one transaction.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the prospect does not exist, or
/// [`DbError::Sqlx`] if any statement fails.
pub async fn log_communication(
    pool: &PgPool,
    entry: &NewCommunication,
) -> Result<CommunicationRow, DbError> {
    let mut tx = pool.begin().await?;

    let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM prospects WHERE id = $1 FOR UPDATE")
        .bind(entry.prospect_id)
        .fetch_optional(&mut *tx)
        .await?;
    if exists.is_none() {
        return Err(DbError::NotFound);
    }

    let sql = format!(
        "INSERT INTO communications \
             (public_id, prospect_id, channel, direction, status, subject, message, response, \
              external_id, scheduled_at, completed_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         RETURNING {COMMUNICATION_COLUMNS}"
    );
    let row = sqlx::query_as::<_, CommunicationRow>(&sql)
        .bind(Uuid::new_v4())
        .bind(entry.prospect_id)
        .bind(entry.channel.as_str())
        .bind(entry.direction.as_str())
        .bind(entry.status.as_deref())
        .bind(entry.subject.as_deref())
        .bind(entry.message.as_deref())
        .bind(entry.response.as_deref())
        .bind(entry.external_id.as_deref())
        .bind(entry.scheduled_at)
        .bind(entry.completed_at)
        .fetch_one(&mut *tx)
        .await?;

    if entry.channel.is_outreach() {
        let promoted = sqlx::query(
            "UPDATE prospects SET status = $2, updated_at = NOW() \
             WHERE id = $1 AND status = $3",
        )
        .bind(entry.prospect_id)
        .bind(ProspectStatus::Contacted.as_str())
        .bind(ProspectStatus::Prospect.as_str())
        .execute(&mut *tx)
        .await?;
        if promoted.rows_affected() > 0 {
            tracing::info!(prospect_id = entry.prospect_id, "prospect marked contacted");
        }
    }

    tx.commit().await?;
    Ok(row)
}

/// All communications for one prospect, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_prospect_communications(
    pool: &PgPool,
    prospect_id: i64,
) -> Result<Vec<CommunicationRow>, DbError> {
    let sql = format!(
        "SELECT {COMMUNICATION_COLUMNS} FROM communications \
         WHERE prospect_id = $1 \
         ORDER BY created_at DESC, id DESC"
    );
    let rows = sqlx::query_as::<_, CommunicationRow>(&sql)
        .bind(prospect_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Communications across all prospects in the last `days` days, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_recent_communications(
    pool: &PgPool,
    days: i32,
) -> Result<Vec<RecentCommunicationRow>, DbError> {
    let rows = sqlx::query_as::<_, RecentCommunicationRow>(
        "SELECT c.id, c.prospect_id, p.name AS prospect_name, c.channel, c.direction, \
                c.status, c.subject, c.created_at \
         FROM communications c \
         JOIN prospects p ON p.id = c.prospect_id \
         WHERE c.created_at >= NOW() - make_interval(days => $1) \
         ORDER BY c.created_at DESC, c.id DESC",
    )
    .bind(days.max(0))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_communication_defaults_to_outbound_without_content() {
        let entry = NewCommunication::new(7, Channel::Call);
        assert_eq!(entry.prospect_id, 7);
        assert_eq!(entry.direction, Direction::Outbound);
        assert!(entry.message.is_none());
        assert!(entry.scheduled_at.is_none());
    }
}
