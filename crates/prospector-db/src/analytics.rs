//! Aggregate CRM statistics.

use sqlx::PgPool;

use crate::DbError;

/// A label with a row count, e.g. a status and how many prospects have it.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CountByKey {
    pub key: String,
    pub count: i64,
}

#[derive(Debug, Clone)]
pub struct ProspectStats {
    pub total: i64,
    pub contacted: i64,
    pub visited: i64,
    pub high_priority: i64,
    /// `None` when there are no prospects.
    pub average_score: Option<f64>,
    pub by_status: Vec<CountByKey>,
}

#[derive(Debug, Clone)]
pub struct CommunicationStats {
    pub days: i32,
    pub total: i64,
    pub by_channel: Vec<CountByKey>,
    /// Outcome counts; entries logged without an outcome are grouped as `unknown`.
    pub by_status: Vec<CountByKey>,
}

/// Per source ZIP aggregates.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TerritoryStatsRow {
    pub zip_code: String,
    pub prospect_count: i64,
    pub average_score: Option<f64>,
    pub average_rating: Option<f64>,
    pub visited_count: i64,
}

#[derive(sqlx::FromRow)]
struct ProspectTotals {
    total: i64,
    contacted: i64,
    visited: i64,
    high_priority: i64,
    average_score: Option<f64>,
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if a query fails.
pub async fn prospect_stats(pool: &PgPool) -> Result<ProspectStats, DbError> {
    let totals = sqlx::query_as::<_, ProspectTotals>(
        "SELECT COUNT(*) AS total, \
                COUNT(*) FILTER (WHERE status = 'contacted') AS contacted, \
                COUNT(*) FILTER (WHERE is_visited) AS visited, \
                COUNT(*) FILTER (WHERE priority = 'high') AS high_priority, \
                AVG(score)::float8 AS average_score \
         FROM prospects",
    )
    .fetch_one(pool)
    .await?;

    let by_status = sqlx::query_as::<_, CountByKey>(
        "SELECT status AS key, COUNT(*) AS count \
         FROM prospects GROUP BY status ORDER BY count DESC, key",
    )
    .fetch_all(pool)
    .await?;

    Ok(ProspectStats {
        total: totals.total,
        contacted: totals.contacted,
        visited: totals.visited,
        high_priority: totals.high_priority,
        average_score: totals.average_score,
        by_status,
    })
}

/// Communication counts over the last `days` days.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if a query fails.
pub async fn communication_stats(pool: &PgPool, days: i32) -> Result<CommunicationStats, DbError> {
    let days = days.max(0);

    let by_channel = sqlx::query_as::<_, CountByKey>(
        "SELECT channel AS key, COUNT(*) AS count \
         FROM communications \
         WHERE created_at >= NOW() - make_interval(days => $1) \
         GROUP BY channel ORDER BY count DESC, key",
    )
    .bind(days)
    .fetch_all(pool)
    .await?;

    let by_status = sqlx::query_as::<_, CountByKey>(
        "SELECT COALESCE(status, 'unknown') AS key, COUNT(*) AS count \
         FROM communications \
         WHERE created_at >= NOW() - make_interval(days => $1) \
         GROUP BY 1 ORDER BY count DESC, key",
    )
    .bind(days)
    .fetch_all(pool)
    .await?;

    Ok(CommunicationStats {
        days,
        total: by_channel.iter().map(|c| c.count).sum(),
        by_channel,
        by_status,
    })
}

/// Prospect aggregates per source ZIP, largest territory first. Prospects
/// without a source ZIP are left out.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn territory_stats(pool: &PgPool) -> Result<Vec<TerritoryStatsRow>, DbError> {
    let rows = sqlx::query_as::<_, TerritoryStatsRow>(
        "SELECT source_zip AS zip_code, \
                COUNT(*) AS prospect_count, \
                ROUND(AVG(score)::numeric, 1)::float8 AS average_score, \
                ROUND(AVG(rating)::numeric, 1)::float8 AS average_rating, \
                COUNT(*) FILTER (WHERE is_visited) AS visited_count \
         FROM prospects \
         WHERE source_zip IS NOT NULL \
         GROUP BY source_zip \
         ORDER BY prospect_count DESC, zip_code",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
