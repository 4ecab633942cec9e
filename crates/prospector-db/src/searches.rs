//! Database operations for `searches` and `search_results`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `searches` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SearchRow {
    pub id: i64,
    pub public_id: Uuid,
    pub zip_codes: Vec<String>,
    pub origin_latitude: Option<f64>,
    pub origin_longitude: Option<f64>,
    pub max_distance_miles: Option<f64>,
    pub strategy_fingerprint: Option<String>,
    pub candidates_examined: i32,
    pub total_found: i32,
    pub new_prospects: i32,
    pub duplicate_prospects: i32,
    /// Classifier exclusion counters as a JSON object.
    pub filter_counters: serde_json::Value,
    pub duration_seconds: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// A `search_results` row joined with the prospect's name and current status.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SearchResultRow {
    pub id: i64,
    pub search_id: i64,
    pub prospect_id: i64,
    pub prospect_name: String,
    pub prospect_status: String,
    pub distance_miles: Option<f64>,
    pub score_at_time: i16,
    pub was_new: bool,
}

/// Input for [`create_search`].
#[derive(Debug, Clone)]
pub struct NewSearch {
    pub zip_codes: Vec<String>,
    pub origin_latitude: Option<f64>,
    pub origin_longitude: Option<f64>,
    pub max_distance_miles: Option<f64>,
    pub strategy_fingerprint: Option<String>,
    pub candidates_examined: i32,
    pub total_found: i32,
    pub new_prospects: i32,
    pub duplicate_prospects: i32,
    pub filter_counters: serde_json::Value,
    pub duration_seconds: Option<f64>,
}

/// One prospect found by a search.
#[derive(Debug, Clone, Copy)]
pub struct NewSearchResult {
    pub prospect_id: i64,
    pub distance_miles: Option<f64>,
    pub score_at_time: i16,
    pub was_new: bool,
}

const SEARCH_COLUMNS: &str = "id, public_id, zip_codes, origin_latitude, origin_longitude, \
     max_distance_miles, strategy_fingerprint, candidates_examined, total_found, new_prospects, \
     duplicate_prospects, filter_counters, duration_seconds, created_at";

// ---------------------------------------------------------------------------
// searches operations
// ---------------------------------------------------------------------------

/// Records a completed search and returns the stored row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_search(pool: &PgPool, search: &NewSearch) -> Result<SearchRow, DbError> {
    let sql = format!(
        "INSERT INTO searches \
             (public_id, zip_codes, origin_latitude, origin_longitude, max_distance_miles, \
              strategy_fingerprint, candidates_examined, total_found, new_prospects, \
              duplicate_prospects, filter_counters, duration_seconds) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
         RETURNING {SEARCH_COLUMNS}"
    );
    let row = sqlx::query_as::<_, SearchRow>(&sql)
        .bind(Uuid::new_v4())
        .bind(&search.zip_codes)
        .bind(search.origin_latitude)
        .bind(search.origin_longitude)
        .bind(search.max_distance_miles)
        .bind(search.strategy_fingerprint.as_deref())
        .bind(search.candidates_examined)
        .bind(search.total_found)
        .bind(search.new_prospects)
        .bind(search.duplicate_prospects)
        .bind(&search.filter_counters)
        .bind(search.duration_seconds)
        .fetch_one(pool)
        .await?;

    Ok(row)
}

/// Links prospects to a search. Re-linking the same prospect is a no-op.
///
/// Returns the number of links inserted.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails (including an unknown
/// `search_id` or prospect id).
pub async fn link_search_results(
    pool: &PgPool,
    search_id: i64,
    results: &[NewSearchResult],
) -> Result<u64, DbError> {
    if results.is_empty() {
        return Ok(0);
    }

    let prospect_ids: Vec<i64> = results.iter().map(|r| r.prospect_id).collect();
    let distances: Vec<Option<f64>> = results.iter().map(|r| r.distance_miles).collect();
    let scores: Vec<i16> = results.iter().map(|r| r.score_at_time).collect();
    let was_new: Vec<bool> = results.iter().map(|r| r.was_new).collect();

    let result = sqlx::query(
        "INSERT INTO search_results (search_id, prospect_id, distance_miles, score_at_time, was_new) \
         SELECT $1, * FROM UNNEST($2::int8[], $3::float8[], $4::int2[], $5::bool[]) \
         ON CONFLICT (search_id, prospect_id) DO NOTHING",
    )
    .bind(search_id)
    .bind(&prospect_ids)
    .bind(&distances)
    .bind(&scores)
    .bind(&was_new)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Most recent searches first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_searches(pool: &PgPool, limit: i64) -> Result<Vec<SearchRow>, DbError> {
    let sql = format!(
        "SELECT {SEARCH_COLUMNS} FROM searches ORDER BY created_at DESC, id DESC LIMIT $1"
    );
    let rows = sqlx::query_as::<_, SearchRow>(&sql)
        .bind(limit.max(1))
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no search has `id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_search(pool: &PgPool, id: i64) -> Result<SearchRow, DbError> {
    let sql = format!("SELECT {SEARCH_COLUMNS} FROM searches WHERE id = $1");
    sqlx::query_as::<_, SearchRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}

/// Prospects found by a search, highest score at the time first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_search_results(
    pool: &PgPool,
    search_id: i64,
) -> Result<Vec<SearchResultRow>, DbError> {
    let rows = sqlx::query_as::<_, SearchResultRow>(
        "SELECT sr.id, sr.search_id, sr.prospect_id, p.name AS prospect_name, \
                p.status AS prospect_status, sr.distance_miles, sr.score_at_time, sr.was_new \
         FROM search_results sr \
         JOIN prospects p ON p.id = sr.prospect_id \
         WHERE sr.search_id = $1 \
         ORDER BY sr.score_at_time DESC, sr.distance_miles ASC NULLS LAST",
    )
    .bind(search_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Deletes a search and its result links. Prospects are kept.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no search has `id`, or
/// [`DbError::Sqlx`] if the delete fails.
pub async fn delete_search(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM searches WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
