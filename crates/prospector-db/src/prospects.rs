//! Database operations for the `prospects` table.
//!
//! Provider and classification columns are refreshed on every search; CRM
//! columns (status, notes, contact details, visit tracking) belong to the
//! user and are only written by the explicit update functions below.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use prospector_core::{Priority, ProspectStatus, ScoredProspect};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `prospects` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProspectRow {
    pub id: i64,
    pub public_id: Uuid,
    pub place_id: String,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub maps_url: Option<String>,
    pub rating: Option<f64>,
    pub review_count: Option<i32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub business_status: Option<String>,
    pub status: String,
    pub priority: String,
    pub priority_overridden: bool,
    /// The schema defines this as `SMALLINT` constrained to 0..=100.
    pub score: i16,
    pub contact_person: Option<String>,
    pub contact_email: Option<String>,
    pub contact_title: Option<String>,
    pub source_zip: Option<String>,
    pub distance_miles: Option<f64>,
    pub is_visited: bool,
    pub first_visited_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProspectRow {
    /// Parsed `status` column.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidValue`] if the stored value is unknown.
    pub fn status(&self) -> Result<ProspectStatus, DbError> {
        self.status
            .parse()
            .map_err(|_| DbError::InvalidValue(format!("prospect status '{}'", self.status)))
    }

    /// Parsed `priority` column.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidValue`] if the stored value is unknown.
    pub fn priority(&self) -> Result<Priority, DbError> {
        self.priority
            .parse()
            .map_err(|_| DbError::InvalidValue(format!("priority '{}'", self.priority)))
    }
}

/// Result of upserting one prospect.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UpsertedProspect {
    pub id: i64,
    pub place_id: String,
    /// `true` when the row was inserted rather than updated.
    pub is_new: bool,
}

/// Filters for [`list_prospects`]. `None` fields do not filter.
#[derive(Debug, Clone)]
pub struct ProspectFilter {
    pub status: Option<ProspectStatus>,
    pub priority: Option<Priority>,
    pub visited: Option<bool>,
    pub source_zip: Option<String>,
    pub limit: i64,
}

impl Default for ProspectFilter {
    fn default() -> Self {
        Self {
            status: None,
            priority: None,
            visited: None,
            source_zip: None,
            limit: 100,
        }
    }
}

/// Contact fields for [`update_prospect_contact`]. `None` leaves a column
/// unchanged; an empty string clears it.
#[derive(Debug, Clone, Default)]
pub struct ContactUpdate {
    pub contact_person: Option<String>,
    pub contact_email: Option<String>,
    pub contact_title: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
}

impl ContactUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contact_person.is_none()
            && self.contact_email.is_none()
            && self.contact_title.is_none()
            && self.phone.is_none()
            && self.website.is_none()
    }
}

const PROSPECT_COLUMNS: &str = "id, public_id, place_id, name, address, phone, website, maps_url, \
     rating, review_count, latitude, longitude, business_status, status, priority, \
     priority_overridden, score, contact_person, contact_email, contact_title, source_zip, \
     distance_miles, is_visited, first_visited_at, notes, created_at, updated_at";

// ---------------------------------------------------------------------------
// Write operations
// ---------------------------------------------------------------------------

/// Upserts a batch of scored prospects keyed by `place_id`.
///
/// Conflicting rows get their provider fields, score, distance, and source
/// ZIP refreshed. Status, notes, contact details, visit tracking, and a
/// manually overridden priority are left untouched. Repeated place ids in
/// `prospects` are collapsed to the first occurrence.
///
/// Uses a single `INSERT … SELECT * FROM UNNEST(…) ON CONFLICT` so the whole
/// batch is written in one round-trip.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn upsert_prospects(
    pool: &PgPool,
    source_zip: Option<&str>,
    prospects: &[ScoredProspect],
) -> Result<Vec<UpsertedProspect>, DbError> {
    let mut seen = HashSet::new();
    let unique: Vec<&ScoredProspect> = prospects
        .iter()
        .filter(|p| seen.insert(p.place.place_id.as_str()))
        .collect();
    if unique.is_empty() {
        return Ok(Vec::new());
    }

    // Collect each column into a parallel Vec for UNNEST binding.
    let n = unique.len();
    let mut public_ids: Vec<Uuid> = Vec::with_capacity(n);
    let mut place_ids: Vec<String> = Vec::with_capacity(n);
    let mut names: Vec<String> = Vec::with_capacity(n);
    let mut addresses: Vec<Option<String>> = Vec::with_capacity(n);
    let mut phones: Vec<Option<String>> = Vec::with_capacity(n);
    let mut websites: Vec<Option<String>> = Vec::with_capacity(n);
    let mut maps_urls: Vec<Option<String>> = Vec::with_capacity(n);
    let mut ratings: Vec<Option<f64>> = Vec::with_capacity(n);
    let mut review_counts: Vec<Option<i32>> = Vec::with_capacity(n);
    let mut latitudes: Vec<Option<f64>> = Vec::with_capacity(n);
    let mut longitudes: Vec<Option<f64>> = Vec::with_capacity(n);
    let mut business_statuses: Vec<Option<String>> = Vec::with_capacity(n);
    let mut priorities: Vec<String> = Vec::with_capacity(n);
    let mut scores: Vec<i16> = Vec::with_capacity(n);
    let mut distances: Vec<f64> = Vec::with_capacity(n);

    for p in unique {
        let place = &p.place;
        public_ids.push(Uuid::new_v4());
        place_ids.push(place.place_id.clone());
        names.push(place.name.clone());
        addresses.push(place.address.clone());
        phones.push(place.phone.clone());
        websites.push(place.website.clone());
        maps_urls.push(place.maps_url.clone());
        ratings.push(place.rating);
        review_counts.push(place.review_count.and_then(|c| i32::try_from(c).ok()));
        latitudes.push(place.location.map(|l| l.lat));
        longitudes.push(place.location.map(|l| l.lng));
        business_statuses.push(place.business_status.map(|s| s.as_str().to_string()));
        priorities.push(p.priority.as_str().to_string());
        scores.push(i16::from(p.prospect_score));
        distances.push(p.distance_miles);
    }

    let rows = sqlx::query_as::<_, UpsertedProspect>(
        "INSERT INTO prospects \
             (source_zip, public_id, place_id, name, address, phone, website, maps_url, \
              rating, review_count, latitude, longitude, business_status, priority, score, \
              distance_miles) \
         SELECT $1, * FROM UNNEST(\
              $2::uuid[], $3::text[], $4::text[], $5::text[], $6::text[], $7::text[], \
              $8::text[], $9::float8[], $10::int4[], $11::float8[], $12::float8[], \
              $13::text[], $14::text[], $15::int2[], $16::float8[]) \
         ON CONFLICT (place_id) DO UPDATE SET \
             name            = EXCLUDED.name, \
             address         = EXCLUDED.address, \
             phone           = COALESCE(EXCLUDED.phone, prospects.phone), \
             website         = COALESCE(EXCLUDED.website, prospects.website), \
             maps_url        = EXCLUDED.maps_url, \
             rating          = EXCLUDED.rating, \
             review_count    = EXCLUDED.review_count, \
             latitude        = EXCLUDED.latitude, \
             longitude       = EXCLUDED.longitude, \
             business_status = EXCLUDED.business_status, \
             score           = EXCLUDED.score, \
             priority        = CASE WHEN prospects.priority_overridden \
                                    THEN prospects.priority ELSE EXCLUDED.priority END, \
             source_zip      = COALESCE(EXCLUDED.source_zip, prospects.source_zip), \
             distance_miles  = EXCLUDED.distance_miles, \
             updated_at      = NOW() \
         RETURNING id, place_id, (xmax = 0) AS is_new",
    )
    .bind(source_zip)
    .bind(&public_ids)
    .bind(&place_ids)
    .bind(&names)
    .bind(&addresses)
    .bind(&phones)
    .bind(&websites)
    .bind(&maps_urls)
    .bind(&ratings)
    .bind(&review_counts)
    .bind(&latitudes)
    .bind(&longitudes)
    .bind(&business_statuses)
    .bind(&priorities)
    .bind(&scores)
    .bind(&distances)
    .fetch_all(pool)
    .await?;

    let new_count = rows.iter().filter(|r| r.is_new).count();
    tracing::debug!(
        upserted = rows.len(),
        new = new_count,
        source_zip = source_zip.unwrap_or("-"),
        "upserted prospects"
    );

    Ok(rows)
}

/// Sets the CRM status of a prospect.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no prospect has `id`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_prospect_status(
    pool: &PgPool,
    id: i64,
    status: ProspectStatus,
) -> Result<(), DbError> {
    let result = sqlx::query("UPDATE prospects SET status = $2, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .bind(status.as_str())
        .execute(pool)
        .await?;
    require_one(result.rows_affected())
}

/// Overrides the computed priority. Later searches keep the override.
/// Passing `None` clears the override; the next search recomputes it.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no prospect has `id`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn override_prospect_priority(
    pool: &PgPool,
    id: i64,
    priority: Option<Priority>,
) -> Result<(), DbError> {
    let result = match priority {
        Some(priority) => {
            sqlx::query(
                "UPDATE prospects \
                 SET priority = $2, priority_overridden = TRUE, updated_at = NOW() \
                 WHERE id = $1",
            )
            .bind(id)
            .bind(priority.as_str())
            .execute(pool)
            .await?
        }
        None => {
            sqlx::query(
                "UPDATE prospects \
                 SET priority_overridden = FALSE, updated_at = NOW() \
                 WHERE id = $1",
            )
            .bind(id)
            .execute(pool)
            .await?
        }
    };
    require_one(result.rows_affected())
}

/// Replaces the free-text sales notes. An empty string clears them.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no prospect has `id`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_prospect_notes(pool: &PgPool, id: i64, notes: &str) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE prospects SET notes = NULLIF($2, ''), updated_at = NOW() WHERE id = $1",
    )
    .bind(id)
    .bind(notes)
    .execute(pool)
    .await?;
    require_one(result.rows_affected())
}

/// Marks a prospect visited or not visited.
///
/// `first_visited_at` is stamped on the first visit only and cleared when
/// the visit flag is removed.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no prospect has `id`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn mark_prospect_visited(pool: &PgPool, id: i64, visited: bool) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE prospects SET \
             is_visited       = $2, \
             first_visited_at = CASE WHEN $2 THEN COALESCE(first_visited_at, NOW()) ELSE NULL END, \
             updated_at       = NOW() \
         WHERE id = $1",
    )
    .bind(id)
    .bind(visited)
    .execute(pool)
    .await?;
    require_one(result.rows_affected())
}

/// Updates contact fields. See [`ContactUpdate`] for the `None`/empty rules.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no prospect has `id`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_prospect_contact(
    pool: &PgPool,
    id: i64,
    update: &ContactUpdate,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE prospects SET \
             contact_person = CASE WHEN $2::text IS NULL THEN contact_person ELSE NULLIF($2, '') END, \
             contact_email  = CASE WHEN $3::text IS NULL THEN contact_email  ELSE NULLIF($3, '') END, \
             contact_title  = CASE WHEN $4::text IS NULL THEN contact_title  ELSE NULLIF($4, '') END, \
             phone          = CASE WHEN $5::text IS NULL THEN phone          ELSE NULLIF($5, '') END, \
             website        = CASE WHEN $6::text IS NULL THEN website        ELSE NULLIF($6, '') END, \
             updated_at     = NOW() \
         WHERE id = $1",
    )
    .bind(id)
    .bind(update.contact_person.as_deref())
    .bind(update.contact_email.as_deref())
    .bind(update.contact_title.as_deref())
    .bind(update.phone.as_deref())
    .bind(update.website.as_deref())
    .execute(pool)
    .await?;
    require_one(result.rows_affected())
}

/// Deletes a prospect with its communications and search links.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no prospect has `id`, or
/// [`DbError::Sqlx`] if the delete fails.
pub async fn delete_prospect(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM prospects WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    require_one(result.rows_affected())
}

/// Deletes several prospects and returns how many existed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_prospects(pool: &PgPool, ids: &[i64]) -> Result<u64, DbError> {
    if ids.is_empty() {
        return Ok(0);
    }
    let result = sqlx::query("DELETE FROM prospects WHERE id = ANY($1)")
        .bind(ids)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

// ---------------------------------------------------------------------------
// Query operations
// ---------------------------------------------------------------------------

/// Fetches a prospect by internal id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no prospect has `id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_prospect(pool: &PgPool, id: i64) -> Result<ProspectRow, DbError> {
    let sql = format!("SELECT {PROSPECT_COLUMNS} FROM prospects WHERE id = $1");
    sqlx::query_as::<_, ProspectRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}

/// Fetches a prospect by provider place id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_prospect_by_place_id(
    pool: &PgPool,
    place_id: &str,
) -> Result<Option<ProspectRow>, DbError> {
    let sql = format!("SELECT {PROSPECT_COLUMNS} FROM prospects WHERE place_id = $1");
    let row = sqlx::query_as::<_, ProspectRow>(&sql)
        .bind(place_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Lists prospects matching `filter`, best score first, then most recently
/// updated.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_prospects(
    pool: &PgPool,
    filter: &ProspectFilter,
) -> Result<Vec<ProspectRow>, DbError> {
    let sql = format!(
        "SELECT {PROSPECT_COLUMNS} FROM prospects \
         WHERE ($1::text IS NULL OR status = $1) \
           AND ($2::text IS NULL OR priority = $2) \
           AND ($3::bool IS NULL OR is_visited = $3) \
           AND ($4::text IS NULL OR source_zip = $4) \
         ORDER BY score DESC, updated_at DESC \
         LIMIT $5"
    );
    let rows = sqlx::query_as::<_, ProspectRow>(&sql)
        .bind(filter.status.map(ProspectStatus::as_str))
        .bind(filter.priority.map(Priority::as_str))
        .bind(filter.visited)
        .bind(filter.source_zip.as_deref())
        .bind(filter.limit.max(1))
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Case-insensitive substring search over name, address, and contact person.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn search_prospects(
    pool: &PgPool,
    query: &str,
    limit: i64,
) -> Result<Vec<ProspectRow>, DbError> {
    let pattern = like_pattern(query);
    let sql = format!(
        "SELECT {PROSPECT_COLUMNS} FROM prospects \
         WHERE name ILIKE $1 OR address ILIKE $1 OR contact_person ILIKE $1 \
         ORDER BY score DESC, name \
         LIMIT $2"
    );
    let rows = sqlx::query_as::<_, ProspectRow>(&sql)
        .bind(pattern)
        .bind(limit.max(1))
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Wraps `query` in `%…%`, escaping LIKE metacharacters so they match literally.
fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn require_one(rows_affected: u64) -> Result<(), DbError> {
    if rows_affected == 0 {
        Err(DbError::NotFound)
    } else {
        Ok(())
    }
}
