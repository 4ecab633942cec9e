//! Offline unit tests for prospector-db pool configuration and row types.
//! These tests do not require a live database connection.

use chrono::Utc;
use prospector_core::{AppConfig, Channel, Environment, Priority, ProspectStatus};
use prospector_db::{
    CountByKey, DbError, NewCommunication, NewSearchResult, PoolConfig, ProspectFilter,
    ProspectRow, SearchRow,
};
use uuid::Uuid;

fn prospect_row(status: &str, priority: &str) -> ProspectRow {
    let now = Utc::now();
    ProspectRow {
        id: 1,
        public_id: Uuid::new_v4(),
        place_id: "ChIJ-budget".to_string(),
        name: "Budget Auto Sales".to_string(),
        address: Some("12 Elm St, Springfield, IL 62701, USA".to_string()),
        phone: Some("(217) 555-0100".to_string()),
        website: None,
        maps_url: None,
        rating: Some(4.4),
        review_count: Some(61),
        latitude: Some(39.8),
        longitude: Some(-89.65),
        business_status: Some("operational".to_string()),
        status: status.to_string(),
        priority: priority.to_string(),
        priority_overridden: false,
        score: 90,
        contact_person: None,
        contact_email: None,
        contact_title: None,
        source_zip: Some("62701".to_string()),
        distance_miles: Some(1.2),
        is_visited: false,
        first_visited_at: None,
        notes: None,
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        log_level: "info".to_string(),
        rules_path: None,
        google_maps_api_key: None,
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        places_request_timeout_secs: 30,
        places_user_agent: "ua".to_string(),
        places_max_retries: 3,
        places_retry_backoff_base_ms: 1000,
        places_page_delay_ms: 2000,
        places_detail_concurrency: 4,
        search_cache_ttl_secs: 3600,
        max_distance_miles: Some(20.0),
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn prospect_row_parses_stored_enums() {
    let row = prospect_row("contacted", "high");
    assert_eq!(row.status().unwrap(), ProspectStatus::Contacted);
    assert_eq!(row.priority().unwrap(), Priority::High);
}

#[test]
fn prospect_row_rejects_unknown_stored_values() {
    let row = prospect_row("archived", "urgent");
    assert!(matches!(row.status(), Err(DbError::InvalidValue(_))));
    assert!(matches!(row.priority(), Err(DbError::InvalidValue(_))));
}

/// Compile-time smoke test: confirm that [`SearchRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn search_row_has_expected_fields() {
    let row = SearchRow {
        id: 3,
        public_id: Uuid::new_v4(),
        zip_codes: vec!["62701".to_string(), "62702".to_string()],
        origin_latitude: Some(39.8),
        origin_longitude: Some(-89.65),
        max_distance_miles: Some(20.0),
        strategy_fingerprint: Some("abc".to_string()),
        candidates_examined: 40,
        total_found: 12,
        new_prospects: 9,
        duplicate_prospects: 3,
        filter_counters: serde_json::json!({ "franchise": 10 }),
        duration_seconds: Some(14.2),
        created_at: Utc::now(),
    };

    assert_eq!(row.zip_codes.len(), 2);
    assert_eq!(row.new_prospects + row.duplicate_prospects, row.total_found);
    assert_eq!(row.filter_counters["franchise"], 10);
}

#[test]
fn input_types_are_plain_values() {
    let link = NewSearchResult {
        prospect_id: 1,
        distance_miles: None,
        score_at_time: 75,
        was_new: true,
    };
    assert!(link.was_new);

    let entry = NewCommunication::new(1, Channel::Note);
    assert!(!entry.channel.is_outreach());

    let filter = ProspectFilter {
        status: Some(ProspectStatus::Prospect),
        ..ProspectFilter::default()
    };
    assert_eq!(filter.limit, 100);

    let count = CountByKey {
        key: "call".to_string(),
        count: 4,
    };
    assert_eq!(count.count, 4);
}
