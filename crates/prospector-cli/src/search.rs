//! `search`: gather candidates, classify, persist, and print the ranking.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use anyhow::Context;
use prospector_classify::{Classifier, FilterCounters};
use prospector_core::{
    load_rules, merge_territories, summarize_territories, AppConfig, RuleSet, SearchSummary,
    TerritoryResult,
};
use prospector_db::{NewSearch, NewSearchResult};
use prospector_places::{CandidateBatch, CandidateSource, PlacesClient, QueryStrategy};
use sqlx::PgPool;

const MAX_ZIP_CODES: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SearchTarget {
    Zips(Vec<String>),
    /// A map click, resolved to the ZIP code that contains it.
    Point { lat: f64, lng: f64 },
}

/// Run one search end to end.
///
/// With `pool == None` (dry run) nothing is written. ZIP codes that fail to
/// gather are logged and skipped; the search fails only when none succeed.
///
/// # Errors
///
/// Returns an error if the API key is missing, the rule file is invalid,
/// every target fails to gather, or a database write fails.
pub(crate) async fn run_search(
    pool: Option<&PgPool>,
    config: &AppConfig,
    target: &SearchTarget,
    limit: usize,
) -> anyhow::Result<()> {
    let started = Instant::now();
    let classifier = build_classifier(config)?;
    let source = build_source(config)?;

    let batches = gather(&source, target).await?;

    let mut counters = FilterCounters::default();
    let mut territories = Vec::with_capacity(batches.len());
    for batch in &batches {
        let classification = classifier.classify_and_score(&batch.candidates, &batch.origin);
        counters.merge(&classification.counters);
        territories.push(TerritoryResult {
            zip_code: batch.origin.zip_code.clone().unwrap_or_default(),
            prospects: classification.prospects,
        });
    }
    let territories = merge_territories(territories);
    let summary = summarize_territories(&territories);

    print_ranking(&territories, limit);
    print_summary(&summary, &counters);

    match pool {
        Some(pool) => {
            let search_id = persist(
                pool,
                &source,
                &batches,
                &territories,
                &counters,
                started.elapsed(),
                config.max_distance_miles,
            )
            .await?;
            println!("saved as search #{search_id}");
        }
        None => println!("dry-run: nothing written to the database"),
    }

    Ok(())
}

fn build_classifier(config: &AppConfig) -> anyhow::Result<Classifier> {
    let rules = match &config.rules_path {
        Some(path) => load_rules(path)
            .with_context(|| format!("failed to load rules from {}", path.display()))?,
        None => RuleSet::default(),
    };
    Ok(Classifier::new(rules).with_max_distance(config.max_distance_miles))
}

fn build_source(config: &AppConfig) -> anyhow::Result<CandidateSource> {
    let api_key = config
        .google_maps_api_key
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("GOOGLE_MAPS_API_KEY is not set; cannot run search"))?;

    let client = PlacesClient::new(
        api_key,
        config.places_request_timeout_secs,
        &config.places_user_agent,
    )
    .map_err(|e| anyhow::anyhow!("failed to build places client: {e}"))?
    .with_retry_policy(config.places_max_retries, config.places_retry_backoff_base_ms)
    .with_page_delay(Duration::from_millis(config.places_page_delay_ms));

    Ok(CandidateSource::new(
        client,
        QueryStrategy::default(),
        config.places_detail_concurrency,
        Duration::from_secs(config.search_cache_ttl_secs),
    ))
}

async fn gather(
    source: &CandidateSource,
    target: &SearchTarget,
) -> anyhow::Result<Vec<CandidateBatch>> {
    match target {
        SearchTarget::Point { lat, lng } => {
            let batch = source.gather_for_point(*lat, *lng).await?;
            Ok(vec![batch])
        }
        SearchTarget::Zips(zips) => {
            if zips.is_empty() {
                anyhow::bail!("at least one ZIP code is required");
            }
            if zips.len() > MAX_ZIP_CODES {
                anyhow::bail!("at most {MAX_ZIP_CODES} ZIP codes can be searched at once");
            }

            let mut batches = Vec::with_capacity(zips.len());
            let mut last_error = None;
            for zip in zips {
                match source.gather_for_zip(zip).await {
                    Ok(batch) => batches.push(batch),
                    Err(e) => {
                        tracing::warn!(zip = %zip, error = %e, "skipping ZIP code");
                        last_error = Some(e);
                    }
                }
            }

            match (batches.is_empty(), last_error) {
                (true, Some(e)) => Err(e.into()),
                _ => Ok(batches),
            }
        }
    }
}

/// Upserts prospects per territory, records the search, and links results.
/// Returns the new search id.
async fn persist(
    pool: &PgPool,
    source: &CandidateSource,
    batches: &[CandidateBatch],
    territories: &[TerritoryResult],
    counters: &FilterCounters,
    elapsed: Duration,
    max_distance_miles: Option<f64>,
) -> anyhow::Result<i64> {
    let mut links = Vec::new();
    let mut new_count = 0usize;

    for territory in territories {
        let zip = Some(territory.zip_code.as_str()).filter(|z| !z.is_empty());
        let upserted = prospector_db::upsert_prospects(pool, zip, &territory.prospects).await?;
        let by_place: HashMap<&str, (i64, bool)> = upserted
            .iter()
            .map(|u| (u.place_id.as_str(), (u.id, u.is_new)))
            .collect();

        for prospect in &territory.prospects {
            let Some(&(prospect_id, was_new)) = by_place.get(prospect.place.place_id.as_str())
            else {
                continue;
            };
            if was_new {
                new_count += 1;
            }
            links.push(NewSearchResult {
                prospect_id,
                distance_miles: Some(prospect.distance_miles),
                score_at_time: i16::from(prospect.prospect_score),
                was_new,
            });
        }
    }

    let origin = batches.first().map(|b| b.origin.point);
    let search = NewSearch {
        zip_codes: batches
            .iter()
            .filter_map(|b| b.origin.zip_code.clone())
            .collect(),
        origin_latitude: origin.map(|p| p.lat),
        origin_longitude: origin.map(|p| p.lng),
        max_distance_miles,
        strategy_fingerprint: Some(source.strategy().fingerprint()),
        candidates_examined: to_i32(counters.examined),
        total_found: to_i32(links.len()),
        new_prospects: to_i32(new_count),
        duplicate_prospects: to_i32(links.len() - new_count),
        filter_counters: serde_json::to_value(counters)?,
        duration_seconds: Some(elapsed.as_secs_f64()),
    };

    let row = prospector_db::create_search(pool, &search).await?;
    prospector_db::link_search_results(pool, row.id, &links).await?;

    tracing::info!(
        search_id = row.id,
        found = links.len(),
        new = new_count,
        "search saved"
    );
    Ok(row.id)
}

fn to_i32(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

fn print_ranking(territories: &[TerritoryResult], limit: usize) {
    let mut ranked: Vec<_> = territories
        .iter()
        .flat_map(|t| t.prospects.iter().map(move |p| (t.zip_code.as_str(), p)))
        .collect();
    ranked.sort_by(|a, b| {
        b.1.prospect_score
            .cmp(&a.1.prospect_score)
            .then(a.1.distance_miles.total_cmp(&b.1.distance_miles))
    });

    if ranked.is_empty() {
        println!("no independent dealers found");
        return;
    }

    println!(
        "{:<5}{:<7}{:<10}{:<8}{:<7}{:<38}PHONE",
        "#", "SCORE", "PRIORITY", "MILES", "ZIP", "NAME"
    );
    for (rank, (zip, p)) in ranked.iter().take(limit).enumerate() {
        println!(
            "{:<5}{:<7}{:<10}{:<8.1}{:<7}{:<38}{}",
            rank + 1,
            p.prospect_score,
            p.priority.as_str(),
            p.distance_miles,
            zip,
            crate::truncate(&p.place.name, 36),
            crate::or_dash(p.place.phone.as_deref()),
        );
    }
    if ranked.len() > limit {
        println!("... {} more (raise --limit to see them)", ranked.len() - limit);
    }
}

fn print_summary(summary: &SearchSummary, counters: &FilterCounters) {
    println!();
    println!(
        "prospects: {}  high priority: {}  with phone: {}  with website: {}",
        summary.total, summary.high_priority, summary.with_phone, summary.with_website
    );
    println!(
        "average score: {}  average rating: {}",
        crate::or_dash(summary.average_score.map(|s| format!("{s:.1}"))),
        crate::or_dash(summary.average_rating.map(|r| format!("{r:.1}"))),
    );
    for (zip, count) in &summary.by_zip {
        println!("  {zip}: {count}");
    }
    println!(
        "examined {}: franchise {}, non-dealer {}, irrelevant {}, closed {}, \
         no location {}, out of range {}, duplicate {}, malformed {}",
        counters.examined,
        counters.franchise,
        counters.non_dealer,
        counters.irrelevant,
        counters.closed,
        counters.no_location,
        counters.out_of_range,
        counters.duplicate,
        counters.malformed,
    );
}
