use prospector_core::{BusinessStatus, GeoPoint};

use super::*;

const ORIGIN_LAT: f64 = 39.7817;
const ORIGIN_LNG: f64 = -89.6501;

fn origin() -> SearchOrigin {
    SearchOrigin::new(GeoPoint::new(ORIGIN_LAT, ORIGIN_LNG)).with_zip_code("62701")
}

/// Candidate `lat_offset` degrees north of the origin (0.01 deg is about 0.7 mi).
fn candidate(id: &str, name: &str, lat_offset: f64) -> RawPlace {
    let mut place = RawPlace::new(id, name);
    place.address = Some("100 Main St, Springfield, IL 62701, USA".to_string());
    place.location = Some(GeoPoint::new(ORIGIN_LAT + lat_offset, ORIGIN_LNG));
    place
}

fn well_reviewed(mut place: RawPlace) -> RawPlace {
    place.rating = Some(4.6);
    place.review_count = Some(120);
    place.website = Some("https://dealer.example".to_string());
    place.phone = Some("(217) 555-0100".to_string());
    place
}

fn classifier() -> Classifier {
    Classifier::new(RuleSet::default())
}

#[test]
fn brand_with_dealership_indicator_is_excluded() {
    let place = candidate("p1", "Honda Dealership of Springfield", 0.01);
    let result = classifier().evaluate(&place, &origin());
    assert!(
        matches!(result, Err(Exclusion::Franchise(_))),
        "got: {result:?}"
    );
}

#[test]
fn incidental_brand_mention_is_retained() {
    let place = candidate("p1", "City Auto Sales \u{2014} We Buy Toyotas & More", 0.01);
    let prospect = classifier()
        .evaluate(&place, &origin())
        .expect("independent dealer should be retained");
    // base + independent indicator ("auto sales")
    assert_eq!(prospect.prospect_score, 65);
    assert_eq!(prospect.priority, Priority::Standard);
}

#[test]
fn fully_loaded_independent_clamps_to_100_and_high() {
    let place = well_reviewed(candidate("p1", "Springfield Pre-Owned", 0.01));
    let prospect = classifier().evaluate(&place, &origin()).unwrap();
    assert_eq!(prospect.prospect_score, 100);
    assert_eq!(prospect.priority, Priority::High);
}

#[test]
fn used_cars_dealer_with_everything_scores_100() {
    let place = well_reviewed(candidate("p1", "Springfield Used Cars", 0.01));
    let prospect = classifier().evaluate(&place, &origin()).unwrap();
    assert_eq!(prospect.prospect_score, 100);
    assert_eq!(prospect.priority, Priority::High);
}

#[test]
fn towing_service_is_excluded_as_non_dealer() {
    let place = well_reviewed(candidate("p1", "ABC Towing Service", 0.01));
    assert_eq!(
        classifier().evaluate(&place, &origin()),
        Err(Exclusion::NonDealer)
    );
}

#[test]
fn unrelated_business_is_excluded_as_irrelevant() {
    let place = well_reviewed(candidate("p1", "Joe's Pizza", 0.01));
    assert_eq!(
        classifier().evaluate(&place, &origin()),
        Err(Exclusion::Irrelevant)
    );
}

#[test]
fn permanently_closed_is_excluded_regardless_of_quality() {
    let mut place = well_reviewed(candidate("p1", "Family Owned Used Cars", 0.01));
    place.business_status = Some(BusinessStatus::ClosedPermanently);
    assert_eq!(
        classifier().evaluate(&place, &origin()),
        Err(Exclusion::Closed)
    );
}

#[test]
fn temporarily_closed_is_retained() {
    let mut place = candidate("p1", "Budget Auto Sales", 0.01);
    place.business_status = Some(BusinessStatus::ClosedTemporarily);
    assert!(classifier().evaluate(&place, &origin()).is_ok());
}

/// A brand that ends the name counts as prominent, so "We Buy Any Car
/// Including Toyota" is excluded even though it reads like an incidental
/// mention. Rewording the trailing brand is the way to keep such a dealer.
#[test]
fn trailing_brand_is_prominent_even_after_we_buy_phrase() {
    let place = candidate("p1", "City Motors - We Buy Any Car Including Toyota", 0.01);
    assert!(matches!(
        classifier().evaluate(&place, &origin()),
        Err(Exclusion::Franchise(FranchiseSignal::ProminentBrand { ref brand })) if brand == "toyota"
    ));
}

#[test]
fn blank_name_is_malformed() {
    let place = candidate("p1", "   ", 0.01);
    assert_eq!(
        classifier().evaluate(&place, &origin()),
        Err(Exclusion::Malformed)
    );
}

#[test]
fn blank_place_id_is_malformed() {
    let place = candidate("", "Budget Auto Sales", 0.01);
    assert_eq!(
        classifier().evaluate(&place, &origin()),
        Err(Exclusion::Malformed)
    );
}

#[test]
fn distance_is_rounded_to_one_decimal() {
    let place = candidate("p1", "Budget Auto Sales", 0.05);
    let prospect = classifier().evaluate(&place, &origin()).unwrap();
    assert!((prospect.distance_miles - 3.5).abs() < 1e-9, "got {}", prospect.distance_miles);
}

#[test]
fn missing_location_falls_back_to_zip_in_address() {
    let mut place = candidate("p1", "Budget Auto Sales", 0.0);
    place.location = None;
    let prospect = classifier().evaluate(&place, &origin()).unwrap();
    assert!(prospect.distance_miles.abs() < f64::EPSILON);
}

#[test]
fn missing_location_without_zip_match_is_excluded() {
    let mut place = candidate("p1", "Budget Auto Sales", 0.0);
    place.location = None;
    place.address = Some("9 Elm St, Decatur, IL 62521, USA".to_string());
    assert_eq!(
        classifier().evaluate(&place, &origin()),
        Err(Exclusion::NoLocation)
    );
}

#[test]
fn missing_location_and_address_is_excluded() {
    let mut place = RawPlace::new("p1", "Budget Auto Sales");
    place.phone = Some("(217) 555-0100".to_string());
    assert_eq!(
        classifier().evaluate(&place, &origin()),
        Err(Exclusion::NoLocation)
    );
}

#[test]
fn radius_cut_excludes_far_candidates() {
    let near = candidate("near", "Budget Auto Sales", 0.05);
    let far = candidate("far", "Faraway Auto Sales", 0.5);
    let classifier = classifier().with_max_distance(Some(20.0));
    let result = classifier.classify_and_score(&[near, far], &origin());
    assert_eq!(result.prospects.len(), 1);
    assert_eq!(result.prospects[0].place.place_id, "near");
    assert_eq!(result.counters.out_of_range, 1);
}

#[test]
fn radius_cut_uses_unrounded_distance() {
    let classifier = classifier().with_max_distance(Some(20.0));

    // About 20.04 miles: rounds to 20.0 but is past the limit.
    let just_past = candidate("past", "Budget Auto Sales", 20.04 / 69.093);
    assert_eq!(
        classifier.evaluate(&just_past, &origin()),
        Err(Exclusion::OutOfRange)
    );

    // About 19.96 miles: inside the limit, reported rounded.
    let just_inside = candidate("inside", "Budget Auto Sales", 19.96 / 69.093);
    let prospect = classifier.evaluate(&just_inside, &origin()).unwrap();
    assert!((prospect.distance_miles - 20.0).abs() < 1e-9, "got {}", prospect.distance_miles);
}

#[test]
fn without_radius_cut_far_candidates_are_kept() {
    let far = candidate("far", "Faraway Auto Sales", 0.5);
    let result = classifier().classify_and_score(&[far], &origin());
    assert_eq!(result.prospects.len(), 1);
}

#[test]
fn output_is_ranked_by_score_then_distance() {
    let candidates = vec![
        candidate("low-near", "Budget Auto Sales", 0.01),
        well_reviewed(candidate("high-far", "Quality Used Autos", 0.1)),
        well_reviewed(candidate("high-near", "Reliable Used Autos", 0.02)),
        candidate("low-far", "Cheap Cars Depot", 0.08),
    ];
    let result = classifier().classify_and_score(&candidates, &origin());
    let ids: Vec<&str> = result
        .prospects
        .iter()
        .map(|p| p.place.place_id.as_str())
        .collect();
    assert_eq!(ids, vec!["high-near", "high-far", "low-near", "low-far"]);

    for pair in result.prospects.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(
            a.prospect_score > b.prospect_score
                || (a.prospect_score == b.prospect_score && a.distance_miles <= b.distance_miles)
        );
    }
}

#[test]
fn duplicate_place_ids_appear_once() {
    let candidates = vec![
        candidate("dup", "Budget Auto Sales", 0.01),
        candidate("dup", "Budget Auto Sales", 0.01),
        candidate("other", "Cheap Cars Depot", 0.02),
    ];
    let result = classifier().classify_and_score(&candidates, &origin());
    assert_eq!(result.prospects.len(), 2);
    assert_eq!(result.counters.duplicate, 1);

    let mut ids: Vec<&str> = result
        .prospects
        .iter()
        .map(|p| p.place.place_id.as_str())
        .collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), result.prospects.len());
}

fn mixed_batch() -> Vec<RawPlace> {
    let mut closed = well_reviewed(candidate("closed", "Locally Owned Used Cars", 0.01));
    closed.business_status = Some(BusinessStatus::ClosedPermanently);

    let mut unrated = candidate("unrated", "Auto Mart Express", 0.03);
    unrated.rating = Some(0.0);
    unrated.review_count = Some(0);

    vec![
        well_reviewed(candidate("a", "Independent Auto Sales", 0.02)),
        candidate("franchise", "Toyota of Springfield", 0.01),
        closed,
        candidate("tow", "ABC Towing Service", 0.01),
        candidate("pizza", "Joe's Pizza", 0.01),
        unrated,
        candidate("b", "Family Owned Car Lot", 0.04),
        candidate("a", "Independent Auto Sales", 0.02),
        candidate("", "", 0.0),
    ]
}

#[test]
fn counters_account_for_every_candidate() {
    let batch = mixed_batch();
    let result = classifier().classify_and_score(&batch, &origin());
    let c = result.counters;
    assert_eq!(c.examined, batch.len());
    assert_eq!(c.retained, result.prospects.len());
    assert_eq!(c.retained + c.excluded(), c.examined);
    assert_eq!(c.franchise, 1);
    assert_eq!(c.closed, 1);
    assert_eq!(c.non_dealer, 1);
    assert_eq!(c.irrelevant, 1);
    assert_eq!(c.duplicate, 1);
    assert_eq!(c.malformed, 1);
    assert_eq!(c.retained, 3);
}

#[test]
fn scores_are_bounded_and_priority_is_consistent() {
    let result = classifier().classify_and_score(&mixed_batch(), &origin());
    for prospect in &result.prospects {
        assert!(prospect.prospect_score <= 100);
        assert_eq!(
            prospect.priority == Priority::High,
            prospect.prospect_score >= 70
        );
    }
}

#[test]
fn zero_rating_is_treated_as_unrated() {
    let result = classifier().classify_and_score(&mixed_batch(), &origin());
    let unrated = result
        .prospects
        .iter()
        .find(|p| p.place.place_id == "unrated")
        .expect("unrated dealer should be retained");
    // base + independent indicator only
    assert_eq!(unrated.prospect_score, 65);
}

#[test]
fn classification_is_idempotent() {
    let batch = mixed_batch();
    let classifier = classifier();
    let first = classifier.classify_and_score(&batch, &origin());
    let second = classifier.classify_and_score(&batch, &origin());
    assert_eq!(first, second);
}

#[test]
fn closed_candidates_never_appear_in_output() {
    let result = classifier().classify_and_score(&mixed_batch(), &origin());
    assert!(result
        .prospects
        .iter()
        .all(|p| p.place.business_status != Some(BusinessStatus::ClosedPermanently)));
}

#[test]
fn retained_records_pass_fields_through_unchanged() {
    let place = well_reviewed(candidate("p1", "Budget Auto Sales", 0.01));
    let result = classifier().classify_and_score(std::slice::from_ref(&place), &origin());
    assert_eq!(result.prospects[0].place, place);
}

#[test]
fn free_function_uses_builtin_rules() {
    let batch = vec![
        candidate("p1", "Honda Dealership of Springfield", 0.01),
        candidate("p2", "Budget Auto Sales", 0.01),
    ];
    let prospects = classify_and_score(&batch, &origin());
    assert_eq!(prospects.len(), 1);
    assert_eq!(prospects[0].place.place_id, "p2");
}

#[test]
fn empty_input_yields_empty_output() {
    let result = classifier().classify_and_score(&[], &origin());
    assert!(result.prospects.is_empty());
    assert_eq!(result.counters, FilterCounters::default());
}

#[test]
fn custom_rules_change_decisions() {
    let mut rules = RuleSet::default();
    rules.non_dealer_phrases.push("pizza".to_string());
    rules.generic_dealer_tokens.push("pizza".to_string());
    let place = candidate("p1", "Joe's Pizza", 0.01);
    assert_eq!(
        Classifier::new(rules).evaluate(&place, &origin()),
        Err(Exclusion::NonDealer)
    );
}

#[test]
fn counters_merge_across_runs() {
    let c = classifier();
    let first = c.classify_and_score(&[candidate("a", "Budget Auto Sales", 0.01)], &origin());
    let second = c.classify_and_score(&[candidate("b", "Joe's Pizza", 0.01)], &origin());

    let mut total = first.counters;
    total.merge(&second.counters);
    assert_eq!(total.examined, 2);
    assert_eq!(total.retained, 1);
    assert_eq!(total.irrelevant, 1);
    assert_eq!(total.excluded(), 1);
}
