//! Word lists that drive dealer classification.
//!
//! Every list holds lowercase phrases that are matched as substrings of the
//! lowercased business name. The built-in tables are the canonical rule set;
//! `config/rules.yaml` ships the same lists so an operator can tune them
//! without rebuilding.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Manufacturer brands whose names mark a franchise store.
pub const FRANCHISE_BRANDS: &[&str] = &[
    "toyota",
    "honda",
    "ford",
    "chevrolet",
    "chevy",
    "nissan",
    "mazda",
    "hyundai",
    "kia",
    "subaru",
    "volkswagen",
    "vw",
    "bmw",
    "mercedes-benz",
    "mercedes",
    "audi",
    "lexus",
    "infiniti",
    "acura",
    "cadillac",
    "lincoln",
    "buick",
    "gmc",
    "chrysler",
    "dodge",
    "jeep",
    "ram",
    "fiat",
    "mitsubishi",
    "volvo",
    "jaguar",
    "land rover",
    "porsche",
    "mini",
    "tesla",
    "genesis",
    "alfa romeo",
    "maserati",
    "bentley",
    "rolls-royce",
    "ferrari",
    "lamborghini",
    "peugeot",
    "citroen",
    "renault",
    "seat",
    "skoda",
    "smart",
    "saab",
    "hummer",
    "saturn",
    "pontiac",
    "oldsmobile",
    "plymouth",
    "mercury",
    "scion",
    "isuzu",
    "suzuki",
    "daewoo",
    "maybach",
    "mclaren",
    "aston martin",
    "lotus",
];

/// Heavy-truck manufacturers, treated the same as passenger brands.
pub const TRUCK_BRANDS: &[&str] = &[
    "freightliner",
    "peterbilt",
    "kenworth",
    "mack",
    "international",
    "volvo trucks",
    "western star",
    "sterling",
    "autocar",
    "hino",
    "isuzu commercial",
];

/// Phrases that corroborate a brand mention as a franchise store.
pub const FRANCHISE_INDICATORS: &[&str] = &[
    "dealership",
    "new & used",
    "new and used",
    "certified pre-owned",
    "sales & service",
    "sales and service",
    "service center",
    "collision center",
    "parts & service",
    "motor company",
    "auto group",
    "family of dealerships",
    "auto mall",
];

/// Phrases that mark a franchise store even without a brand in the name.
pub const FRANCHISE_ONLY_PHRASES: &[&str] = &[
    "authorized dealer",
    "certified dealer",
    "official dealer",
    "factory authorized",
    "manufacturer certified",
    "oem parts",
    "genuine parts",
    "warranty service",
];

/// Business types that are never vehicle dealers.
pub const NON_DEALER_PHRASES: &[&str] = &[
    "rent-a-car",
    "enterprise rent",
    "hertz rent",
    "avis rent",
    "budget rent",
    "parts only",
    "junkyard",
    "salvage yard",
    "towing service",
    "wrecker service",
    "car wash only",
    "detail only",
    "repair only",
    "mechanic only",
    "glass only",
    "windshield only",
    "tire shop",
    "oil change only",
    "insurance agency",
    "financing only",
    "aftermarket only",
    "motorcycle only",
    "truck rental only",
    "van rental only",
    "parking lot",
    "storage facility",
    "gas station",
    "fuel station",
    "driving school",
    "dmv office",
    "dmv service",
    "notary service",
    "parts & service only",
    "service only",
    "repairs only",
];

/// Name endings that mark a single-service shop. Leading space is significant.
pub const NON_DEALER_SUFFIXES: &[&str] = &[" parts", " towing", " glass", " tires"];

/// Phrases typical of independent used-vehicle dealers.
pub const INDEPENDENT_INDICATORS: &[&str] = &[
    // used inventory
    "used cars",
    "used car",
    "pre-owned",
    "pre owned",
    "previously owned",
    "certified pre-owned",
    "quality used",
    "clean used",
    "reliable used",
    // sales
    "auto sales",
    "car sales",
    "vehicle sales",
    "automobile sales",
    // ownership
    "independent",
    "family owned",
    "locally owned",
    "owner operated",
    "family business",
    "local business",
    "since",
    "est.",
    // lots
    "car lot",
    "auto lot",
    "lot",
    "cars",
    "autos",
    "vehicles",
    // marts and worlds
    "car mart",
    "auto mart",
    "car world",
    "auto world",
    "car connection",
    "auto connection",
    "car plaza",
    "auto plaza",
    "car center",
    "auto center",
    "car hub",
    "auto hub",
    "car gallery",
    "auto gallery",
    "car depot",
    "auto depot",
    "car warehouse",
    "auto warehouse",
    "car emporium",
    "auto emporium",
    // value
    "affordable cars",
    "discount auto",
    "budget cars",
    "economy auto",
    "value cars",
    "bargain auto",
    "cheap cars",
    "low price",
    // selection
    "select auto",
    "premier auto",
    "elite auto",
    "choice auto",
    "best buy auto",
    "first choice",
    "top choice",
    "prime auto",
    // general
    "motors",
    "automotive",
    "auto",
    "dealer",
    "dealership",
    "car company",
    "auto company",
    "car group",
    "auto group",
    // trade
    "wholesale",
    "trade",
    "consignment",
    "broker",
];

/// Subset of [`INDEPENDENT_INDICATORS`] worth an extra bonus.
pub const STRONG_INDEPENDENT_INDICATORS: &[&str] = &[
    "independent",
    "family owned",
    "locally owned",
    "used cars",
    "used car lot",
];

/// Bare tokens that make a name plausibly vehicle-related.
pub const GENERIC_DEALER_TOKENS: &[&str] = &["car", "auto", "vehicle", "motor", "sales", "dealer", "lot"];

/// The full set of classification word lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    pub franchise_brands: Vec<String>,
    #[serde(default)]
    pub truck_brands: Vec<String>,
    pub franchise_indicators: Vec<String>,
    #[serde(default)]
    pub franchise_only_phrases: Vec<String>,
    pub non_dealer_phrases: Vec<String>,
    #[serde(default)]
    pub non_dealer_suffixes: Vec<String>,
    pub independent_indicators: Vec<String>,
    pub strong_independent_indicators: Vec<String>,
    pub generic_dealer_tokens: Vec<String>,
}

impl Default for RuleSet {
    fn default() -> Self {
        fn owned(list: &[&str]) -> Vec<String> {
            list.iter().map(|s| (*s).to_string()).collect()
        }

        Self {
            franchise_brands: owned(FRANCHISE_BRANDS),
            truck_brands: owned(TRUCK_BRANDS),
            franchise_indicators: owned(FRANCHISE_INDICATORS),
            franchise_only_phrases: owned(FRANCHISE_ONLY_PHRASES),
            non_dealer_phrases: owned(NON_DEALER_PHRASES),
            non_dealer_suffixes: owned(NON_DEALER_SUFFIXES),
            independent_indicators: owned(INDEPENDENT_INDICATORS),
            strong_independent_indicators: owned(STRONG_INDEPENDENT_INDICATORS),
            generic_dealer_tokens: owned(GENERIC_DEALER_TOKENS),
        }
    }
}

impl RuleSet {
    /// Passenger and truck brands together.
    pub fn all_brands(&self) -> impl Iterator<Item = &str> {
        self.franchise_brands
            .iter()
            .chain(self.truck_brands.iter())
            .map(String::as_str)
    }

    /// Named list sizes, in declaration order.
    #[must_use]
    pub fn list_sizes(&self) -> Vec<(&'static str, usize)> {
        vec![
            ("franchise_brands", self.franchise_brands.len()),
            ("truck_brands", self.truck_brands.len()),
            ("franchise_indicators", self.franchise_indicators.len()),
            ("franchise_only_phrases", self.franchise_only_phrases.len()),
            ("non_dealer_phrases", self.non_dealer_phrases.len()),
            ("non_dealer_suffixes", self.non_dealer_suffixes.len()),
            ("independent_indicators", self.independent_indicators.len()),
            (
                "strong_independent_indicators",
                self.strong_independent_indicators.len(),
            ),
            ("generic_dealer_tokens", self.generic_dealer_tokens.len()),
        ]
    }

    /// Check the invariants the classifier relies on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] describing the first violation found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required: [(&str, &[String]); 6] = [
            ("franchise_brands", &self.franchise_brands),
            ("franchise_indicators", &self.franchise_indicators),
            ("non_dealer_phrases", &self.non_dealer_phrases),
            ("independent_indicators", &self.independent_indicators),
            (
                "strong_independent_indicators",
                &self.strong_independent_indicators,
            ),
            ("generic_dealer_tokens", &self.generic_dealer_tokens),
        ];
        for (name, list) in required {
            if list.is_empty() {
                return Err(ConfigError::Validation(format!("{name} must not be empty")));
            }
        }

        let all: [(&str, &[String]); 9] = [
            ("franchise_brands", &self.franchise_brands),
            ("truck_brands", &self.truck_brands),
            ("franchise_indicators", &self.franchise_indicators),
            ("franchise_only_phrases", &self.franchise_only_phrases),
            ("non_dealer_phrases", &self.non_dealer_phrases),
            ("non_dealer_suffixes", &self.non_dealer_suffixes),
            ("independent_indicators", &self.independent_indicators),
            (
                "strong_independent_indicators",
                &self.strong_independent_indicators,
            ),
            ("generic_dealer_tokens", &self.generic_dealer_tokens),
        ];
        for (name, list) in all {
            validate_list(name, list)?;
        }

        // A name matching a strong indicator must also match an ordinary one.
        for strong in &self.strong_independent_indicators {
            let covered = self
                .independent_indicators
                .iter()
                .any(|ind| strong.contains(ind.as_str()));
            if !covered {
                return Err(ConfigError::Validation(format!(
                    "strong indicator {strong:?} is not covered by any independent indicator"
                )));
            }
        }

        Ok(())
    }
}

fn validate_list(name: &str, list: &[String]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for entry in list {
        if entry.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "{name} contains a blank entry"
            )));
        }
        if *entry != entry.to_lowercase() {
            return Err(ConfigError::Validation(format!(
                "{name} entry {entry:?} must be lowercase"
            )));
        }
        if !seen.insert(entry.as_str()) {
            return Err(ConfigError::Validation(format!(
                "{name} contains duplicate entry {entry:?}"
            )));
        }
    }
    Ok(())
}

/// Load and validate a rule set from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_rules(path: &Path) -> Result<RuleSet, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::RulesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let rules: RuleSet = serde_yaml::from_str(&content)?;
    rules.validate()?;

    Ok(rules)
}

#[cfg(test)]
#[path = "rules_test.rs"]
mod tests;
