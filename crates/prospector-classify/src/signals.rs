//! Name-based signals: franchise, non-dealer, and independence indicators.
//!
//! All functions take the business name already trimmed and lowercased.

use prospector_core::RuleSet;

/// Why a name was classified as a franchise store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FranchiseSignal {
    /// Brand token corroborated by a franchise indicator phrase.
    BrandWithIndicator { brand: String, indicator: String },
    /// Brand token in a position that names the store itself.
    ProminentBrand { brand: String },
    /// Phrase that only franchise stores use, e.g. "factory authorized".
    FranchiseOnlyPhrase { phrase: String },
}

/// Independence indicators found in a name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndicatorSignal {
    /// First independent-dealer indicator matched, if any.
    pub independent: Option<String>,
    /// First strong indicator matched, if any.
    pub strong: Option<String>,
    /// Whether any bare car token ("car", "auto", ...) appears.
    pub generic: bool,
}

impl IndicatorSignal {
    /// Whether the name is plausibly a vehicle dealer at all.
    #[must_use]
    pub fn is_relevant(&self) -> bool {
        self.independent.is_some() || self.generic
    }
}

/// `true` when `brand` is positioned as the store's own name: leading
/// (`"toyota of ..."`, `"hondas ..."`), free-standing mid-name, trailing, or
/// the whole name.
#[must_use]
pub fn brand_is_prominent(name: &str, brand: &str) -> bool {
    name == brand
        || name.starts_with(&format!("{brand} "))
        || name.starts_with(&format!("{brand}s "))
        || name.contains(&format!(" {brand} "))
        || name.ends_with(&format!(" {brand}"))
}

/// Classify a name as franchise or not.
///
/// A brand mention alone is not enough: it needs either a franchise
/// indicator phrase or a prominent position. Franchise-only phrases match
/// without any brand.
#[must_use]
pub fn franchise_signal(name: &str, rules: &RuleSet) -> Option<FranchiseSignal> {
    if let Some(phrase) = first_match(name, &rules.franchise_only_phrases) {
        return Some(FranchiseSignal::FranchiseOnlyPhrase {
            phrase: phrase.to_string(),
        });
    }

    let indicator = first_match(name, &rules.franchise_indicators);

    for brand in rules.all_brands().filter(|b| name.contains(b)) {
        if let Some(indicator) = indicator {
            return Some(FranchiseSignal::BrandWithIndicator {
                brand: brand.to_string(),
                indicator: indicator.to_string(),
            });
        }
        if brand_is_prominent(name, brand) {
            return Some(FranchiseSignal::ProminentBrand {
                brand: brand.to_string(),
            });
        }
    }

    None
}

#[must_use]
pub fn is_non_dealer(name: &str, rules: &RuleSet) -> bool {
    first_match(name, &rules.non_dealer_phrases).is_some()
        || rules
            .non_dealer_suffixes
            .iter()
            .any(|suffix| name.ends_with(suffix.as_str()))
}

#[must_use]
pub fn indicator_signal(name: &str, rules: &RuleSet) -> IndicatorSignal {
    IndicatorSignal {
        independent: first_match(name, &rules.independent_indicators).map(str::to_string),
        strong: first_match(name, &rules.strong_independent_indicators).map(str::to_string),
        generic: first_match(name, &rules.generic_dealer_tokens).is_some(),
    }
}

fn first_match<'r>(name: &str, phrases: &'r [String]) -> Option<&'r str> {
    phrases
        .iter()
        .map(String::as_str)
        .find(|phrase| name.contains(phrase))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> RuleSet {
        RuleSet::default()
    }

    #[test]
    fn brand_prominence_positions() {
        assert!(brand_is_prominent("toyota of springfield", "toyota"));
        assert!(brand_is_prominent("hondas unlimited", "honda"));
        assert!(brand_is_prominent("springfield ford lincoln", "ford"));
        assert!(brand_is_prominent("springfield ford", "ford"));
        assert!(brand_is_prominent("bmw", "bmw"));
    }

    #[test]
    fn brand_inside_a_word_is_not_prominent() {
        assert!(!brand_is_prominent("bradford auto sales", "ford"));
        assert!(!brand_is_prominent("we buy toyotas & more", "toyota"));
    }

    #[test]
    fn brand_with_indicator_is_franchise() {
        let signal = franchise_signal("honda dealership of springfield", &rules());
        assert!(matches!(
            signal,
            Some(FranchiseSignal::BrandWithIndicator { ref brand, ref indicator })
                if brand == "honda" && indicator == "dealership"
        ));
    }

    #[test]
    fn leading_brand_is_franchise() {
        let signal = franchise_signal("toyota of springfield", &rules());
        assert!(matches!(
            signal,
            Some(FranchiseSignal::ProminentBrand { ref brand }) if brand == "toyota"
        ));
    }

    #[test]
    fn incidental_brand_mention_is_not_franchise() {
        assert!(franchise_signal("city auto sales \u{2014} we buy toyotas & more", &rules()).is_none());
    }

    #[test]
    fn truck_brands_count() {
        assert!(franchise_signal("peterbilt of the ozarks", &rules()).is_some());
    }

    #[test]
    fn franchise_only_phrase_needs_no_brand() {
        assert!(matches!(
            franchise_signal("springfield factory authorized outlet", &rules()),
            Some(FranchiseSignal::FranchiseOnlyPhrase { ref phrase }) if phrase == "factory authorized"
        ));
    }

    #[test]
    fn non_dealer_phrases_and_suffixes() {
        assert!(is_non_dealer("abc towing service", &rules()));
        assert!(is_non_dealer("enterprise rent-a-car", &rules()));
        assert!(is_non_dealer("springfield auto parts", &rules()));
        assert!(is_non_dealer("discount tires", &rules()));
        assert!(!is_non_dealer("parts unknown auto sales", &rules()));
        assert!(!is_non_dealer("budget auto sales", &rules()));
    }

    #[test]
    fn indicator_signal_finds_strong_and_generic() {
        let signal = indicator_signal("family owned used cars", &rules());
        assert!(signal.independent.is_some());
        assert_eq!(signal.strong.as_deref(), Some("family owned"));
        assert!(signal.generic);
        assert!(signal.is_relevant());
    }

    #[test]
    fn unrelated_name_is_not_relevant() {
        let signal = indicator_signal("joe's pizza", &rules());
        assert_eq!(signal, IndicatorSignal::default());
        assert!(!signal.is_relevant());
    }
}
