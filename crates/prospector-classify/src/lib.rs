//! Independent used-car dealer classification and prospect scoring.
//!
//! [`Classifier::classify_and_score`] turns a batch of raw place candidates
//! into a ranked list of independent dealers. It is a pure function of its
//! inputs: no I/O, no clock, no shared state.

mod classifier;
mod scoring;
mod signals;

pub use classifier::{
    classify_and_score, Classification, Classifier, Exclusion, FilterCounters,
};
pub use scoring::{score_place, ScoreBreakdown};
pub use signals::{
    brand_is_prominent, franchise_signal, indicator_signal, is_non_dealer, FranchiseSignal,
    IndicatorSignal,
};
