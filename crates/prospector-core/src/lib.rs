pub mod app_config;
pub mod config;
pub mod crm;
pub mod geo;
pub mod rules;
pub mod templates;
pub mod territory;
pub mod types;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use crm::{Channel, Direction, ProspectStatus};
pub use geo::{haversine_miles, round_tenth, validate_zip_code, GeoPoint};
pub use rules::{load_rules, RuleSet};
pub use templates::{
    email_templates, find_template, render_template, sms_templates, template_vars_for,
    MessageTemplate, TemplateKind,
};
pub use territory::{merge_territories, summarize_territories, SearchSummary, TerritoryResult};
pub use types::{
    BusinessStatus, Priority, RawPlace, ScoredProspect, SearchOrigin, HIGH_PRIORITY_THRESHOLD,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read rules file {path}: {source}")]
    RulesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse rules file: {0}")]
    RulesFileParse(#[from] serde_yaml::Error),

    #[error("rules validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid ZIP code: {0:?} (expected five digits)")]
    InvalidZipCode(String),

    #[error("invalid prospect status: {0}")]
    InvalidStatus(String),

    #[error("invalid priority: {0}")]
    InvalidPriority(String),

    #[error("invalid communication channel: {0}")]
    InvalidChannel(String),

    #[error("invalid communication direction: {0}")]
    InvalidDirection(String),

    #[error("invalid template kind: {0} (expected email or sms)")]
    InvalidTemplateKind(String),

    #[error("unknown {kind} template: {id}")]
    UnknownTemplate { kind: String, id: String },
}
