use std::path::PathBuf;

use clap::Subcommand;
use prospector_core::{load_rules, AppConfig, RuleSet};

/// Sub-commands available under `rules`.
#[derive(Debug, Subcommand)]
pub enum RulesCommands {
    /// Load and validate a rule file, then print its list sizes
    Check {
        /// Rule file to check (defaults to PROSPECTOR_RULES_PATH, then the built-in rules)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

pub(crate) fn run_rules(config: &AppConfig, command: RulesCommands) -> anyhow::Result<()> {
    match command {
        RulesCommands::Check { path } => {
            let (label, rules) = match path.or_else(|| config.rules_path.clone()) {
                Some(path) => {
                    let rules = load_rules(&path)?;
                    (path.display().to_string(), rules)
                }
                None => {
                    let rules = RuleSet::default();
                    rules.validate()?;
                    ("built-in rules".to_string(), rules)
                }
            };

            println!("{label}: ok");
            for (name, size) in rules.list_sizes() {
                println!("  {name:<32}{size}");
            }
        }
    }
    Ok(())
}
