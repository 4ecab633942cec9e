use super::*;
use prospector_core::{Channel, Direction, Priority, ProspectStatus, TemplateKind};

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["prospector", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli =
        Cli::try_parse_from(["prospector", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["prospector"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn search_accepts_up_to_three_zips() {
    let cli = Cli::try_parse_from(["prospector", "search", "--zip", "62701", "62702", "62703"])
        .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Search {
            ref zips,
            lat: None,
            lng: None,
            dry_run: false,
            limit: 25,
        }) if zips.len() == 3 && zips[0] == "62701"
    ));
}

#[test]
fn search_rejects_four_zips_in_one_flag() {
    let result = Cli::try_parse_from([
        "prospector", "search", "--zip", "62701", "62702", "62703", "62704",
    ]);
    assert!(result.is_err());
}

#[test]
fn search_accepts_negative_coordinates() {
    let cli = Cli::try_parse_from([
        "prospector", "search", "--lat", "39.78", "--lng", "-89.65", "--dry-run",
    ])
    .unwrap();
    match cli.command {
        Some(Commands::Search {
            zips,
            lat: Some(lat),
            lng: Some(lng),
            dry_run: true,
            ..
        }) => {
            assert!(zips.is_empty());
            assert!((lat - 39.78).abs() < 1e-9);
            assert!((lng + 89.65).abs() < 1e-9);
        }
        other => panic!("unexpected parse: {other:?}"),
    }
}

#[test]
fn search_requires_a_target() {
    assert!(Cli::try_parse_from(["prospector", "search"]).is_err());
}

#[test]
fn search_rejects_zip_with_point() {
    let result = Cli::try_parse_from([
        "prospector", "search", "--zip", "62701", "--lat", "39.7", "--lng", "-89.6",
    ]);
    assert!(result.is_err());
}

#[test]
fn search_requires_both_coordinates() {
    assert!(Cli::try_parse_from(["prospector", "search", "--lat", "39.7"]).is_err());
}

#[test]
fn prospects_list_parses_typed_filters() {
    let cli = Cli::try_parse_from([
        "prospector", "prospects", "list", "--status", "contacted", "--priority", "high",
        "--visited", "false", "--limit", "10",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Prospects {
            command: ProspectsCommands::List {
                status: Some(ProspectStatus::Contacted),
                priority: Some(Priority::High),
                visited: Some(false),
                zip: None,
                limit: 10,
            }
        })
    ));
}

#[test]
fn prospects_status_rejects_unknown_value() {
    let result = Cli::try_parse_from(["prospector", "prospects", "status", "4", "archived"]);
    assert!(result.is_err());
}

#[test]
fn prospects_priority_clear_needs_no_value() {
    let cli = Cli::try_parse_from(["prospector", "prospects", "priority", "4", "--clear"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Prospects {
            command: ProspectsCommands::Priority {
                id: 4,
                priority: None,
                clear: true,
            }
        })
    ));
}

#[test]
fn prospects_priority_requires_value_or_clear() {
    assert!(Cli::try_parse_from(["prospector", "prospects", "priority", "4"]).is_err());
    assert!(
        Cli::try_parse_from(["prospector", "prospects", "priority", "4", "low", "--clear"])
            .is_err()
    );
}

#[test]
fn prospects_delete_takes_many_ids() {
    let cli = Cli::try_parse_from(["prospector", "prospects", "delete", "1", "2", "3"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Prospects {
            command: ProspectsCommands::Delete { ref ids }
        }) if ids == &[1, 2, 3]
    ));
}

#[test]
fn outreach_log_defaults_to_outbound() {
    let cli = Cli::try_parse_from([
        "prospector", "outreach", "log", "12", "--channel", "call", "--status", "answered",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Outreach {
            command: OutreachCommands::Log {
                id: 12,
                channel: Channel::Call,
                direction: Direction::Outbound,
                ref status,
                template: None,
                ..
            }
        }) if status.as_deref() == Some("answered")
    ));
}

#[test]
fn outreach_template_conflicts_with_message() {
    let result = Cli::try_parse_from([
        "prospector", "outreach", "log", "12", "--channel", "email", "--template", "intro",
        "--message", "hello",
    ]);
    assert!(result.is_err());
}

#[test]
fn outreach_render_parses_kind() {
    let cli = Cli::try_parse_from([
        "prospector", "outreach", "render", "3", "--kind", "sms", "--template", "followup",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Outreach {
            command: OutreachCommands::Render {
                id: 3,
                kind: TemplateKind::Sms,
                ref template,
            }
        }) if template == "followup"
    ));
}

#[test]
fn stats_communications_defaults_to_thirty_days() {
    let cli = Cli::try_parse_from(["prospector", "stats", "communications"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Stats {
            command: StatsCommands::Communications { days: 30 }
        })
    ));
}

#[test]
fn history_show_takes_id() {
    let cli = Cli::try_parse_from(["prospector", "history", "show", "9"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::History {
            command: HistoryCommands::Show { id: 9 }
        })
    ));
}

#[test]
fn rules_check_accepts_optional_path() {
    let cli = Cli::try_parse_from(["prospector", "rules", "check", "--path", "config/rules.yaml"])
        .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Rules {
            command: RulesCommands::Check { path: Some(ref p) }
        }) if p.ends_with("rules.yaml")
    ));

    let cli = Cli::try_parse_from(["prospector", "rules", "check"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Rules {
            command: RulesCommands::Check { path: None }
        })
    ));
}

#[test]
fn truncate_marks_cut_text() {
    assert_eq!(truncate("Budget Auto Sales", 40), "Budget Auto Sales");
    assert_eq!(truncate("Springfield Pre-Owned Superstore", 12), "Springfie...");
}

#[test]
fn or_dash_fills_missing_values() {
    assert_eq!(or_dash(None::<&str>), "\u{2014}");
    assert_eq!(or_dash(Some(4.5)), "4.5");
}
