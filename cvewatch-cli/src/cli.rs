//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// cvewatch -- CVE watch and notification service.
///
/// Use `cvewatch <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "cvewatch", version, about, long_about = None)]
pub struct Cli {
    /// Path to the cvewatch.toml configuration file.
    #[arg(short, long, default_value = "cvewatch.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage the watched product list.
    Watch(WatchArgs),

    /// Query the advisory feed directly (does not touch seen history).
    Search(SearchArgs),

    /// Run a single poll cycle and print the summary.
    Run,

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- watch ----

/// Manage the watched product list.
#[derive(Args, Debug)]
pub struct WatchArgs {
    #[command(subcommand)]
    pub action: WatchAction,
}

#[derive(Subcommand, Debug)]
pub enum WatchAction {
    /// Add a product keyword to the watch list.
    Add {
        /// Product keyword (e.g., "openssl"). Leading/trailing whitespace is trimmed.
        keyword: String,
    },
    /// List all watched product keywords in lexicographic order.
    List,
}

// ---- search ----

/// Query the advisory feed for a keyword.
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search keyword.
    pub query: String,

    /// Maximum number of records to fetch.
    #[arg(long, default_value_t = 5)]
    pub limit: u32,
}

// ---- config ----

/// Manage cvewatch configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, storage, feed, notify, watcher, metrics).
        #[arg(long)]
        section: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse_watch_add() {
        let args = Cli::try_parse_from(["cvewatch", "watch", "add", "openssl"]);
        assert!(args.is_ok(), "should parse 'watch add' subcommand");
        let cli = args.expect("parse succeeded");
        match cli.command {
            Commands::Watch(watch_args) => match watch_args.action {
                WatchAction::Add { keyword } => {
                    assert_eq!(keyword, "openssl", "keyword should match");
                }
                _ => panic!("expected Add action"),
            },
            _ => panic!("expected Watch command"),
        }
    }

    #[test]
    fn test_cli_parse_watch_add_requires_keyword() {
        let args = Cli::try_parse_from(["cvewatch", "watch", "add"]);
        assert!(args.is_err(), "watch add without keyword should fail");
    }

    #[test]
    fn test_cli_parse_watch_list() {
        let args = Cli::try_parse_from(["cvewatch", "watch", "list"]);
        assert!(args.is_ok(), "should parse 'watch list' subcommand");
        let cli = args.expect("parse succeeded");
        match cli.command {
            Commands::Watch(watch_args) => match watch_args.action {
                WatchAction::List => {}
                _ => panic!("expected List action"),
            },
            _ => panic!("expected Watch command"),
        }
    }

    #[test]
    fn test_cli_parse_search_defaults() {
        let args = Cli::try_parse_from(["cvewatch", "search", "nginx"]);
        assert!(args.is_ok(), "should parse 'search' subcommand");
        let cli = args.expect("parse succeeded");
        match cli.command {
            Commands::Search(search_args) => {
                assert_eq!(search_args.query, "nginx");
                assert_eq!(search_args.limit, 5, "limit should default to 5");
            }
            _ => panic!("expected Search command"),
        }
    }

    #[test]
    fn test_cli_parse_search_custom_limit() {
        let args = Cli::try_parse_from(["cvewatch", "search", "nginx", "--limit", "20"]);
        assert!(args.is_ok(), "should parse search with custom limit");
        let cli = args.expect("parse succeeded");
        match cli.command {
            Commands::Search(search_args) => {
                assert_eq!(search_args.limit, 20);
            }
            _ => panic!("expected Search command"),
        }
    }

    #[test]
    fn test_cli_parse_search_requires_query() {
        let args = Cli::try_parse_from(["cvewatch", "search"]);
        assert!(args.is_err(), "search without query should fail");
    }

    #[test]
    fn test_cli_parse_run() {
        let args = Cli::try_parse_from(["cvewatch", "run"]);
        assert!(args.is_ok(), "should parse 'run' subcommand");
        let cli = args.expect("parse succeeded");
        assert!(matches!(cli.command, Commands::Run), "expected Run command");
    }

    #[test]
    fn test_cli_parse_config_validate() {
        let args = Cli::try_parse_from(["cvewatch", "config", "validate"]);
        assert!(args.is_ok(), "should parse 'config validate' subcommand");
        let cli = args.expect("parse succeeded");
        match cli.command {
            Commands::Config(config_args) => match config_args.action {
                ConfigAction::Validate => {}
                _ => panic!("expected Validate action"),
            },
            _ => panic!("expected Config command"),
        }
    }

    #[test]
    fn test_cli_parse_config_show() {
        let args = Cli::try_parse_from(["cvewatch", "config", "show"]);
        assert!(args.is_ok(), "should parse 'config show' subcommand");
        let cli = args.expect("parse succeeded");
        match cli.command {
            Commands::Config(config_args) => match config_args.action {
                ConfigAction::Show { section } => {
                    assert!(section.is_none(), "section should be None");
                }
                _ => panic!("expected Show action"),
            },
            _ => panic!("expected Config command"),
        }
    }

    #[test]
    fn test_cli_parse_config_show_section() {
        let args = Cli::try_parse_from(["cvewatch", "config", "show", "--section", "watcher"]);
        assert!(args.is_ok(), "should parse config show with section");
        let cli = args.expect("parse succeeded");
        match cli.command {
            Commands::Config(config_args) => match config_args.action {
                ConfigAction::Show { section } => {
                    assert_eq!(section, Some("watcher".to_owned()));
                }
                _ => panic!("expected Show action"),
            },
            _ => panic!("expected Config command"),
        }
    }

    #[test]
    fn test_cli_parse_custom_config_path() {
        let args = Cli::try_parse_from(["cvewatch", "-c", "/custom/config.toml", "run"]);
        assert!(args.is_ok(), "should parse with custom config path");
        let cli = args.expect("parse succeeded");
        assert_eq!(cli.config, std::path::PathBuf::from("/custom/config.toml"));
    }

    #[test]
    fn test_cli_parse_log_level() {
        let args = Cli::try_parse_from(["cvewatch", "--log-level", "debug", "run"]);
        assert!(args.is_ok(), "should parse with custom log level");
        let cli = args.expect("parse succeeded");
        assert_eq!(cli.log_level, Some("debug".to_owned()));
    }

    #[test]
    fn test_cli_parse_output_format_json() {
        let args = Cli::try_parse_from(["cvewatch", "--output", "json", "watch", "list"]);
        assert!(args.is_ok(), "should parse with json output format");
        let cli = args.expect("parse succeeded");
        match cli.output {
            OutputFormat::Json => {}
            _ => panic!("expected Json output format"),
        }
    }

    #[test]
    fn test_cli_parse_output_format_text() {
        let args = Cli::try_parse_from(["cvewatch", "--output", "text", "watch", "list"]);
        assert!(args.is_ok(), "should parse with text output format");
        let cli = args.expect("parse succeeded");
        match cli.output {
            OutputFormat::Text => {}
            _ => panic!("expected Text output format"),
        }
    }

    #[test]
    fn test_cli_parse_invalid_command_fails() {
        let args = Cli::try_parse_from(["cvewatch", "invalid-command"]);
        assert!(args.is_err(), "should fail on invalid command");
    }

    #[test]
    fn test_cli_parse_missing_command_fails() {
        let args = Cli::try_parse_from(["cvewatch"]);
        assert!(args.is_err(), "should fail when no command provided");
    }

    #[test]
    fn test_cli_verify_command_structure() {
        // Verify CLI command compiles and has expected structure
        let cmd = Cli::command();
        assert_eq!(cmd.get_name(), "cvewatch");

        let subcommands: Vec<_> = cmd.get_subcommands().map(|s| s.get_name()).collect();
        assert!(
            subcommands.contains(&"watch"),
            "should have 'watch' subcommand"
        );
        assert!(
            subcommands.contains(&"search"),
            "should have 'search' subcommand"
        );
        assert!(subcommands.contains(&"run"), "should have 'run' subcommand");
        assert!(
            subcommands.contains(&"config"),
            "should have 'config' subcommand"
        );
    }
}
