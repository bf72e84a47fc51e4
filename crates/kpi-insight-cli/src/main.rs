mod commands;
mod input;
mod logging;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use std::process;

use commands::analyze::AnalyzeArgs;
use commands::dataset::KpisArgs;
use commands::scoring::{AchievementArgs, PeerScoreArgs};
use commands::{GroupArgs, Session};

/// KPI achievement scoring, trend fitting and 360 evaluation
#[derive(Parser)]
#[command(
    name = "kpi",
    version,
    about = "KPI achievement scoring, trend fitting and 360 evaluation",
    long_about = "Loads a KPI dataset (CSV), filters it by position and KPI name, fits a \
                  linear trend of realized on target values, scores achievement and \
                  weighted achievement per row, and blends supervisor, peer and \
                  subordinate ratings into a 360 evaluation score."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Scoring configuration (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// KPI dataset CSV; "-" reads stdin. Defaults to the configured data_path
    #[arg(long, global = true)]
    data: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List positions / units in the dataset
    Positions,
    /// List KPI names, optionally for one position
    Kpis(KpisArgs),
    /// Show the rows of the selected KPI group
    Show(GroupArgs),
    /// Fit the realized-vs-target trend for the selected KPI group
    Trend(GroupArgs),
    /// Full analysis: trend, achievement, recommendations and 360 scores
    Analyze(AnalyzeArgs),
    /// Score a single target/realized pair
    Achievement(AchievementArgs),
    /// Blend supervisor, peer and subordinate ratings into a 360 score
    PeerScore(PeerScoreArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();
    logging::init();

    let session = Session {
        config_path: cli.config,
        data: cli.data,
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Positions => commands::dataset::run_positions(&session),
        Commands::Kpis(args) => commands::dataset::run_kpis(&session, args),
        Commands::Show(args) => commands::dataset::run_show(&session, args),
        Commands::Trend(args) => commands::trend::run_trend(&session, args),
        Commands::Analyze(args) => commands::analyze::run_analyze(&session, args),
        Commands::Achievement(args) => commands::scoring::run_achievement(&session, args),
        Commands::PeerScore(args) => commands::scoring::run_peer_score(&session, args),
        Commands::Version => {
            println!("kpi {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_analyze_with_globals() {
        let cli = Cli::try_parse_from([
            "kpi",
            "analyze",
            "--position",
            "Ops",
            "--kpi",
            "Throughput",
            "--data",
            "kpi.csv",
            "--output",
            "table",
        ])
        .unwrap();
        assert!(matches!(cli.output, OutputFormat::Table));
        assert_eq!(cli.data.as_deref(), Some("kpi.csv"));
        match cli.command {
            Commands::Analyze(args) => {
                assert_eq!(args.group.position.as_deref(), Some("Ops"));
                assert_eq!(args.group.kpi.as_deref(), Some("Throughput"));
                assert!(args.ratings.is_none());
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_parse_negative_achievement_values() {
        let cli = Cli::try_parse_from([
            "kpi",
            "achievement",
            "--target",
            "-20",
            "--realized",
            "-25",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Achievement(_)));
    }
}
