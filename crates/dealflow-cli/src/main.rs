mod commands;
mod input;
mod output;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use log::LevelFilter;
use std::process;

use commands::ingest::IngestArgs;
use commands::lbo::LboArgs;
use commands::scenarios::{MonteCarloArgs, SensitivityArgs};
use commands::screening::{MetricsArgs, ScoreArgs, ScreenArgs};

/// Deal screening and LBO underwriting
#[derive(Parser)]
#[command(
    name = "dealflow",
    version,
    about = "Deal screening and LBO underwriting",
    long_about = "A CLI for screening a deal pipeline and underwriting leveraged buyouts \
                  with decimal precision. Supports LBO returns, screening scores, pipeline \
                  metrics, CSV import, sensitivity grids and Monte Carlo."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the LBO underwriting model (MOIC, IRR, debt schedule)
    Lbo(LboArgs),
    /// Screening score for a single deal
    Score(ScoreArgs),
    /// Filter and rank a set of deals by screening score
    Screen(ScreenArgs),
    /// Pipeline statistics: multiples and counts by sector and geography
    Metrics(MetricsArgs),
    /// Import deals from a CSV file
    Ingest(IngestArgs),
    /// 2-way LBO sensitivity grid
    Sensitivity(SensitivityArgs),
    /// Monte Carlo LBO over uncertain assumptions
    MonteCarlo(MonteCarloArgs),
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

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Lbo(args) => commands::lbo::run_lbo(args),
        Commands::Score(args) => commands::screening::run_score(args),
        Commands::Screen(args) => commands::screening::run_screen(args),
        Commands::Metrics(args) => commands::screening::run_metrics(args),
        Commands::Ingest(args) => commands::ingest::run_ingest(args),
        Commands::Sensitivity(args) => commands::scenarios::run_sensitivity(args),
        Commands::MonteCarlo(args) => commands::scenarios::run_monte_carlo(args),
        Commands::Version => {
            println!("dealflow {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
