mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use log::LevelFilter;
use std::process;

use commands::distribution::DistributeArgs;
use commands::sensitivity::SensitivityArgs;
use commands::waterfall::WaterfallArgs;

/// Syndication waterfall and investor distribution calculations
#[derive(Parser)]
#[command(
    name = "syndicate",
    version,
    about = "Syndication waterfall and investor distribution calculations",
    long_about = "A CLI for splitting real-estate syndication exit proceeds between the \
                  GP sponsor and LP investors with decimal precision. Supports simple, \
                  preferred return and catch-up waterfalls, pro-rata investor \
                  distributions, and exit multiple by hold period sensitivity grids."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log each allocation step to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Split exit proceeds through the distribution waterfall
    Waterfall(WaterfallArgs),
    /// Split a distribution across investor positions by ownership
    Distribute(DistributeArgs),
    /// Grid a waterfall metric over exit multiple and hold period
    Sensitivity(SensitivityArgs),
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

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    // RUST_LOG still wins when set
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Waterfall(args) => commands::waterfall::run_waterfall(args),
        Commands::Distribute(args) => commands::distribution::run_distribute(args),
        Commands::Sensitivity(args) => commands::sensitivity::run_sensitivity(args),
        Commands::Version => {
            println!("syndicate {}", env!("CARGO_PKG_VERSION"));
            println!("syndicate-core {}", syndicate_core::VERSION);
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
