pub mod commands;
pub mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use cellquote_core::config::{AppConfig, LogFormat};
use clap::{Args, Parser, Subcommand};
use tracing::Level;

use crate::commands::{load_options, quote::QuoteOptions, CommandResult};
use crate::render::OutputFormat;

#[derive(Debug, Parser)]
#[command(
    name = "cellquote",
    about = "Robotic cell quote pricing CLI",
    long_about = "Price robotic sorting cell configurations from a flat rate table, audit price tables, and inspect configuration.",
    after_help = "Examples:\n  cellquote quote --request acme.toml --currency CAD --format table\n  cellquote prices check --json\n  cellquote doctor"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to cellquote.toml (must exist when given)")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Price a quote request file and print or export the breakdown")]
    Quote(QuoteArgs),
    #[command(about = "Inspect or seed the price table")]
    Prices {
        #[command(subcommand)]
        command: PricesCommand,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, price table load, and catalog price coverage")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

#[derive(Debug, Args)]
struct QuoteArgs {
    #[arg(long, help = "Quote request file (.toml or .json)")]
    request: PathBuf,
    #[arg(long, help = "Price table CSV; overrides pricing.table_path")]
    prices: Option<PathBuf>,
    #[arg(long, help = "Currency code; overrides the request and pricing.default_currency")]
    currency: Option<String>,
    #[arg(long, help = "Fail on currencies without a configured rate")]
    strict_currency: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
    #[arg(
        long,
        help = "Write output to a file, or into a directory as <client>_Quote_<date>_breakdown.<ext>"
    )]
    out: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum PricesCommand {
    #[command(about = "Audit a price table against the catalog of price keys")]
    Check {
        #[arg(long, help = "Price table CSV; overrides pricing.table_path")]
        prices: Option<PathBuf>,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Write the reference rate card as a price table CSV")]
    Init {
        #[arg(long)]
        out: PathBuf,
        #[arg(long, help = "Overwrite an existing file")]
        force: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.config.clone());

    let load = load_options(cli.config);
    let result = match cli.command {
        Command::Quote(args) => commands::quote::run(
            load,
            QuoteOptions {
                request: args.request,
                prices: args.prices,
                currency: args.currency,
                strict_currency: args.strict_currency,
                format: args.format,
                out: args.out,
            },
        ),
        Command::Prices { command: PricesCommand::Check { prices, json } } => {
            commands::prices::check(load, prices, json)
        }
        Command::Prices { command: PricesCommand::Init { out, force } } => {
            commands::prices::init(&out, force)
        }
        Command::Config => commands::config::run(load),
        Command::Doctor { json } => commands::doctor::run(load, json),
    };

    emit(result)
}

fn emit(result: CommandResult) -> ExitCode {
    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Logs go to stderr so stdout stays a clean payload. Invalid config falls back to defaults;
/// the command itself reports the config failure.
fn init_logging(config_path: Option<PathBuf>) {
    let config = AppConfig::load(load_options(config_path)).unwrap_or_default();
    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    let _ = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
