//! tradejournal CLI - Trading Journal Spreadsheet Generator
//!
//! Command-line interface for generating, inspecting and previewing
//! trading journal workbooks.

mod exit;
mod launcher;
mod output;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing::{debug, error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use tradejournal_core::config::parse_capital;
use tradejournal_core::preview::{self, TradeInputs};
use tradejournal_core::{JournalError, JournalLayout, JournalSettings, Renderer};
use tradejournal_render::ExcelRenderer;

use crate::exit::ExitCode;
use crate::output::DEFAULT_OUTPUT_DIR;

#[derive(Parser)]
#[command(name = "tradejournal")]
#[command(author, version, about = "Trading journal spreadsheet generator", long_about = None)]
struct Cli {
    /// Verbose output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Inputs shared by every command
#[derive(Args, Debug, Clone)]
struct JournalArgs {
    /// First day of the journal (weekends roll forward to Monday)
    #[arg(short, long, env = "TRADEJOURNAL_START_DATE", value_name = "YYYY-MM-DD")]
    start_date: Option<String>,

    /// Initial account capital
    #[arg(long, env = "TRADEJOURNAL_CAPITAL", value_name = "AMOUNT")]
    capital: Option<String>,

    /// Number of weeks (1-4)
    #[arg(short, long, env = "TRADEJOURNAL_WEEKS", value_name = "N")]
    weeks: Option<String>,

    /// TOML settings file; flags override its values
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the journal workbook
    Generate {
        #[command(flatten)]
        journal: JournalArgs,

        /// Output directory (created if missing)
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Output file name (default: trading_journal_<start>_to_<end>.xlsx)
        #[arg(short, long, value_name = "NAME")]
        file_name: Option<String>,

        /// Do not open the workbook after writing it
        #[arg(long)]
        no_open: bool,
    },

    /// Print the layout model as JSON
    Layout {
        #[command(flatten)]
        journal: JournalArgs,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Evaluate balances for sample results without writing a workbook
    Preview {
        #[command(flatten)]
        journal: JournalArgs,

        /// Result (R) of a data row, as ROW=R
        #[arg(short, long = "result", value_name = "ROW=R")]
        results: Vec<String>,

        /// Risk (%) of the slot starting at ROW, as ROW=PCT
        #[arg(long = "risk", value_name = "ROW=PCT")]
        risks: Vec<String>,

        /// Print the full preview as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let outcome = match cli.command {
        Commands::Generate {
            journal,
            output_dir,
            file_name,
            no_open,
        } => cmd_generate(&journal, output_dir, file_name, no_open),
        Commands::Layout { journal, pretty } => cmd_layout(&journal, pretty),
        Commands::Preview {
            journal,
            results,
            risks,
            json,
        } => cmd_preview(&journal, &results, &risks, json),
    };

    if let Err(err) = &outcome {
        error!("{err:#}");
        eprintln!("Error: {err:#}");
    }
    ExitCode::from_outcome(&outcome).to_process_exit_code()
}

/// `-v` raises the default level; `RUST_LOG` wins when set
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

impl JournalArgs {
    /// Settings file overlaid by flags and environment
    fn settings(&self) -> Result<JournalSettings> {
        let file = match &self.config {
            Some(path) => {
                debug!(path = %path.display(), "loading settings");
                JournalSettings::load(path)?
            }
            None => JournalSettings::default(),
        };
        let flags = JournalSettings {
            start_date: self.start_date.clone(),
            initial_capital: self.capital.as_deref().map(parse_capital).transpose()?,
            weeks: self.weeks.as_deref().map(parse_weeks).transpose()?,
            ..JournalSettings::default()
        };
        Ok(file.overlay(flags))
    }
}

fn parse_weeks(input: &str) -> Result<u32, JournalError> {
    input.trim().parse().map_err(|_| {
        JournalError::InvalidInput(format!("weeks must be a whole number, got '{input}'"))
    })
}

/// Parse `ROW=VALUE`
fn parse_assignment(input: &str) -> Result<(u32, Decimal), JournalError> {
    let invalid = || JournalError::InvalidInput(format!("expected ROW=VALUE, got '{input}'"));
    let (row, value) = input.split_once('=').ok_or_else(invalid)?;
    let row = row.trim().parse().map_err(|_| invalid())?;
    let value = value.trim().parse().map_err(|_| invalid())?;
    Ok((row, value))
}

fn cmd_generate(
    journal: &JournalArgs,
    output_dir: Option<PathBuf>,
    file_name: Option<String>,
    no_open: bool,
) -> Result<()> {
    let settings = journal.settings()?.overlay(JournalSettings {
        output_dir,
        file_name,
        open: no_open.then_some(false),
        ..JournalSettings::default()
    });
    let config = settings.resolve()?;
    info!(
        start = %config.start_date,
        capital = %config.initial_capital,
        weeks = config.weeks,
        "generating journal"
    );

    let layout = JournalLayout::build(&config);
    let bytes = ExcelRenderer::new()
        .render(&layout)
        .context("failed to render workbook")?;

    let file_name = settings
        .file_name
        .clone()
        .unwrap_or_else(|| config.default_file_name());
    let output_dir = settings
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
    let fallback_dir = std::env::current_dir().context("cannot determine current directory")?;
    let path = output::write_with_fallback(&output_dir, &fallback_dir, &file_name, &bytes)?;

    println!("Generated: {}", path.display());
    if settings.open.unwrap_or(true) {
        launcher::open_document(&path);
    }
    Ok(())
}

fn cmd_layout(journal: &JournalArgs, pretty: bool) -> Result<()> {
    let config = journal.settings()?.resolve()?;
    let layout = JournalLayout::build(&config);
    let json = if pretty {
        serde_json::to_string_pretty(&layout)?
    } else {
        serde_json::to_string(&layout)?
    };
    println!("{json}");
    Ok(())
}

fn cmd_preview(
    journal: &JournalArgs,
    results: &[String],
    risks: &[String],
    json: bool,
) -> Result<()> {
    let config = journal.settings()?.resolve()?;
    let layout = JournalLayout::build(&config);

    let mut inputs = TradeInputs::new();
    for raw in results {
        let (row, value) = parse_assignment(raw)?;
        inputs = inputs.result(row, value);
    }
    for raw in risks {
        let (row, value) = parse_assignment(raw)?;
        inputs = inputs.risk(row, value);
    }

    let preview = preview::evaluate(&layout, &inputs)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&preview)?);
        return Ok(());
    }

    for day in &preview.days {
        println!(
            "{:<22} {:>8} R   balance {}",
            day.date.format("%A %Y-%m-%d").to_string(),
            day.result_total.normalize(),
            day.closing_balance.normalize()
        );
    }
    if let Some(balance) = preview.final_balance() {
        println!("Final balance: {}", balance.normalize());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_assignments() {
        assert_eq!(parse_assignment("13=1.5").unwrap(), (13, Decimal::new(15, 1)));
        assert_eq!(parse_assignment(" 3 = -2 ").unwrap(), (3, Decimal::from(-2)));
        assert!(parse_assignment("13").is_err());
        assert!(parse_assignment("x=1").is_err());
        assert!(parse_assignment("3=abc").is_err());
    }

    #[test]
    fn weeks_must_be_numeric() {
        assert_eq!(parse_weeks("3").unwrap(), 3);
        assert!(matches!(parse_weeks("four"), Err(JournalError::InvalidInput(_))));
    }

    #[test]
    fn flags_override_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.toml");
        std::fs::write(
            &path,
            "start_date = \"2025-05-05\"\nweeks = 2\ninitial_capital = 1000\n",
        )
        .unwrap();

        let args = JournalArgs {
            start_date: None,
            capital: Some("5000".into()),
            weeks: None,
            config: Some(path),
        };
        let config = args.settings().unwrap().resolve().unwrap();
        assert_eq!(config.start_date.to_string(), "2025-05-05");
        assert_eq!(config.weeks, 2);
        assert_eq!(config.initial_capital, Decimal::from(5000));
    }
}
