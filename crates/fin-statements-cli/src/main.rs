mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::statements::{ModelArgs, ReportArgs};

/// Exit code for `verify` when the balance sheet does not balance
const EXIT_UNBALANCED: i32 = 2;

/// Single-period financial statements
#[derive(Parser)]
#[command(
    name = "fss",
    version,
    about = "Build and reconcile a balance sheet, income statement and cash flow statement",
    long_about = "Builds the three linked financial statements for a single period from \
                  primitive line items with decimal precision, checks that \
                  Assets = Liabilities + Equity, and carries net income from the income \
                  statement into the cash flow statement."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log builder diagnostics to stderr (overridden by FSS_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build all three statements with reconciliation and warnings
    Statements(ModelArgs),
    /// Build the balance sheet
    BalanceSheet(ModelArgs),
    /// Build the income statement
    IncomeStatement(ModelArgs),
    /// Build the cash flow statement
    CashFlow(ModelArgs),
    /// Check the accounting identity and cross-statement invariants (exit 2 if unbalanced)
    Verify(ModelArgs),
    /// Render the statements as text panels with bar charts
    Report(ReportArgs),
    /// Print the resolved primitive inputs
    Inputs(ModelArgs),
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

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("FSS_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Statements(args) => commands::statements::run_statements(args),
        Commands::BalanceSheet(args) => commands::statements::run_balance_sheet(args),
        Commands::IncomeStatement(args) => commands::statements::run_income_statement(args),
        Commands::CashFlow(args) => commands::statements::run_cash_flow(args),
        Commands::Verify(args) => commands::statements::run_verify(args),
        Commands::Inputs(args) => commands::statements::run_inputs(args),
        Commands::Report(args) => match commands::statements::run_report(args) {
            Ok(text) => {
                print!("{text}");
                process::exit(0);
            }
            Err(e) => Err(e),
        },
        Commands::Version => {
            println!("fss {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            if value.pointer("/result/balanced") == Some(&serde_json::Value::Bool(false)) {
                eprintln!(
                    "{}: assets do not equal liabilities plus equity",
                    "unbalanced".red().bold()
                );
                process::exit(EXIT_UNBALANCED);
            }
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
