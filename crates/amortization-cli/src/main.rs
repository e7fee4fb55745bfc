mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use amortization_core::types::Currency;
use commands::loan::{BalanceArgs, LoanArgs};

/// Fixed-rate loan amortization schedules
#[derive(Parser)]
#[command(
    name = "amort",
    version,
    about = "Fixed-rate loan amortization schedules",
    long_about = "Computes the level monthly payment for a fixed-rate loan and renders \
                  the full repayment schedule, with running totals and year boundaries, \
                  as a table, CSV or JSON."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    output: OutputFormat,

    /// Currency code used for the display symbol (no conversion)
    #[arg(long, default_value = "USD", global = true)]
    currency: String,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the full amortization schedule
    Schedule(LoanArgs),
    /// Show the periodic payment and loan totals
    Payment(LoanArgs),
    /// Outstanding balance after a number of payments
    Balance(BalanceArgs),
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
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Schedule(args) => commands::loan::run_schedule(args),
        Commands::Payment(args) => commands::loan::run_payment(args),
        Commands::Balance(args) => commands::loan::run_balance(args),
        Commands::Version => {
            println!("amort {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            let currency = Currency::from_code(&cli.currency);
            output::format_output(&cli.output, &value, currency.symbol());
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
