use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::time::Instant;
use tracing::{debug, warn};

use amortization_core::amortization::loan::{self, LoanInput};
use amortization_core::amortization::schedule;
use amortization_core::types::{with_metadata, ComputationOutput};

use crate::input;

/// Loan terms, from flags, a JSON file, or piped JSON on stdin
#[derive(Args)]
pub struct LoanArgs {
    /// Path to JSON input file (takes precedence over flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (e.g. 6.5)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Loan term in whole years
    #[arg(long)]
    pub years: Option<u32>,
}

/// Arguments for the remaining-balance query
#[derive(Args)]
pub struct BalanceArgs {
    #[command(flatten)]
    pub loan: LoanArgs,

    /// Number of payments already made
    #[arg(long)]
    pub after: u32,
}

pub fn run_schedule(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan_input = resolve_loan_input(&args)?;
    let result = schedule::build_amortization_schedule(&loan_input).inspect_err(|e| {
        warn!(error = %e, "loan input rejected");
    })?;
    debug!(
        periods = result.result.periods.len(),
        markers = result.result.year_markers.len(),
        elapsed_us = result.metadata.computation_time_us,
        "schedule generated"
    );
    Ok(serde_json::to_value(result)?)
}

pub fn run_payment(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan_input = resolve_loan_input(&args)?;
    let full = schedule::build_amortization_schedule(&loan_input).inspect_err(|e| {
        warn!(error = %e, "loan input rejected");
    })?;
    let summary = ComputationOutput {
        result: full.result.summary,
        methodology: full.methodology,
        assumptions: full.assumptions,
        warnings: full.warnings,
        metadata: full.metadata,
    };
    Ok(serde_json::to_value(summary)?)
}

pub fn run_balance(args: BalanceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let loan_input = resolve_loan_input(&args.loan)?;
    let params = loan_input.to_parameters().inspect_err(|e| {
        warn!(error = %e, "loan input rejected");
    })?;
    let balance = loan::balance_after(&params, args.after).inspect_err(|e| {
        warn!(error = %e, after = args.after, "balance query rejected");
    })?;

    let output = with_metadata(
        "Closed-form remaining balance",
        &loan_input,
        Vec::new(),
        start.elapsed().as_micros() as u64,
        json!({
            "periods_elapsed": args.after,
            "periods_remaining": params.term_periods - args.after,
            "remaining_balance": balance.to_string(),
        }),
    );
    Ok(serde_json::to_value(output)?)
}

/// Pick the loan terms source: `--input` file, then flags, then piped stdin.
fn resolve_loan_input(args: &LoanArgs) -> Result<LoanInput, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        debug!(path = %path, "reading loan terms from file");
        return input::file::read_json(path);
    }

    match (args.principal, args.rate, args.years) {
        (Some(principal), Some(annual_rate_percent), Some(term_years)) => {
            debug!("reading loan terms from flags");
            Ok(LoanInput {
                principal,
                annual_rate_percent,
                term_years,
            })
        }
        (None, None, None) => match input::stdin::read_stdin()? {
            Some(loan_input) => {
                debug!("reading loan terms from stdin");
                Ok(loan_input)
            }
            None => Err(
                "--principal, --rate and --years, --input <file.json>, or stdin required".into(),
            ),
        },
        _ => Err("--principal, --rate and --years must be given together".into()),
    }
}
