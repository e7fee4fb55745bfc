//! Period-by-period amortization schedule for a fixed-rate, level-payment loan.
//!
//! [`generate_schedule`] is the pure generator: one [`PeriodRecord`] per
//! period, a [`YearMarker`] every twelfth period and per-year totals. The
//! `build_*` functions validate inputs first and wrap the result in the
//! standard [`ComputationOutput`] envelope.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::loan::{LoanInput, LoanParameters};
use crate::amortization::summary::ScheduleSummary;
use crate::time_value;
use crate::types::{with_metadata, ComputationOutput, Money, PERIODS_PER_YEAR};
use crate::AmortizationResult;

/// Final balance above this is reported as a rounding residual.
const RESIDUAL_WARNING_THRESHOLD: Money = dec!(0.005);

/// One row of the schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRecord {
    /// 1-based period number
    pub period: u32,
    pub starting_balance: Money,
    pub principal_paid: Money,
    pub cumulative_principal_paid: Money,
    pub interest_paid: Money,
    pub cumulative_interest_paid: Money,
    pub ending_balance: Money,
}

/// Boundary between two loan years, placed after every twelfth period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearMarker {
    /// Period after which the boundary falls
    pub period: u32,
    /// 1-based year that just ended
    pub year: u32,
    /// True when the boundary is the end of the loan
    pub is_terminal: bool,
    pub end_label: String,
    /// Absent on the terminal marker
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_label: Option<String>,
}

impl YearMarker {
    fn new(period: u32, term_periods: u32) -> Self {
        let year = period / PERIODS_PER_YEAR;
        let is_terminal = period == term_periods;
        YearMarker {
            period,
            year,
            is_terminal,
            end_label: format!("End of year {year}"),
            start_label: (!is_terminal).then(|| format!("Start of year {}", year + 1)),
        }
    }

    /// Combined separator text, e.g. "End of year 1 / Start of year 2".
    pub fn label(&self) -> String {
        match &self.start_label {
            Some(start) => format!("{} / {}", self.end_label, start),
            None => self.end_label.clone(),
        }
    }
}

/// Principal and interest paid within one loan year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearTotals {
    pub year: u32,
    pub principal_paid: Money,
    pub interest_paid: Money,
    pub ending_balance: Money,
}

/// Complete schedule plus the values a caption needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub summary: ScheduleSummary,
    pub periods: Vec<PeriodRecord>,
    pub year_markers: Vec<YearMarker>,
    pub yearly_totals: Vec<YearTotals>,
}

impl AmortizationSchedule {
    /// Marker placed after `period`, if any.
    pub fn marker_after(&self, period: u32) -> Option<&YearMarker> {
        self.year_markers.iter().find(|m| m.period == period)
    }

    pub fn final_balance(&self) -> Money {
        self.periods
            .last()
            .map(|p| p.ending_balance)
            .unwrap_or(self.summary.principal)
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Generate the full schedule for already-validated parameters.
///
/// Callers must uphold the [`LoanParameters::validate`] preconditions; see the
/// `# Panics` notes in [`crate::time_value`].
pub fn generate_schedule(params: &LoanParameters) -> AmortizationSchedule {
    let principal = params.principal;
    let rate = params.periodic_rate;
    let term = params.term_periods;

    let payment = time_value::periodic_payment(principal, term, rate);

    let mut periods = Vec::with_capacity(term as usize);
    let mut year_markers = Vec::with_capacity((term / PERIODS_PER_YEAR) as usize);
    let mut yearly_totals = Vec::with_capacity(term.div_ceil(PERIODS_PER_YEAR) as usize);

    let mut cumulative_principal = Decimal::ZERO;
    let mut cumulative_interest = Decimal::ZERO;
    let mut year_principal = Decimal::ZERO;
    let mut year_interest = Decimal::ZERO;

    for period in 1..=term {
        let starting_balance = time_value::remaining_balance(principal, rate, payment, period - 1);
        let interest_paid = time_value::period_interest(principal, rate, payment, period);
        let principal_paid = payment - interest_paid;
        let ending_balance = time_value::remaining_balance(principal, rate, payment, period);

        cumulative_principal += principal_paid;
        cumulative_interest += interest_paid;
        year_principal += principal_paid;
        year_interest += interest_paid;

        periods.push(PeriodRecord {
            period,
            starting_balance,
            principal_paid,
            cumulative_principal_paid: cumulative_principal,
            interest_paid,
            cumulative_interest_paid: cumulative_interest,
            ending_balance,
        });

        let year_end = period % PERIODS_PER_YEAR == 0;
        if year_end {
            year_markers.push(YearMarker::new(period, term));
        }
        if year_end || period == term {
            yearly_totals.push(YearTotals {
                year: period.div_ceil(PERIODS_PER_YEAR),
                principal_paid: year_principal,
                interest_paid: year_interest,
                ending_balance,
            });
            year_principal = Decimal::ZERO;
            year_interest = Decimal::ZERO;
        }
    }

    AmortizationSchedule {
        summary: ScheduleSummary::new(params, payment, cumulative_principal, cumulative_interest),
        periods,
        year_markers,
        yearly_totals,
    }
}

/// Validate borrower-facing loan terms and build the schedule.
pub fn build_amortization_schedule(
    input: &LoanInput,
) -> AmortizationResult<ComputationOutput<AmortizationSchedule>> {
    let start = Instant::now();
    let params = input.to_parameters()?;
    let (schedule, warnings) = compute(&params);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Level-payment annuity amortization",
        input,
        warnings,
        elapsed,
        schedule,
    ))
}

/// Build the schedule from parameters already expressed in periodic units.
pub fn build_schedule_from_parameters(
    params: &LoanParameters,
) -> AmortizationResult<ComputationOutput<AmortizationSchedule>> {
    let start = Instant::now();
    params.validate()?;
    let (schedule, mut warnings) = compute(params);

    if params.term_periods % PERIODS_PER_YEAR != 0 {
        warnings.push(format!(
            "Term of {} periods is not a whole number of years; final year is partial",
            params.term_periods
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Level-payment annuity amortization",
        params,
        warnings,
        elapsed,
        schedule,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn compute(params: &LoanParameters) -> (AmortizationSchedule, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let schedule = generate_schedule(params);

    if params.periodic_rate.is_zero() {
        warnings.push("Zero interest rate: principal is repaid straight-line".into());
    }

    // No final-period adjustment; surface the residual instead
    let residual = schedule.final_balance();
    if residual > RESIDUAL_WARNING_THRESHOLD {
        warnings.push(format!(
            "Final balance residual of {residual} remains after the last payment"
        ));
    }

    (schedule, warnings)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: Decimal = dec!(0.000001);

    fn params(principal: Decimal, rate: Decimal, term: u32) -> LoanParameters {
        LoanParameters::new(principal, rate, term).unwrap()
    }

    #[test]
    fn test_one_record_per_period_in_order() {
        let s = generate_schedule(&params(dec!(10000), dec!(0.01), 30));
        assert_eq!(s.periods.len(), 30);
        for (i, rec) in s.periods.iter().enumerate() {
            assert_eq!(rec.period, i as u32 + 1);
        }
    }

    #[test]
    fn test_ending_balance_equals_start_minus_principal() {
        let s = generate_schedule(&params(dec!(75000), dec!(0.004), 84));
        for rec in &s.periods {
            let diff = (rec.starting_balance - rec.principal_paid - rec.ending_balance).abs();
            assert!(diff < TOL, "period {}: diff {}", rec.period, diff);
        }
    }

    #[test]
    fn test_marker_labels() {
        let s = generate_schedule(&params(dec!(5000), dec!(0.01), 24));
        assert_eq!(s.year_markers.len(), 2);

        let first = &s.year_markers[0];
        assert_eq!(first.period, 12);
        assert_eq!(first.year, 1);
        assert!(!first.is_terminal);
        assert_eq!(first.label(), "End of year 1 / Start of year 2");

        let last = &s.year_markers[1];
        assert!(last.is_terminal);
        assert_eq!(last.start_label, None);
        assert_eq!(last.label(), "End of year 2");
    }

    #[test]
    fn test_partial_final_year_has_no_terminal_marker() {
        let s = generate_schedule(&params(dec!(5000), dec!(0.01), 18));
        assert_eq!(s.year_markers.len(), 1);
        assert!(!s.year_markers[0].is_terminal);
        assert_eq!(s.yearly_totals.len(), 2);
        assert_eq!(s.yearly_totals[1].year, 2);
    }

    #[test]
    fn test_marker_after_lookup() {
        let s = generate_schedule(&params(dec!(5000), dec!(0.01), 36));
        assert!(s.marker_after(11).is_none());
        assert_eq!(s.marker_after(24).map(|m| m.year), Some(2));
    }

    #[test]
    fn test_yearly_totals_sum_to_schedule_totals() {
        let s = generate_schedule(&params(dec!(300000), dec!(0.0045), 180));
        let interest: Decimal = s.yearly_totals.iter().map(|y| y.interest_paid).sum();
        let principal: Decimal = s.yearly_totals.iter().map(|y| y.principal_paid).sum();
        assert!((interest - s.summary.total_interest).abs() < TOL);
        assert!((principal - s.summary.principal).abs() < TOL);
    }

    #[test]
    fn test_build_zero_rate_warns() {
        let input = LoanInput {
            principal: dec!(120000),
            annual_rate_percent: Decimal::ZERO,
            term_years: 10,
        };
        let out = build_amortization_schedule(&input).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("straight-line")));
        assert_eq!(out.methodology, "Level-payment annuity amortization");
        assert_eq!(out.assumptions["term_years"], 10);
    }

    #[test]
    fn test_build_rejects_invalid_input() {
        let input = LoanInput {
            principal: dec!(-1),
            annual_rate_percent: dec!(5),
            term_years: 10,
        };
        assert!(build_amortization_schedule(&input).is_err());
    }

    #[test]
    fn test_build_from_parameters_partial_year_warning() {
        let out = build_schedule_from_parameters(&params(dec!(1000), dec!(0.01), 7)).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("partial")));
        assert_eq!(out.result.periods.len(), 7);
    }

    #[test]
    fn test_no_residual_warning_for_standard_loan() {
        let input = LoanInput {
            principal: dec!(200000),
            annual_rate_percent: dec!(6.5),
            term_years: 30,
        };
        let out = build_amortization_schedule(&input).unwrap();
        assert!(out.warnings.is_empty(), "unexpected warnings: {:?}", out.warnings);
    }

    #[test]
    fn test_residual_warning_when_balance_does_not_reach_zero() {
        // Bypasses validation: 5% per period for 1200 periods loses the final
        // balance to cancellation, and the residual is reported, not adjusted
        let params = LoanParameters {
            principal: dec!(1000),
            periodic_rate: dec!(0.05),
            term_periods: 1200,
        };
        let (schedule, warnings) = compute(&params);
        assert!(schedule.final_balance() > RESIDUAL_WARNING_THRESHOLD);
        assert!(
            warnings.iter().any(|w| w.contains("Final balance residual")),
            "missing residual warning: {:?}",
            warnings
        );
    }
}
