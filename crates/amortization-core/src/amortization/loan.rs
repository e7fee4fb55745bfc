use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::AmortizationError;
use crate::time_value;
use crate::types::{Money, Rate, PERIODS_PER_YEAR};
use crate::AmortizationResult;

/// Longest supported loan: 100 years of monthly payments.
pub const MAX_TERM_PERIODS: u32 = 1200;

/// Longest supported loan in years.
pub const MAX_TERM_YEARS: u32 = MAX_TERM_PERIODS / PERIODS_PER_YEAR;

/// Highest accepted annual rate, in percent.
const MAX_ANNUAL_RATE_PERCENT: Decimal = dec!(100);

/// Largest `(1 + r)^n` the closed-form balance tolerates. The final balance is
/// a difference of two terms of size `P * (1 + r)^n`, so its error relative to
/// `P` grows with the factor against Decimal's ~28 significant digits.
pub const MAX_GROWTH_FACTOR: Decimal = dec!(1_000_000_000_000_000_000);

/// Loan terms in periodic units, as consumed by the schedule generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanParameters {
    /// Amount borrowed
    pub principal: Money,
    /// Interest rate per period (not annualised)
    pub periodic_rate: Rate,
    /// Number of repayment periods
    pub term_periods: u32,
}

/// Loan terms as entered by a borrower: annual percentage rate and whole years.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanInput {
    /// Amount borrowed
    pub principal: Money,
    /// Annual interest rate as a percentage (e.g., 6.5 for 6.5%).
    pub annual_rate_percent: Decimal,
    /// Loan term in years
    pub term_years: u32,
}

impl LoanParameters {
    /// Build validated parameters.
    pub fn new(
        principal: Money,
        periodic_rate: Rate,
        term_periods: u32,
    ) -> AmortizationResult<Self> {
        let params = LoanParameters {
            principal,
            periodic_rate,
            term_periods,
        };
        params.validate()?;
        Ok(params)
    }

    /// Check the preconditions the annuity formulas rely on.
    pub fn validate(&self) -> AmortizationResult<()> {
        if self.principal <= Decimal::ZERO {
            return Err(AmortizationError::InvalidInput {
                field: "principal".into(),
                reason: "Principal must be positive".into(),
            });
        }
        if self.periodic_rate < Decimal::ZERO {
            return Err(AmortizationError::InvalidInput {
                field: "periodic_rate".into(),
                reason: "Periodic rate cannot be negative".into(),
            });
        }
        if self.term_periods == 0 {
            return Err(AmortizationError::InvalidInput {
                field: "term_periods".into(),
                reason: "Term must be at least one period".into(),
            });
        }
        if self.term_periods > MAX_TERM_PERIODS {
            return Err(AmortizationError::InvalidInput {
                field: "term_periods".into(),
                reason: format!("Term cannot exceed {MAX_TERM_PERIODS} periods"),
            });
        }

        let factor = time_value::checked_growth_factor(self.periodic_rate, self.term_periods)
            .filter(|factor| factor.checked_mul(self.principal).is_some());
        match factor {
            None => Err(AmortizationError::FinancialImpossibility(format!(
                "Compounded balance of {} at {} over {} periods exceeds decimal range",
                self.principal, self.periodic_rate, self.term_periods
            ))),
            Some(factor) if factor > MAX_GROWTH_FACTOR => {
                Err(AmortizationError::FinancialImpossibility(format!(
                    "Growth factor {} at {} over {} periods exceeds {MAX_GROWTH_FACTOR}; \
                     the schedule would not amortize to zero",
                    factor.round_dp(0),
                    self.periodic_rate,
                    self.term_periods
                )))
            }
            Some(_) => Ok(()),
        }
    }

    /// Annualised rate as a percentage (periodic rate * 12 * 100).
    pub fn annual_rate_percent(&self) -> Decimal {
        self.periodic_rate * Decimal::from(PERIODS_PER_YEAR) * dec!(100)
    }

    /// Term in years; fractional when the term is not a whole number of years.
    pub fn term_years(&self) -> Decimal {
        Decimal::from(self.term_periods) / Decimal::from(PERIODS_PER_YEAR)
    }
}

impl LoanInput {
    /// Validate and convert to periodic units.
    ///
    /// periodic_rate = annual_rate_percent / 100 / 12, term_periods = term_years * 12
    pub fn to_parameters(&self) -> AmortizationResult<LoanParameters> {
        self.validate()?;
        let periodic_rate =
            self.annual_rate_percent / dec!(100) / Decimal::from(PERIODS_PER_YEAR);
        LoanParameters::new(
            self.principal,
            periodic_rate,
            self.term_years * PERIODS_PER_YEAR,
        )
    }

    fn validate(&self) -> AmortizationResult<()> {
        if self.principal <= Decimal::ZERO {
            return Err(AmortizationError::InvalidInput {
                field: "principal".into(),
                reason: "Principal must be positive".into(),
            });
        }
        if self.annual_rate_percent < Decimal::ZERO
            || self.annual_rate_percent > MAX_ANNUAL_RATE_PERCENT
        {
            return Err(AmortizationError::InvalidInput {
                field: "annual_rate_percent".into(),
                reason: format!("Annual rate must be between 0 and {MAX_ANNUAL_RATE_PERCENT}"),
            });
        }
        if self.term_years == 0 || self.term_years > MAX_TERM_YEARS {
            return Err(AmortizationError::InvalidInput {
                field: "term_years".into(),
                reason: format!("Term must be between 1 and {MAX_TERM_YEARS} years"),
            });
        }
        Ok(())
    }
}

/// Outstanding balance after `periods_elapsed` payments, with input checks.
pub fn balance_after(params: &LoanParameters, periods_elapsed: u32) -> AmortizationResult<Money> {
    params.validate()?;
    if periods_elapsed > params.term_periods {
        return Err(AmortizationError::InvalidInput {
            field: "periods_elapsed".into(),
            reason: format!(
                "Cannot exceed the loan term of {} periods",
                params.term_periods
            ),
        });
    }

    let payment =
        time_value::periodic_payment(params.principal, params.term_periods, params.periodic_rate);
    Ok(time_value::remaining_balance(
        params.principal,
        params.periodic_rate,
        payment,
        periods_elapsed,
    ))
}
