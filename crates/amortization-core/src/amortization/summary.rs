use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amortization::loan::LoanParameters;
use crate::types::{Money, Rate, Years};

/// Headline figures for a schedule caption. All values are unrounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    /// Constant payment due each period
    pub periodic_payment: Money,
    pub principal: Money,
    pub periodic_rate: Rate,
    /// Annualised rate as a percentage (periodic rate * 12 * 100)
    pub annual_rate_percent: Decimal,
    pub term_periods: u32,
    pub term_years: Years,
    /// Sum of interest over the whole term
    pub total_interest: Money,
    /// Sum of all payments (principal + interest)
    pub total_paid: Money,
}

impl ScheduleSummary {
    pub fn new(
        params: &LoanParameters,
        periodic_payment: Money,
        total_principal: Money,
        total_interest: Money,
    ) -> Self {
        ScheduleSummary {
            periodic_payment,
            principal: params.principal,
            periodic_rate: params.periodic_rate,
            annual_rate_percent: params.annual_rate_percent(),
            term_periods: params.term_periods,
            term_years: params.term_years(),
            total_interest,
            total_paid: total_principal + total_interest,
        }
    }
}
