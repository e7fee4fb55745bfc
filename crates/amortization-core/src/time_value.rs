//! Level-payment annuity formulas.
//!
//! These are the building blocks of every amortization schedule: the constant
//! periodic payment, the outstanding balance after any number of payments, and
//! the interest accrued in a given period. All functions are pure and assume
//! validated inputs (see [`crate::amortization::loan::LoanParameters::validate`]).
//! All math in `rust_decimal::Decimal`.

use rust_decimal::Decimal;

use crate::types::{Money, Rate};

/// Constant payment that fully retires `principal` over `term_periods` at
/// compound rate `periodic_rate`.
///
/// Uses the annuity formula `P * r / (1 - (1 + r)^-n)`. At a zero rate the
/// compounding formula is undefined, so the principal is repaid straight-line.
///
/// # Panics
///
/// Panics if `term_periods` is zero or if `(1 + r)^n` overflows `Decimal`.
pub fn periodic_payment(principal: Money, term_periods: u32, periodic_rate: Rate) -> Money {
    if periodic_rate <= Decimal::ZERO {
        return principal / Decimal::from(term_periods);
    }

    let factor = growth_factor(periodic_rate, term_periods);
    let discount = Decimal::ONE - Decimal::ONE / factor;
    principal * (periodic_rate / discount)
}

/// Outstanding balance after `periods_elapsed` payments of `periodic_payment`.
///
/// `|(1 + r)^k * P - ((1 + r)^k - 1) / r * pmt|`, or `|P - pmt * k|` at a zero
/// rate. The absolute value absorbs the tiny negative residual that rounding
/// can leave at the final period.
///
/// # Panics
///
/// Panics if `(1 + r)^k * P` overflows `Decimal`.
pub fn remaining_balance(
    principal: Money,
    periodic_rate: Rate,
    periodic_payment: Money,
    periods_elapsed: u32,
) -> Money {
    if periods_elapsed == 0 {
        return principal;
    }

    if periodic_rate <= Decimal::ZERO {
        return (principal - periodic_payment * Decimal::from(periods_elapsed)).abs();
    }

    let factor = growth_factor(periodic_rate, periods_elapsed);
    let accrued = factor * principal;
    let repaid = (factor - Decimal::ONE) / periodic_rate * periodic_payment;
    (accrued - repaid).abs()
}

/// Interest accrued in period `period` (1-based).
///
/// Interest for period k accrues on the balance outstanding at the start of
/// that period, i.e. after k - 1 payments.
pub fn period_interest(
    principal: Money,
    periodic_rate: Rate,
    periodic_payment: Money,
    period: u32,
) -> Money {
    periodic_rate
        * remaining_balance(
            principal,
            periodic_rate,
            periodic_payment,
            period.saturating_sub(1),
        )
}

/// Compound growth factor `(1 + rate)^periods` via iterative multiplication.
pub fn growth_factor(rate: Rate, periods: u32) -> Decimal {
    let base = Decimal::ONE + rate;
    let mut result = Decimal::ONE;
    for _ in 0..periods {
        result *= base;
    }
    result
}

/// Same as [`growth_factor`] but returns `None` instead of overflowing.
pub fn checked_growth_factor(rate: Rate, periods: u32) -> Option<Decimal> {
    let base = Decimal::ONE.checked_add(rate)?;
    let mut result = Decimal::ONE;
    for _ in 0..periods {
        result = result.checked_mul(base)?;
    }
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn assert_close(actual: Decimal, expected: Decimal, tol: Decimal, msg: &str) {
        let diff = (actual - expected).abs();
        assert!(
            diff <= tol,
            "{}: expected ~{}, got {} (diff = {})",
            msg,
            expected,
            actual,
            diff
        );
    }

    fn monthly(annual_pct: Decimal) -> Rate {
        annual_pct / dec!(100) / dec!(12)
    }

    #[test]
    fn test_payment_30y_mortgage() {
        let pmt = periodic_payment(dec!(200000), 360, monthly(dec!(6.5)));
        assert_close(pmt, dec!(1264.14), dec!(0.01), "30y @ 6.5%");
    }

    #[test]
    fn test_payment_zero_rate_is_straight_line() {
        let pmt = periodic_payment(dec!(120000), 120, Decimal::ZERO);
        assert_eq!(pmt, dec!(1000));
    }

    #[test]
    fn test_payment_single_period() {
        // One period: repay principal plus one period of interest
        let pmt = periodic_payment(dec!(1000), 1, dec!(0.01));
        assert_close(pmt, dec!(1010), dec!(0.0000001), "single period");
    }

    #[test]
    fn test_balance_at_zero_elapsed_is_principal() {
        let r = monthly(dec!(5));
        let pmt = periodic_payment(dec!(50000), 60, r);
        assert_eq!(remaining_balance(dec!(50000), r, pmt, 0), dec!(50000));
    }

    #[test]
    fn test_balance_at_term_is_zero() {
        let r = monthly(dec!(6.5));
        let pmt = periodic_payment(dec!(200000), 360, r);
        let bal = remaining_balance(dec!(200000), r, pmt, 360);
        assert_close(bal, Decimal::ZERO, dec!(0.000001), "final balance");
    }

    #[test]
    fn test_balance_zero_rate_linear() {
        let bal = remaining_balance(dec!(120000), Decimal::ZERO, dec!(1000), 30);
        assert_eq!(bal, dec!(90000));
    }

    #[test]
    fn test_balance_never_negative_past_term() {
        // Past the term the closed form goes negative; the absolute value keeps it positive
        let bal = remaining_balance(dec!(1200), Decimal::ZERO, dec!(100), 13);
        assert_eq!(bal, dec!(100));
    }

    #[test]
    fn test_first_period_interest_on_full_principal() {
        let r = dec!(0.005);
        let pmt = periodic_payment(dec!(100000), 360, r);
        let interest = period_interest(dec!(100000), r, pmt, 1);
        assert_eq!(interest, dec!(500));
    }

    #[test]
    fn test_interest_declines_over_time() {
        let r = monthly(dec!(7));
        let pmt = periodic_payment(dec!(250000), 240, r);
        let early = period_interest(dec!(250000), r, pmt, 2);
        let late = period_interest(dec!(250000), r, pmt, 200);
        assert!(early > late);
    }

    #[test]
    fn test_zero_rate_interest_is_zero() {
        let interest = period_interest(dec!(120000), Decimal::ZERO, dec!(1000), 57);
        assert_eq!(interest, Decimal::ZERO);
    }

    #[test]
    fn test_growth_factor_matches_checked() {
        let r = dec!(0.01);
        assert_eq!(growth_factor(r, 0), Decimal::ONE);
        assert_eq!(Some(growth_factor(r, 24)), checked_growth_factor(r, 24));
    }

    #[test]
    fn test_checked_growth_factor_overflow() {
        // 2^1200 is far outside the 96-bit Decimal mantissa
        assert!(checked_growth_factor(Decimal::ONE, 1200).is_none());
    }
}
