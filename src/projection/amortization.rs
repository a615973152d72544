//! Fixed-payment loan math
//!
//! All amounts are minor units held as `f64`; callers round with
//! [`crate::money::to_cents`] before comparing.

use serde::{Deserialize, Serialize};

use crate::rates::Rate;

/// Monthly rates below this are treated as interest free
const ZERO_RATE_EPSILON: f64 = 1e-12;

/// Convert an annual nominal percentage to a monthly decimal rate
pub fn monthly_rate(annual_rate_pct: f64) -> f64 {
    annual_rate_pct / 100.0 / 12.0
}

/// Level payment amortizing `principal` over `term_months`
///
/// # Panics
/// A zero-month term is a caller contract violation.
pub fn monthly_payment(principal: f64, annual_rate_pct: f64, term_months: u32) -> f64 {
    assert!(term_months > 0, "loan term must be at least one month");

    let r = monthly_rate(annual_rate_pct);
    if r.abs() < ZERO_RATE_EPSILON {
        return principal / term_months as f64;
    }

    let growth = (1.0 + r).powi(term_months as i32);
    principal * r * growth / (growth - 1.0)
}

/// Balance left after `elapsed_months` level payments
///
/// `elapsed_months` is clamped to the term, so the balance at the end of the
/// term is zero up to floating noise.
pub fn remaining_balance(
    principal: f64,
    annual_rate_pct: f64,
    total_term_months: u32,
    elapsed_months: u32,
) -> f64 {
    let elapsed = elapsed_months.min(total_term_months);
    if elapsed == 0 {
        return principal;
    }

    let payment = monthly_payment(principal, annual_rate_pct, total_term_months);
    let r = monthly_rate(annual_rate_pct);
    let balance = if r.abs() < ZERO_RATE_EPSILON {
        principal - payment * elapsed as f64
    } else {
        let growth = (1.0 + r).powi(elapsed as i32);
        principal * growth - payment * (growth - 1.0) / r
    };

    balance.max(0.0)
}

/// Total paid over the term, switching to the follow-on payment when the
/// fixed period ends inside the term
///
/// Without a follow-on payment the initial payment is assumed to run for the
/// whole term; callers flag that case as `uses_fixed_rate_for_whole_term`.
pub fn total_repayable(
    rate: &Rate,
    monthly_payment: f64,
    monthly_follow_on_payment: Option<f64>,
    term_months: u32,
) -> f64 {
    match (rate.fixed_term_months(), monthly_follow_on_payment) {
        (Some(fixed), Some(follow_on)) if fixed < term_months => {
            monthly_payment * fixed as f64 + follow_on * (term_months - fixed) as f64
        }
        _ => monthly_payment * term_months as f64,
    }
}

/// Interest/principal split of one payment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaymentSplit {
    pub interest: f64,
    pub principal: f64,
}

/// Split `payment` against `balance`; principal never exceeds the balance and
/// never goes negative
pub fn split_payment(balance: f64, annual_rate_pct: f64, payment: f64) -> PaymentSplit {
    let interest = balance * monthly_rate(annual_rate_pct);
    let principal = (payment - interest).max(0.0).min(balance);
    PaymentSplit { interest, principal }
}

/// One month of a full amortization schedule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub month: u32,
    pub payment: f64,
    pub interest: f64,
    pub principal: f64,
    pub balance: f64,
}

/// Month-by-month schedule at a constant rate; the last payment clears the
/// balance exactly
pub fn amortization_schedule(principal: f64, annual_rate_pct: f64, term_months: u32) -> Vec<ScheduleRow> {
    let payment = monthly_payment(principal, annual_rate_pct, term_months);
    let mut balance = principal;
    let mut rows = Vec::with_capacity(term_months as usize);

    for month in 1..=term_months {
        let mut split = split_payment(balance, annual_rate_pct, payment);
        if month == term_months {
            split.principal = balance;
        }
        balance -= split.principal;
        rows.push(ScheduleRow {
            month,
            payment: split.interest + split.principal,
            interest: split.interest,
            principal: split.principal,
            balance: balance.max(0.0),
        });
    }

    rows
}

/// Loan-to-value in percent
pub fn projected_ltv_pct(balance: f64, property_value: f64) -> f64 {
    if property_value <= 0.0 {
        return 0.0;
    }
    balance / property_value * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::RateProduct;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_zero_rate_payment_is_straight_line() {
        for &(principal, term) in &[(30_000_000.0, 240), (12_345.0, 7), (1.0, 1)] {
            assert_eq!(monthly_payment(principal, 0.0, term), principal / term as f64);
        }
    }

    #[test]
    fn test_known_payment() {
        // €300,000 over 20 years at 3.5% is €1,739.88 a month
        let payment = monthly_payment(30_000_000.0, 3.5, 240);
        assert_abs_diff_eq!(payment, 173_987.9, epsilon = 1.0);
    }

    #[test]
    fn test_balance_is_zero_at_term_end() {
        for &rate in &[0.0, 0.5, 3.5, 4.5, 9.99, 15.0] {
            for &term in &[12_u32, 240, 300, 420] {
                let balance = remaining_balance(35_000_000.0, rate, term, term);
                assert!(balance.abs() <= 1.0, "rate {} term {}: {}", rate, term, balance);
            }
        }
    }

    #[test]
    fn test_elapsed_is_clamped() {
        assert_eq!(remaining_balance(1_000_000.0, 4.0, 120, 0), 1_000_000.0);
        assert_eq!(
            remaining_balance(1_000_000.0, 4.0, 120, 500),
            remaining_balance(1_000_000.0, 4.0, 120, 120)
        );
    }

    #[test]
    fn test_balance_matches_schedule() {
        let schedule = amortization_schedule(25_000_000.0, 4.2, 300);
        let closed_form = remaining_balance(25_000_000.0, 4.2, 300, 60);
        assert_abs_diff_eq!(schedule[59].balance, closed_form, epsilon = 1e-3);
        assert_eq!(schedule.last().unwrap().balance, 0.0);
    }

    #[test]
    fn test_total_repayable_at_least_principal() {
        let principal = 30_000_000.0;
        for &rate in &[0.1, 2.0, 4.5, 8.0] {
            let variable = Rate::variable(RateProduct::new("v", "l", rate));
            let payment = monthly_payment(principal, rate, 300);
            assert!(total_repayable(&variable, payment, None, 300) >= principal);
        }
    }

    #[test]
    fn test_total_repayable_uses_follow_on() {
        let fixed = Rate::fixed(RateProduct::new("f", "l", 3.0), 36);
        let total = total_repayable(&fixed, 1000.0, Some(1200.0), 240);
        assert_eq!(total, 1000.0 * 36.0 + 1200.0 * 204.0);

        // No follow-on: the fixed payment runs the whole term
        assert_eq!(total_repayable(&fixed, 1000.0, None, 240), 240_000.0);
    }

    #[test]
    fn test_split_never_overpays_principal() {
        let split = split_payment(500.0, 6.0, 10_000.0);
        assert_abs_diff_eq!(split.interest, 2.5, epsilon = 1e-12);
        assert_eq!(split.principal, 500.0);

        let underpaid = split_payment(100_000.0, 12.0, 10.0);
        assert_eq!(underpaid.principal, 0.0);
    }

    #[test]
    #[should_panic]
    fn test_zero_term_fails_fast() {
        monthly_payment(1000.0, 3.0, 0);
    }
}
