//! Loan terms and month-by-month loan state
//!
//! A loan runs at its initial rate until the fixed period ends, then the
//! payment is re-amortized on the outstanding balance at the follow-on rate
//! over the months that remain.

use serde::{Deserialize, Serialize};

use super::amortization::{monthly_payment, remaining_balance, split_payment};
use crate::rates::{FollowOnResolution, Rate};

/// Everything needed to step a capital-and-interest loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Amount borrowed, minor units
    pub principal: f64,

    pub term_months: u32,

    /// Rate for the first `fixed_months` (or the whole term)
    pub initial_rate_pct: f64,

    /// Length of the initial-rate period; `None` keeps the initial rate throughout
    pub fixed_months: Option<u32>,

    /// Rate once the fixed period ends
    pub follow_on_rate_pct: f64,
}

impl LoanTerms {
    /// Single rate for the whole term
    pub fn constant(principal: f64, rate_pct: f64, term_months: u32) -> Self {
        Self {
            principal,
            term_months,
            initial_rate_pct: rate_pct,
            fixed_months: None,
            follow_on_rate_pct: rate_pct,
        }
    }

    pub fn with_follow_on(
        principal: f64,
        rate_pct: f64,
        fixed_months: u32,
        follow_on_rate_pct: f64,
        term_months: u32,
    ) -> Self {
        Self {
            principal,
            term_months,
            initial_rate_pct: rate_pct,
            fixed_months: Some(fixed_months),
            follow_on_rate_pct,
        }
    }

    /// Terms for a catalog product with its resolved follow-on
    pub fn for_rate(principal: f64, rate: &Rate, follow_on: &FollowOnResolution, term_months: u32) -> Self {
        match rate.fixed_term_months() {
            Some(fixed) => Self::with_follow_on(
                principal,
                rate.rate_pct(),
                fixed,
                follow_on.follow_on_rate_pct,
                term_months,
            ),
            None => Self::constant(principal, rate.rate_pct(), term_months),
        }
    }

    /// Month after which the follow-on rate applies, if that happens inside the term
    pub fn switch_month(&self) -> Option<u32> {
        self.fixed_months.filter(|&months| months < self.term_months)
    }

    pub fn initial_payment(&self) -> f64 {
        monthly_payment(self.principal, self.initial_rate_pct, self.term_months)
    }

    /// Balance when the fixed period ends
    pub fn balance_at_switch(&self) -> Option<f64> {
        self.switch_month().map(|month| {
            remaining_balance(self.principal, self.initial_rate_pct, self.term_months, month)
        })
    }

    /// Payment after re-amortizing at the follow-on rate
    pub fn follow_on_payment(&self) -> Option<f64> {
        let month = self.switch_month()?;
        let balance = self.balance_at_switch()?;
        Some(monthly_payment(balance, self.follow_on_rate_pct, self.term_months - month))
    }

    /// Sum of scheduled payments over the term
    pub fn total_repayable(&self) -> f64 {
        let initial = self.initial_payment();
        match (self.switch_month(), self.follow_on_payment()) {
            (Some(month), Some(follow_on)) => {
                initial * month as f64 + follow_on * (self.term_months - month) as f64
            }
            _ => initial * self.term_months as f64,
        }
    }

    /// Step the loan for `months` months (rows for months 1..=months)
    pub fn project(&self, months: u32) -> Vec<LoanMonth> {
        let mut state = LoanState::from_terms(self);
        (1..=months).map(|_| state.advance_month(self)).collect()
    }
}

/// Figures for one month of a stepped loan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoanMonth {
    pub month: u32,
    pub rate_pct: f64,
    pub payment: f64,
    pub interest: f64,
    pub principal: f64,
    /// Balance after this month's payment
    pub balance: f64,
    pub cumulative_interest: f64,
    pub cumulative_principal: f64,
    pub cumulative_payments: f64,
}

/// State of a loan at a point in its life
#[derive(Debug, Clone)]
pub struct LoanState {
    /// Months elapsed (0 before the first payment)
    pub month: u32,

    pub balance: f64,

    /// Current level payment
    pub payment: f64,

    pub rate_pct: f64,

    pub cumulative_interest: f64,
    pub cumulative_principal: f64,
    pub cumulative_payments: f64,
}

impl LoanState {
    pub fn from_terms(terms: &LoanTerms) -> Self {
        Self {
            month: 0,
            balance: terms.principal,
            payment: terms.initial_payment(),
            rate_pct: terms.initial_rate_pct,
            cumulative_interest: 0.0,
            cumulative_principal: 0.0,
            cumulative_payments: 0.0,
        }
    }

    /// Advance one month and return that month's figures
    pub fn advance_month(&mut self, terms: &LoanTerms) -> LoanMonth {
        // Re-amortize at the start of the first follow-on month
        if let Some(switch) = terms.switch_month() {
            if self.month == switch {
                self.rate_pct = terms.follow_on_rate_pct;
                self.payment =
                    monthly_payment(self.balance, terms.follow_on_rate_pct, terms.term_months - switch);
            }
        }

        self.month += 1;

        let (interest, principal) = if self.month > terms.term_months || self.balance <= 0.0 {
            (0.0, 0.0)
        } else {
            let mut split = split_payment(self.balance, self.rate_pct, self.payment);
            if self.month == terms.term_months {
                // Final payment clears whatever floating residue is left
                split.principal = self.balance;
            }
            (split.interest, split.principal)
        };

        let payment = interest + principal;
        self.balance = (self.balance - principal).max(0.0);
        self.cumulative_interest += interest;
        self.cumulative_principal += principal;
        self.cumulative_payments += payment;

        LoanMonth {
            month: self.month,
            rate_pct: self.rate_pct,
            payment,
            interest,
            principal,
            balance: self.balance,
            cumulative_interest: self.cumulative_interest,
            cumulative_principal: self.cumulative_principal,
            cumulative_payments: self.cumulative_payments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::RateProduct;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_constant_loan_pays_off() {
        let terms = LoanTerms::constant(30_000_000.0, 4.5, 240);
        let rows = terms.project(240);

        assert_eq!(rows.len(), 240);
        assert_eq!(rows.last().unwrap().balance, 0.0);
        assert_abs_diff_eq!(rows.last().unwrap().cumulative_principal, 30_000_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(
            rows[0].payment,
            terms.initial_payment(),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_follow_on_reamortizes() {
        let terms = LoanTerms::with_follow_on(30_000_000.0, 3.0, 36, 5.0, 300);
        let rows = terms.project(300);

        assert_eq!(rows[35].rate_pct, 3.0);
        assert_eq!(rows[36].rate_pct, 5.0);
        assert!(rows[36].payment > rows[35].payment);
        assert_abs_diff_eq!(rows[36].payment, terms.follow_on_payment().unwrap(), epsilon = 1e-3);
        assert_abs_diff_eq!(rows[35].balance, terms.balance_at_switch().unwrap(), epsilon = 1e-3);
        assert_eq!(rows.last().unwrap().balance, 0.0);
        assert_abs_diff_eq!(
            rows.last().unwrap().cumulative_payments,
            terms.total_repayable(),
            epsilon = 1.0
        );
    }

    #[test]
    fn test_fixed_period_longer_than_term_never_switches() {
        let terms = LoanTerms::with_follow_on(1_000_000.0, 3.0, 120, 6.0, 60);
        assert_eq!(terms.switch_month(), None);
        assert_eq!(terms.follow_on_payment(), None);
        assert!(terms.project(60).iter().all(|row| row.rate_pct == 3.0));
    }

    #[test]
    fn test_projection_past_term_is_flat() {
        let rows = LoanTerms::constant(1_000_000.0, 3.0, 12).project(15);
        assert_eq!(rows[14].payment, 0.0);
        assert_eq!(rows[14].balance, 0.0);
    }

    #[test]
    fn test_for_rate_uses_resolution() {
        let fixed = Rate::fixed(RateProduct::new("f", "l", 3.2), 24);
        let resolution = FollowOnResolution {
            follow_on_rate_id: Some("svr".to_string()),
            follow_on_rate_pct: 4.4,
            projected_ltv_pct: 70.0,
            uses_fixed_rate_for_whole_term: false,
        };
        let terms = LoanTerms::for_rate(20_000_000.0, &fixed, &resolution, 240);
        assert_eq!(terms.fixed_months, Some(24));
        assert_eq!(terms.follow_on_rate_pct, 4.4);

        let variable = Rate::variable(RateProduct::new("v", "l", 4.1));
        let terms = LoanTerms::for_rate(20_000_000.0, &variable, &resolution, 240);
        assert_eq!(terms.fixed_months, None);
        assert_eq!(terms.follow_on_rate_pct, 4.1);
    }
}
