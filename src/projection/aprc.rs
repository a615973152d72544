//! Annual percentage rate of charge (APRC)
//!
//! The APRC is the rate that discounts a standardized loan's cashflows to
//! zero: the reference amount is paid out net of upfront fees, then repaid
//! monthly at the fixed rate and afterwards at the follow-on rate, with the
//! security release fee added to the last repayment.

use log::debug;
use serde::{Deserialize, Serialize};

use super::loan::LoanTerms;
use crate::config::AprcConfig;
use crate::money::Cents;
use crate::rates::{FollowOnResolution, Rate};

/// Lender fees that enter the APRC cashflows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AprcFeeConfig {
    /// Deducted from the disbursement at month 0
    pub valuation_fee: Cents,

    /// Paid with the final repayment
    pub security_release_fee: Cents,
}

impl Default for AprcFeeConfig {
    fn default() -> Self {
        Self {
            valuation_fee: 18_500,
            security_release_fee: 6_000,
        }
    }
}

impl AprcFeeConfig {
    pub fn none() -> Self {
        Self { valuation_fee: 0, security_release_fee: 0 }
    }
}

/// Where an APRC figure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AprcSource {
    /// Published by the lender, used verbatim
    Disclosed,
    /// Solved from the cashflows
    Computed,
}

/// APRC with solver diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AprcEstimate {
    /// Annualized rate in percent
    pub aprc_pct: f64,
    pub source: AprcSource,
    /// False when the iteration cap was hit; the figure is then a best effort
    pub converged: bool,
    pub iterations: u32,
}

/// Rate pair the APRC is solved for
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AprcInputs {
    pub fixed_rate_pct: f64,
    /// Zero for variable products
    pub fixed_months: u32,
    pub follow_on_rate_pct: f64,
}

impl AprcInputs {
    pub fn for_rate(rate: &Rate, follow_on: &FollowOnResolution) -> Self {
        match rate.fixed_term_months() {
            Some(fixed_months) => Self {
                fixed_rate_pct: rate.rate_pct(),
                fixed_months,
                follow_on_rate_pct: follow_on.follow_on_rate_pct,
            },
            None => Self {
                fixed_rate_pct: rate.rate_pct(),
                fixed_months: 0,
                follow_on_rate_pct: rate.rate_pct(),
            },
        }
    }
}

/// Cashflows of the reference loan: index 0 is the net disbursement
/// (positive), later entries are repayments (negative)
pub fn aprc_cashflows(inputs: &AprcInputs, fees: &AprcFeeConfig, config: &AprcConfig) -> Vec<f64> {
    let loan = config.reference_loan as f64;
    let term = config.reference_term_months.max(1);

    let terms = if inputs.fixed_months > 0 {
        LoanTerms::with_follow_on(loan, inputs.fixed_rate_pct, inputs.fixed_months, inputs.follow_on_rate_pct, term)
    } else {
        LoanTerms::constant(loan, inputs.fixed_rate_pct, term)
    };

    let mut cashflows = Vec::with_capacity(term as usize + 1);
    cashflows.push(loan - fees.valuation_fee as f64);
    cashflows.extend(terms.project(term).iter().map(|row| -row.payment));
    if let Some(last) = cashflows.last_mut() {
        *last -= fees.security_release_fee as f64;
    }
    cashflows
}

/// NPV and its derivative at a periodic rate
fn npv_and_derivative(cashflows: &[f64], rate: f64) -> (f64, f64) {
    let v = 1.0 / (1.0 + rate);
    let mut discount = 1.0;
    let mut npv = 0.0;
    let mut dnpv = 0.0;

    for (t, &cf) in cashflows.iter().enumerate() {
        npv += cf * discount;
        // d/di of cf * v^t = -t * cf * v^(t+1)
        dnpv -= t as f64 * cf * discount * v;
        discount *= v;
    }

    (npv, dnpv)
}

fn npv_at_rate(cashflows: &[f64], rate: f64) -> f64 {
    npv_and_derivative(cashflows, rate).0
}

/// Running best guess, kept so a capped run still returns something sensible
struct BestEstimate {
    rate: f64,
    residual: f64,
}

impl BestEstimate {
    fn offer(&mut self, rate: f64, npv: f64) {
        if npv.abs() < self.residual {
            self.rate = rate;
            self.residual = npv.abs();
        }
    }
}

/// Monthly rate bracket from the configured annual percentages
///
/// Non-finite ends fall back to the defaults and an inverted bracket is
/// swapped, so a bad configuration can never panic the solver.
fn monthly_bracket(config: &AprcConfig) -> (f64, f64) {
    let defaults = AprcConfig::default();
    let finite_or = |value: f64, fallback: f64| if value.is_finite() { value } else { fallback };

    let min = finite_or(config.min_annual_pct, defaults.min_annual_pct);
    let max = finite_or(config.max_annual_pct, defaults.max_annual_pct);
    let (min, max) = if min <= max { (min, max) } else { (max, min) };
    (min / 1200.0, max / 1200.0)
}

/// Solve the monthly IRR of the reference cashflows and annualize it
///
/// Newton-Raphson from the fixed rate, falling back to bisection over the
/// configured bracket. Never panics and never returns NaN; a run that hits
/// the iteration cap reports its best estimate with `converged: false`.
pub fn solve_aprc(inputs: &AprcInputs, fees: &AprcFeeConfig, config: &AprcConfig) -> AprcEstimate {
    let cashflows = aprc_cashflows(inputs, fees, config);
    let tolerance = config.tolerance_ratio * config.reference_loan.max(1) as f64;
    let (low_bound, high_bound) = monthly_bracket(config);

    let guess = (inputs.fixed_rate_pct / 1200.0).clamp(low_bound, high_bound);
    let mut best = BestEstimate { rate: guess, residual: f64::INFINITY };
    let mut iterations = 0;
    let mut converged = false;

    // Newton-Raphson
    let mut rate = guess;
    while iterations < config.max_iterations {
        iterations += 1;
        let (npv, dnpv) = npv_and_derivative(&cashflows, rate);
        best.offer(rate, npv);

        if npv.abs() < tolerance {
            converged = true;
            break;
        }
        if dnpv.abs() < 1e-20 || !dnpv.is_finite() {
            break;
        }

        let next = rate - npv / dnpv;
        if !next.is_finite() || next < low_bound || next > high_bound {
            break;
        }
        rate = next;
    }

    // Bisection fallback; NPV falls as the rate rises
    if !converged {
        let mut low = low_bound;
        let mut high = high_bound;
        let npv_low = npv_at_rate(&cashflows, low);
        let npv_high = npv_at_rate(&cashflows, high);
        best.offer(low, npv_low);
        best.offer(high, npv_high);

        if npv_low * npv_high <= 0.0 {
            while iterations < config.max_iterations {
                iterations += 1;
                let mid = (low + high) / 2.0;
                let npv_mid = npv_at_rate(&cashflows, mid);
                best.offer(mid, npv_mid);

                if npv_mid.abs() < tolerance {
                    converged = true;
                    break;
                }
                if (npv_mid > 0.0) == (npv_low > 0.0) {
                    low = mid;
                } else {
                    high = mid;
                }
            }
        }
    }

    let mut aprc_pct = best.rate * 1200.0;
    if !aprc_pct.is_finite() {
        aprc_pct = inputs.fixed_rate_pct;
    }

    if converged {
        debug!("APRC solved at {:.4}% after {} iterations", aprc_pct, iterations);
    } else {
        debug!(
            "APRC did not converge after {} iterations; best estimate {:.4}% (residual {:.4})",
            iterations, aprc_pct, best.residual
        );
    }

    AprcEstimate {
        aprc_pct,
        source: AprcSource::Computed,
        converged,
        iterations,
    }
}

/// APRC for a product: the lender's disclosed figure if it has one,
/// otherwise a solved estimate
pub fn aprc_for_rate(
    rate: &Rate,
    follow_on: &FollowOnResolution,
    fees: &AprcFeeConfig,
    config: &AprcConfig,
) -> AprcEstimate {
    if let Some(disclosed) = rate.apr_pct() {
        return AprcEstimate {
            aprc_pct: disclosed,
            source: AprcSource::Disclosed,
            converged: true,
            iterations: 0,
        };
    }
    solve_aprc(&AprcInputs::for_rate(rate, follow_on), fees, config)
}
