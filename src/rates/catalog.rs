//! Rate catalog and follow-on rate resolution
//!
//! When a fixed period ends the borrower rolls onto one of the same lender's
//! variable products. Which one depends on the LTV reached by then, so the
//! match is made against the projected balance rather than today's.

use std::cmp::Ordering;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::{BerRating, BuyerCategory, FixedRate, Rate, VariableRate};
use crate::money::Cents;

/// Outcome of looking up a follow-on rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FollowOn<'a> {
    Matched(&'a VariableRate),
    /// Not an error: callers fall back to the fixed rate for the whole term
    NoMatch,
}

/// Follow-on decision as carried in scenario results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowOnResolution {
    /// Matched variable product, if any
    pub follow_on_rate_id: Option<String>,

    /// Rate applied after the fixed period (the fixed rate itself on fallback)
    pub follow_on_rate_pct: f64,

    /// LTV the match was made against
    pub projected_ltv_pct: f64,

    /// Set when no follow-on was found; later figures are optimistic
    pub uses_fixed_rate_for_whole_term: bool,
}

impl FollowOnResolution {
    /// Resolution for a product that has no fixed period to roll off
    pub fn not_applicable(rate_pct: f64, ltv_pct: f64) -> Self {
        Self {
            follow_on_rate_id: None,
            follow_on_rate_pct: rate_pct,
            projected_ltv_pct: ltv_pct,
            uses_fixed_rate_for_whole_term: false,
        }
    }
}

/// Filter used to list the products a borrower can take out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityCriteria {
    #[serde(default)]
    pub buyer: Option<BuyerCategory>,
    pub ltv_pct: f64,
    #[serde(default)]
    pub loan_amount: Option<Cents>,
    #[serde(default)]
    pub ber: Option<BerRating>,
}

/// Find the variable rate `fixed` rolls onto at `projected_ltv_pct`
///
/// Candidates must be variable, from the same lender, cover the LTV and accept
/// the energy rating. The narrowest LTV band wins, then the lowest rate; the
/// product id settles any remaining tie so the result is deterministic.
pub fn resolve_follow_on<'a>(
    fixed: &FixedRate,
    catalog: &'a [Rate],
    projected_ltv_pct: f64,
    ber: Option<BerRating>,
) -> FollowOn<'a> {
    let best = catalog
        .iter()
        .filter_map(|rate| match rate {
            Rate::Variable(variable) => Some(variable),
            Rate::Fixed(_) => None,
        })
        .filter(|variable| {
            let product = &variable.product;
            product.lender_id == fixed.product.lender_id
                && product.covers_ltv(projected_ltv_pct)
                && product.accepts_ber(ber)
        })
        .min_by(|a, b| {
            a.product
                .ltv_band_width()
                .total_cmp(&b.product.ltv_band_width())
                .then_with(|| a.product.rate_pct.total_cmp(&b.product.rate_pct))
                .then_with(|| a.product.id.cmp(&b.product.id))
        });

    match best {
        Some(variable) => FollowOn::Matched(variable),
        None => FollowOn::NoMatch,
    }
}

/// Collection of lender products, including user-entered ones
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateCatalog {
    rates: Vec<Rate>,
}

impl RateCatalog {
    pub fn new(rates: Vec<Rate>) -> Self {
        Self { rates }
    }

    /// Append custom rates; they take part in every lookup
    pub fn with_custom_rates<I>(mut self, custom: I) -> Self
    where
        I: IntoIterator<Item = Rate>,
    {
        self.rates.extend(custom);
        self
    }

    pub fn rates(&self) -> &[Rate] {
        &self.rates
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Rate> {
        self.rates.iter().find(|rate| rate.id() == id)
    }

    pub fn lender_rates<'a>(&'a self, lender_id: &'a str) -> impl Iterator<Item = &'a Rate> + 'a {
        self.rates.iter().filter(move |rate| rate.lender_id() == lender_id)
    }

    /// Products a borrower qualifies for, cheapest first
    pub fn eligible(&self, criteria: &EligibilityCriteria) -> Vec<&Rate> {
        let mut matches: Vec<&Rate> = self
            .rates
            .iter()
            .filter(|rate| {
                let product = rate.product();
                product.covers_ltv(criteria.ltv_pct)
                    && product.accepts_ber(criteria.ber)
                    && criteria.buyer.map_or(true, |buyer| product.accepts_buyer(buyer))
                    && criteria.loan_amount.map_or(true, |loan| product.accepts_loan(loan))
            })
            .collect();

        matches.sort_by(|a, b| {
            a.rate_pct()
                .partial_cmp(&b.rate_pct())
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.id().cmp(b.id()))
        });
        matches
    }

    pub fn resolve_follow_on(
        &self,
        fixed: &FixedRate,
        projected_ltv_pct: f64,
        ber: Option<BerRating>,
    ) -> FollowOn<'_> {
        resolve_follow_on(fixed, &self.rates, projected_ltv_pct, ber)
    }

    /// Resolve the rate applied after `rate`'s fixed period
    ///
    /// Variable products simply keep their own rate. A fixed product with no
    /// match keeps its fixed rate and raises `uses_fixed_rate_for_whole_term`.
    pub fn follow_on_for(
        &self,
        rate: &Rate,
        projected_ltv_pct: f64,
        ber: Option<BerRating>,
    ) -> FollowOnResolution {
        let fixed = match rate {
            Rate::Fixed(fixed) => fixed,
            Rate::Variable(variable) => {
                return FollowOnResolution::not_applicable(
                    variable.product.rate_pct,
                    projected_ltv_pct,
                )
            }
        };

        match self.resolve_follow_on(fixed, projected_ltv_pct, ber) {
            FollowOn::Matched(variable) => {
                debug!(
                    "Rate {} rolls onto {} at {:.2}% (LTV {:.1}%)",
                    fixed.product.id, variable.product.id, variable.product.rate_pct, projected_ltv_pct
                );
                FollowOnResolution {
                    follow_on_rate_id: Some(variable.product.id.clone()),
                    follow_on_rate_pct: variable.product.rate_pct,
                    projected_ltv_pct,
                    uses_fixed_rate_for_whole_term: false,
                }
            }
            FollowOn::NoMatch => {
                warn!(
                    "No follow-on rate for {} ({}) at LTV {:.1}%; assuming the fixed rate for the whole term",
                    fixed.product.id, fixed.product.lender_id, projected_ltv_pct
                );
                FollowOnResolution {
                    follow_on_rate_id: None,
                    follow_on_rate_pct: fixed.product.rate_pct,
                    projected_ltv_pct,
                    uses_fixed_rate_for_whole_term: true,
                }
            }
        }
    }
}
