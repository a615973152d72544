//! Cashback vs rate comparison
//!
//! Options are compared over the shortest fixed period among them, since
//! fixed-rate figures only hold for that long. Adjusted balance treats the
//! cashback as a lump sum taken off the ending balance.

use serde::{Deserialize, Serialize};

use super::CashbackType;
use crate::breakeven::{find_breakeven, Breakeven, BreakevenDisplay};
use crate::config::EngineConfig;
use crate::money::{to_cents, Cents};
use crate::projection::{
    aprc_for_rate, project_cashback, projected_ltv_pct, remaining_balance, AprcEstimate,
    CashbackLeg, CashbackMonth, CashbackPosition, LoanTerms, Projection,
};
use crate::rates::{BerRating, FollowOnResolution, Rate, RateCatalog};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashbackOption {
    pub rate: Rate,

    #[serde(default)]
    pub cashback: CashbackType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashbackInputs {
    pub mortgage_amount: Cents,
    pub property_value: Cents,
    pub term_months: u32,

    /// Two or more options, compared pairwise
    pub options: Vec<CashbackOption>,

    /// Explicit horizon; replaces the shortest fixed period
    #[serde(default)]
    pub comparison_months: Option<u32>,

    #[serde(default)]
    pub ber: Option<BerRating>,
}

/// Months the options are compared over, never beyond the term
pub fn comparison_horizon(inputs: &CashbackInputs) -> u32 {
    inputs
        .comparison_months
        .or_else(|| {
            inputs
                .options
                .iter()
                .filter_map(|option| option.rate.fixed_term_months())
                .min()
        })
        .unwrap_or(inputs.term_months)
        .min(inputs.term_months)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashbackOptionResult {
    pub rate_id: String,
    pub cashback_amount: Cents,
    pub monthly_payment: Cents,
    pub follow_on_payment: Option<Cents>,

    /// Figures at the comparison horizon
    pub balance: Cents,
    pub adjusted_balance: Cents,
    pub cumulative_interest: Cents,
    pub net_cost: Cents,

    pub follow_on: FollowOnResolution,
    pub uses_fixed_rate_for_whole_term: bool,
    pub aprc: AprcEstimate,
}

/// Option indices, best first; ties keep input order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashbackRankings {
    pub by_monthly_payment: Vec<usize>,
    pub by_adjusted_balance: Vec<usize>,
    pub by_net_cost: Vec<usize>,
}

/// Both positions at the month one option overtakes the other
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairwiseDetail {
    pub month: u32,
    pub first: CashbackPosition,
    pub second: CashbackPosition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairwiseBreakeven {
    pub first: usize,
    pub second: usize,

    /// Lower net cost at month 0 (the earlier option on a tie)
    pub initially_cheaper: usize,

    /// First month the other option's net cost is strictly lower
    pub breakeven: Breakeven,
    pub breakeven_display: BreakevenDisplay,
    pub detail: Option<PairwiseDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashbackResult {
    pub comparison_months: u32,
    pub options: Vec<CashbackOptionResult>,
    pub rankings: CashbackRankings,
    pub pairwise: Vec<PairwiseBreakeven>,
    pub projection: Projection<CashbackMonth>,
}

fn rank_by<F>(count: usize, mut metric: F) -> Vec<usize>
where
    F: FnMut(usize) -> Cents,
{
    let mut order: Vec<usize> = (0..count).collect();
    order.sort_by_key(|&idx| metric(idx));
    order
}

fn pairwise_breakeven(projection: &Projection<CashbackMonth>, first: usize, second: usize, threshold: u32) -> PairwiseBreakeven {
    let start = &projection.monthly[0].positions;
    let (leader, trailer) = if start[second].net_cost < start[first].net_cost {
        (second, first)
    } else {
        (first, second)
    };

    let breakeven = find_breakeven(&projection.monthly, |month| {
        month.positions[trailer].net_cost < month.positions[leader].net_cost
    });
    let detail = breakeven
        .month()
        .and_then(|month| projection.at_month(month))
        .map(|month| PairwiseDetail {
            month: month.month,
            first: month.positions[first].clone(),
            second: month.positions[second].clone(),
        });

    PairwiseBreakeven {
        first,
        second,
        initially_cheaper: leader,
        breakeven,
        breakeven_display: breakeven.display(threshold),
        detail,
    }
}

pub fn run_cashback(inputs: &CashbackInputs, catalog: &RateCatalog, config: &EngineConfig) -> CashbackResult {
    let term = inputs.term_months;
    let principal = inputs.mortgage_amount as f64;
    let horizon = comparison_horizon(inputs);

    let resolved: Vec<(FollowOnResolution, CashbackLeg)> = inputs
        .options
        .iter()
        .map(|option| {
            let ltv_pct = match option.rate.fixed_term_months() {
                Some(fixed) => projected_ltv_pct(
                    remaining_balance(principal, option.rate.rate_pct(), term, fixed),
                    inputs.property_value as f64,
                ),
                None => projected_ltv_pct(principal, inputs.property_value as f64),
            };
            let follow_on = catalog.follow_on_for(&option.rate, ltv_pct, inputs.ber);
            let leg = CashbackLeg {
                terms: LoanTerms::for_rate(principal, &option.rate, &follow_on, term),
                cashback: option.cashback.amount(inputs.mortgage_amount),
            };
            (follow_on, leg)
        })
        .collect();

    let legs: Vec<CashbackLeg> = resolved.iter().map(|(_, leg)| leg.clone()).collect();
    let projection = project_cashback(&legs, horizon);
    let end = projection.last().map(|month| month.positions.as_slice()).unwrap_or(&[]);

    let options: Vec<CashbackOptionResult> = inputs
        .options
        .iter()
        .zip(resolved)
        .zip(end)
        .map(|((option, (follow_on, leg)), position)| {
            let fees = config.fees_for(option.rate.lender_id());
            CashbackOptionResult {
                rate_id: option.rate.id().to_string(),
                cashback_amount: leg.cashback,
                monthly_payment: to_cents(leg.terms.initial_payment()),
                follow_on_payment: leg.terms.follow_on_payment().map(to_cents),
                balance: position.balance,
                adjusted_balance: position.adjusted_balance,
                cumulative_interest: position.cumulative_interest,
                net_cost: position.net_cost,
                uses_fixed_rate_for_whole_term: follow_on.uses_fixed_rate_for_whole_term,
                aprc: aprc_for_rate(&option.rate, &follow_on, fees, &config.aprc),
                follow_on,
            }
        })
        .collect();

    let count = options.len();
    let rankings = CashbackRankings {
        by_monthly_payment: rank_by(count, |idx| options[idx].monthly_payment),
        by_adjusted_balance: rank_by(count, |idx| options[idx].adjusted_balance),
        by_net_cost: rank_by(count, |idx| options[idx].net_cost),
    };

    let threshold = config.month_resolution_threshold;
    let pairwise: Vec<PairwiseBreakeven> = (0..count)
        .flat_map(|first| ((first + 1)..count).map(move |second| (first, second)))
        .map(|(first, second)| pairwise_breakeven(&projection, first, second, threshold))
        .collect();

    log::debug!(
        "Cashback comparison of {} options over {} months: best net cost {:?}",
        count,
        horizon,
        rankings.by_net_cost.first().map(|&idx| &options[idx].rate_id)
    );

    CashbackResult {
        comparison_months: horizon,
        options,
        rankings,
        pairwise,
        projection,
    }
}
