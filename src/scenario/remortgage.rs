//! Remortgage: stay on the current rate or switch to a new product
//!
//! Breakeven is the first month the payments saved by switching cover the
//! switching costs. Interest saved over the whole term and the net benefit
//! are reported independently of that search.

use serde::{Deserialize, Serialize};

use super::CashbackType;
use crate::breakeven::{find_first_non_negative, Breakeven, BreakevenDisplay};
use crate::config::EngineConfig;
use crate::money::{to_cents, Cents};
use crate::projection::{
    aprc_for_rate, project_remortgage, projected_ltv_pct, remaining_balance, AprcEstimate,
    LoanTerms, Projection, RemortgageMonth,
};
use crate::rates::{BerRating, FollowOnResolution, Rate, RateCatalog};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemortgageInputs {
    pub outstanding_balance: Cents,
    pub property_value: Cents,
    pub remaining_term_months: u32,

    /// Rate on the existing mortgage, assumed to continue unchanged
    pub current_rate_pct: f64,

    /// Product being switched to
    pub new_rate: Rate,

    #[serde(default)]
    pub ber: Option<BerRating>,

    #[serde(default)]
    pub legal_fees: Cents,

    #[serde(default)]
    pub early_repayment_charge: Cents,

    #[serde(default)]
    pub cashback: CashbackType,
}

impl RemortgageInputs {
    pub fn cashback_amount(&self) -> Cents {
        self.cashback.amount(self.outstanding_balance)
    }

    /// Legal fees plus early-repayment charge minus cashback
    pub fn switching_costs(&self) -> Cents {
        self.legal_fees + self.early_repayment_charge - self.cashback_amount()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemortgageResult {
    /// First month cumulative savings reach the switching costs
    pub breakeven: Breakeven,
    pub breakeven_display: BreakevenDisplay,

    /// Set for fixed products whose breakeven falls after the fixed period
    pub breakeven_exceeds_fixed_period: bool,

    pub current_monthly_payment: Cents,
    pub new_monthly_payment: Cents,
    pub monthly_savings: Cents,

    /// Payment once the new product's fixed period ends
    pub new_follow_on_payment: Option<Cents>,

    pub cashback_amount: Cents,
    pub switching_costs: Cents,

    pub total_interest_current: Cents,
    pub total_interest_new: Cents,
    pub total_interest_saved: Cents,

    /// Interest saved minus switching costs
    pub net_benefit: Cents,

    pub total_repayable_new: Cents,

    pub follow_on: FollowOnResolution,
    pub uses_fixed_rate_for_whole_term: bool,
    pub aprc: AprcEstimate,

    pub projection: Projection<RemortgageMonth>,

    /// Values frozen at the breakeven month
    pub detail: Option<RemortgageMonth>,
}

/// Compare staying on the current rate with switching to `inputs.new_rate`
pub fn run_remortgage(inputs: &RemortgageInputs, catalog: &RateCatalog, config: &EngineConfig) -> RemortgageResult {
    let term = inputs.remaining_term_months;
    let balance = inputs.outstanding_balance as f64;

    // LTV the borrower reaches when the new product's fixed period ends
    let ltv_pct = match inputs.new_rate.fixed_term_months() {
        Some(fixed) => projected_ltv_pct(
            remaining_balance(balance, inputs.new_rate.rate_pct(), term, fixed),
            inputs.property_value as f64,
        ),
        None => projected_ltv_pct(balance, inputs.property_value as f64),
    };
    let follow_on = catalog.follow_on_for(&inputs.new_rate, ltv_pct, inputs.ber);

    let current = LoanTerms::constant(balance, inputs.current_rate_pct, term);
    let new = LoanTerms::for_rate(balance, &inputs.new_rate, &follow_on, term);

    let switching_costs = inputs.switching_costs();
    let projection = project_remortgage(&current, &new, switching_costs, term);

    // Net savings are whole cents indexed by month, month 0 first
    let net_savings: Vec<Cents> = projection.monthly.iter().map(|month| month.net_savings).collect();
    let breakeven = find_first_non_negative(&net_savings);
    let detail = breakeven
        .month()
        .and_then(|month| projection.at_month(month))
        .cloned();

    let breakeven_exceeds_fixed_period = inputs
        .new_rate
        .fixed_term_months()
        .map_or(false, |fixed| breakeven.exceeds(fixed));

    let (total_interest_current, total_interest_new) = projection
        .last()
        .map_or((0, 0), |end| (end.cumulative_current_interest, end.cumulative_new_interest));
    let total_interest_saved = total_interest_current - total_interest_new;

    let current_monthly_payment = to_cents(current.initial_payment());
    let new_monthly_payment = to_cents(new.initial_payment());

    let fees = config.fees_for(inputs.new_rate.lender_id());
    let aprc = aprc_for_rate(&inputs.new_rate, &follow_on, fees, &config.aprc);

    log::debug!(
        "Remortgage {:.2}% -> {} ({:.2}%): breakeven {:?}, interest saved {}",
        inputs.current_rate_pct,
        inputs.new_rate.id(),
        inputs.new_rate.rate_pct(),
        breakeven.month(),
        total_interest_saved
    );

    RemortgageResult {
        breakeven,
        breakeven_display: breakeven.display(config.month_resolution_threshold),
        breakeven_exceeds_fixed_period,
        current_monthly_payment,
        new_monthly_payment,
        monthly_savings: current_monthly_payment - new_monthly_payment,
        new_follow_on_payment: new.follow_on_payment().map(to_cents),
        cashback_amount: inputs.cashback_amount(),
        switching_costs,
        total_interest_current,
        total_interest_new,
        total_interest_saved,
        net_benefit: total_interest_saved - switching_costs,
        total_repayable_new: to_cents(new.total_repayable()),
        uses_fixed_rate_for_whole_term: follow_on.uses_fixed_rate_for_whole_term,
        follow_on,
        aprc,
        projection,
        detail,
    }
}
