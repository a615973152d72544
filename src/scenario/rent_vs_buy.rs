//! Rent vs buy
//!
//! Three breakevens are searched over the same projection because they
//! answer different questions and usually land in different months:
//! - net worth: renting has cost more than owning
//! - sale: selling would return more than the cash put in
//! - equity: equity alone exceeds the cash put in

use serde::{Deserialize, Serialize};

use crate::breakeven::{find_breakeven, Breakeven, BreakevenDisplay};
use crate::config::EngineConfig;
use crate::money::{to_cents, Cents};
use crate::projection::{
    aprc_for_rate, project_rent_vs_buy, projected_ltv_pct, remaining_balance, AprcEstimate,
    HomeCosts, LoanTerms, Projection, RentVsBuyMonth,
};
use crate::rates::{BerRating, FollowOnResolution, Rate, RateCatalog};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentVsBuyInputs {
    #[serde(flatten)]
    pub home: HomeCosts,

    /// Mortgage product financing the purchase
    pub rate: Rate,

    pub term_months: u32,

    #[serde(default)]
    pub ber: Option<BerRating>,
}

/// Projection rows frozen at each breakeven
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentVsBuyDetails {
    pub net_worth: Option<RentVsBuyMonth>,
    pub sale: Option<RentVsBuyMonth>,
    pub equity: Option<RentVsBuyMonth>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentVsBuyResult {
    pub mortgage_amount: Cents,
    pub upfront_cash: Cents,
    pub monthly_payment: Cents,
    pub follow_on_payment: Option<Cents>,

    /// Cumulative rent above the net ownership cost
    pub net_worth_breakeven: Breakeven,
    /// Net sale proceeds above the upfront cash
    pub sale_breakeven: Breakeven,
    /// Equity above the upfront cash
    pub equity_breakeven: Breakeven,

    pub net_worth_display: BreakevenDisplay,
    pub sale_display: BreakevenDisplay,
    pub equity_display: BreakevenDisplay,

    pub follow_on: FollowOnResolution,
    pub uses_fixed_rate_for_whole_term: bool,
    pub aprc: AprcEstimate,

    pub projection: Projection<RentVsBuyMonth>,
    pub details: RentVsBuyDetails,
}

pub fn run_rent_vs_buy(inputs: &RentVsBuyInputs, catalog: &RateCatalog, config: &EngineConfig) -> RentVsBuyResult {
    let home = &inputs.home;
    let term = inputs.term_months;
    let mortgage_amount = home.mortgage_amount();
    let principal = mortgage_amount as f64;

    // Follow-on matched against the balance and home value when the fixed period ends
    let ltv_pct = match inputs.rate.fixed_term_months() {
        Some(fixed) => projected_ltv_pct(
            remaining_balance(principal, inputs.rate.rate_pct(), term, fixed),
            home.home_value_at(fixed),
        ),
        None => projected_ltv_pct(principal, home.property_price as f64),
    };
    let follow_on = catalog.follow_on_for(&inputs.rate, ltv_pct, inputs.ber);
    let loan = LoanTerms::for_rate(principal, &inputs.rate, &follow_on, term);

    let projection = project_rent_vs_buy(home, &loan, term);
    let monthly = &projection.monthly;

    // Strict: a tie at month 0 (no purchase costs) is not a crossing
    let net_worth_breakeven = find_breakeven(monthly, |m| m.cumulative_rent > m.net_ownership_cost);
    let sale_breakeven = find_breakeven(monthly, |m| m.net_sale_proceeds > m.upfront_cash);
    let equity_breakeven = find_breakeven(monthly, |m| m.equity > m.upfront_cash);

    let freeze = |breakeven: Breakeven| {
        breakeven
            .month()
            .and_then(|month| projection.at_month(month))
            .cloned()
    };
    let details = RentVsBuyDetails {
        net_worth: freeze(net_worth_breakeven),
        sale: freeze(sale_breakeven),
        equity: freeze(equity_breakeven),
    };

    let fees = config.fees_for(inputs.rate.lender_id());
    let aprc = aprc_for_rate(&inputs.rate, &follow_on, fees, &config.aprc);
    let threshold = config.month_resolution_threshold;

    log::debug!(
        "Rent vs buy on {}: net worth {:?}, sale {:?}, equity {:?}",
        inputs.rate.id(),
        net_worth_breakeven.month(),
        sale_breakeven.month(),
        equity_breakeven.month()
    );

    RentVsBuyResult {
        mortgage_amount,
        upfront_cash: home.upfront_cash(),
        monthly_payment: to_cents(loan.initial_payment()),
        follow_on_payment: loan.follow_on_payment().map(to_cents),
        net_worth_breakeven,
        sale_breakeven,
        equity_breakeven,
        net_worth_display: net_worth_breakeven.display(threshold),
        sale_display: sale_breakeven.display(threshold),
        equity_display: equity_breakeven.display(threshold),
        uses_fixed_rate_for_whole_term: follow_on.uses_fixed_rate_for_whole_term,
        follow_on,
        aprc,
        details,
        projection,
    }
}
