//! Projection builders for the comparison scenarios
//!
//! Each builder steps the loans involved month by month, accumulates the
//! side cashflows of the scenario and rounds every snapshot to whole cents.

use serde::{Deserialize, Serialize};

use super::loan::{LoanMonth, LoanTerms};
use super::series::{
    CashbackMonth, CashbackPosition, Projection, RemortgageMonth, RentVsBuyMonth,
};
use crate::money::{percent_of, to_cents, Cents};

/// Home purchase and rental assumptions for a rent-vs-buy comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeCosts {
    pub property_price: Cents,
    pub deposit: Cents,

    /// Stamp duty, legal and other one-off purchase costs
    #[serde(default)]
    pub purchase_costs: Cents,

    /// Rent currently paid for an equivalent home
    pub monthly_rent: Cents,

    /// Rent rises once a year by this percentage
    #[serde(default)]
    pub annual_rent_increase_pct: f64,

    /// Home value growth per year, compounded monthly
    #[serde(default)]
    pub annual_appreciation_pct: f64,

    /// Upkeep per year as a percentage of the home value
    #[serde(default)]
    pub annual_maintenance_pct: f64,

    /// Agent and legal costs of selling, percent of the sale price
    #[serde(default)]
    pub sale_cost_pct: f64,
}

impl HomeCosts {
    pub fn mortgage_amount(&self) -> Cents {
        (self.property_price - self.deposit).max(0)
    }

    pub fn upfront_cash(&self) -> Cents {
        self.deposit + self.purchase_costs
    }

    /// Rent due in `month` (1-based); rises at each 12-month boundary
    pub fn rent_in_month(&self, month: u32) -> f64 {
        let years = month.saturating_sub(1) / 12;
        self.monthly_rent as f64 * (1.0 + self.annual_rent_increase_pct / 100.0).powi(years as i32)
    }

    /// Home value after `month` months
    pub fn home_value_at(&self, month: u32) -> f64 {
        self.property_price as f64 * (1.0 + self.annual_appreciation_pct / 100.0).powf(month as f64 / 12.0)
    }
}

/// One option in a cashback comparison
#[derive(Debug, Clone, PartialEq)]
pub struct CashbackLeg {
    pub terms: LoanTerms,
    pub cashback: Cents,
}

/// Current mortgage carried on vs switching, over `horizon_months`
pub fn project_remortgage(
    current: &LoanTerms,
    new: &LoanTerms,
    switching_costs: Cents,
    horizon_months: u32,
) -> Projection<RemortgageMonth> {
    let current_rows = current.project(horizon_months);
    let new_rows = new.project(horizon_months);

    let mut monthly = Vec::with_capacity(horizon_months as usize + 1);
    monthly.push(RemortgageMonth {
        month: 0,
        current_payment: to_cents(current.initial_payment()),
        new_payment: to_cents(new.initial_payment()),
        current_balance: to_cents(current.principal),
        new_balance: to_cents(new.principal),
        cumulative_current_interest: 0,
        cumulative_new_interest: 0,
        cumulative_current_payments: 0,
        cumulative_new_payments: 0,
        cumulative_savings: 0,
        switching_costs,
        net_savings: -switching_costs,
    });

    for (cur, new) in current_rows.iter().zip(&new_rows) {
        let cumulative_current_payments = to_cents(cur.cumulative_payments);
        let cumulative_new_payments = to_cents(new.cumulative_payments);
        let cumulative_savings = cumulative_current_payments - cumulative_new_payments;

        monthly.push(RemortgageMonth {
            month: cur.month,
            current_payment: to_cents(cur.payment),
            new_payment: to_cents(new.payment),
            current_balance: to_cents(cur.balance),
            new_balance: to_cents(new.balance),
            cumulative_current_interest: to_cents(cur.cumulative_interest),
            cumulative_new_interest: to_cents(new.cumulative_interest),
            cumulative_current_payments,
            cumulative_new_payments,
            cumulative_savings,
            switching_costs,
            net_savings: cumulative_savings - switching_costs,
        });
    }

    Projection::from_monthly(monthly)
}

/// Renting vs buying with `loan` financing the purchase
pub fn project_rent_vs_buy(home: &HomeCosts, loan: &LoanTerms, horizon_months: u32) -> Projection<RentVsBuyMonth> {
    let upfront_cash = home.upfront_cash();
    let sale_factor = 1.0 - home.sale_cost_pct / 100.0;
    let rows = loan.project(horizon_months);

    let snapshot = |month: u32, payment: f64, row: Option<&LoanMonth>, cumulative_rent: f64, cumulative_maintenance: f64| {
        let home_value = home.home_value_at(month);
        let balance = row.map_or(loan.principal, |r| r.balance);
        let cumulative_payments = row.map_or(0.0, |r| r.cumulative_payments);

        let home_value_c = to_cents(home_value);
        let balance_c = to_cents(balance);
        let cumulative_maintenance_c = to_cents(cumulative_maintenance);
        let equity = home_value_c - balance_c;

        RentVsBuyMonth {
            month,
            monthly_rent: to_cents(home.rent_in_month(month.max(1))),
            cumulative_rent: to_cents(cumulative_rent),
            mortgage_payment: to_cents(payment),
            cumulative_interest: to_cents(row.map_or(0.0, |r| r.cumulative_interest)),
            cumulative_principal: to_cents(row.map_or(0.0, |r| r.cumulative_principal)),
            cumulative_maintenance: cumulative_maintenance_c,
            home_value: home_value_c,
            remaining_balance: balance_c,
            equity,
            upfront_cash,
            net_ownership_cost: upfront_cash + to_cents(cumulative_payments) + cumulative_maintenance_c - equity,
            net_sale_proceeds: to_cents(home_value * sale_factor) - balance_c,
        }
    };

    let mut monthly = Vec::with_capacity(horizon_months as usize + 1);
    monthly.push(snapshot(0, loan.initial_payment(), None, 0.0, 0.0));

    let mut cumulative_rent = 0.0;
    let mut cumulative_maintenance = 0.0;
    for row in &rows {
        cumulative_rent += home.rent_in_month(row.month);
        cumulative_maintenance += percent_of(home.home_value_at(row.month), home.annual_maintenance_pct) / 12.0;
        monthly.push(snapshot(row.month, row.payment, Some(row), cumulative_rent, cumulative_maintenance));
    }

    Projection::from_monthly(monthly)
}

/// All cashback options side by side over `horizon_months`
pub fn project_cashback(legs: &[CashbackLeg], horizon_months: u32) -> Projection<CashbackMonth> {
    let rows: Vec<Vec<LoanMonth>> = legs.iter().map(|leg| leg.terms.project(horizon_months)).collect();

    let mut monthly = Vec::with_capacity(horizon_months as usize + 1);
    monthly.push(CashbackMonth {
        month: 0,
        positions: legs
            .iter()
            .map(|leg| {
                let balance = to_cents(leg.terms.principal);
                CashbackPosition {
                    payment: to_cents(leg.terms.initial_payment()),
                    balance,
                    cumulative_interest: 0,
                    cumulative_payments: 0,
                    adjusted_balance: balance - leg.cashback,
                    net_cost: -leg.cashback,
                }
            })
            .collect(),
    });

    for month in 1..=horizon_months {
        let idx = (month - 1) as usize;
        let positions = legs
            .iter()
            .zip(&rows)
            .map(|(leg, leg_rows)| {
                let row = &leg_rows[idx];
                let balance = to_cents(row.balance);
                let cumulative_interest = to_cents(row.cumulative_interest);
                CashbackPosition {
                    payment: to_cents(row.payment),
                    balance,
                    cumulative_interest,
                    cumulative_payments: to_cents(row.cumulative_payments),
                    adjusted_balance: balance - leg.cashback,
                    net_cost: cumulative_interest - leg.cashback,
                }
            })
            .collect();
        monthly.push(CashbackMonth { month, positions });
    }

    Projection::from_monthly(monthly)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn home() -> HomeCosts {
        HomeCosts {
            property_price: 40_000_000,
            deposit: 4_000_000,
            purchase_costs: 1_000_000,
            monthly_rent: 200_000,
            annual_rent_increase_pct: 3.0,
            annual_appreciation_pct: 2.0,
            annual_maintenance_pct: 0.0,
            sale_cost_pct: 2.0,
        }
    }

    #[test]
    fn test_remortgage_savings_accumulate() {
        let current = LoanTerms::constant(30_000_000.0, 4.5, 240);
        let new = LoanTerms::constant(30_000_000.0, 3.5, 240);
        let projection = project_remortgage(&current, &new, 150_000, 240);

        assert_eq!(projection.monthly.len(), 241);
        assert_eq!(projection.yearly.len(), 20);
        assert_eq!(projection.monthly[0].net_savings, -150_000);

        let month_one = &projection.monthly[1];
        assert!(month_one.cumulative_savings > 0);
        assert_eq!(
            month_one.cumulative_savings,
            month_one.cumulative_current_payments - month_one.cumulative_new_payments
        );
        assert!(projection.monthly.windows(2).all(|w| w[1].cumulative_savings >= w[0].cumulative_savings));
        assert_eq!(projection.yearly[0], projection.monthly[12]);
    }

    #[test]
    fn test_rent_vs_buy_month_zero() {
        let home = home();
        let loan = LoanTerms::constant(home.mortgage_amount() as f64, 3.5, 300);
        let projection = project_rent_vs_buy(&home, &loan, 300);
        let start = &projection.monthly[0];

        assert_eq!(start.equity, 4_000_000);
        assert_eq!(start.upfront_cash, 5_000_000);
        assert_eq!(start.net_ownership_cost, 1_000_000);
        assert_eq!(start.cumulative_rent, 0);
        assert_eq!(start.net_sale_proceeds, 39_200_000 - 36_000_000);
    }

    #[test]
    fn test_rent_steps_up_yearly() {
        let home = home();
        assert_eq!(home.rent_in_month(1), 200_000.0);
        assert_eq!(home.rent_in_month(12), 200_000.0);
        assert!((home.rent_in_month(13) - 206_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_rent_vs_buy_equity_grows() {
        let home = home();
        let loan = LoanTerms::constant(home.mortgage_amount() as f64, 3.5, 300);
        let projection = project_rent_vs_buy(&home, &loan, 300);

        let last = projection.last().unwrap();
        assert_eq!(last.remaining_balance, 0);
        assert_eq!(last.equity, last.home_value);
        assert!(projection.monthly[120].equity > projection.monthly[60].equity);
    }

    #[test]
    fn test_cashback_positions_start_at_minus_cashback() {
        let legs = vec![
            CashbackLeg { terms: LoanTerms::constant(35_000_000.0, 4.0, 300), cashback: 700_000 },
            CashbackLeg { terms: LoanTerms::constant(35_000_000.0, 3.5, 300), cashback: 0 },
        ];
        let projection = project_cashback(&legs, 36);

        assert_eq!(projection.monthly.len(), 37);
        assert_eq!(projection.monthly[0].positions[0].net_cost, -700_000);
        assert_eq!(projection.monthly[0].positions[1].net_cost, 0);
        assert_eq!(projection.yearly.len(), 3);

        let end = &projection.monthly[36].positions;
        assert_eq!(end[0].net_cost, end[0].cumulative_interest - 700_000);
        assert!(end[0].cumulative_interest > end[1].cumulative_interest);
    }
}
