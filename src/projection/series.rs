//! Period snapshots and the monthly/yearly series that hold them
//!
//! Monthly series start at month 0 (before any payment), so index and month
//! coincide. Yearly series are samples of the monthly one, never a separate
//! computation.

use serde::{Deserialize, Serialize};

use crate::money::Cents;

/// A point in a projection time series
pub trait PeriodSnapshot {
    /// Months since the start of the projection
    fn month(&self) -> u32;
}

/// Monthly and yearly views of one projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection<T> {
    pub horizon_months: u32,

    /// Entries for months 0..=horizon_months
    pub monthly: Vec<T>,

    /// Entries at each 12-month boundary, plus the horizon if it is not one
    pub yearly: Vec<T>,
}

impl<T: PeriodSnapshot + Clone> Projection<T> {
    pub fn from_monthly(monthly: Vec<T>) -> Self {
        let horizon_months = monthly.last().map(|entry| entry.month()).unwrap_or(0);
        let yearly = sample_yearly(&monthly);
        Self {
            horizon_months,
            monthly,
            yearly,
        }
    }

    pub fn at_month(&self, month: u32) -> Option<&T> {
        self.monthly.get(month as usize)
    }

    pub fn last(&self) -> Option<&T> {
        self.monthly.last()
    }
}

/// Pick the year-end entries out of a monthly series
pub fn sample_yearly<T: PeriodSnapshot + Clone>(monthly: &[T]) -> Vec<T> {
    let mut yearly: Vec<T> = monthly
        .iter()
        .filter(|entry| entry.month() > 0 && entry.month() % 12 == 0)
        .cloned()
        .collect();

    if let Some(last) = monthly.last() {
        if last.month() % 12 != 0 {
            yearly.push(last.clone());
        }
    }
    yearly
}

/// Year number (1-based) a month falls in
pub fn year_of_month(month: u32) -> u32 {
    (month + 11) / 12
}

/// Current mortgage vs a new one, month by month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemortgageMonth {
    pub month: u32,
    pub current_payment: Cents,
    pub new_payment: Cents,
    pub current_balance: Cents,
    pub new_balance: Cents,
    pub cumulative_current_interest: Cents,
    pub cumulative_new_interest: Cents,
    pub cumulative_current_payments: Cents,
    pub cumulative_new_payments: Cents,
    /// Payments avoided by switching so far
    pub cumulative_savings: Cents,
    /// Legal fees plus early-repayment charge minus cashback
    pub switching_costs: Cents,
    /// `cumulative_savings - switching_costs`
    pub net_savings: Cents,
}

impl PeriodSnapshot for RemortgageMonth {
    fn month(&self) -> u32 {
        self.month
    }
}

/// Renting vs buying the same home, month by month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentVsBuyMonth {
    pub month: u32,
    pub monthly_rent: Cents,
    pub cumulative_rent: Cents,
    pub mortgage_payment: Cents,
    pub cumulative_interest: Cents,
    pub cumulative_principal: Cents,
    pub cumulative_maintenance: Cents,
    pub home_value: Cents,
    pub remaining_balance: Cents,
    /// Home value minus remaining balance
    pub equity: Cents,
    /// Deposit plus purchase costs
    pub upfront_cash: Cents,
    /// Money spent on owning that is not held as equity
    pub net_ownership_cost: Cents,
    /// Home value less selling costs less the remaining balance
    pub net_sale_proceeds: Cents,
}

impl PeriodSnapshot for RentVsBuyMonth {
    fn month(&self) -> u32 {
        self.month
    }
}

/// One option's position in a cashback comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashbackPosition {
    pub payment: Cents,
    pub balance: Cents,
    pub cumulative_interest: Cents,
    pub cumulative_payments: Cents,
    /// Balance minus cashback
    pub adjusted_balance: Cents,
    /// Cumulative interest minus cashback
    pub net_cost: Cents,
}

/// All options of a cashback comparison at one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashbackMonth {
    pub month: u32,
    /// In option order
    pub positions: Vec<CashbackPosition>,
}

impl PeriodSnapshot for CashbackMonth {
    fn month(&self) -> u32 {
        self.month
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Tick(u32);

    impl PeriodSnapshot for Tick {
        fn month(&self) -> u32 {
            self.0
        }
    }

    #[test]
    fn test_yearly_samples_year_ends() {
        let monthly: Vec<Tick> = (0..=36).map(Tick).collect();
        let yearly = sample_yearly(&monthly);
        assert_eq!(yearly, vec![Tick(12), Tick(24), Tick(36)]);
    }

    #[test]
    fn test_partial_final_year_kept() {
        let projection = Projection::from_monthly((0..=30).map(Tick).collect());
        assert_eq!(projection.horizon_months, 30);
        assert_eq!(projection.yearly, vec![Tick(12), Tick(24), Tick(30)]);
        assert_eq!(projection.at_month(7), Some(&Tick(7)));
    }

    #[test]
    fn test_short_series_has_single_sample() {
        let yearly = sample_yearly(&(0..=5).map(Tick).collect::<Vec<_>>());
        assert_eq!(yearly, vec![Tick(5)]);
        assert!(sample_yearly::<Tick>(&[]).is_empty());
    }

    #[test]
    fn test_year_of_month() {
        assert_eq!(year_of_month(1), 1);
        assert_eq!(year_of_month(12), 1);
        assert_eq!(year_of_month(13), 2);
    }
}
