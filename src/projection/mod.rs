//! Loan math, APRC and the monthly/yearly projections built on them

mod amortization;
mod loan;
mod series;
mod engine;
mod aprc;

pub use amortization::{
    amortization_schedule, monthly_payment, monthly_rate, projected_ltv_pct, remaining_balance,
    split_payment, total_repayable, PaymentSplit, ScheduleRow,
};
pub use loan::{LoanMonth, LoanState, LoanTerms};
pub use series::{
    sample_yearly, year_of_month, CashbackMonth, CashbackPosition, PeriodSnapshot, Projection,
    RemortgageMonth, RentVsBuyMonth,
};
pub use engine::{project_cashback, project_remortgage, project_rent_vs_buy, CashbackLeg, HomeCosts};
pub use aprc::{
    aprc_cashflows, aprc_for_rate, solve_aprc, AprcEstimate, AprcFeeConfig, AprcInputs, AprcSource,
};
