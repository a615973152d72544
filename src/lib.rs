//! Mortgage Model - Amortization, APRC and breakeven engine for mortgage comparisons
//!
//! This library provides:
//! - Amortization with fixed periods rolling onto follow-on variable rates
//! - Follow-on rate resolution against a lender rate catalog
//! - APRC estimates from an iterative IRR solver
//! - Remortgage, rent-vs-buy and cashback-vs-rate breakeven scenarios
//! - Parallel batch evaluation of many scenarios

pub mod money;
pub mod error;
pub mod config;
pub mod rates;
pub mod projection;
pub mod breakeven;
pub mod scenario;

// Re-export commonly used types
pub use error::{EngineError, Result};
pub use config::{AprcConfig, EngineConfig};
pub use money::Cents;
pub use rates::{BerRating, Rate, RateCatalog, RateProduct};
pub use breakeven::{Breakeven, BreakevenDisplay};
pub use scenario::{
    decode_share, encode_share, run_scenario, CashbackType, ScenarioInputs, ScenarioOutcome,
    ScenarioRunner,
};
