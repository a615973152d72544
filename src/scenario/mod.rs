//! Scenario orchestration
//!
//! Each scenario composes the rate catalog, the projection builders and the
//! breakeven search. `ScenarioInputs` is the serializable form used for share
//! links; re-running decoded inputs reproduces the same outcome.

mod remortgage;
mod rent_vs_buy;
mod cashback;

pub use remortgage::{run_remortgage, RemortgageInputs, RemortgageResult};
pub use rent_vs_buy::{run_rent_vs_buy, RentVsBuyDetails, RentVsBuyInputs, RentVsBuyResult};
pub use cashback::{
    comparison_horizon, run_cashback, CashbackInputs, CashbackOption, CashbackOptionResult,
    CashbackRankings, CashbackResult, PairwiseBreakeven,
};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::money::{percent_of, to_cents, Cents};
use crate::rates::RateCatalog;

/// How a lender's cashback is worked out
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CashbackType {
    #[default]
    None,
    /// Fixed amount
    Flat { amount: Cents },
    /// Percentage of the loan, optionally capped
    Percentage {
        pct: f64,
        #[serde(default)]
        cap: Option<Cents>,
    },
}

impl CashbackType {
    pub fn amount(&self, loan_amount: Cents) -> Cents {
        match *self {
            CashbackType::None => 0,
            CashbackType::Flat { amount } => amount,
            CashbackType::Percentage { pct, cap } => {
                let amount = to_cents(percent_of(loan_amount as f64, pct));
                cap.map_or(amount, |cap| amount.min(cap))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scenario", rename_all = "snake_case")]
pub enum ScenarioInputs {
    Remortgage(RemortgageInputs),
    RentVsBuy(RentVsBuyInputs),
    Cashback(CashbackInputs),
}

impl ScenarioInputs {
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioInputs::Remortgage(_) => "remortgage",
            ScenarioInputs::RentVsBuy(_) => "rent_vs_buy",
            ScenarioInputs::Cashback(_) => "cashback",
        }
    }

    /// Reject inputs the projections cannot run on
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| Err(EngineError::InvalidScenario(format!("{}: {}", self.name(), reason)));

        match self {
            ScenarioInputs::Remortgage(inputs) => {
                if inputs.remaining_term_months == 0 {
                    return invalid("remaining term must be at least one month");
                }
                if inputs.outstanding_balance < 0 {
                    return invalid("outstanding balance is negative");
                }
                inputs.new_rate.validate()
            }
            ScenarioInputs::RentVsBuy(inputs) => {
                if inputs.term_months == 0 {
                    return invalid("term must be at least one month");
                }
                if inputs.home.deposit > inputs.home.property_price {
                    return invalid("deposit exceeds the property price");
                }
                inputs.rate.validate()
            }
            ScenarioInputs::Cashback(inputs) => {
                if inputs.term_months == 0 {
                    return invalid("term must be at least one month");
                }
                if inputs.options.len() < 2 {
                    return invalid("at least two options are needed");
                }
                if inputs.comparison_months == Some(0) {
                    return invalid("comparison horizon must be at least one month");
                }
                inputs.options.iter().try_for_each(|option| option.rate.validate())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scenario", rename_all = "snake_case")]
pub enum ScenarioOutcome {
    Remortgage(RemortgageResult),
    RentVsBuy(RentVsBuyResult),
    Cashback(CashbackResult),
}

/// Validate and run one scenario
pub fn run_scenario(inputs: &ScenarioInputs, catalog: &RateCatalog, config: &EngineConfig) -> Result<ScenarioOutcome> {
    inputs.validate()?;
    Ok(match inputs {
        ScenarioInputs::Remortgage(inputs) => ScenarioOutcome::Remortgage(run_remortgage(inputs, catalog, config)),
        ScenarioInputs::RentVsBuy(inputs) => ScenarioOutcome::RentVsBuy(run_rent_vs_buy(inputs, catalog, config)),
        ScenarioInputs::Cashback(inputs) => ScenarioOutcome::Cashback(run_cashback(inputs, catalog, config)),
    })
}

/// Serialize scenario inputs for a share link
pub fn encode_share(inputs: &ScenarioInputs) -> Result<String> {
    Ok(serde_json::to_string(inputs)?)
}

pub fn decode_share(encoded: &str) -> Result<ScenarioInputs> {
    let inputs: ScenarioInputs = serde_json::from_str(encoded)?;
    inputs.validate()?;
    Ok(inputs)
}

/// Runs scenarios against one catalog and configuration
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new(catalog, EngineConfig::default());
/// let outcomes = runner.run_batch(&scenarios);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    catalog: RateCatalog,
    config: EngineConfig,
}

impl ScenarioRunner {
    pub fn new(catalog: RateCatalog, config: EngineConfig) -> Self {
        Self { catalog, config }
    }

    pub fn run(&self, inputs: &ScenarioInputs) -> Result<ScenarioOutcome> {
        run_scenario(inputs, &self.catalog, &self.config)
    }

    /// Run many scenarios in parallel; results keep the input order
    pub fn run_batch(&self, scenarios: &[ScenarioInputs]) -> Vec<Result<ScenarioOutcome>> {
        scenarios.par_iter().map(|inputs| self.run(inputs)).collect()
    }

    pub fn catalog(&self) -> &RateCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakeven::Breakeven;
    use crate::money::from_major;
    use crate::rates::{Rate, RateProduct};

    fn remortgage(new_rate_pct: f64) -> ScenarioInputs {
        ScenarioInputs::Remortgage(RemortgageInputs {
            outstanding_balance: from_major(300_000.0),
            property_value: from_major(500_000.0),
            remaining_term_months: 240,
            current_rate_pct: 4.5,
            new_rate: Rate::variable(RateProduct::new("svr", "boi", new_rate_pct)),
            ber: None,
            legal_fees: from_major(1_500.0),
            early_repayment_charge: 0,
            cashback: CashbackType::None,
        })
    }

    #[test]
    fn test_cashback_type_amounts() {
        let loan = from_major(300_000.0);
        assert_eq!(CashbackType::None.amount(loan), 0);
        assert_eq!(CashbackType::Flat { amount: from_major(3_000.0) }.amount(loan), from_major(3_000.0));
        assert_eq!(CashbackType::Percentage { pct: 2.0, cap: None }.amount(loan), from_major(6_000.0));
        assert_eq!(
            CashbackType::Percentage { pct: 2.0, cap: Some(from_major(5_000.0)) }.amount(loan),
            from_major(5_000.0)
        );
    }

    #[test]
    fn test_cashback_type_json_shape() {
        let json = r#"{"kind":"percentage","pct":1.5}"#;
        let parsed: CashbackType = serde_json::from_str(json).unwrap();
        assert_eq!(parsed, CashbackType::Percentage { pct: 1.5, cap: None });
    }

    #[test]
    fn test_zero_term_rejected() {
        let mut inputs = remortgage(3.5);
        if let ScenarioInputs::Remortgage(ref mut r) = inputs {
            r.remaining_term_months = 0;
        }
        let err = run_scenario(&inputs, &RateCatalog::default(), &EngineConfig::default()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidScenario(_)));
    }

    #[test]
    fn test_share_round_trip_reproduces_outcome() {
        let inputs = remortgage(3.5);
        let catalog = RateCatalog::default();
        let config = EngineConfig::default();

        let encoded = encode_share(&inputs).unwrap();
        let decoded = decode_share(&encoded).unwrap();
        assert_eq!(decoded, inputs);

        let original = run_scenario(&inputs, &catalog, &config).unwrap();
        let restored = run_scenario(&decoded, &catalog, &config).unwrap();
        assert_eq!(
            serde_json::to_string(&original).unwrap(),
            serde_json::to_string(&restored).unwrap()
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode_share("{\"scenario\":\"lottery\"}"), Err(EngineError::Json(_))));
    }

    #[test]
    fn test_batch_preserves_order() {
        let runner = ScenarioRunner::default();
        let scenarios = vec![remortgage(3.5), remortgage(5.0), remortgage(3.0)];
        let outcomes = runner.run_batch(&scenarios);

        assert_eq!(outcomes.len(), 3);
        let breakevens: Vec<Breakeven> = outcomes
            .into_iter()
            .map(|outcome| match outcome.unwrap() {
                ScenarioOutcome::Remortgage(result) => result.breakeven,
                other => panic!("unexpected outcome {:?}", other),
            })
            .collect();
        assert_eq!(breakevens[0], Breakeven::Month(10));
        assert_eq!(breakevens[1], Breakeven::Never);
        assert!(breakevens[2].month().unwrap() < 10);
    }
}
