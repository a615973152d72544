//! End-to-end scenario checks through the public API
//!
//! Each scenario is built from JSON the way a caller or a share link would
//! supply it, then run through `ScenarioRunner`.

use approx::assert_abs_diff_eq;
use mortgage_model::projection::{monthly_payment, remaining_balance, solve_aprc, AprcFeeConfig, AprcInputs, LoanTerms};
use mortgage_model::{
    decode_share, encode_share, AprcConfig, Breakeven, EngineConfig, RateCatalog, ScenarioInputs,
    ScenarioOutcome, ScenarioRunner,
};

/// Helper to parse scenario JSON
fn scenario(json: &str) -> ScenarioInputs {
    serde_json::from_str(json).expect("scenario JSON should parse")
}

fn remortgage_example() -> ScenarioInputs {
    scenario(
        r#"{
            "scenario": "remortgage",
            "outstanding_balance": 30000000,
            "property_value": 50000000,
            "remaining_term_months": 240,
            "current_rate_pct": 4.5,
            "new_rate": { "type": "variable", "id": "svr-35", "lender_id": "boi", "rate_pct": 3.5 },
            "legal_fees": 150000
        }"#,
    )
}

fn cashback_example() -> ScenarioInputs {
    scenario(
        r#"{
            "scenario": "cashback",
            "mortgage_amount": 35000000,
            "property_value": 45000000,
            "term_months": 300,
            "options": [
                {
                    "rate": { "type": "fixed", "id": "cb-4", "lender_id": "a", "rate_pct": 4.0, "fixed_term_months": 36 },
                    "cashback": { "kind": "flat", "amount": 700000 }
                },
                {
                    "rate": { "type": "fixed", "id": "plain-35", "lender_id": "b", "rate_pct": 3.5, "fixed_term_months": 36 }
                }
            ]
        }"#,
    )
}

fn rent_vs_buy_example() -> ScenarioInputs {
    scenario(
        r#"{
            "scenario": "rent_vs_buy",
            "property_price": 40000000,
            "deposit": 4000000,
            "purchase_costs": 1000000,
            "monthly_rent": 200000,
            "annual_rent_increase_pct": 3.0,
            "annual_appreciation_pct": 3.0,
            "annual_maintenance_pct": 0.5,
            "sale_cost_pct": 2.5,
            "rate": { "type": "variable", "id": "svr", "lender_id": "boi", "rate_pct": 3.75 },
            "term_months": 360
        }"#,
    )
}

// ============================================================================
// Amortization properties
// ============================================================================

#[test]
fn test_zero_rate_payment_is_straight_line() {
    for (principal, term) in [(30_000_000.0, 240), (12_345_678.0, 7), (100.0, 1)] {
        assert_abs_diff_eq!(monthly_payment(principal, 0.0, term), principal / term as f64, epsilon = 1e-9);
    }
}

#[test]
fn test_balance_cleared_at_term() {
    for rate in [0.5, 3.5, 7.25, 15.0] {
        assert_abs_diff_eq!(remaining_balance(30_000_000.0, rate, 300, 300), 0.0, epsilon = 1.0);
    }
}

#[test]
fn test_total_repayable_not_below_principal() {
    for rate in [0.01, 2.0, 4.5, 9.0] {
        let terms = LoanTerms::with_follow_on(30_000_000.0, rate, 36, rate + 1.0, 300);
        assert!(terms.total_repayable() >= terms.principal);
    }
}

#[test]
fn test_fee_free_aprc_matches_nominal() {
    let inputs = AprcInputs {
        fixed_rate_pct: 3.9,
        fixed_months: 0,
        follow_on_rate_pct: 3.9,
    };
    let estimate = solve_aprc(&inputs, &AprcFeeConfig::none(), &AprcConfig::default());
    assert!(estimate.converged);
    assert_abs_diff_eq!(estimate.aprc_pct, 3.9, epsilon = 1e-4);
}

// ============================================================================
// Scenario examples
// ============================================================================

#[test]
fn test_remortgage_example_breaks_even() {
    let runner = ScenarioRunner::default();
    let outcome = runner.run(&remortgage_example()).unwrap();

    let ScenarioOutcome::Remortgage(result) = outcome else {
        panic!("expected a remortgage outcome");
    };
    let month = result.breakeven.month().expect("finite breakeven");
    assert!(result.monthly_savings > 0);
    assert!(result.total_interest_saved > 0);

    // First crossing: true at the month, false the month before
    let at = &result.projection.monthly[month as usize];
    assert!(at.cumulative_savings >= at.switching_costs);
    if month > 0 {
        let before = &result.projection.monthly[month as usize - 1];
        assert!(before.cumulative_savings < before.switching_costs);
    }
}

#[test]
fn test_missing_follow_on_keeps_totals() {
    let inputs = scenario(
        r#"{
            "scenario": "remortgage",
            "outstanding_balance": 30000000,
            "property_value": 50000000,
            "remaining_term_months": 240,
            "current_rate_pct": 4.5,
            "new_rate": { "type": "fixed", "id": "x-2yr", "lender_id": "x", "rate_pct": 3.2, "fixed_term_months": 24 },
            "legal_fees": 150000
        }"#,
    );
    let runner = ScenarioRunner::default();
    let ScenarioOutcome::Remortgage(result) = runner.run(&inputs).unwrap() else {
        panic!("expected a remortgage outcome");
    };

    assert!(result.uses_fixed_rate_for_whole_term);
    assert!(result.total_interest_new > 0);
    assert!(result.total_repayable_new > 0);
    assert!(result.aprc.aprc_pct.is_finite());

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["uses_fixed_rate_for_whole_term"], true);
    assert!(!json["total_interest_saved"].is_null());
}

#[test]
fn test_cashback_example_net_costs_differ() {
    let runner = ScenarioRunner::default();
    let ScenarioOutcome::Cashback(result) = runner.run(&cashback_example()).unwrap() else {
        panic!("expected a cashback outcome");
    };

    assert_eq!(result.comparison_months, 36);
    assert_eq!(result.pairwise.len(), 1);
    let difference = result.options[1].net_cost - result.options[0].net_cost;
    assert!(difference > 0);
    assert_eq!(result.pairwise[0].breakeven, Breakeven::Never);
}

#[test]
fn test_rent_vs_buy_breakevens_are_first_crossings() {
    let runner = ScenarioRunner::default();
    let ScenarioOutcome::RentVsBuy(result) = runner.run(&rent_vs_buy_example()).unwrap() else {
        panic!("expected a rent vs buy outcome");
    };

    let month = result.sale_breakeven.month().expect("sale breakeven");
    let at = &result.projection.monthly[month as usize];
    let before = &result.projection.monthly[month as usize - 1];
    assert!(at.net_sale_proceeds > at.upfront_cash);
    assert!(before.net_sale_proceeds <= before.upfront_cash);

    // Yearly rows are samples of the monthly series
    for row in &result.projection.yearly {
        assert_eq!(row, &result.projection.monthly[row.month as usize]);
    }
}

// ============================================================================
// Share links
// ============================================================================

#[test]
fn test_share_round_trip_is_identical() {
    let runner = ScenarioRunner::new(RateCatalog::default(), EngineConfig::default());

    for inputs in [remortgage_example(), cashback_example(), rent_vs_buy_example()] {
        let encoded = encode_share(&inputs).unwrap();
        let decoded = decode_share(&encoded).unwrap();

        let original = serde_json::to_string(&runner.run(&inputs).unwrap()).unwrap();
        let restored = serde_json::to_string(&runner.run(&decoded).unwrap()).unwrap();
        assert_eq!(original, restored, "{} outcome changed after round trip", inputs.name());
    }
}

#[test]
fn test_batch_matches_single_runs() {
    let runner = ScenarioRunner::default();
    let scenarios = vec![cashback_example(), remortgage_example(), rent_vs_buy_example()];

    let batch = runner.run_batch(&scenarios);
    for (inputs, outcome) in scenarios.iter().zip(batch) {
        assert_eq!(outcome.unwrap(), runner.run(inputs).unwrap());
    }
}
