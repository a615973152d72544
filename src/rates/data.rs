//! Rate data structures matching the lender catalog format

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::money::Cents;

/// Buyer category a product is open to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuyerCategory {
    FirstTimeBuyer,
    Mover,
    Switcher,
}

impl FromStr for BuyerCategory {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ftb" | "first_time_buyer" | "first-time-buyer" => Ok(BuyerCategory::FirstTimeBuyer),
            "mover" => Ok(BuyerCategory::Mover),
            "switcher" => Ok(BuyerCategory::Switcher),
            other => Err(EngineError::UnknownValue {
                field: "buyer category",
                value: other.to_string(),
            }),
        }
    }
}

/// Building energy rating band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BerRating {
    A1,
    A2,
    A3,
    B1,
    B2,
    B3,
    C1,
    C2,
    C3,
    D1,
    D2,
    E1,
    E2,
    F,
    G,
    Exempt,
}

impl BerRating {
    pub fn as_str(&self) -> &'static str {
        match self {
            BerRating::A1 => "A1",
            BerRating::A2 => "A2",
            BerRating::A3 => "A3",
            BerRating::B1 => "B1",
            BerRating::B2 => "B2",
            BerRating::B3 => "B3",
            BerRating::C1 => "C1",
            BerRating::C2 => "C2",
            BerRating::C3 => "C3",
            BerRating::D1 => "D1",
            BerRating::D2 => "D2",
            BerRating::E1 => "E1",
            BerRating::E2 => "E2",
            BerRating::F => "F",
            BerRating::G => "G",
            BerRating::Exempt => "Exempt",
        }
    }
}

impl fmt::Display for BerRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BerRating {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        let rating = match s.trim().to_ascii_uppercase().as_str() {
            "A1" => BerRating::A1,
            "A2" => BerRating::A2,
            "A3" => BerRating::A3,
            "B1" => BerRating::B1,
            "B2" => BerRating::B2,
            "B3" => BerRating::B3,
            "C1" => BerRating::C1,
            "C2" => BerRating::C2,
            "C3" => BerRating::C3,
            "D1" => BerRating::D1,
            "D2" => BerRating::D2,
            "E1" => BerRating::E1,
            "E2" => BerRating::E2,
            "F" => BerRating::F,
            "G" => BerRating::G,
            "EXEMPT" => BerRating::Exempt,
            other => {
                return Err(EngineError::UnknownValue {
                    field: "BER rating",
                    value: other.to_string(),
                })
            }
        };
        Ok(rating)
    }
}

/// Product perk, resolved to a variant at the catalog boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Perk {
    Cashback,
    LegalFeeContribution,
    ValuationFeeRefund,
    GreenRate,
    /// Anything the engine does not model
    #[serde(other)]
    Unknown,
}

impl Perk {
    /// Lenient parse used by the CSV loader; unrecognised perks map to `Unknown`
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "cashback" => Perk::Cashback,
            "legal_fee_contribution" | "legal_fees" => Perk::LegalFeeContribution,
            "valuation_fee_refund" | "valuation_refund" => Perk::ValuationFeeRefund,
            "green_rate" | "green" => Perk::GreenRate,
            _ => Perk::Unknown,
        }
    }
}

fn default_max_ltv() -> f64 {
    100.0
}

/// Attributes shared by fixed and variable products
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateProduct {
    /// Unique product identifier
    pub id: String,

    /// Lender identifier, used to find follow-on rates
    pub lender_id: String,

    /// Nominal annual rate in percent
    pub rate_pct: f64,

    /// Officially disclosed APRC in percent, if the lender publishes one
    #[serde(default)]
    pub apr_pct: Option<f64>,

    /// Lowest LTV (percent) the product accepts, inclusive
    #[serde(default)]
    pub min_ltv: f64,

    /// Highest LTV (percent) the product accepts, inclusive
    #[serde(default = "default_max_ltv")]
    pub max_ltv: f64,

    /// Minimum loan size in minor units
    #[serde(default)]
    pub min_loan: Option<Cents>,

    /// Buyer categories the product is open to (empty = everyone)
    #[serde(default)]
    pub buyer_categories: Vec<BuyerCategory>,

    /// Energy ratings the product is restricted to (None = unrestricted)
    #[serde(default)]
    pub ber_eligible: Option<Vec<BerRating>>,

    #[serde(default)]
    pub perks: Vec<Perk>,

    /// Free-text caveat shown next to the product
    #[serde(default)]
    pub warning: Option<String>,

    /// True for rates the user typed in rather than catalog products
    #[serde(default)]
    pub custom: bool,
}

impl RateProduct {
    /// Minimal product covering every LTV, used by tests and custom rates
    pub fn new(id: impl Into<String>, lender_id: impl Into<String>, rate_pct: f64) -> Self {
        Self {
            id: id.into(),
            lender_id: lender_id.into(),
            rate_pct,
            apr_pct: None,
            min_ltv: 0.0,
            max_ltv: 100.0,
            min_loan: None,
            buyer_categories: Vec::new(),
            ber_eligible: None,
            perks: Vec::new(),
            warning: None,
            custom: false,
        }
    }

    /// Restrict to an LTV band
    pub fn with_ltv_band(mut self, min_ltv: f64, max_ltv: f64) -> Self {
        self.min_ltv = min_ltv;
        self.max_ltv = max_ltv;
        self
    }

    pub fn covers_ltv(&self, ltv_pct: f64) -> bool {
        ltv_pct >= self.min_ltv && ltv_pct <= self.max_ltv
    }

    /// Width of the LTV band; narrower means more specific
    pub fn ltv_band_width(&self) -> f64 {
        self.max_ltv - self.min_ltv
    }

    /// Unrestricted products accept any rating, including none
    pub fn accepts_ber(&self, ber: Option<BerRating>) -> bool {
        match (&self.ber_eligible, ber) {
            (None, _) => true,
            (Some(allowed), Some(rating)) => allowed.contains(&rating),
            (Some(_), None) => false,
        }
    }

    pub fn accepts_buyer(&self, buyer: BuyerCategory) -> bool {
        self.buyer_categories.is_empty() || self.buyer_categories.contains(&buyer)
    }

    pub fn accepts_loan(&self, loan: Cents) -> bool {
        self.min_loan.map_or(true, |min| loan >= min)
    }
}

/// A fixed-rate product; the fixed term is always present
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedRate {
    #[serde(flatten)]
    pub product: RateProduct,

    /// Length of the fixed period in months
    pub fixed_term_months: u32,
}

/// A variable-rate product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableRate {
    #[serde(flatten)]
    pub product: RateProduct,
}

/// One lender product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Rate {
    Fixed(FixedRate),
    Variable(VariableRate),
}

impl Rate {
    pub fn fixed(product: RateProduct, fixed_term_months: u32) -> Self {
        Rate::Fixed(FixedRate { product, fixed_term_months })
    }

    pub fn variable(product: RateProduct) -> Self {
        Rate::Variable(VariableRate { product })
    }

    pub fn product(&self) -> &RateProduct {
        match self {
            Rate::Fixed(fixed) => &fixed.product,
            Rate::Variable(variable) => &variable.product,
        }
    }

    pub fn id(&self) -> &str {
        &self.product().id
    }

    pub fn lender_id(&self) -> &str {
        &self.product().lender_id
    }

    pub fn rate_pct(&self) -> f64 {
        self.product().rate_pct
    }

    pub fn apr_pct(&self) -> Option<f64> {
        self.product().apr_pct
    }

    /// Fixed period length, `None` for variable products
    pub fn fixed_term_months(&self) -> Option<u32> {
        match self {
            Rate::Fixed(fixed) => Some(fixed.fixed_term_months),
            Rate::Variable(_) => None,
        }
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self, Rate::Fixed(_))
    }

    /// Check the record invariants
    pub fn validate(&self) -> Result<()> {
        let product = self.product();
        let invalid = |reason: String| EngineError::InvalidRate {
            id: product.id.clone(),
            reason,
        };

        if !product.rate_pct.is_finite() || product.rate_pct < 0.0 {
            return Err(invalid(format!("rate must be non-negative, got {}", product.rate_pct)));
        }
        if product.min_ltv > product.max_ltv {
            return Err(invalid(format!(
                "min LTV {} exceeds max LTV {}",
                product.min_ltv, product.max_ltv
            )));
        }
        if let Some(0) = self.fixed_term_months() {
            return Err(invalid("fixed term must be at least one month".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_json_is_tagged() {
        let rate = Rate::fixed(RateProduct::new("aib-3yr", "aib", 3.85), 36);
        let json = serde_json::to_value(&rate).unwrap();

        assert_eq!(json["type"], "fixed");
        assert_eq!(json["fixed_term_months"], 36);
        assert_eq!(json["lender_id"], "aib");

        let back: Rate = serde_json::from_value(json).unwrap();
        assert_eq!(back, rate);
    }

    #[test]
    fn test_variable_has_no_fixed_term() {
        let json = r#"{"type":"variable","id":"aib-svr","lender_id":"aib","rate_pct":4.15,"min_ltv":0,"max_ltv":80}"#;
        let rate: Rate = serde_json::from_str(json).unwrap();

        assert!(!rate.is_fixed());
        assert_eq!(rate.fixed_term_months(), None);
        assert!(rate.product().covers_ltv(80.0));
        assert!(!rate.product().covers_ltv(80.01));
    }

    #[test]
    fn test_validate_rejects_inverted_band() {
        let rate = Rate::variable(RateProduct::new("bad", "x", 4.0).with_ltv_band(90.0, 80.0));
        assert!(matches!(rate.validate(), Err(EngineError::InvalidRate { .. })));
    }

    #[test]
    fn test_ber_restriction() {
        let mut product = RateProduct::new("green", "boi", 3.5);
        assert!(product.accepts_ber(None));

        product.ber_eligible = Some(vec![BerRating::A1, BerRating::A2, BerRating::A3]);
        assert!(product.accepts_ber(Some(BerRating::A2)));
        assert!(!product.accepts_ber(Some(BerRating::B1)));
        assert!(!product.accepts_ber(None));
    }

    #[test]
    fn test_unknown_perk_maps_to_catch_all() {
        let perks: Vec<Perk> = serde_json::from_str(r#"["cashback","free_pizza"]"#).unwrap();
        assert_eq!(perks, vec![Perk::Cashback, Perk::Unknown]);
        assert_eq!(Perk::parse("Green-Rate"), Perk::GreenRate);
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!("b2".parse::<BerRating>().unwrap(), BerRating::B2);
        assert_eq!("FTB".parse::<BuyerCategory>().unwrap(), BuyerCategory::FirstTimeBuyer);
        assert!("Z9".parse::<BerRating>().is_err());
    }
}
