//! Engine configuration
//!
//! Defaults reproduce the standard disclosure setup; every field can be
//! overridden from a JSON file and a few from the environment.

use std::collections::HashMap;
use std::env;
use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::money::Cents;
use crate::projection::AprcFeeConfig;

/// Environment variable overriding the APRC reference loan (minor units)
pub const ENV_APRC_REFERENCE_LOAN: &str = "APRC_REFERENCE_LOAN";
/// Environment variable overriding the APRC reference term (months)
pub const ENV_APRC_REFERENCE_TERM: &str = "APRC_REFERENCE_TERM";
/// Environment variable overriding the APRC iteration cap
pub const ENV_APRC_MAX_ITERATIONS: &str = "APRC_MAX_ITERATIONS";

/// Settings for the APRC root finder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AprcConfig {
    /// Normalisation loan amount, not the borrower's own
    pub reference_loan: Cents,

    /// Normalisation term in months
    pub reference_term_months: u32,

    /// Lower end of the annual rate bracket (percent)
    pub min_annual_pct: f64,

    /// Upper end of the annual rate bracket (percent)
    pub max_annual_pct: f64,

    /// NPV residual tolerance as a fraction of the reference loan
    pub tolerance_ratio: f64,

    /// Hard cap on solver iterations
    pub max_iterations: u32,
}

impl Default for AprcConfig {
    fn default() -> Self {
        Self {
            reference_loan: 10_000_000, // €100,000
            reference_term_months: 240,
            min_annual_pct: 0.0,
            max_annual_pct: 30.0,
            tolerance_ratio: 1e-6,
            max_iterations: 100,
        }
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub aprc: AprcConfig,

    /// Fees assumed for lenders without an entry in `lender_fees`
    pub default_fees: AprcFeeConfig,

    /// Per-lender fee schedules keyed by lender id
    pub lender_fees: HashMap<String, AprcFeeConfig>,

    /// Breakevens earlier than this many months are reported month by month
    pub month_resolution_threshold: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            aprc: AprcConfig::default(),
            default_fees: AprcFeeConfig::default(),
            lender_fees: HashMap::new(),
            month_resolution_threshold: 24,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file; missing fields keep their defaults
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }

    /// Apply overrides from the process environment
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(loan) = env::var(ENV_APRC_REFERENCE_LOAN)
            .ok()
            .and_then(|s| s.parse().ok())
        {
            self.aprc.reference_loan = loan;
        }
        if let Some(term) = env::var(ENV_APRC_REFERENCE_TERM)
            .ok()
            .and_then(|s| s.parse().ok())
        {
            self.aprc.reference_term_months = term;
        }
        if let Some(iterations) = env::var(ENV_APRC_MAX_ITERATIONS)
            .ok()
            .and_then(|s| s.parse().ok())
        {
            self.aprc.max_iterations = iterations;
        }
        self
    }

    /// Fee schedule for a lender, falling back to the defaults
    pub fn fees_for(&self, lender_id: &str) -> &AprcFeeConfig {
        self.lender_fees.get(lender_id).unwrap_or(&self.default_fees)
    }
}
