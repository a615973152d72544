//! Error types for the fallible edges of the engine
//!
//! The modeling math itself never fails: "no breakeven" or "no follow-on
//! rate" are ordinary outcomes carried as data. Errors only come from loading
//! catalogs and configuration or from malformed rate records.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid rate {id}: {reason}")]
    InvalidRate { id: String, reason: String },

    #[error("unknown {field}: {value}")]
    UnknownValue { field: &'static str, value: String },

    #[error("invalid scenario: {0}")]
    InvalidScenario(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
