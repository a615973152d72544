//! Minor-unit currency helpers
//!
//! Every amount crossing the public API is an integer number of minor units
//! (cents). Interest math runs in `f64` minor units and is rounded back with
//! [`to_cents`] before any comparison.

/// Currency amount in minor units
pub type Cents = i64;

/// Round a floating minor-unit amount to whole cents (half away from zero)
pub fn to_cents(amount: f64) -> Cents {
    if !amount.is_finite() {
        return 0;
    }
    amount.round() as Cents
}

/// Convert a major-unit amount (e.g. euros) to cents
pub fn from_major(amount: f64) -> Cents {
    to_cents(amount * 100.0)
}

/// Convert cents to a major-unit amount for display
pub fn to_major(amount: Cents) -> f64 {
    amount as f64 / 100.0
}

/// `pct` percent of `amount`, left unrounded
pub fn percent_of(amount: f64, pct: f64) -> f64 {
    amount * pct / 100.0
}
