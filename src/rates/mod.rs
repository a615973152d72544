//! Lender rate products, the catalog and follow-on rate resolution

mod data;
mod catalog;
pub mod loader;

pub use data::{BerRating, BuyerCategory, FixedRate, Perk, Rate, RateProduct, VariableRate};
pub use catalog::{
    resolve_follow_on, EligibilityCriteria, FollowOn, FollowOnResolution, RateCatalog,
};
pub use loader::{load_catalog, load_rates, load_rates_from_reader, load_rates_json};
