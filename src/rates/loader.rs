//! Load rate catalogs from CSV or JSON
//!
//! CSV layout, one product per row:
//! `id,lender_id,type,rate_pct,apr_pct,fixed_term_months,min_ltv,max_ltv,min_loan,buyer_categories,ber_eligible,perks,warning`
//! List columns are semicolon separated; empty cells mean "not set".

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::Reader;

use super::{BerRating, BuyerCategory, Perk, Rate, RateCatalog, RateProduct};
use crate::error::{EngineError, Result};
use crate::money::Cents;

/// Raw CSV row matching the catalog export columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    id: String,
    lender_id: String,
    #[serde(rename = "type")]
    kind: String,
    rate_pct: f64,
    apr_pct: Option<f64>,
    fixed_term_months: Option<u32>,
    min_ltv: f64,
    max_ltv: f64,
    min_loan: Option<Cents>,
    #[serde(default)]
    buyer_categories: String,
    #[serde(default)]
    ber_eligible: String,
    #[serde(default)]
    perks: String,
    warning: Option<String>,
}

fn split_list(cell: &str) -> impl Iterator<Item = &str> {
    cell.split(';').map(str::trim).filter(|s| !s.is_empty())
}

impl CsvRow {
    fn to_rate(self) -> Result<Rate> {
        let buyer_categories = split_list(&self.buyer_categories)
            .map(str::parse::<BuyerCategory>)
            .collect::<Result<Vec<_>>>()?;

        let ber_eligible = if self.ber_eligible.trim().is_empty() {
            None
        } else {
            Some(
                split_list(&self.ber_eligible)
                    .map(str::parse::<BerRating>)
                    .collect::<Result<Vec<_>>>()?,
            )
        };

        let product = RateProduct {
            id: self.id,
            lender_id: self.lender_id,
            rate_pct: self.rate_pct,
            apr_pct: self.apr_pct,
            min_ltv: self.min_ltv,
            max_ltv: self.max_ltv,
            min_loan: self.min_loan,
            buyer_categories,
            ber_eligible,
            perks: split_list(&self.perks).map(Perk::parse).collect(),
            warning: self.warning.filter(|w| !w.trim().is_empty()),
            custom: false,
        };

        let rate = match self.kind.trim().to_ascii_lowercase().as_str() {
            "fixed" => {
                let term = self.fixed_term_months.ok_or_else(|| EngineError::InvalidRate {
                    id: product.id.clone(),
                    reason: "fixed rate without fixed_term_months".to_string(),
                })?;
                Rate::fixed(product, term)
            }
            "variable" => Rate::variable(product),
            other => {
                return Err(EngineError::UnknownValue {
                    field: "rate type",
                    value: other.to_string(),
                })
            }
        };

        rate.validate()?;
        Ok(rate)
    }
}

/// Load a catalog from any CSV reader
pub fn load_rates_from_reader<R: Read>(reader: R) -> Result<RateCatalog> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut rates = Vec::new();

    for result in csv_reader.deserialize() {
        let row: CsvRow = result?;
        rates.push(row.to_rate()?);
    }

    Ok(RateCatalog::new(rates))
}

/// Load a catalog from a CSV file
pub fn load_rates<P: AsRef<Path>>(path: P) -> Result<RateCatalog> {
    load_rates_from_reader(File::open(path)?)
}

/// Load a catalog from a JSON array of tagged rate records
pub fn load_rates_json<R: Read>(reader: R) -> Result<RateCatalog> {
    let rates: Vec<Rate> = serde_json::from_reader(reader)?;
    for rate in &rates {
        rate.validate()?;
    }
    Ok(RateCatalog::new(rates))
}

/// Load a catalog by file extension (`.json`, anything else is CSV)
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<RateCatalog> {
    let path = path.as_ref();
    let is_json = path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        load_rates_json(File::open(path)?)
    } else {
        load_rates(path)
    }
}
