use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::metrics::InvestmentProjection;

/// Header names and raw text cells exactly as extracted from the page.
/// Duplicate header labels carry a `_{n}` suffix from the second occurrence
/// on. Immutable once built; discarded after normalization.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Borrowed label → raw-text view of one table row.
#[derive(Debug, Clone, Copy)]
pub struct RawBondRow<'a> {
    headers: &'a [String],
    cells: &'a [String],
}

impl<'a> RawBondRow<'a> {
    pub fn new(headers: &'a [String], cells: &'a [String]) -> Self {
        Self { headers, cells }
    }

    pub fn get(&self, label: &str) -> Option<&'a str> {
        let idx = self.headers.iter().position(|h| h == label)?;
        self.cells.get(idx).map(String::as_str)
    }
}

/// One bond listing with every cell converted to its typed form. Numeric and
/// date fields are either a valid value or `None`; malformed source text
/// never survives past normalization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BondRecord {
    pub name: String,
    pub code: String,
    pub coupon_rate_pct: Option<f64>,
    pub maturity_date: Option<NaiveDate>,
    pub face_value: Option<f64>,
    pub accrued_interest_pct: Option<f64>,
    pub clean_sell_price_pct: Option<f64>,
    pub clean_buy_price_pct: Option<f64>,
    pub dirty_sell_price_pct: Option<f64>,
    pub dirty_buy_price_pct: Option<f64>,
    pub transaction_count: Option<i64>,
    pub turnover_eur: Option<f64>,
    pub issue_date: Option<NaiveDate>,
    pub exchange_name: String,
    pub final_trade_date: Option<NaiveDate>,
    pub last_sold_dirty_price: Option<f64>,
    pub last_sold_clean_price: Option<f64>,
}

/// Final row shape appended to the warehouse: normalized fields, derived
/// projection, and the wall-clock capture time of the run. Never mutated
/// after construction.
#[derive(Debug, Clone, Serialize)]
pub struct OutputRecord {
    #[serde(flatten)]
    pub bond: BondRecord,
    #[serde(flatten)]
    pub projection: InvestmentProjection,
    pub captured_at: DateTime<Utc>,
}
