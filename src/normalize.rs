//! Raw-text to typed-value conversion for the scraped bond table.
//!
//! The source page is Latvian-locale: decimal commas, spaces as thousands
//! separators, " EUR" unit suffixes, "d.m.Y" dates, and a lone dash for
//! "no value". Each column is covered by a declarative rule; a cell that a
//! rule cannot parse becomes `None`, never an error.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::crawler::models::{BondRecord, RawBondRow, RawTable};

/// Parsing class applied to every cell of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// Percentage or price quote: locale decimal, lone dash means absent.
    Decimal,
    /// Monetary amount with a trailing " EUR" marker.
    CurrencyAmount,
    /// Strict dot-separated "d.m.Y" date.
    Date,
    /// Count with optional space grouping.
    Integer,
    /// Trimmed pass-through.
    Text,
}

/// Binds one source column label to a normalized field name and a rule.
/// Columns without a rule (e.g. the watchlist button column) are ignored;
/// new columns are added here, not in parsing code.
#[derive(Debug, Clone)]
pub struct ColumnRule {
    pub label: &'static str,
    pub field: &'static str,
    pub rule: FieldRule,
}

const fn col(label: &'static str, field: &'static str, rule: FieldRule) -> ColumnRule {
    ColumnRule { label, field, rule }
}

/// Column map for the Nasdaq Baltic LV bond listing. The `_2` labels are the
/// dirty-price columns produced by header disambiguation.
pub fn default_rules() -> Vec<ColumnRule> {
    vec![
        col("Nosaukums", "name", FieldRule::Text),
        col("Kods", "code", FieldRule::Text),
        col("Kupons %", "coupon_rate_pct", FieldRule::Decimal),
        col("Dzēšana", "maturity_date", FieldRule::Date),
        col("Nomināls", "face_value", FieldRule::CurrencyAmount),
        col("Uzkr.ienāk.", "accrued_interest_pct", FieldRule::Decimal),
        col("Pied.", "clean_sell_price_pct", FieldRule::Decimal),
        col("Piepr.", "clean_buy_price_pct", FieldRule::Decimal),
        col("Pied._2", "dirty_sell_price_pct", FieldRule::Decimal),
        col("Piepr._2", "dirty_buy_price_pct", FieldRule::Decimal),
        col("Darījumi", "transaction_count", FieldRule::Integer),
        col("Apgr. €", "turnover_eur", FieldRule::CurrencyAmount),
        col("Emitēts", "issue_date", FieldRule::Date),
        col("Tirgus", "exchange_name", FieldRule::Text),
        col("Pēdējā tirdzniecības diena", "final_trade_date", FieldRule::Date),
        col("Pēdējā netīrā cena", "last_sold_dirty_price", FieldRule::Decimal),
        col("Pēdējā tīrā cena", "last_sold_clean_price", FieldRule::Decimal),
    ]
}

#[derive(Debug, Clone, PartialEq)]
enum CellValue {
    Number(f64),
    Int(i64),
    Date(NaiveDate),
    Text(String),
    Null,
}

pub struct Normalizer {
    rules: Vec<ColumnRule>,
}

/// Normalized records plus the count of cells that had content but failed
/// their rule, logged once per run.
pub struct NormalizeOutcome {
    pub records: Vec<BondRecord>,
    pub unparsable_cells: usize,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl Normalizer {
    pub fn new(rules: Vec<ColumnRule>) -> Self {
        Self { rules }
    }

    pub fn normalize_table(&self, table: &RawTable) -> NormalizeOutcome {
        let mut unparsable_cells = 0usize;
        let records = table
            .rows
            .iter()
            .map(|cells| {
                let row = RawBondRow::new(&table.headers, cells);
                self.normalize_row(&row, &mut unparsable_cells)
            })
            .collect();

        NormalizeOutcome {
            records,
            unparsable_cells,
        }
    }

    fn normalize_row(&self, row: &RawBondRow<'_>, unparsable: &mut usize) -> BondRecord {
        let mut values: HashMap<&'static str, CellValue> = HashMap::new();

        for rule in &self.rules {
            let raw = row.get(rule.label).unwrap_or("");
            let value = match parse_cell(rule.rule, raw) {
                Ok(v) => v,
                Err(()) => {
                    *unparsable += 1;
                    CellValue::Null
                }
            };
            values.insert(rule.field, value);
        }

        BondRecord {
            name: take_text(&mut values, "name"),
            code: take_text(&mut values, "code"),
            coupon_rate_pct: take_number(&mut values, "coupon_rate_pct"),
            maturity_date: take_date(&mut values, "maturity_date"),
            face_value: take_number(&mut values, "face_value"),
            accrued_interest_pct: take_number(&mut values, "accrued_interest_pct"),
            clean_sell_price_pct: take_number(&mut values, "clean_sell_price_pct"),
            clean_buy_price_pct: take_number(&mut values, "clean_buy_price_pct"),
            dirty_sell_price_pct: take_number(&mut values, "dirty_sell_price_pct"),
            dirty_buy_price_pct: take_number(&mut values, "dirty_buy_price_pct"),
            transaction_count: take_int(&mut values, "transaction_count"),
            turnover_eur: take_number(&mut values, "turnover_eur"),
            issue_date: take_date(&mut values, "issue_date"),
            exchange_name: take_text(&mut values, "exchange_name"),
            final_trade_date: take_date(&mut values, "final_trade_date"),
            last_sold_dirty_price: take_number(&mut values, "last_sold_dirty_price"),
            last_sold_clean_price: take_number(&mut values, "last_sold_clean_price"),
        }
    }
}

/// Err(()) marks a cell that had content but failed its rule; absent cells
/// ("" or a lone "-") are Null without counting as failures.
fn parse_cell(rule: FieldRule, raw: &str) -> Result<CellValue, ()> {
    let trimmed = raw.trim();

    if rule == FieldRule::Text {
        return Ok(CellValue::Text(trimmed.to_string()));
    }
    if trimmed.is_empty() || trimmed == "-" {
        return Ok(CellValue::Null);
    }

    match rule {
        FieldRule::Decimal => parse_decimal(trimmed).map(CellValue::Number).ok_or(()),
        FieldRule::CurrencyAmount => parse_currency(trimmed).map(CellValue::Number).ok_or(()),
        FieldRule::Date => parse_date(trimmed).map(CellValue::Date).ok_or(()),
        FieldRule::Integer => parse_integer(trimmed).map(CellValue::Int).ok_or(()),
        FieldRule::Text => unreachable!(),
    }
}

/// "1 234,56" → 1234.56. Spaces (including NBSP) are thousands separators;
/// the comma is the decimal separator.
fn parse_decimal(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != ' ' && *c != '\u{a0}')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    cleaned.parse().ok()
}

/// "1 000 EUR" → 1000.0.
fn parse_currency(raw: &str) -> Option<f64> {
    let stripped = raw.strip_suffix("EUR").unwrap_or(raw).trim_end();
    parse_decimal(stripped)
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%d.%m.%Y").ok()
}

fn parse_integer(raw: &str) -> Option<i64> {
    let cleaned: String = raw.chars().filter(|c| *c != ' ' && *c != '\u{a0}').collect();
    cleaned.parse().ok()
}

fn take_text(values: &mut HashMap<&'static str, CellValue>, field: &str) -> String {
    match values.remove(field) {
        Some(CellValue::Text(s)) => s,
        _ => String::new(),
    }
}

fn take_number(values: &mut HashMap<&'static str, CellValue>, field: &str) -> Option<f64> {
    match values.remove(field) {
        Some(CellValue::Number(n)) => Some(n),
        _ => None,
    }
}

fn take_int(values: &mut HashMap<&'static str, CellValue>, field: &str) -> Option<i64> {
    match values.remove(field) {
        Some(CellValue::Int(n)) => Some(n),
        _ => None,
    }
}

fn take_date(values: &mut HashMap<&'static str, CellValue>, field: &str) -> Option<NaiveDate> {
    match values.remove(field) {
        Some(CellValue::Date(d)) => Some(d),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locale_decimals_parse() {
        assert_eq!(parse_decimal("102,50"), Some(102.5));
        assert_eq!(parse_decimal("1 234,56"), Some(1234.56));
        assert_eq!(parse_decimal("0,07"), Some(0.07));
        assert_eq!(parse_decimal("abc"), None);
    }

    #[test]
    fn currency_amounts_drop_the_unit_marker() {
        assert_eq!(parse_currency("1 234,56 EUR"), Some(1234.56));
        assert_eq!(parse_currency("1 000 EUR"), Some(1000.0));
        assert_eq!(parse_currency("100"), Some(100.0));
    }

    #[test]
    fn lone_dash_and_empty_are_absent_not_failures() {
        assert_eq!(parse_cell(FieldRule::Decimal, "-"), Ok(CellValue::Null));
        assert_eq!(parse_cell(FieldRule::Decimal, ""), Ok(CellValue::Null));
        assert_eq!(parse_cell(FieldRule::Decimal, "  -  "), Ok(CellValue::Null));
        assert_eq!(parse_cell(FieldRule::Decimal, "n/a"), Err(()));
    }

    #[test]
    fn dates_require_dot_separators() {
        assert_eq!(
            parse_date("31.12.2030"),
            NaiveDate::from_ymd_opt(2030, 12, 31)
        );
        assert_eq!(parse_date("31/12/2030"), None);
    }

    #[test]
    fn grouped_integers_parse() {
        assert_eq!(parse_integer("1 024"), Some(1024));
        assert_eq!(parse_integer("17"), Some(17));
        assert_eq!(parse_integer("17,5"), None);
    }

    fn sample_table() -> RawTable {
        let headers: Vec<String> = [
            "Nosaukums",
            "Kods",
            "Kupons %",
            "Dzēšana",
            "Nomināls",
            "Pied._2",
            "Darījumi",
            "Tirgus",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let rows = vec![
            vec![
                "  Latvenergo AS  ".to_string(),
                "LV0000802460".to_string(),
                "5,00".to_string(),
                "31.12.2030".to_string(),
                "1 000 EUR".to_string(),
                "102,00".to_string(),
                "12".to_string(),
                "RIG".to_string(),
            ],
            vec![
                "Broken row".to_string(),
                "XX".to_string(),
                "oops".to_string(),
                "2030-12-31".to_string(),
                "-".to_string(),
                "".to_string(),
                "-".to_string(),
                "RIG".to_string(),
            ],
        ];

        RawTable { headers, rows }
    }

    #[test]
    fn rows_normalize_to_typed_records() {
        let outcome = Normalizer::default().normalize_table(&sample_table());
        assert_eq!(outcome.records.len(), 2);

        let rec = &outcome.records[0];
        assert_eq!(rec.name, "Latvenergo AS");
        assert_eq!(rec.code, "LV0000802460");
        assert_eq!(rec.coupon_rate_pct, Some(5.0));
        assert_eq!(rec.maturity_date, NaiveDate::from_ymd_opt(2030, 12, 31));
        assert_eq!(rec.face_value, Some(1000.0));
        assert_eq!(rec.dirty_sell_price_pct, Some(102.0));
        assert_eq!(rec.transaction_count, Some(12));
        assert_eq!(rec.exchange_name, "RIG");
        // columns missing from the source table are plain nulls
        assert_eq!(rec.turnover_eur, None);
    }

    #[test]
    fn unparsable_cells_become_null_and_are_counted() {
        let outcome = Normalizer::default().normalize_table(&sample_table());

        let rec = &outcome.records[1];
        assert_eq!(rec.coupon_rate_pct, None);
        assert_eq!(rec.maturity_date, None);
        assert_eq!(rec.face_value, None);
        assert_eq!(rec.dirty_sell_price_pct, None);
        assert_eq!(rec.transaction_count, None);

        // "oops" and the wrong-format date failed; dashes and blanks did not
        assert_eq!(outcome.unparsable_cells, 2);
    }
}
