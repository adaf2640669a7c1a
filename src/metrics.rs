//! Investment-return projection for a single bond under a fixed purchase
//! scenario. Pure arithmetic over the normalized record: no I/O, no clock,
//! deterministic for a given record and config.
//!
//! A missing input propagates `None` through every dependent value. A bond
//! whose net monthly income is zero or negative never breaks even; its
//! break-even month count is `f64::INFINITY` and the profit and annualized
//! return fields stay `None` instead of faulting.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::crawler::models::BondRecord;

/// Fixed purchase scenario, constant per run. Rates are percentages, not
/// fractions: `commission_rate_pct = 0.2` means 0.2 %.
#[derive(Debug, Clone)]
pub struct PurchaseConfig {
    pub units_to_buy: u32,
    pub commission_rate_pct: f64,
    pub min_commission_amount: f64,
    pub monthly_interest_rate_pct: f64,
    pub monthly_account_fee: f64,
    pub tax_rate: f64,
    pub reference_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvestmentProjection {
    pub sell_price_eur: Option<f64>,
    pub total_buy_value_eur: Option<f64>,
    pub trade_commission_eur: Option<f64>,
    pub yearly_income_eur: Option<f64>,
    pub monthly_income_eur: Option<f64>,
    pub monthly_cost_eur: Option<f64>,
    pub net_monthly_income_eur: Option<f64>,
    /// `f64::INFINITY` when the bond never breaks even.
    pub months_to_break_even: Option<f64>,
    pub months_until_maturity: Option<i32>,
    pub profit_before_tax_eur: Option<f64>,
    pub profit_after_tax_eur: Option<f64>,
    pub annualized_return_before_tax_pct: Option<f64>,
    pub annualized_return_after_tax_pct: Option<f64>,
}

/// Derive the full projection chain for one bond.
pub fn project(record: &BondRecord, cfg: &PurchaseConfig) -> InvestmentProjection {
    let units = cfg.units_to_buy as f64;

    let sell_price_eur = record
        .face_value
        .zip(record.dirty_sell_price_pct)
        .map(|(face, pct)| face * pct / 100.0);

    let total_buy_value_eur = sell_price_eur.map(|p| p * units);

    let trade_commission_eur = total_buy_value_eur
        .map(|total| (total * cfg.commission_rate_pct / 100.0).max(cfg.min_commission_amount));

    let yearly_income_eur = record
        .face_value
        .zip(record.coupon_rate_pct)
        .map(|(face, coupon)| face * units * coupon / 100.0);

    let monthly_income_eur = yearly_income_eur.map(|y| y / 12.0);

    let monthly_cost_eur = total_buy_value_eur
        .map(|total| total * cfg.monthly_interest_rate_pct / 100.0 + cfg.monthly_account_fee);

    let net_monthly_income_eur = monthly_income_eur
        .zip(monthly_cost_eur)
        .map(|(income, cost)| income - cost);

    let months_until_maturity = record
        .maturity_date
        .map(|maturity| months_between(cfg.reference_date, maturity));

    // Purchase premium over face plus commission, recovered month by month.
    let months_to_break_even = match (
        total_buy_value_eur,
        record.face_value,
        trade_commission_eur,
        net_monthly_income_eur,
    ) {
        (Some(total), Some(face), Some(fee), Some(net)) => {
            if net <= 0.0 {
                Some(f64::INFINITY)
            } else {
                Some((total - face * units + fee) / net)
            }
        }
        _ => None,
    };

    let profit_before_tax_eur = match (months_until_maturity, months_to_break_even, net_monthly_income_eur) {
        (Some(months), Some(break_even), Some(net)) if break_even.is_finite() => {
            Some((f64::from(months) - break_even) * net)
        }
        _ => None,
    };

    let profit_after_tax_eur = profit_before_tax_eur.map(|p| p * (1.0 - cfg.tax_rate));

    let invested = total_buy_value_eur
        .zip(trade_commission_eur)
        .map(|(total, fee)| total + fee);

    let annualize = |profit: Option<f64>| match (profit, invested, months_until_maturity) {
        (Some(profit), Some(invested), Some(months)) if months != 0 => {
            Some(profit / invested / (f64::from(months) / 12.0) * 100.0)
        }
        _ => None,
    };

    InvestmentProjection {
        sell_price_eur,
        total_buy_value_eur,
        trade_commission_eur,
        yearly_income_eur,
        monthly_income_eur,
        monthly_cost_eur,
        net_monthly_income_eur,
        months_to_break_even,
        months_until_maturity,
        profit_before_tax_eur,
        profit_after_tax_eur,
        annualized_return_before_tax_pct: annualize(profit_before_tax_eur),
        annualized_return_after_tax_pct: annualize(profit_after_tax_eur),
    }
}

/// Calendar-month difference, ignoring days of month.
fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_record() -> BondRecord {
        BondRecord {
            name: "Test bond".to_string(),
            code: "LV0000000001".to_string(),
            coupon_rate_pct: Some(5.0),
            maturity_date: NaiveDate::from_ymd_opt(2027, 1, 20),
            face_value: Some(1000.0),
            accrued_interest_pct: Some(0.5),
            clean_sell_price_pct: Some(101.5),
            clean_buy_price_pct: Some(101.0),
            dirty_sell_price_pct: Some(102.0),
            dirty_buy_price_pct: Some(101.5),
            transaction_count: Some(3),
            turnover_eur: Some(15_000.0),
            issue_date: NaiveDate::from_ymd_opt(2023, 1, 20),
            exchange_name: "RIG".to_string(),
            final_trade_date: None,
            last_sold_dirty_price: Some(101.8),
            last_sold_clean_price: Some(101.3),
        }
    }

    fn scenario_config() -> PurchaseConfig {
        PurchaseConfig {
            units_to_buy: 7,
            commission_rate_pct: 0.2,
            min_commission_amount: 20.0,
            monthly_interest_rate_pct: 0.01,
            monthly_account_fee: 1.0,
            tax_rate: 0.255,
            reference_date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
        }
    }

    fn close(actual: Option<f64>, expected: f64) -> bool {
        actual.is_some_and(|v| (v - expected).abs() < 1e-2)
    }

    #[test]
    fn projection_chain_matches_worked_scenario() {
        let p = project(&scenario_record(), &scenario_config());

        assert_eq!(p.sell_price_eur, Some(1020.0));
        assert_eq!(p.total_buy_value_eur, Some(7140.0));
        // 7140 × 0.2 % = 14.28, below the 20 EUR floor
        assert_eq!(p.trade_commission_eur, Some(20.0));
        assert_eq!(p.yearly_income_eur, Some(350.0));
        assert!(close(p.monthly_income_eur, 29.17));
        assert!(close(p.monthly_cost_eur, 1.714));
        assert!(close(p.net_monthly_income_eur, 27.45));
        assert_eq!(p.months_until_maturity, Some(24));
        assert!(close(p.months_to_break_even, 5.83));
        assert!(close(p.profit_before_tax_eur, 498.86));
        assert!(close(p.profit_after_tax_eur, 498.86 * 0.745));
        assert!(close(p.annualized_return_before_tax_pct, 3.48));
    }

    #[test]
    fn projection_is_deterministic() {
        let record = scenario_record();
        let cfg = scenario_config();
        assert_eq!(project(&record, &cfg), project(&record, &cfg));
    }

    #[test]
    fn negative_net_income_never_breaks_even() {
        let mut record = scenario_record();
        record.coupon_rate_pct = Some(0.1); // monthly income below costs
        let cfg = scenario_config();

        let p = project(&record, &cfg);
        assert_eq!(p.months_to_break_even, Some(f64::INFINITY));
        assert_eq!(p.profit_before_tax_eur, None);
        assert_eq!(p.profit_after_tax_eur, None);
        assert_eq!(p.annualized_return_before_tax_pct, None);
        assert_eq!(p.annualized_return_after_tax_pct, None);
    }

    #[test]
    fn missing_maturity_nulls_the_dependent_chain() {
        let mut record = scenario_record();
        record.maturity_date = None;

        let p = project(&record, &scenario_config());
        assert_eq!(p.months_until_maturity, None);
        assert_eq!(p.profit_before_tax_eur, None);
        assert_eq!(p.annualized_return_before_tax_pct, None);
        // upstream values are unaffected
        assert_eq!(p.total_buy_value_eur, Some(7140.0));
    }

    #[test]
    fn missing_price_nulls_everything_downstream() {
        let mut record = scenario_record();
        record.dirty_sell_price_pct = None;

        let p = project(&record, &scenario_config());
        assert_eq!(p.sell_price_eur, None);
        assert_eq!(p.total_buy_value_eur, None);
        assert_eq!(p.trade_commission_eur, None);
        assert_eq!(p.months_to_break_even, None);
        assert_eq!(p.profit_before_tax_eur, None);
        // income depends only on face value and coupon
        assert_eq!(p.yearly_income_eur, Some(350.0));
    }

    #[test]
    fn maturity_this_month_guards_the_annualized_return() {
        let mut record = scenario_record();
        record.maturity_date = NaiveDate::from_ymd_opt(2025, 1, 31);

        let p = project(&record, &scenario_config());
        assert_eq!(p.months_until_maturity, Some(0));
        assert_eq!(p.annualized_return_before_tax_pct, None);
        assert_eq!(p.annualized_return_after_tax_pct, None);
    }

    #[test]
    fn bond_unprofitable_before_maturity_yields_negative_profit() {
        let mut record = scenario_record();
        record.maturity_date = NaiveDate::from_ymd_opt(2025, 4, 15); // 3 months out

        let p = project(&record, &scenario_config());
        let profit = p.profit_before_tax_eur.unwrap();
        assert!(profit < 0.0, "expected a loss, got {profit}");
    }
}
