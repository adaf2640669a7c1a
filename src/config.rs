use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;

use crate::metrics::PurchaseConfig;

const DEFAULT_BONDS_URL: &str = "https://nasdaqbaltic.com/statistics/lv/bonds";

pub struct Config {
    pub bonds_url: String,
    pub database_url: String,
    pub warehouse_schema: String,
    pub warehouse_table: String,
    pub http_timeout: Duration,
    pub purchase: PurchaseConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            bonds_url: env::var("BONDS_URL").unwrap_or_else(|_| DEFAULT_BONDS_URL.to_string()),
            database_url: env::var("DATABASE_URL").context("DATABASE_URL is required")?,
            warehouse_schema: env::var("WAREHOUSE_SCHEMA").context("WAREHOUSE_SCHEMA is required")?,
            warehouse_table: env::var("WAREHOUSE_TABLE").context("WAREHOUSE_TABLE is required")?,
            http_timeout: Duration::from_secs(env_or("HTTP_TIMEOUT_SECS", 30u64)?),
            purchase: PurchaseConfig {
                units_to_buy: env_or("UNITS_TO_BUY", 7)?,
                commission_rate_pct: env_or("COMMISSION_RATE_PCT", 0.2)?,
                min_commission_amount: env_or("MIN_COMMISSION_EUR", 20.0)?,
                monthly_interest_rate_pct: env_or("MONTHLY_INTEREST_RATE_PCT", 0.01)?,
                monthly_account_fee: env_or("MONTHLY_ACCOUNT_FEE_EUR", 1.0)?,
                tax_rate: env_or("TAX_RATE", 0.255)?,
                reference_date: Utc::now().date_naive(),
            },
        })
    }
}

fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("invalid value for {key}")),
        Err(_) => Ok(default),
    }
}
