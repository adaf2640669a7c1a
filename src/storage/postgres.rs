use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::crawler::models::OutputRecord;
use crate::error::PipelineError;

/// Append-only sink over the analytical warehouse table. The table is
/// addressed by configured schema and table identifiers and assumed to
/// pre-exist with a compatible shape; there is no migration or upsert logic.
pub struct Storage {
    pool: PgPool,
    insert_sql: String,
}

const COLUMNS: [&str; 31] = [
    "name",
    "code",
    "coupon_rate_pct",
    "maturity_date",
    "face_value",
    "accrued_interest_pct",
    "clean_sell_price_pct",
    "clean_buy_price_pct",
    "dirty_sell_price_pct",
    "dirty_buy_price_pct",
    "transaction_count",
    "turnover_eur",
    "issue_date",
    "exchange_name",
    "final_trade_date",
    "last_sold_dirty_price",
    "last_sold_clean_price",
    "sell_price_eur",
    "total_buy_value_eur",
    "trade_commission_eur",
    "yearly_income_eur",
    "monthly_income_eur",
    "monthly_cost_eur",
    "net_monthly_income_eur",
    "months_to_break_even",
    "months_until_maturity",
    "profit_before_tax_eur",
    "profit_after_tax_eur",
    "annualized_return_before_tax_pct",
    "annualized_return_after_tax_pct",
    "captured_at",
];

impl Storage {
    pub async fn new(database_url: &str, schema: &str, table: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        Ok(Self {
            pool,
            insert_sql: build_insert_sql(schema, table),
        })
    }

    /// Insert every record inside one transaction. Plain INSERTs: repeated
    /// runs produce new rows, and a failure rolls the whole batch back.
    pub async fn append_records(&self, records: &[OutputRecord]) -> Result<usize, PipelineError> {
        let mut tx = self.pool.begin().await?;
        let mut appended = 0usize;

        for rec in records {
            sqlx::query(&self.insert_sql)
                .bind(&rec.bond.name)
                .bind(&rec.bond.code)
                .bind(rec.bond.coupon_rate_pct)
                .bind(rec.bond.maturity_date)
                .bind(rec.bond.face_value)
                .bind(rec.bond.accrued_interest_pct)
                .bind(rec.bond.clean_sell_price_pct)
                .bind(rec.bond.clean_buy_price_pct)
                .bind(rec.bond.dirty_sell_price_pct)
                .bind(rec.bond.dirty_buy_price_pct)
                .bind(rec.bond.transaction_count)
                .bind(rec.bond.turnover_eur)
                .bind(rec.bond.issue_date)
                .bind(&rec.bond.exchange_name)
                .bind(rec.bond.final_trade_date)
                .bind(rec.bond.last_sold_dirty_price)
                .bind(rec.bond.last_sold_clean_price)
                .bind(rec.projection.sell_price_eur)
                .bind(rec.projection.total_buy_value_eur)
                .bind(rec.projection.trade_commission_eur)
                .bind(rec.projection.yearly_income_eur)
                .bind(rec.projection.monthly_income_eur)
                .bind(rec.projection.monthly_cost_eur)
                .bind(rec.projection.net_monthly_income_eur)
                .bind(rec.projection.months_to_break_even)
                .bind(rec.projection.months_until_maturity)
                .bind(rec.projection.profit_before_tax_eur)
                .bind(rec.projection.profit_after_tax_eur)
                .bind(rec.projection.annualized_return_before_tax_pct)
                .bind(rec.projection.annualized_return_after_tax_pct)
                .bind(rec.captured_at)
                .execute(&mut *tx)
                .await?;

            appended += 1;
        }

        tx.commit().await?;
        Ok(appended)
    }
}

fn build_insert_sql(schema: &str, table: &str) -> String {
    let placeholders: Vec<String> = (1..=COLUMNS.len()).map(|i| format!("${i}")).collect();
    format!(
        "INSERT INTO {}.{} ({}) VALUES ({})",
        schema,
        table,
        COLUMNS.join(", "),
        placeholders.join(", ")
    )
}
