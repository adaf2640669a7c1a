use tracing::debug;

use crate::config::Config;
use crate::crawler::models::RawTable;
use crate::error::PipelineError;

pub mod fetcher;
pub mod models;
pub mod table;

/// Fetch the listing page and extract the raw bond table. Both steps are
/// fatal on failure; no partial table ever reaches normalization.
pub async fn scrape_bond_table(cfg: &Config) -> Result<RawTable, PipelineError> {
    let client = fetcher::build_client(cfg.http_timeout)?;

    debug!(url = %cfg.bonds_url, "Fetching bond listing page");
    let html = fetcher::fetch_html(&client, &cfg.bonds_url).await?;

    table::extract_bond_table(&html)
}
