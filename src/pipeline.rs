use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::config::Config;
use crate::crawler::{
    self,
    models::{BondRecord, OutputRecord},
};
use crate::metrics::{self, PurchaseConfig};
use crate::normalize::Normalizer;
use crate::storage::postgres::Storage;

/// One batch run: fetch → extract → normalize → project → append.
///
/// Structural failures (fetch, extraction, write) propagate out immediately
/// and nothing is written; only individual cells are allowed to fail, and
/// those are confined to the normalization stage.
pub struct PipelineService {
    cfg: Config,
    storage: Storage,
    normalizer: Normalizer,
}

impl PipelineService {
    pub async fn new(cfg: Config) -> Result<Self> {
        let storage = Storage::new(
            &cfg.database_url,
            &cfg.warehouse_schema,
            &cfg.warehouse_table,
        )
        .await?;

        Ok(Self {
            cfg,
            storage,
            normalizer: Normalizer::default(),
        })
    }

    pub async fn run(&self) -> Result<usize> {
        let raw = crawler::scrape_bond_table(&self.cfg).await?;
        info!(
            headers = raw.headers.len(),
            rows = raw.rows.len(),
            "Extracted bond table"
        );

        let outcome = self.normalizer.normalize_table(&raw);
        if outcome.unparsable_cells > 0 {
            warn!(
                cells = outcome.unparsable_cells,
                "Cells failed their parsing rule and were stored as null"
            );
        }

        let captured_at = Utc::now();
        let records: Vec<OutputRecord> = outcome
            .records
            .into_iter()
            .map(|bond| assemble(bond, &self.cfg.purchase, captured_at))
            .collect();

        let appended = self.storage.append_records(&records).await?;
        info!(appended, "Appended rows to warehouse");

        Ok(appended)
    }
}

/// Merge one normalized record with its projection and the run timestamp.
/// Total: every record passes through, including all-null ones, so the
/// warehouse keeps an audit trail of unpriced listings.
pub fn assemble(
    bond: BondRecord,
    purchase: &PurchaseConfig,
    captured_at: DateTime<Utc>,
) -> OutputRecord {
    let projection = metrics::project(&bond, purchase);
    OutputRecord {
        bond,
        projection,
        captured_at,
    }
}
