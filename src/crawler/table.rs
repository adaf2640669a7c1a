use std::collections::HashMap;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::crawler::models::RawTable;
use crate::error::PipelineError;

/// The bonds table carries a `table-<hash>` CSS class where the hash changes
/// between frontend builds; only the prefix is stable.
const TABLE_CLASS_PREFIX: &str = "table-";

pub fn extract_bond_table(html: &str) -> Result<RawTable, PipelineError> {
    let doc = Html::parse_document(html);

    let table_sel = Selector::parse("table").unwrap();
    let th_sel = Selector::parse("th").unwrap();
    let tr_sel = Selector::parse("tr").unwrap();
    let td_sel = Selector::parse("td").unwrap();

    let table = doc
        .select(&table_sel)
        .find(|el| el.value().classes().any(|c| c.starts_with(TABLE_CLASS_PREFIX)))
        .ok_or_else(|| PipelineError::Extraction("bonds table marker not found".into()))?;

    let headers = disambiguate(table.select(&th_sel).map(|th| cell_text(&th)));
    if headers.is_empty() {
        return Err(PipelineError::Extraction("bonds table has no header cells".into()));
    }

    let mut rows = Vec::new();
    let mut dropped = 0usize;
    for tr in table.select(&tr_sel) {
        let cells: Vec<String> = tr.select(&td_sel).map(|td| cell_text(&td)).collect();
        if cells.is_empty() {
            // header row has only <th> cells
            continue;
        }
        if cells.len() != headers.len() {
            dropped += 1;
            continue;
        }
        rows.push(cells);
    }

    if dropped > 0 {
        debug!(dropped, "Dropped rows with mismatched cell count");
    }

    Ok(RawTable { headers, rows })
}

/// First occurrence keeps its label; every repeat gets `_{n}` appended, so
/// two "Pied." columns become "Pied." and "Pied._2".
fn disambiguate(labels: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen: HashMap<String, u32> = HashMap::new();
    let mut headers = Vec::new();

    for label in labels {
        let count = seen.entry(label.clone()).or_insert(0);
        *count += 1;
        if *count > 1 {
            headers.push(format!("{}_{}", label, count));
        } else {
            headers.push(label);
        }
    }

    headers
}

fn cell_text(el: &ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}
