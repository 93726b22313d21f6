//! Delimited-text parsing of the inspection extract.
//!
//! Every cell is read as text; coercion happens later in the normalizer.

use std::io::Read;

use csv::{ReaderBuilder, Trim};
use tracing::debug;
use visa_core::error::{DashboardError, Result};
use visa_core::models::RawTable;

// ── Public API ────────────────────────────────────────────────────────────────

/// Parse CSV text (as served by a spreadsheet "export as CSV" link).
///
/// `source_name` is only used to label errors.
pub fn parse_csv(text: &str, source_name: &str) -> Result<RawTable> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    read_table(text.as_bytes(), source_name)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn read_table<R: Read>(input: R, source_name: &str) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::None)
        .from_reader(input);

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| DashboardError::source_unavailable(source_name, e))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (index, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| {
            DashboardError::source_unavailable(source_name, format!("row {}: {e}", index + 1))
        })?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    debug!(
        source = source_name,
        columns = headers.len(),
        rows = rows.len(),
        "parsed extract"
    );

    Ok(RawTable::new(headers, rows))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
