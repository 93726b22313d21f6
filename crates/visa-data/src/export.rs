//! Spreadsheet export of the filtered tables.
//!
//! Each workbook has exactly one sheet, header row first. Cells are written
//! as text so values round-trip exactly as they appear on screen.

use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook, XlsxError};
use serde::Serialize;
use tracing::info;
use visa_core::error::{DashboardError, Result};
use visa_core::models::{InspectionRecord, RawTable};
use visa_core::selection::{FilterSelection, Identity};
use visa_core::time_utils::format_day_first;

use crate::expander::explode;
use crate::filter::FilteredView;
use crate::normalizer::NormalizedTable;

pub const SHEET_NAME: &str = "Dados Filtrados";
pub const MONTH_COLUMN: &str = "MÊS";
pub const INSPECTOR_COLUMN: &str = "INSPETOR";

/// Which filtered table to export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportScope {
    /// One row per inspection ("por equipe").
    Teams,
    /// One row per (inspection, inspector) ("por inspetor").
    Inspectors,
}

impl ExportScope {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Teams => "por equipe",
            Self::Inspectors => "por inspetor",
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Lay out the filtered rows of `table` as a sheet of text cells.
///
/// The date column is rendered `dd/mm/yyyy` when it parsed, and the
/// year-month key is appended as `MÊS`. The inspector scope adds an
/// `INSPETOR` column holding the single inspector of each row.
pub fn build_sheet(table: &NormalizedTable, view: &FilteredView<'_>, scope: ExportScope) -> RawTable {
    let date_index = table.headers.iter().position(|h| *h == table.date_column);

    let mut headers = table.headers.clone();
    if scope == ExportScope::Inspectors {
        headers.push(INSPECTOR_COLUMN.to_string());
    }
    headers.push(MONTH_COLUMN.to_string());

    let rows = match scope {
        ExportScope::Teams => view
            .records
            .iter()
            .map(|record| sheet_row(record, date_index, None))
            .collect(),
        ExportScope::Inspectors => view
            .exploded
            .iter()
            .map(|row| sheet_row(row.record, date_index, Some(row.inspector)))
            .collect(),
    };

    RawTable::new(headers, rows)
}

/// Serialize a sheet to `.xlsx` bytes.
pub fn to_xlsx(sheet: &RawTable) -> Result<Vec<u8>> {
    let mut workbook = build_workbook(sheet).map_err(export_error)?;
    workbook.save_to_buffer().map_err(export_error)
}

/// Write a sheet to `path` as `.xlsx`.
pub fn write_xlsx(sheet: &RawTable, path: &Path) -> Result<()> {
    let bytes = to_xlsx(sheet)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    info!(path = %path.display(), rows = sheet.len(), "exported spreadsheet");
    Ok(())
}

/// Filter `table` and write the team export to `output`, plus the
/// per-inspector export next to it when `per_inspector` is set.
///
/// Returns the paths written.
pub fn export_selection(
    table: &NormalizedTable,
    selection: &FilterSelection,
    identity: &Identity,
    output: &Path,
    per_inspector: bool,
) -> Result<Vec<PathBuf>> {
    let exploded = explode(&table.records);
    let view = FilteredView::build(&table.records, &exploded, selection, identity);

    let mut written = vec![output.to_path_buf()];
    write_xlsx(&build_sheet(table, &view, ExportScope::Teams), output)?;

    if per_inspector {
        let path = inspector_export_path(output);
        write_xlsx(&build_sheet(table, &view, ExportScope::Inspectors), &path)?;
        written.push(path);
    }
    Ok(written)
}

/// Path of the per-inspector workbook, next to `output`.
///
/// A trailing `_equipes` in the stem becomes `_inspetores`
/// (`dados_filtrados_equipes.xlsx` → `dados_filtrados_inspetores.xlsx`);
/// any other stem gets `_inspetores` appended.
pub fn inspector_export_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dados_filtrados".to_string());
    let base = stem.strip_suffix("_equipes").unwrap_or(&stem);
    output.with_file_name(format!("{base}_inspetores.xlsx"))
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn sheet_row(
    record: &InspectionRecord,
    date_index: Option<usize>,
    inspector: Option<&str>,
) -> Vec<String> {
    let mut cells = record.values.clone();
    if let (Some(i), Some(date)) = (date_index, record.date) {
        if let Some(cell) = cells.get_mut(i) {
            *cell = format_day_first(date);
        }
    }
    if let Some(name) = inspector {
        cells.push(name.to_string());
    }
    cells.push(record.year_month_key.clone().unwrap_or_default());
    cells
}

fn build_workbook(sheet: &RawTable) -> std::result::Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, header) in sheet.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, header, &header_format)?;
    }
    for (row, cells) in sheet.rows.iter().enumerate() {
        for (col, value) in cells.iter().enumerate() {
            if !value.is_empty() {
                worksheet.write_string(row as u32 + 1, col as u16, value)?;
            }
        }
    }

    Ok(workbook)
}

fn export_error(e: XlsxError) -> DashboardError {
    DashboardError::Export(e.to_string())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
