//! Record Normalizer: raw extract → canonical inspection records.
//!
//! Normalization never adds or drops rows. Unparsable dates become `None`
//! and are reported as [`ParseWarning`]s rather than errors.

use chrono::Datelike;
use serde::Serialize;
use tracing::{debug, warn};
use visa_core::error::Result;
use visa_core::models::{InspectionRecord, ParseWarning, RawTable};
use visa_core::time_utils::{month_year_label, parse_day_first, year_month_key};

use crate::schema::{self, RequiredColumn, ResolvedSchema};

// ── Public types ──────────────────────────────────────────────────────────────

/// The canonical record set plus the column layout it was built from.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizedTable {
    /// Output headers (normalized, timestamp dropped, synthesized appended).
    pub headers: Vec<String>,
    /// Header of the detected date column.
    pub date_column: String,
    pub records: Vec<InspectionRecord>,
}

impl NormalizedTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Render back to a raw table of trimmed text cells.
    ///
    /// Feeding the result to [`normalize`] yields an identical record set.
    pub fn to_raw(&self) -> RawTable {
        RawTable::new(
            self.headers.clone(),
            self.records.iter().map(|r| r.values.clone()).collect(),
        )
    }
}

/// Data-quality counters collected while normalizing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizationReport {
    /// Rows read (equal to rows produced).
    pub rows: usize,
    /// Records whose date is absent, blank or unparsable.
    pub undated: usize,
    /// One entry per non-blank date that failed to parse.
    pub warnings: Vec<ParseWarning>,
    /// Required columns that were missing and filled with empty text.
    pub synthesized_columns: Vec<String>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Normalize a raw extract.
///
/// Fails only when the extract has no date-bearing column.
pub fn normalize(raw: &RawTable) -> Result<(NormalizedTable, NormalizationReport)> {
    let schema = schema::resolve(&raw.headers)?;
    let date_column = schema.date_column().to_string();

    let mut report = NormalizationReport {
        rows: raw.len(),
        synthesized_columns: schema.synthesized(),
        ..Default::default()
    };

    let mut records = Vec::with_capacity(raw.len());
    for (row, cells) in raw.rows.iter().enumerate() {
        let record = normalize_row(&schema, cells);
        if record.date.is_none() {
            report.undated += 1;
            let text = &record.values[schema.date];
            if !text.is_empty() {
                debug!(row, value = %text, "unparsable inspection date");
                report.warnings.push(ParseWarning {
                    row,
                    column: date_column.clone(),
                    value: text.clone(),
                });
            }
        }
        records.push(record);
    }

    if !report.warnings.is_empty() {
        warn!(
            rows = report.rows,
            unparsable = report.warnings.len(),
            "some inspection dates could not be parsed; those records are undated"
        );
    }
    debug!(
        rows = report.rows,
        undated = report.undated,
        date_column = %date_column,
        "normalized extract"
    );

    Ok((
        NormalizedTable {
            headers: schema.headers(),
            date_column,
            records,
        },
        report,
    ))
}

/// Split a free-text team field into individual inspector names.
///
/// ```
/// use visa_data::normalizer::split_inspectors;
///
/// assert_eq!(split_inspectors(" ana,  Bruno ,, "), vec!["ANA", "BRUNO"]);
/// assert!(split_inspectors("").is_empty());
/// ```
pub fn split_inspectors(team: &str) -> Vec<String> {
    team.split(',')
        .map(|token| token.trim().to_uppercase())
        .filter(|name| !name.is_empty())
        .collect()
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn normalize_row(schema: &ResolvedSchema, cells: &[String]) -> InspectionRecord {
    let values: Vec<String> = schema
        .columns
        .iter()
        .map(|column| {
            column
                .source
                .and_then(|i| cells.get(i))
                .map(|cell| cell.trim().to_string())
                .unwrap_or_default()
        })
        .collect();

    let text = |column: RequiredColumn| values[schema.position(column)].clone();

    let date = parse_day_first(&values[schema.date]);
    let team = text(RequiredColumn::Team);

    InspectionRecord {
        establishment: text(RequiredColumn::Establishment),
        shift: text(RequiredColumn::Shift),
        locality: text(RequiredColumn::Locality),
        coordination: text(RequiredColumn::Coordination),
        risk: text(RequiredColumn::Risk),
        released_flag: text(RequiredColumn::ReleaseStatus).to_uppercase(),
        visit_number: text(RequiredColumn::VisitNumber),
        motivation: text(RequiredColumn::Motivation),
        date,
        year: date.map(|d| d.year()),
        month: date.map(|d| d.month()),
        year_month_key: date.map(year_month_key),
        month_year_label: date.map(month_year_label),
        inspectors: split_inspectors(&team),
        team,
        values,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use visa_core::error::DashboardError;

    fn raw(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    fn scenario() -> RawTable {
        raw(
            &["DATA", "EQUIPE/INSPETOR", "O ESTABELECIMENTO FOI LIBERADO", "ESTABELECIMENTO"],
            &[
                &["05/01/2025", "ANA, BRUNO", "SIM", "PADARIA"],
                &["10/01/2025", "ANA", "NÃO", "MERCADO"],
            ],
        )
    }

    #[test]
    fn test_normalize_scenario() {
        let (table, report) = normalize(&scenario()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(report.undated, 0);

        let first = &table.records[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2025, 1, 5));
        assert_eq!(first.year, Some(2025));
        assert_eq!(first.month, Some(1));
        assert_eq!(first.year_month_key.as_deref(), Some("2025-01"));
        assert_eq!(first.month_year_label.as_deref(), Some("Jan/2025"));
        assert_eq!(first.inspectors, vec!["ANA", "BRUNO"]);
        assert_eq!(first.released_bin(), 1);
        assert_eq!(table.records[1].released_bin(), 0);
    }

    #[test]
    fn test_row_count_is_preserved() {
        let input = raw(
            &["DATA", "ESTABELECIMENTO"],
            &[&["", ""], &["lixo", "X"], &["01/01/2025"], &[]],
        );
        let (table, _) = normalize(&input).unwrap();
        assert_eq!(table.len(), input.len());
    }

    #[test]
    fn test_unparsable_date_is_warning_not_error() {
        let input = raw(
            &["DATA", "ESTABELECIMENTO"],
            &[&["ontem", "A"], &["", "B"], &["02/02/2025", "C"]],
        );
        let (table, report) = normalize(&input).unwrap();
        assert!(table.records[0].date.is_none());
        assert!(table.records[0].year_month_key.is_none());
        assert!(table.records[0].month_year_label.is_none());
        assert_eq!(report.undated, 2);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].row, 0);
        assert_eq!(report.warnings[0].value, "ontem");
        assert_eq!(report.warnings[0].column, "DATA");
    }

    #[test]
    fn test_every_text_column_is_trimmed() {
        let input = raw(
            &["DATA", "ESTABELECIMENTO", "OBSERVAÇÕES"],
            &[&[" 05/01/2025 ", "  PADARIA  ", "  nota "]],
        );
        let (table, _) = normalize(&input).unwrap();
        let record = &table.records[0];
        assert_eq!(record.establishment, "PADARIA");
        assert_eq!(record.values, vec!["05/01/2025", "PADARIA", "nota", "", "", "", "", "", "", "", ""]);
        assert!(record.date.is_some());
    }

    #[test]
    fn test_missing_columns_synthesized_empty() {
        let input = raw(&["DATA"], &[&["05/01/2025"]]);
        let (table, report) = normalize(&input).unwrap();
        assert_eq!(report.synthesized_columns.len(), 9);
        let record = &table.records[0];
        assert_eq!(record.team, "");
        assert!(record.inspectors.is_empty());
        assert_eq!(record.released_bin(), 0);
        assert_eq!(table.headers.len(), 10);
    }

    #[test]
    fn test_missing_date_column_fails() {
        let input = raw(&["ESTABELECIMENTO"], &[&["A"]]);
        assert!(matches!(
            normalize(&input),
            Err(DashboardError::Schema { .. })
        ));
    }

    #[test]
    fn test_release_flag_uppercased() {
        let input = raw(
            &["DATA", "O ESTABELECIMENTO FOI LIBERADO"],
            &[&["05/01/2025", " sim "], &["05/01/2025", "Sim, parcialmente"]],
        );
        let (table, _) = normalize(&input).unwrap();
        assert_eq!(table.records[0].released_flag, "SIM");
        assert_eq!(table.records[0].released_bin(), 1);
        assert_eq!(table.records[1].released_bin(), 0);
    }

    #[test]
    fn test_inspector_list_invariant() {
        for team in ["", "   ", ",", " ana ,, bruno ,", "CARLA"] {
            for name in split_inspectors(team) {
                assert!(!name.is_empty());
                assert_eq!(name, name.trim());
            }
        }
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let (first, _) = normalize(&scenario()).unwrap();
        let (second, report) = normalize(&first.to_raw()).unwrap();
        assert_eq!(first.records, second.records);
        assert_eq!(first.headers, second.headers);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_resplitting_single_name_is_stable() {
        let once = split_inspectors("ana");
        let twice = split_inspectors(&once.join(", "));
        assert_eq!(once, twice);
    }
}
