//! One-shot resolution of the extract's columns.
//!
//! Header names vary between extract versions, so they are matched once here
//! (trimmed, upper-cased) and every later lookup is a plain index.

use tracing::warn;
use visa_core::error::{DashboardError, Result};

/// Columns that carry the form-submission timestamp; dropped before anything
/// else so they can never be mistaken for the inspection date.
pub const TIMESTAMP_COLUMNS: &[&str] = &["CARIMBO DE DATA/HORA", "TIMESTAMP"];

/// Any header containing this text (after upper-casing) is a date candidate.
pub const DATE_MARKER: &str = "DATA";

/// The logical columns the dashboard relies on, other than the date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredColumn {
    Establishment,
    Shift,
    Locality,
    Coordination,
    Risk,
    Team,
    ReleaseStatus,
    VisitNumber,
    Motivation,
}

impl RequiredColumn {
    pub const ALL: [RequiredColumn; 9] = [
        RequiredColumn::Establishment,
        RequiredColumn::Shift,
        RequiredColumn::Locality,
        RequiredColumn::Coordination,
        RequiredColumn::Risk,
        RequiredColumn::Team,
        RequiredColumn::ReleaseStatus,
        RequiredColumn::VisitNumber,
        RequiredColumn::Motivation,
    ];

    /// Header text in the extract.
    pub fn header(&self) -> &'static str {
        match self {
            Self::Establishment => "ESTABELECIMENTO",
            Self::Shift => "TURNO",
            Self::Locality => "LOCALIDADE",
            Self::Coordination => "COORDENAÇÃO",
            Self::Risk => "CLASSIFICAÇÃO DE RISCO",
            Self::Team => "EQUIPE/INSPETOR",
            Self::ReleaseStatus => "O ESTABELECIMENTO FOI LIBERADO",
            Self::VisitNumber => "NÚMERO DA VISITA",
            Self::Motivation => "MOTIVAÇÃO",
        }
    }
}

/// One column of the normalized table and where it comes from in the extract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumn {
    /// Normalized header.
    pub name: String,
    /// Index in the raw row; `None` for synthesized empty columns.
    pub source: Option<usize>,
}

/// The extract's columns after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSchema {
    /// Output columns: source columns in order (timestamp dropped), then any
    /// synthesized required columns.
    pub columns: Vec<ResolvedColumn>,
    /// Position of the date column in `columns`.
    pub date: usize,
    required: [usize; 9],
}

impl ResolvedSchema {
    /// Position of a required column in `columns`.
    pub fn position(&self, column: RequiredColumn) -> usize {
        self.required[column as usize]
    }

    /// Normalized header names, in output order.
    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Name of the detected date column.
    pub fn date_column(&self) -> &str {
        &self.columns[self.date].name
    }

    /// Headers that were missing and filled with empty text.
    pub fn synthesized(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.source.is_none())
            .map(|c| c.name.clone())
            .collect()
    }
}

/// Header as it is compared: trimmed and upper-cased.
pub fn normalize_header(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Resolve raw headers into a [`ResolvedSchema`].
///
/// Fails with [`DashboardError::Schema`] when no date-bearing column exists.
/// Other required columns are synthesized as empty when absent.
pub fn resolve(raw_headers: &[String]) -> Result<ResolvedSchema> {
    let mut columns: Vec<ResolvedColumn> = raw_headers
        .iter()
        .enumerate()
        .map(|(index, raw)| ResolvedColumn {
            name: normalize_header(raw),
            source: Some(index),
        })
        .filter(|c| !TIMESTAMP_COLUMNS.contains(&c.name.as_str()))
        .collect();

    let date = columns
        .iter()
        .position(|c| c.name.contains(DATE_MARKER))
        .ok_or_else(|| DashboardError::Schema {
            missing: "date column (header containing \"DATA\")".to_string(),
            found: columns.iter().map(|c| c.name.clone()).collect(),
        })?;

    let mut required = [0usize; 9];
    let mut synthesized: Vec<&'static str> = Vec::new();
    for column in RequiredColumn::ALL {
        let header = column.header();
        let position = match columns.iter().position(|c| c.name == header) {
            Some(p) => p,
            None => {
                synthesized.push(header);
                columns.push(ResolvedColumn {
                    name: header.to_string(),
                    source: None,
                });
                columns.len() - 1
            }
        };
        required[column as usize] = position;
    }

    if !synthesized.is_empty() {
        warn!(columns = ?synthesized, "required columns missing from extract; using empty values");
    }

    Ok(ResolvedSchema {
        columns,
        date,
        required,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
