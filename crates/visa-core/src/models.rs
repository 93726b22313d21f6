use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The only release-status value that counts as "released".
pub const AFFIRMATIVE_RELEASE: &str = "SIM";

/// A tabular extract exactly as read from the source: headers plus rows of
/// text cells. Rows may be shorter than the header list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    /// Column names in source order.
    pub headers: Vec<String>,
    /// One entry per data row, one string per cell.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Build a table from headers and rows.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// `true` when the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell text at (`row`, `col`), `None` when the row is short.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }
}

/// The categorical columns a selection can restrict.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalField {
    Shift,
    Locality,
    Establishment,
    Coordination,
    Risk,
    Motivation,
    ReleaseStatus,
}

impl CategoricalField {
    /// Every categorical field, in display order.
    pub const ALL: [CategoricalField; 7] = [
        CategoricalField::Establishment,
        CategoricalField::Shift,
        CategoricalField::Locality,
        CategoricalField::Coordination,
        CategoricalField::Risk,
        CategoricalField::Motivation,
        CategoricalField::ReleaseStatus,
    ];

    /// Portuguese display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Shift => "Turno",
            Self::Locality => "Localidade",
            Self::Establishment => "Estabelecimento",
            Self::Coordination => "Coordenação",
            Self::Risk => "Classificação de Risco",
            Self::Motivation => "Motivação",
            Self::ReleaseStatus => "Status do Estabelecimento",
        }
    }
}

/// Three-valued reading of the release-status column.
///
/// Release-rate statistics only ever use [`InspectionRecord::released_bin`];
/// this exists so blank statuses can be counted separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseStatus {
    Released,
    NotReleased,
    Unknown,
}

/// One inspection after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionRecord {
    pub establishment: String,
    pub shift: String,
    pub locality: String,
    pub coordination: String,
    pub risk: String,
    /// Free-text team field as written in the extract (trimmed).
    pub team: String,
    /// Upper-cased, trimmed release-status text.
    pub released_flag: String,
    pub visit_number: String,
    pub motivation: String,
    /// Inspection date; `None` when the source text did not parse.
    pub date: Option<NaiveDate>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    /// `"YYYY-MM"` bucket key.
    pub year_month_key: Option<String>,
    /// `"Mon/YYYY"` display label.
    pub month_year_label: Option<String>,
    /// Individual inspectors parsed from `team`: trimmed, upper-cased, no blanks.
    pub inspectors: Vec<String>,
    /// Every source column (timestamp column excluded), trimmed, in header order.
    pub values: Vec<String>,
}

impl InspectionRecord {
    /// `1` when the establishment was released, `0` otherwise (including blank).
    pub fn released_bin(&self) -> u32 {
        u32::from(self.released_flag == AFFIRMATIVE_RELEASE)
    }

    pub fn is_released(&self) -> bool {
        self.released_bin() == 1
    }

    pub fn release_status(&self) -> ReleaseStatus {
        if self.is_released() {
            ReleaseStatus::Released
        } else if self.released_flag.is_empty() {
            ReleaseStatus::Unknown
        } else {
            ReleaseStatus::NotReleased
        }
    }

    /// Value of a categorical column.
    pub fn field(&self, field: CategoricalField) -> &str {
        match field {
            CategoricalField::Shift => &self.shift,
            CategoricalField::Locality => &self.locality,
            CategoricalField::Establishment => &self.establishment,
            CategoricalField::Coordination => &self.coordination,
            CategoricalField::Risk => &self.risk,
            CategoricalField::Motivation => &self.motivation,
            CategoricalField::ReleaseStatus => &self.released_flag,
        }
    }
}

/// One (inspection, inspector) pair. Borrowed from the normalized table it
/// was expanded from, so it can never outlive that snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplodedRecord<'a> {
    pub record: &'a InspectionRecord,
    pub inspector: &'a str,
}

/// A non-fatal per-row problem found during normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseWarning {
    /// Zero-based data-row index in the extract.
    pub row: usize,
    /// Column the value came from.
    pub column: String,
    /// The offending text.
    pub value: String,
}
