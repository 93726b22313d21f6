//! Filter selections and the resolved viewer identity.
//!
//! Both are plain values handed to the filter engine on every render; neither
//! is ever held as ambient state.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};
use crate::models::CategoricalField;

// ── DateRange ─────────────────────────────────────────────────────────────────

/// Inclusive calendar range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range, swapping the bounds if they arrive reversed.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

// ── FilterSelection ───────────────────────────────────────────────────────────

/// The operator's current slicing choices.
///
/// Every part is optional; an empty set means "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSelection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    /// Allowed `"YYYY-MM"` keys.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub months: BTreeSet<String>,
    /// Allowed exact dates.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub dates: BTreeSet<NaiveDate>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub categorical: BTreeMap<CategoricalField, BTreeSet<String>>,
    /// Allowed inspector names (any-of against the record's inspector list).
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub inspectors: BTreeSet<String>,
}

impl FilterSelection {
    /// A selection with nothing restricted.
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict a categorical column to `values` (builder style).
    pub fn with_values<I, S>(mut self, field: CategoricalField, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_values(field, values);
        self
    }

    /// Replace the allowed set of a categorical column. An empty iterator
    /// clears the restriction.
    pub fn set_values<I, S>(&mut self, field: CategoricalField, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        if set.is_empty() {
            self.categorical.remove(&field);
        } else {
            self.categorical.insert(field, set);
        }
    }

    /// Allowed values for `field`, `None` when unrestricted.
    pub fn values(&self, field: CategoricalField) -> Option<&BTreeSet<String>> {
        self.categorical
            .get(&field)
            .filter(|set| !set.is_empty())
    }

    pub fn with_date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.date_range = Some(DateRange::new(start, end));
        self
    }

    pub fn with_inspectors<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inspectors = names.into_iter().map(Into::into).collect();
        self
    }

    /// `true` when any predicate that needs a date is active.
    pub fn filters_by_date(&self) -> bool {
        self.date_range.is_some() || !self.months.is_empty() || !self.dates.is_empty()
    }

    /// `true` when nothing is restricted.
    pub fn is_unrestricted(&self) -> bool {
        !self.filters_by_date()
            && self.inspectors.is_empty()
            && self.categorical.values().all(BTreeSet::is_empty)
    }

    /// The single selected establishment, if exactly one is selected.
    pub fn single_establishment(&self) -> Option<&str> {
        let set = self.values(CategoricalField::Establishment)?;
        if set.len() == 1 {
            set.iter().next().map(String::as_str)
        } else {
            None
        }
    }
}

// ── Identity ──────────────────────────────────────────────────────────────────

/// The two access tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Inspector,
}

/// Who is looking at the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub role: Role,
    /// Upper-cased inspector name; always `Some` for [`Role::Inspector`].
    pub inspector: Option<String>,
}

impl Identity {
    pub fn admin() -> Self {
        Self {
            role: Role::Admin,
            inspector: None,
        }
    }

    /// An inspector-scoped identity. The name is normalized the same way
    /// inspector lists are.
    pub fn inspector(name: &str) -> Self {
        Self {
            role: Role::Inspector,
            inspector: Some(name.trim().to_uppercase()),
        }
    }

    /// Resolve a `(role, name)` pair supplied by the presentation layer.
    pub fn resolve(role: &str, name: Option<&str>) -> Result<Self> {
        match role.trim().to_lowercase().as_str() {
            "admin" => Ok(Self::admin()),
            "inspector" => match name.map(str::trim).filter(|n| !n.is_empty()) {
                Some(n) => Ok(Self::inspector(n)),
                None => Err(DashboardError::Config(
                    "inspector role requires an inspector name".to_string(),
                )),
            },
            other => Err(DashboardError::Config(format!("unknown role: {other}"))),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Apply this identity to a selection.
    ///
    /// Inspectors always see exactly their own records, whatever inspector
    /// choice the selection carried.
    pub fn scope(&self, selection: &FilterSelection) -> FilterSelection {
        let mut scoped = selection.clone();
        if let (Role::Inspector, Some(name)) = (self.role, self.inspector.as_ref()) {
            scoped.inspectors = BTreeSet::from([name.clone()]);
        }
        scoped
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::admin()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
