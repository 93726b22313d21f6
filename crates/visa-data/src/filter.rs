//! Filter Engine.
//!
//! The same selection is applied to the normalized table and to its exploded
//! counterpart so that counts taken from either side agree. Every predicate is
//! optional; active predicates are ANDed; input order is preserved.

use std::collections::BTreeSet;

use tracing::debug;
use visa_core::models::{CategoricalField, ExplodedRecord, InspectionRecord};
use visa_core::selection::{FilterSelection, Identity};

// ── Filterable ────────────────────────────────────────────────────────────────

/// A row the engine can test: either a whole inspection or one exploded
/// (inspection, inspector) pair.
pub trait Filterable {
    /// The inspection the row belongs to.
    fn record(&self) -> &InspectionRecord;

    /// `true` when the row's inspector(s) intersect `allowed`.
    fn has_inspector_in(&self, allowed: &BTreeSet<String>) -> bool;
}

impl Filterable for InspectionRecord {
    fn record(&self) -> &InspectionRecord {
        self
    }

    fn has_inspector_in(&self, allowed: &BTreeSet<String>) -> bool {
        self.inspectors.iter().any(|name| allowed.contains(name))
    }
}

impl Filterable for ExplodedRecord<'_> {
    fn record(&self) -> &InspectionRecord {
        self.record
    }

    fn has_inspector_in(&self, allowed: &BTreeSet<String>) -> bool {
        allowed.contains(self.inspector)
    }
}

// ── Predicates ────────────────────────────────────────────────────────────────

/// `true` when `row` passes every active predicate of `selection`.
pub fn matches<T: Filterable + ?Sized>(row: &T, selection: &FilterSelection) -> bool {
    let record = row.record();

    if selection.filters_by_date() {
        let Some(date) = record.date else {
            return false;
        };
        if let Some(range) = &selection.date_range {
            if !range.contains(date) {
                return false;
            }
        }
        if !selection.dates.is_empty() && !selection.dates.contains(&date) {
            return false;
        }
        if !selection.months.is_empty() {
            let in_month = record
                .year_month_key
                .as_ref()
                .is_some_and(|key| selection.months.contains(key));
            if !in_month {
                return false;
            }
        }
    }

    for field in CategoricalField::ALL {
        if let Some(allowed) = selection.values(field) {
            if !allowed.contains(record.field(field)) {
                return false;
            }
        }
    }

    selection.inspectors.is_empty() || row.has_inspector_in(&selection.inspectors)
}

/// Keep the rows of `rows` that match `selection`, in input order.
pub fn apply<'r, T: Filterable>(rows: &'r [T], selection: &FilterSelection) -> Vec<&'r T> {
    if selection.is_unrestricted() {
        return rows.iter().collect();
    }
    rows.iter().filter(|row| matches(*row, selection)).collect()
}

// ── FilteredView ──────────────────────────────────────────────────────────────

/// Both filtered tables for one selection, sharing the same snapshot.
#[derive(Debug, Clone, Default)]
pub struct FilteredView<'a> {
    pub records: Vec<&'a InspectionRecord>,
    pub exploded: Vec<ExplodedRecord<'a>>,
}

impl<'a> FilteredView<'a> {
    /// Apply `selection`, scoped by `identity`, to both tables.
    pub fn build(
        records: &'a [InspectionRecord],
        exploded: &[ExplodedRecord<'a>],
        selection: &FilterSelection,
        identity: &Identity,
    ) -> Self {
        let scoped = identity.scope(selection);
        let view = Self {
            records: apply(records, &scoped),
            exploded: apply(exploded, &scoped).into_iter().copied().collect(),
        };
        debug!(
            records = view.records.len(),
            exploded = view.exploded.len(),
            of = records.len(),
            "applied filter selection"
        );
        view
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
