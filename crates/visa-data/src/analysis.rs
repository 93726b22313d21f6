//! One-pass dashboard pipeline.
//!
//! Explodes the snapshot once, filters both tables against the scoped
//! selection, and hands the same filtered view to every aggregate.

use serde::Serialize;
use tracing::debug;
use visa_core::error::Result;
use visa_core::models::CategoricalField;
use visa_core::selection::{FilterSelection, Identity};

use crate::aggregator::{
    Aggregator, CategoryCount, EstablishmentCount, EstablishmentProfile, FilterOptions,
    InspectorPerformance, MonthlyInspectorCount, OverallKpis, RankingRow, UnitRollup,
    TOP_ESTABLISHMENTS,
};
use crate::expander::explode;
use crate::filter::{apply, FilteredView};
use crate::normalizer::NormalizedTable;

// ── Public types ──────────────────────────────────────────────────────────────

/// Everything the presentation layer renders for one selection.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub identity: Identity,
    pub selection: FilterSelection,
    pub kpis: OverallKpis,
    pub inspectors: Vec<InspectorPerformance>,
    /// Month the ranking was computed for; the latest month present when the
    /// caller did not pick one.
    pub ranking_month: Option<String>,
    /// `None` for inspector-scoped identities.
    pub ranking: Option<Vec<RankingRow>>,
    pub monthly_series: Vec<MonthlyInspectorCount>,
    /// `None` for inspector-scoped identities.
    pub coordination: Option<Vec<UnitRollup>>,
    pub top_establishments: Vec<EstablishmentCount>,
    pub by_locality: Vec<CategoryCount>,
    pub by_risk: Vec<CategoryCount>,
    /// Present only when exactly one establishment is selected.
    pub establishment_summary: Option<Vec<EstablishmentProfile>>,
    /// Choices available to this identity, over the unfiltered snapshot.
    pub options: FilterOptions,
}

impl DashboardReport {
    /// Pretty JSON rendering of the report.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ── Public function ───────────────────────────────────────────────────────────

/// Run the full derivation for one selection.
///
/// 1. Explode the normalized table.
/// 2. Apply the identity-scoped selection to both tables.
/// 3. Compute every aggregate over that single filtered view.
///
/// Cross-inspector aggregates (ranking, coordination rollup) are skipped for
/// inspector identities.
pub fn build_dashboard(
    table: &NormalizedTable,
    selection: &FilterSelection,
    identity: &Identity,
    ranking_month: Option<&str>,
) -> DashboardReport {
    let exploded = explode(&table.records);
    let view = FilteredView::build(&table.records, &exploded, selection, identity);

    let visible = apply(&table.records, &identity.scope(&FilterSelection::all()));
    let options = Aggregator::filter_options(&visible);

    let ranking_month = ranking_month
        .map(str::to_string)
        .or_else(|| Aggregator::available_months(&view.records).pop());

    let (ranking, coordination) = if identity.is_admin() {
        (
            Some(
                ranking_month
                    .as_deref()
                    .map(|month| Aggregator::monthly_ranking(&view.exploded, month))
                    .unwrap_or_default(),
            ),
            Some(Aggregator::coordination_rollup(&view.records)),
        )
    } else {
        (None, None)
    };

    let establishment_summary = selection
        .single_establishment()
        .map(|_| Aggregator::establishment_profiles(&view.records));

    let report = DashboardReport {
        identity: identity.clone(),
        selection: selection.clone(),
        kpis: Aggregator::overall(&view.records),
        inspectors: Aggregator::inspector_performance(&view.records, &view.exploded),
        ranking_month,
        ranking,
        monthly_series: Aggregator::monthly_series(&view.exploded),
        coordination,
        top_establishments: Aggregator::top_establishments(&view.records, TOP_ESTABLISHMENTS),
        by_locality: Aggregator::category_counts(&view.records, CategoricalField::Locality),
        by_risk: Aggregator::category_counts(&view.records, CategoricalField::Risk),
        establishment_summary,
        options,
    };

    debug!(
        rows = report.kpis.total,
        inspectors = report.inspectors.len(),
        admin = identity.is_admin(),
        "built dashboard report"
    );

    report
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::normalize;
    use visa_core::models::RawTable;

    fn table() -> NormalizedTable {
        let headers = [
            "Carimbo de data/hora",
            "DATA",
            "ESTABELECIMENTO",
            "EQUIPE/INSPETOR",
            "O ESTABELECIMENTO FOI LIBERADO",
            "COORDENAÇÃO",
            "LOCALIDADE",
            "CLASSIFICAÇÃO DE RISCO",
        ];
        let rows = [
            ["05/01/2025 10:00:00", "05/01/2025", "PADARIA", "ANA, BRUNO", "SIM", "C1", "CENTRO", "ALTO"],
            ["10/01/2025 11:00:00", "10/01/2025", "MERCADO", "ANA", "NÃO", "C2", "PORTO", "BAIXO"],
            ["03/12/2024 09:00:00", "03/12/2024", "PADARIA", "CARLA", "SIM", "C1", "CENTRO", "ALTO"],
        ];
        let raw = RawTable::new(
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        );
        normalize(&raw).unwrap().0
    }

    #[test]
    fn test_admin_report_has_everything() {
        let report = build_dashboard(&table(), &FilterSelection::all(), &Identity::admin(), None);
        assert_eq!(report.kpis.total, 3);
        assert_eq!(report.ranking_month.as_deref(), Some("2025-01"));
        let ranking = report.ranking.unwrap();
        assert_eq!(ranking[0].inspector, "ANA");
        assert_eq!(ranking[0].count, 2);
        assert_eq!(report.coordination.unwrap().len(), 2);
        assert_eq!(report.monthly_series[0].month_year_label, "Dec/2024");
        assert!(report.establishment_summary.is_none());
        assert_eq!(report.options.inspectors, vec!["ANA", "BRUNO", "CARLA"]);
    }

    #[test]
    fn test_inspector_report_is_scoped() {
        let report = build_dashboard(
            &table(),
            &FilterSelection::all().with_inspectors(["CARLA"]),
            &Identity::inspector("Bruno"),
            None,
        );
        assert_eq!(report.kpis.total, 1);
        assert!(report.ranking.is_none());
        assert!(report.coordination.is_none());
        assert_eq!(report.inspectors.len(), 1);
        assert_eq!(report.inspectors[0].inspector, "BRUNO");
        assert_eq!(report.options.inspectors, vec!["ANA", "BRUNO"]);
    }

    #[test]
    fn test_explicit_ranking_month() {
        let report = build_dashboard(
            &table(),
            &FilterSelection::all(),
            &Identity::admin(),
            Some("2024-12"),
        );
        let ranking = report.ranking.unwrap();
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].inspector, "CARLA");
    }

    #[test]
    fn test_single_establishment_summary() {
        let selection =
            FilterSelection::all().with_values(CategoricalField::Establishment, ["PADARIA"]);
        let report = build_dashboard(&table(), &selection, &Identity::admin(), None);
        let summary = report.establishment_summary.unwrap();
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].risk, "ALTO");
        assert_eq!(report.kpis.total, 2);
    }

    #[test]
    fn test_empty_selection_result_is_well_formed() {
        let selection = FilterSelection::all().with_inspectors(["NINGUÉM"]);
        let report = build_dashboard(&table(), &selection, &Identity::admin(), None);
        assert_eq!(report.kpis.total, 0);
        assert_eq!(report.kpis.release_rate, 0.0);
        assert!(report.ranking_month.is_none());
        assert!(report.ranking.as_ref().unwrap().is_empty());
        assert!(report.inspectors.is_empty());
        assert!(report.to_json().unwrap().contains("\"total\": 0"));
    }
}
