//! Aggregator: derived statistics over one filtered view.
//!
//! Every function is pure and degrades to empty or zero-valued output on an
//! empty input. Rates use the binary release flag and are always within
//! `[0, 100]`.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;
use visa_core::formatting::ratio_percent;
use visa_core::models::{CategoricalField, ExplodedRecord, InspectionRecord, ReleaseStatus};

/// Label used for blank category values in breakdowns.
pub const BLANK_LABEL: &str = "(em branco)";

/// Number of rows in the establishment leaderboard.
pub const TOP_ESTABLISHMENTS: usize = 10;

// ── Output rows ───────────────────────────────────────────────────────────────

/// Headline numbers for the filtered set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OverallKpis {
    pub total: usize,
    pub establishments: usize,
    pub inspectors: usize,
    pub released: usize,
    pub release_rate: f64,
    /// Distinct calendar days with at least one dated inspection.
    pub active_days: usize,
    pub undated: usize,
    /// Records whose release status is blank (still counted as not released).
    pub unknown_status: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectorPerformance {
    pub inspector: String,
    pub count: usize,
    pub released: usize,
    pub establishments: usize,
    pub release_rate: f64,
    /// `count` over the distinct days of the whole filtered set (at least 1).
    pub per_day: f64,
    /// Share of the summed inspector counts, in percent.
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyInspectorCount {
    pub year_month_key: String,
    pub month_year_label: String,
    pub inspector: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingRow {
    /// 1-based.
    pub position: usize,
    pub inspector: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitRollup {
    pub coordination: String,
    pub count: usize,
    pub establishments: usize,
    pub released: usize,
    pub release_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstablishmentCount {
    pub establishment: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub value: String,
    pub count: usize,
    pub share: f64,
}

/// Identifying attributes of a selected establishment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EstablishmentProfile {
    pub establishment: String,
    pub locality: String,
    pub coordination: String,
    pub risk: String,
}

/// Choices a presentation layer can offer for each filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    /// Year-month keys, chronological.
    pub months: Vec<String>,
    pub dates: Vec<NaiveDate>,
    pub categorical: BTreeMap<CategoricalField, Vec<String>>,
    pub inspectors: Vec<String>,
}

// ── Aggregator ────────────────────────────────────────────────────────────────

/// Stateless helper grouping filtered inspections into derived tables.
pub struct Aggregator;

impl Aggregator {
    /// Overall KPIs over the filtered normalized records.
    pub fn overall(records: &[&InspectionRecord]) -> OverallKpis {
        let total = records.len();
        let released = records.iter().map(|r| r.released_bin() as usize).sum();

        let establishments: HashSet<&str> =
            records.iter().filter_map(|r| named_establishment(r)).collect();
        let inspectors: HashSet<&str> = records
            .iter()
            .flat_map(|r| r.inspectors.iter().map(String::as_str))
            .collect();

        OverallKpis {
            total,
            establishments: establishments.len(),
            inspectors: inspectors.len(),
            released,
            release_rate: ratio_percent(released as f64, total as f64),
            active_days: distinct_dates(records),
            undated: records.iter().filter(|r| r.date.is_none()).count(),
            unknown_status: records
                .iter()
                .filter(|r| r.release_status() == ReleaseStatus::Unknown)
                .count(),
        }
    }

    /// Per-inspector performance, most active first.
    ///
    /// `records` is the filtered normalized table the exploded rows were
    /// filtered alongside; it supplies the active-day denominator.
    pub fn inspector_performance(
        records: &[&InspectionRecord],
        exploded: &[ExplodedRecord<'_>],
    ) -> Vec<InspectorPerformance> {
        struct Acc<'a> {
            inspector: &'a str,
            count: usize,
            released: usize,
            establishments: HashSet<&'a str>,
        }

        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut groups: Vec<Acc<'_>> = Vec::new();
        for row in exploded {
            let slot = *index.entry(row.inspector).or_insert_with(|| {
                groups.push(Acc {
                    inspector: row.inspector,
                    count: 0,
                    released: 0,
                    establishments: HashSet::new(),
                });
                groups.len() - 1
            });
            let acc = &mut groups[slot];
            acc.count += 1;
            acc.released += row.record.released_bin() as usize;
            if let Some(name) = named_establishment(row.record) {
                acc.establishments.insert(name);
            }
        }

        let days = distinct_dates(records).max(1) as f64;
        let total: usize = groups.iter().map(|g| g.count).sum();

        let mut rows: Vec<InspectorPerformance> = groups
            .into_iter()
            .map(|g| InspectorPerformance {
                inspector: g.inspector.to_string(),
                count: g.count,
                released: g.released,
                establishments: g.establishments.len(),
                release_rate: ratio_percent(g.released as f64, g.count as f64),
                per_day: g.count as f64 / days,
                share: ratio_percent(g.count as f64, total as f64),
            })
            .collect();

        // Stable: equal counts keep first-seen order.
        rows.sort_by(|a, b| b.count.cmp(&a.count));
        rows
    }

    /// Inspections per (month, inspector), chronological by the month the key
    /// represents, then by inspector name. Undated rows are skipped.
    pub fn monthly_series(exploded: &[ExplodedRecord<'_>]) -> Vec<MonthlyInspectorCount> {
        let mut groups: BTreeMap<(i32, u32, &str), (&str, &str, usize)> = BTreeMap::new();
        for row in exploded {
            let record = row.record;
            let (Some(year), Some(month), Some(key), Some(label)) = (
                record.year,
                record.month,
                record.year_month_key.as_deref(),
                record.month_year_label.as_deref(),
            ) else {
                continue;
            };
            groups
                .entry((year, month, row.inspector))
                .or_insert((key, label, 0))
                .2 += 1;
        }

        groups
            .into_iter()
            .map(|((_, _, inspector), (key, label, count))| MonthlyInspectorCount {
                year_month_key: key.to_string(),
                month_year_label: label.to_string(),
                inspector: inspector.to_string(),
                count,
            })
            .collect()
    }

    /// Ranking of inspectors for one `"YYYY-MM"` month.
    ///
    /// Descending by count; equal counts are ordered alphabetically by name.
    pub fn monthly_ranking(exploded: &[ExplodedRecord<'_>], month_key: &str) -> Vec<RankingRow> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for row in exploded {
            if row.record.year_month_key.as_deref() == Some(month_key) {
                *counts.entry(row.inspector).or_default() += 1;
            }
        }

        let mut ordered: Vec<(&str, usize)> = counts.into_iter().collect();
        ordered.sort_by(|a, b| b.1.cmp(&a.1));

        ordered
            .into_iter()
            .enumerate()
            .map(|(i, (inspector, count))| RankingRow {
                position: i + 1,
                inspector: inspector.to_string(),
                count,
            })
            .collect()
    }

    /// Year-month keys present in `records`, chronological.
    pub fn available_months(records: &[&InspectionRecord]) -> Vec<String> {
        let months: BTreeMap<(i32, u32), &str> = records
            .iter()
            .filter_map(|r| Some(((r.year?, r.month?), r.year_month_key.as_deref()?)))
            .collect();
        months.into_values().map(str::to_string).collect()
    }

    /// Per coordinating unit, busiest first (stable on ties).
    pub fn coordination_rollup(records: &[&InspectionRecord]) -> Vec<UnitRollup> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut groups: Vec<(&str, usize, usize, HashSet<&str>)> = Vec::new();
        for record in records {
            let unit = record.coordination.as_str();
            let slot = *index.entry(unit).or_insert_with(|| {
                groups.push((unit, 0, 0, HashSet::new()));
                groups.len() - 1
            });
            let group = &mut groups[slot];
            group.1 += 1;
            group.2 += record.released_bin() as usize;
            if let Some(name) = named_establishment(record) {
                group.3.insert(name);
            }
        }

        let mut rows: Vec<UnitRollup> = groups
            .into_iter()
            .map(|(unit, count, released, establishments)| UnitRollup {
                coordination: unit.to_string(),
                count,
                establishments: establishments.len(),
                released,
                release_rate: ratio_percent(released as f64, count as f64),
            })
            .collect();
        rows.sort_by(|a, b| b.count.cmp(&a.count));
        rows
    }

    /// The `limit` most inspected establishments. Equal counts are ordered
    /// alphabetically, so the cut-off is deterministic. Rows without an
    /// establishment name are left out.
    pub fn top_establishments(records: &[&InspectionRecord], limit: usize) -> Vec<EstablishmentCount> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for name in records.iter().filter_map(|r| named_establishment(r)) {
            *counts.entry(name).or_default() += 1;
        }

        let mut rows: Vec<EstablishmentCount> = counts
            .into_iter()
            .map(|(establishment, count)| EstablishmentCount {
                establishment: establishment.to_string(),
                count,
            })
            .collect();
        rows.sort_by(|a, b| b.count.cmp(&a.count));
        rows.truncate(limit);
        rows
    }

    /// Visit counts per value of `field`, most frequent first, alphabetical on
    /// ties. Blank values are grouped under [`BLANK_LABEL`].
    pub fn category_counts(records: &[&InspectionRecord], field: CategoricalField) -> Vec<CategoryCount> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for record in records {
            let value = record.field(field);
            let key = if value.is_empty() { BLANK_LABEL } else { value };
            *counts.entry(key).or_default() += 1;
        }

        let total = records.len() as f64;
        let mut rows: Vec<CategoryCount> = counts
            .into_iter()
            .map(|(value, count)| CategoryCount {
                value: value.to_string(),
                count,
                share: ratio_percent(count as f64, total),
            })
            .collect();
        rows.sort_by(|a, b| b.count.cmp(&a.count));
        rows
    }

    /// Distinct (establishment, locality, coordination, risk) tuples, in
    /// first-seen order.
    pub fn establishment_profiles(records: &[&InspectionRecord]) -> Vec<EstablishmentProfile> {
        let mut seen: HashSet<(&str, &str, &str, &str)> = HashSet::new();
        let mut rows = Vec::new();
        for r in records {
            let key = (
                r.establishment.as_str(),
                r.locality.as_str(),
                r.coordination.as_str(),
                r.risk.as_str(),
            );
            if seen.insert(key) {
                rows.push(EstablishmentProfile {
                    establishment: key.0.to_string(),
                    locality: key.1.to_string(),
                    coordination: key.2.to_string(),
                    risk: key.3.to_string(),
                });
            }
        }
        rows
    }

    /// Sorted distinct non-blank values for every filter.
    pub fn filter_options(records: &[&InspectionRecord]) -> FilterOptions {
        let mut categorical: BTreeMap<CategoricalField, Vec<String>> = BTreeMap::new();
        for field in CategoricalField::ALL {
            let values: BTreeSet<&str> = records
                .iter()
                .map(|r| r.field(field))
                .filter(|v| !v.is_empty())
                .collect();
            categorical.insert(field, values.into_iter().map(str::to_string).collect());
        }

        let dates: BTreeSet<NaiveDate> = records.iter().filter_map(|r| r.date).collect();
        let inspectors: BTreeSet<&str> = records
            .iter()
            .flat_map(|r| r.inspectors.iter().map(String::as_str))
            .collect();

        FilterOptions {
            months: Self::available_months(records),
            dates: dates.into_iter().collect(),
            categorical,
            inspectors: inspectors.into_iter().map(str::to_string).collect(),
        }
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Establishment name, or `None` when the cell is blank.
fn named_establishment(record: &InspectionRecord) -> Option<&str> {
    let name = record.establishment.as_str();
    (!name.is_empty()).then_some(name)
}

fn distinct_dates(records: &[&InspectionRecord]) -> usize {
    records
        .iter()
        .filter_map(|r| r.date)
        .collect::<HashSet<NaiveDate>>()
        .len()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expander::explode;
    use crate::filter::apply;
    use crate::normalizer::normalize;
    use visa_core::models::RawTable;
    use visa_core::selection::FilterSelection;

    const HEADERS: [&str; 6] = [
        "DATA",
        "EQUIPE/INSPETOR",
        "O ESTABELECIMENTO FOI LIBERADO",
        "ESTABELECIMENTO",
        "COORDENAÇÃO",
        "LOCALIDADE",
    ];

    fn records(rows: &[[&str; 6]]) -> Vec<InspectionRecord> {
        let raw = RawTable::new(
            HEADERS.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        );
        normalize(&raw).unwrap().0.records
    }

    fn scenario() -> Vec<InspectionRecord> {
        records(&[
            ["05/01/2025", "ANA, BRUNO", "SIM", "PADARIA", "C1", "CENTRO"],
            ["10/01/2025", "ANA", "NÃO", "MERCADO", "C2", "PORTO"],
        ])
    }

    fn refs(records: &[InspectionRecord]) -> Vec<&InspectionRecord> {
        records.iter().collect()
    }

    #[test]
    fn test_scenario_inspector_performance() {
        let data = scenario();
        let exploded = explode(&data);
        assert_eq!(exploded.len(), 3);

        let perf = Aggregator::inspector_performance(&refs(&data), &exploded);
        assert_eq!(perf.len(), 2);

        let ana = &perf[0];
        assert_eq!(ana.inspector, "ANA");
        assert_eq!(ana.count, 2);
        assert_eq!(ana.released, 1);
        assert_eq!(ana.release_rate, 50.0);
        assert_eq!(ana.establishments, 2);
        assert_eq!(ana.per_day, 1.0);

        let bruno = &perf[1];
        assert_eq!(bruno.inspector, "BRUNO");
        assert_eq!(bruno.count, 1);
        assert_eq!(bruno.released, 1);
        assert_eq!(bruno.release_rate, 100.0);
        assert!((bruno.share - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_scenario_overall_kpis() {
        let data = scenario();
        let kpis = Aggregator::overall(&refs(&data));
        assert_eq!(kpis.total, 2);
        assert_eq!(kpis.establishments, 2);
        assert_eq!(kpis.inspectors, 2);
        assert_eq!(kpis.released, 1);
        assert_eq!(kpis.release_rate, 50.0);
        assert_eq!(kpis.active_days, 2);
        assert_eq!(kpis.undated, 0);
    }

    #[test]
    fn test_empty_team_counts_overall_but_not_per_inspector() {
        let data = records(&[
            ["05/01/2025", "", "SIM", "PADARIA", "C1", "CENTRO"],
            ["05/01/2025", "ANA", "NÃO", "BAR", "C1", "CENTRO"],
        ]);
        let exploded = explode(&data);
        let kpis = Aggregator::overall(&refs(&data));
        assert_eq!(kpis.total, 2);
        assert_eq!(kpis.released, 1);

        let perf = Aggregator::inspector_performance(&refs(&data), &exploded);
        assert_eq!(perf.len(), 1);
        assert_eq!(perf[0].count, 1);
        assert_eq!(perf[0].released, 0);
    }

    #[test]
    fn test_empty_input_yields_zero_results() {
        let kpis = Aggregator::overall(&[]);
        assert_eq!(kpis, OverallKpis::default());
        assert_eq!(kpis.release_rate, 0.0);
        assert!(Aggregator::inspector_performance(&[], &[]).is_empty());
        assert!(Aggregator::monthly_series(&[]).is_empty());
        assert!(Aggregator::monthly_ranking(&[], "2025-01").is_empty());
        assert!(Aggregator::coordination_rollup(&[]).is_empty());
        assert!(Aggregator::top_establishments(&[], TOP_ESTABLISHMENTS).is_empty());
        assert!(Aggregator::category_counts(&[], CategoricalField::Locality).is_empty());
        assert_eq!(Aggregator::filter_options(&[]), FilterOptions {
            categorical: CategoricalField::ALL.iter().map(|f| (*f, Vec::new())).collect(),
            ..Default::default()
        });
    }

    #[test]
    fn test_filter_excluding_everything_aggregates_to_zero() {
        let data = scenario();
        let exploded = explode(&data);
        let sel = FilterSelection::all().with_date_range(
            NaiveDate::from_ymd_opt(2031, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2031, 2, 1).unwrap(),
        );
        let records = apply(&data, &sel);
        let rows: Vec<ExplodedRecord<'_>> = apply(&exploded, &sel).into_iter().copied().collect();
        assert!(records.is_empty() && rows.is_empty());

        let kpis = Aggregator::overall(&records);
        assert_eq!(kpis.total, 0);
        assert_eq!(kpis.release_rate, 0.0);
        assert!(Aggregator::inspector_performance(&records, &rows).is_empty());
    }

    #[test]
    fn test_per_day_denominator_floored_when_undated() {
        let data = records(&[
            ["", "ANA", "SIM", "A", "C1", "X"],
            ["lixo", "ANA", "SIM", "B", "C1", "X"],
        ]);
        let exploded = explode(&data);
        let perf = Aggregator::inspector_performance(&refs(&data), &exploded);
        assert_eq!(perf[0].per_day, 2.0);
    }

    #[test]
    fn test_release_rates_within_bounds() {
        let data = records(&[
            ["05/01/2025", "ANA", "SIM", "A", "C1", "X"],
            ["05/01/2025", "ANA, BRUNO", "", "B", "C2", "Y"],
            ["06/01/2025", "CARLA", "NÃO", "C", "", "Y"],
        ]);
        let exploded = explode(&data);
        let r = refs(&data);
        let mut rates = vec![Aggregator::overall(&r).release_rate];
        rates.extend(Aggregator::inspector_performance(&r, &exploded).iter().map(|p| p.release_rate));
        rates.extend(Aggregator::coordination_rollup(&r).iter().map(|u| u.release_rate));
        assert!(rates.iter().all(|rate| (0.0..=100.0).contains(rate)));
        assert_eq!(Aggregator::overall(&r).unknown_status, 1);
    }

    #[test]
    fn test_per_inspector_ties_keep_encounter_order() {
        let data = records(&[
            ["05/01/2025", "ZECA", "SIM", "A", "C1", "X"],
            ["05/01/2025", "ANA", "SIM", "B", "C1", "X"],
        ]);
        let exploded = explode(&data);
        let perf = Aggregator::inspector_performance(&refs(&data), &exploded);
        let names: Vec<&str> = perf.iter().map(|p| p.inspector.as_str()).collect();
        assert_eq!(names, vec!["ZECA", "ANA"]);
    }

    #[test]
    fn test_monthly_series_sorted_by_date_not_label() {
        let data = records(&[
            ["10/01/2025", "ANA", "SIM", "A", "C1", "X"],
            ["15/12/2024", "ANA", "SIM", "B", "C1", "X"],
            ["20/02/2025", "BRUNO", "SIM", "C", "C1", "X"],
            ["21/12/2024", "BRUNO", "NÃO", "C", "C1", "X"],
        ]);
        let exploded = explode(&data);
        let series = Aggregator::monthly_series(&exploded);
        let labels: Vec<&str> = series.iter().map(|s| s.month_year_label.as_str()).collect();
        assert_eq!(labels, vec!["Dec/2024", "Dec/2024", "Jan/2025", "Feb/2025"]);
        assert_eq!(series[0].inspector, "ANA");
        assert_eq!(series[1].inspector, "BRUNO");
    }

    #[test]
    fn test_monthly_ranking_positions_and_ties() {
        let data = records(&[
            ["05/01/2025", "CARLA, BRUNO", "SIM", "A", "C1", "X"],
            ["06/01/2025", "ANA", "SIM", "B", "C1", "X"],
            ["07/01/2025", "CARLA", "SIM", "B", "C1", "X"],
            ["07/02/2025", "ANA, ANA", "SIM", "B", "C1", "X"],
        ]);
        let exploded = explode(&data);
        let ranking = Aggregator::monthly_ranking(&exploded, "2025-01");
        let view: Vec<(usize, &str, usize)> = ranking
            .iter()
            .map(|r| (r.position, r.inspector.as_str(), r.count))
            .collect();
        assert_eq!(view, vec![(1, "CARLA", 2), (2, "ANA", 1), (3, "BRUNO", 1)]);
    }

    #[test]
    fn test_available_months_chronological() {
        let data = records(&[
            ["10/01/2025", "ANA", "SIM", "A", "C1", "X"],
            ["15/12/2024", "ANA", "SIM", "B", "C1", "X"],
            ["", "ANA", "SIM", "B", "C1", "X"],
        ]);
        assert_eq!(
            Aggregator::available_months(&refs(&data)),
            vec!["2024-12".to_string(), "2025-01".to_string()]
        );
    }

    #[test]
    fn test_coordination_rollup() {
        let data = records(&[
            ["05/01/2025", "ANA", "SIM", "A", "C1", "X"],
            ["05/01/2025", "ANA", "NÃO", "B", "C2", "X"],
            ["06/01/2025", "ANA", "SIM", "B", "C2", "X"],
        ]);
        let rollup = Aggregator::coordination_rollup(&refs(&data));
        assert_eq!(rollup[0].coordination, "C2");
        assert_eq!(rollup[0].count, 2);
        assert_eq!(rollup[0].establishments, 1);
        assert_eq!(rollup[0].released, 1);
        assert_eq!(rollup[0].release_rate, 50.0);
        assert_eq!(rollup[1].coordination, "C1");
        assert_eq!(rollup[1].release_rate, 100.0);
    }

    #[test]
    fn test_top_establishments_truncates_with_alphabetical_ties() {
        let mut rows: Vec<[&str; 6]> = Vec::new();
        let names = ["L", "K", "J", "I", "H", "G", "F", "E", "D", "C", "B", "A"];
        for name in names {
            rows.push(["05/01/2025", "ANA", "SIM", name, "C1", "X"]);
        }
        rows.push(["05/01/2025", "ANA", "SIM", "L", "C1", "X"]);
        let data = records(&rows);
        let top = Aggregator::top_establishments(&refs(&data), TOP_ESTABLISHMENTS);
        assert_eq!(top.len(), 10);
        assert_eq!(top[0].establishment, "L");
        assert_eq!(top[0].count, 2);
        assert_eq!(top[1].establishment, "A");
        assert_eq!(top[9].establishment, "I");
    }

    #[test]
    fn test_blank_establishment_not_counted() {
        let data = records(&[
            ["05/01/2025", "ANA", "SIM", "", "C1", "X"],
            ["06/01/2025", "ANA", "SIM", "", "C1", "X"],
            ["07/01/2025", "ANA", "NÃO", "PADARIA", "C1", "X"],
        ]);
        let refs = refs(&data);

        assert_eq!(Aggregator::overall(&refs).establishments, 1);

        let top = Aggregator::top_establishments(&refs, TOP_ESTABLISHMENTS);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].establishment, "PADARIA");
        assert_eq!(top[0].count, 1);

        let exploded = explode(&data);
        let perf = Aggregator::inspector_performance(&refs, &exploded);
        assert_eq!(perf[0].count, 3);
        assert_eq!(perf[0].establishments, 1);

        let rollup = Aggregator::coordination_rollup(&refs);
        assert_eq!(rollup[0].count, 3);
        assert_eq!(rollup[0].establishments, 1);
    }

    #[test]
    fn test_category_counts_blank_bucket() {
        let data = records(&[
            ["05/01/2025", "ANA", "SIM", "A", "C1", "PORTO"],
            ["05/01/2025", "ANA", "SIM", "A", "C1", ""],
            ["05/01/2025", "ANA", "SIM", "A", "C1", "CENTRO"],
            ["05/01/2025", "ANA", "SIM", "A", "C1", "PORTO"],
        ]);
        let counts = Aggregator::category_counts(&refs(&data), CategoricalField::Locality);
        let view: Vec<(&str, usize)> = counts.iter().map(|c| (c.value.as_str(), c.count)).collect();
        assert_eq!(view, vec![("PORTO", 2), (BLANK_LABEL, 1), ("CENTRO", 1)]);
        assert_eq!(counts[0].share, 50.0);
    }

    #[test]
    fn test_establishment_profiles_distinct() {
        let data = records(&[
            ["05/01/2025", "ANA", "SIM", "PADARIA", "C1", "CENTRO"],
            ["06/01/2025", "BRUNO", "NÃO", "PADARIA", "C1", "CENTRO"],
        ]);
        let profiles = Aggregator::establishment_profiles(&refs(&data));
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].locality, "CENTRO");
    }

    #[test]
    fn test_filter_options() {
        let data = records(&[
            ["10/01/2025", "BRUNO, ANA", "SIM", "PADARIA", "C1", "CENTRO"],
            ["15/12/2024", "ANA", "NÃO", "BAR", "", "PORTO"],
        ]);
        let options = Aggregator::filter_options(&refs(&data));
        assert_eq!(options.months, vec!["2024-12", "2025-01"]);
        assert_eq!(options.inspectors, vec!["ANA", "BRUNO"]);
        assert_eq!(options.dates.len(), 2);
        assert_eq!(options.categorical[&CategoricalField::Coordination], vec!["C1"]);
        assert_eq!(
            options.categorical[&CategoricalField::Establishment],
            vec!["BAR", "PADARIA"]
        );
        assert!(options.categorical[&CategoricalField::Shift].is_empty());
    }
}
