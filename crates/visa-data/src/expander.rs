//! Fact Expander: one row per (inspection, inspector).

use visa_core::models::{ExplodedRecord, InspectionRecord};

/// Expand every record once per inspector on its team.
///
/// Records with no inspectors contribute nothing. Output order follows the
/// input records, then the order of names within each team.
pub fn explode(records: &[InspectionRecord]) -> Vec<ExplodedRecord<'_>> {
    records
        .iter()
        .flat_map(|record| {
            record.inspectors.iter().map(move |inspector| ExplodedRecord {
                record,
                inspector: inspector.as_str(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::normalize;
    use visa_core::models::RawTable;

    fn table(teams: &[&str]) -> RawTable {
        RawTable::new(
            vec!["DATA".to_string(), "EQUIPE/INSPETOR".to_string()],
            teams
                .iter()
                .map(|t| vec!["05/01/2025".to_string(), t.to_string()])
                .collect(),
        )
    }

    #[test]
    fn test_fan_out_matches_inspector_lists() {
        let (normalized, _) = normalize(&table(&["ANA, BRUNO", "ANA", "", "carla,dani,eva"])).unwrap();
        let exploded = explode(&normalized.records);
        let expected: usize = normalized.records.iter().map(|r| r.inspectors.len()).sum();
        assert_eq!(exploded.len(), expected);
        assert_eq!(exploded.len(), 6);
    }

    #[test]
    fn test_empty_team_contributes_no_rows() {
        let (normalized, _) = normalize(&table(&["", "  ,  "])).unwrap();
        assert!(explode(&normalized.records).is_empty());
    }

    #[test]
    fn test_exploded_rows_keep_record_fields() {
        let (normalized, _) = normalize(&table(&["ANA, BRUNO"])).unwrap();
        let exploded = explode(&normalized.records);
        let names: Vec<&str> = exploded.iter().map(|e| e.inspector).collect();
        assert_eq!(names, vec!["ANA", "BRUNO"]);
        assert!(exploded.iter().all(|e| std::ptr::eq(e.record, &normalized.records[0])));
    }

    #[test]
    fn test_explode_is_deterministic() {
        let (normalized, _) = normalize(&table(&["ANA, BRUNO", "CARLA"])).unwrap();
        assert_eq!(explode(&normalized.records), explode(&normalized.records));
    }
}
