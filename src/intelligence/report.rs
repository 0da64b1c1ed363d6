use chrono::NaiveDate;
use serde::Serialize;

use super::classify::classify_with;
use super::reference::ReferenceRangeTable;
use crate::models::{ClassificationStatus, ExtractedData};
use crate::pipeline::extraction::MarkerRegistry;

/// One extracted marker with its classification, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedMarker {
    pub name: String,
    pub value: String,
    pub unit: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub status: ClassificationStatus,
}

impl ClassifiedMarker {
    /// `Name: value unit (Status, range min-max)`; unit and range are
    /// omitted when the marker has no reference entry.
    pub fn line(&self) -> String {
        let mut line = format!("{}: {}", self.name, self.value);
        if let Some(unit) = &self.unit {
            line.push(' ');
            line.push_str(unit);
        }
        match (self.min, self.max) {
            (Some(min), Some(max)) => {
                line.push_str(&format!(" ({}, range {min}-{max})", self.status))
            }
            _ => line.push_str(&format!(" ({})", self.status)),
        }
        line
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabReport {
    pub patient_name: Option<String>,
    /// Date exactly as it appeared on the report.
    pub test_date: Option<String>,
    /// Best-effort calendar reading of `test_date`.
    pub parsed_date: Option<NaiveDate>,
    pub markers: Vec<ClassifiedMarker>,
}

impl LabReport {
    pub fn abnormal_count(&self) -> usize {
        self.markers
            .iter()
            .filter(|m| m.status != ClassificationStatus::Normal)
            .count()
    }

    pub fn lines(&self) -> Vec<String> {
        if self.markers.is_empty() {
            return vec!["No markers detected".to_string()];
        }
        self.markers.iter().map(ClassifiedMarker::line).collect()
    }
}

/// Classify every extracted marker for display, ordered by the built-in
/// registry.
pub fn build_report(extracted: &ExtractedData, table: &ReferenceRangeTable) -> LabReport {
    build_report_with(MarkerRegistry::standard(), extracted, table)
}

/// Like `build_report`, ordered by the registry that produced `extracted`.
/// Registry markers come first in registry order, anything else follows
/// alphabetically.
pub fn build_report_with(
    registry: &MarkerRegistry,
    extracted: &ExtractedData,
    table: &ReferenceRangeTable,
) -> LabReport {
    let mut markers: Vec<ClassifiedMarker> = extracted
        .markers()
        .map(|(name, value)| {
            let range = table.get(name);
            ClassifiedMarker {
                name: name.to_string(),
                value: value.to_string(),
                unit: range.map(|r| r.unit.clone()),
                min: range.map(|r| r.min),
                max: range.map(|r| r.max),
                status: classify_with(table, name, value),
            }
        })
        .collect();
    // Stable sort keeps the map's alphabetical order among unregistered keys.
    markers.sort_by_key(|m| registry.position(&m.name).unwrap_or(usize::MAX));

    let test_date = extracted.test_date().map(str::to_string);
    let parsed_date = test_date.as_deref().and_then(parse_report_date);

    LabReport {
        patient_name: extracted.patient_name().map(str::to_string),
        test_date,
        parsed_date,
        markers,
    }
}

/// Read a `d/m/y` style date, day-first then month-first. Two-digit
/// years are taken as 20xx. Returns `None` for impossible dates.
pub fn parse_report_date(raw: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = raw.split(['/', '-', '.']).collect();
    let [first, second, year] = parts.as_slice() else {
        return None;
    };
    let first: u32 = first.parse().ok()?;
    let second: u32 = second.parse().ok()?;
    let mut year: i32 = year.parse().ok()?;
    if year < 100 {
        year += 2000;
    }

    NaiveDate::from_ymd_opt(year, second, first)
        .or_else(|| NaiveDate::from_ymd_opt(year, first, second))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PATIENT_NAME_KEY, TEST_DATE_KEY};
    use crate::pipeline::extraction::MarkerDefinition;

    fn data(pairs: &[(&str, &str)]) -> ExtractedData {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_report_says_no_markers() {
        let report = build_report(&ExtractedData::new(), ReferenceRangeTable::standard());
        assert_eq!(report.lines(), vec!["No markers detected"]);
        assert_eq!(report.abnormal_count(), 0);
    }

    #[test]
    fn renders_value_unit_status_and_range() {
        let report = build_report(
            &data(&[("Glucose", "250")]),
            ReferenceRangeTable::standard(),
        );
        assert_eq!(report.lines(), vec!["Glucose: 250 mg/dL (High, range 70-99)"]);
    }

    #[test]
    fn marker_without_range_is_unknown() {
        let report = build_report(
            &data(&[("Ferritin", "80")]),
            ReferenceRangeTable::standard(),
        );
        assert_eq!(report.lines(), vec!["Ferritin: 80 (Unknown)"]);
    }

    #[test]
    fn registry_order_then_alphabetical() {
        let report = build_report(
            &data(&[
                ("Zinc", "90"),
                ("TSH", "2.1"),
                ("Ferritin", "80"),
                ("Hemoglobin", "13.5"),
                ("Glucose", "85"),
            ]),
            ReferenceRangeTable::standard(),
        );
        let names: Vec<&str> = report.markers.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Hemoglobin", "Glucose", "TSH", "Ferritin", "Zinc"]);
    }

    #[test]
    fn custom_registry_controls_order() {
        let registry = MarkerRegistry::from_definitions(vec![
            MarkerDefinition {
                name: "Ferritin".into(),
                pattern: r"ferritin:\s*(\d+)".into(),
                value_group_index: 1,
            },
            MarkerDefinition {
                name: "Glucose".into(),
                pattern: r"glucose:\s*(\d+)".into(),
                value_group_index: 1,
            },
        ])
        .unwrap();
        let extracted = data(&[("Glucose", "85"), ("Ferritin", "80"), ("Zinc", "90")]);

        let report = build_report_with(&registry, &extracted, ReferenceRangeTable::standard());
        let names: Vec<&str> = report.markers.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Ferritin", "Glucose", "Zinc"]);
    }

    #[test]
    fn carries_name_and_dates() {
        let report = build_report(
            &data(&[
                (PATIENT_NAME_KEY, "Jane Doe"),
                (TEST_DATE_KEY, "12/05/2024"),
                ("Hemoglobin", "13.5"),
            ]),
            ReferenceRangeTable::standard(),
        );
        assert_eq!(report.patient_name.as_deref(), Some("Jane Doe"));
        assert_eq!(report.test_date.as_deref(), Some("12/05/2024"));
        assert_eq!(report.parsed_date, NaiveDate::from_ymd_opt(2024, 5, 12));
        assert_eq!(report.markers.len(), 1);
    }

    #[test]
    fn parses_day_first_then_month_first() {
        assert_eq!(parse_report_date("31.12.2023"), NaiveDate::from_ymd_opt(2023, 12, 31));
        assert_eq!(parse_report_date("12/31/2023"), NaiveDate::from_ymd_opt(2023, 12, 31));
        assert_eq!(parse_report_date("5-1-24"), NaiveDate::from_ymd_opt(2024, 1, 5));
    }

    #[test]
    fn impossible_date_is_not_parsed() {
        assert_eq!(parse_report_date("45/13/2024"), None);
        assert_eq!(parse_report_date("not a date"), None);
    }
}
