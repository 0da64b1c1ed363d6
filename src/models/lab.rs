use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Pseudo-marker key holding the patient name found on the report.
pub const PATIENT_NAME_KEY: &str = "Patient Name";

/// Pseudo-marker key holding the verbatim test date found on the report.
pub const TEST_DATE_KEY: &str = "Test Date";

/// Values pulled out of one normalized OCR text.
///
/// Keys are marker names plus the two pseudo-markers. A key is present
/// only when its pattern matched; a missing key is not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractedData {
    values: BTreeMap<String, String>,
}

impl ExtractedData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn patient_name(&self) -> Option<&str> {
        self.get(PATIENT_NAME_KEY)
    }

    pub fn test_date(&self) -> Option<&str> {
        self.get(TEST_DATE_KEY)
    }

    /// Clinical markers only, without the name/date pseudo-markers.
    pub fn markers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .filter(|(k, _)| !is_pseudo_marker(k))
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn marker_count(&self) -> usize {
        self.markers().count()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, String)> for ExtractedData {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

pub fn is_pseudo_marker(key: &str) -> bool {
    key == PATIENT_NAME_KEY || key == TEST_DATE_KEY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_skip_name_and_date() {
        let mut data = ExtractedData::new();
        data.insert("Glucose", "250");
        data.insert(PATIENT_NAME_KEY, "Jane Doe");
        data.insert(TEST_DATE_KEY, "12/05/2024");

        let markers: Vec<_> = data.markers().collect();
        assert_eq!(markers, vec![("Glucose", "250")]);
        assert_eq!(data.marker_count(), 1);
        assert_eq!(data.len(), 3);
        assert_eq!(data.patient_name(), Some("Jane Doe"));
        assert_eq!(data.test_date(), Some("12/05/2024"));
    }

    #[test]
    fn serializes_as_flat_object() {
        let mut data = ExtractedData::new();
        data.insert("Hemoglobin", "13.5");
        let json = serde_json::to_string(&data).unwrap();
        assert_eq!(json, r#"{"Hemoglobin":"13.5"}"#);

        let back: ExtractedData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn empty_data_has_no_markers() {
        let data = ExtractedData::new();
        assert!(data.is_empty());
        assert_eq!(data.markers().count(), 0);
        assert!(data.patient_name().is_none());
    }
}
