use std::sync::LazyLock;

use regex::Regex;

use super::markers::MarkerRegistry;
use crate::models::{ExtractedData, PATIENT_NAME_KEY, TEST_DATE_KEY};

/// Day/month in either order, then a 2–4 digit year. The separator must
/// repeat, so reference ranges like `4.0-11.0` are not read as dates.
static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:\d{1,2}/\d{1,2}/\d{2,4}|\d{1,2}-\d{1,2}-\d{2,4}|\d{1,2}\.\d{1,2}\.\d{2,4})\b",
    )
    .expect("valid regex")
});

/// `patient` or `name`, a separator, then letters and spaces up to the line end.
static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:patient|name)\b[^\S\n]*[:\-][^\S\n]*([A-Za-z ]+)\r?(?:\n|$)")
        .expect("valid regex")
});

/// Extract markers, test date and patient name using the built-in registry.
pub fn extract(normalized: &str) -> ExtractedData {
    extract_with(MarkerRegistry::standard(), normalized)
}

/// Extract with a caller-supplied registry.
///
/// Every marker is matched independently against the full text; a miss
/// only leaves its key out.
pub fn extract_with(registry: &MarkerRegistry, normalized: &str) -> ExtractedData {
    let mut data = ExtractedData::new();

    for (name, value) in registry.match_all(normalized) {
        data.insert(name, value);
    }
    let marker_count = data.len();

    if let Some(date) = find_test_date(normalized) {
        data.insert(TEST_DATE_KEY, date);
    }
    if let Some(name) = find_patient_name(normalized) {
        data.insert(PATIENT_NAME_KEY, name);
    }

    tracing::info!(
        markers = marker_count,
        registry_size = registry.len(),
        has_date = data.test_date().is_some(),
        has_name = data.patient_name().is_some(),
        "Report extraction complete"
    );

    data
}

/// First date-like token in text order, verbatim.
pub fn find_test_date(text: &str) -> Option<&str> {
    let dates: Vec<&str> = DATE_PATTERN.find_iter(text).map(|m| m.as_str()).collect();
    if dates.len() > 1 {
        tracing::debug!(candidates = dates.len(), "Several dates found, using the first");
    }
    dates.first().copied()
}

/// Trimmed name following a `patient`/`name` label. A label followed only
/// by spaces does not count.
pub fn find_patient_name(text: &str) -> Option<&str> {
    NAME_PATTERN
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .find(|name| !name.is_empty())
}
