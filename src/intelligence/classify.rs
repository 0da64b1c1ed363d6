use super::reference::ReferenceRangeTable;
use crate::models::ClassificationStatus;

/// Classify a raw extracted value against the bundled reference ranges.
pub fn classify(marker: &str, raw_value: &str) -> ClassificationStatus {
    classify_with(ReferenceRangeTable::standard(), marker, raw_value)
}

/// Classify against a caller-supplied table.
///
/// Total: a marker without a range, a value that does not parse as a
/// decimal, or a non-finite value all yield `Unknown`. Bounds are inclusive.
pub fn classify_with(
    table: &ReferenceRangeTable,
    marker: &str,
    raw_value: &str,
) -> ClassificationStatus {
    let Some(range) = table.get(marker) else {
        tracing::debug!(marker, "No reference range, classified Unknown");
        return ClassificationStatus::Unknown;
    };
    let value = match raw_value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => {
            tracing::debug!(marker, "Value is not a finite number, classified Unknown");
            return ClassificationStatus::Unknown;
        }
    };

    if value < range.min {
        ClassificationStatus::Low
    } else if value > range.max {
        ClassificationStatus::High
    } else {
        ClassificationStatus::Normal
    }
}
