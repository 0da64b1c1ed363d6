//! Rule-based narrative summary of classified lab results.
//!
//! A placeholder for a real scoring service: the text is assembled from
//! fixed clauses and is not a clinical interpretation.

use super::classify::classify_with;
use super::reference::ReferenceRangeTable;
use crate::models::{ClassificationStatus, CompleteProfile, ExtractedData, Sex};

/// Age above which the aging caveat is added.
pub const AGE_CAVEAT_THRESHOLD: u32 = 50;

/// BMI above which the weight-management clause is added.
pub const BMI_CAVEAT_THRESHOLD: f64 = 25.0;

pub const ALL_NORMAL_MESSAGE: &str = "All of your markers are within the normal range. \
Keep up your current habits and continue with routine checkups.";

pub const CLOSING_RECOMMENDATION: &str = "Please consult a healthcare provider to review \
these results. This summary is produced by simple rules and is not a medical diagnosis.";

const AGE_CLAUSE: &str = "After 50, some markers naturally drift and regular monitoring \
becomes more important.";

const FEMALE_CLAUSE: &str = "Hormonal variation, such as the menstrual cycle, pregnancy or \
menopause, can influence several of these values.";

const MALE_CLAUSE: &str = "Some reference ranges differ for men, so a sex-specific \
interpretation may shift how these values are read.";

/// Body mass index from weight (kg) and height (cm), rounded to one decimal.
///
/// Returns `0.0` when either input is missing, non-finite, or not positive.
/// `0.0` means "not computable", never a real BMI.
pub fn bmi(weight_kg: Option<f64>, height_cm: Option<f64>) -> f64 {
    let (Some(weight), Some(height)) = (weight_kg, height_cm) else {
        return 0.0;
    };
    if !(weight.is_finite() && height.is_finite()) || weight <= 0.0 || height <= 0.0 {
        return 0.0;
    }
    // kg / m² with the metre conversion folded in, avoiding 1.6² rounding down
    let raw = weight * 10_000.0 / (height * height);
    (raw * 10.0).round() / 10.0
}

/// Markers whose status is anything but `Normal`, in map order.
pub fn abnormal_markers<'a>(
    table: &ReferenceRangeTable,
    extracted: &'a ExtractedData,
) -> Vec<&'a str> {
    extracted
        .markers()
        .filter(|(name, value)| classify_with(table, name, value) != ClassificationStatus::Normal)
        .map(|(name, _)| name)
        .collect()
}

/// Compose the summary with the bundled reference ranges.
pub fn generate(extracted: &ExtractedData, profile: &CompleteProfile) -> String {
    generate_with(ReferenceRangeTable::standard(), extracted, profile)
}

pub fn generate_with(
    table: &ReferenceRangeTable,
    extracted: &ExtractedData,
    profile: &CompleteProfile,
) -> String {
    let abnormal = abnormal_markers(table, extracted);
    if abnormal.is_empty() {
        return ALL_NORMAL_MESSAGE.to_string();
    }

    let (noun, verb) = if abnormal.len() == 1 {
        ("marker", "needs")
    } else {
        ("markers", "need")
    };
    let mut parts = vec![format!(
        "{} {noun} {verb} attention: {}.",
        abnormal.len(),
        abnormal.join(", ")
    )];

    if profile.age > AGE_CAVEAT_THRESHOLD {
        parts.push(AGE_CLAUSE.to_string());
    }
    match profile.sex {
        Sex::Female => parts.push(FEMALE_CLAUSE.to_string()),
        Sex::Male => parts.push(MALE_CLAUSE.to_string()),
        Sex::Other => {}
    }
    let bmi = bmi(Some(profile.weight_kg), Some(profile.height_cm));
    if bmi > BMI_CAVEAT_THRESHOLD {
        parts.push(format!(
            "Your BMI is {bmi:.1}. Gradual weight management through diet and activity \
may help bring some values back into range."
        ));
    }
    parts.push(CLOSING_RECOMMENDATION.to_string());

    tracing::debug!(abnormal = abnormal.len(), bmi, "Narrative generated");
    parts.join(" ")
}
