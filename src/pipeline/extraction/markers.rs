//! Marker registry: which clinical markers are read from a report and how.
//!
//! Each entry is data (name, pattern, value capture group). Extraction
//! control flow never branches on a marker name, so adding a marker means
//! adding a row.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use super::ExtractionError;

/// Appends the shared "label [ (alias) ] [:|=|-] value" tail to a label pattern.
macro_rules! marker_pattern {
    ($label:literal) => {
        concat!(
            $label,
            r"[^\S\n]*(?:\([^)\n]*\))?[^\S\n]*[:=\-]?[^\S\n]*(\d+(?:\.\d+)?)"
        )
    };
}

/// Built-in markers: (name, pattern, value group). Names match the
/// bundled reference-range table.
const MARKER_TABLE: &[(&str, &str, usize)] = &[
    // Hematology
    ("Hemoglobin", marker_pattern!(r"\b(?:ha?emoglobin|hgb|hb)\b"), 1),
    ("Hematocrit", marker_pattern!(r"\b(?:ha?ematocrit|hct)\b"), 1),
    (
        "WBC",
        marker_pattern!(r"\b(?:wbc|white\s+blood\s+cells?(?:\s+count)?|leukocytes)\b"),
        1,
    ),
    ("Platelets", marker_pattern!(r"\b(?:platelets?(?:\s+count)?|plt)\b"), 1),
    // Metabolic
    ("Glucose", marker_pattern!(r"\b(?:fasting\s+)?(?:blood\s+)?glucose\b"), 1),
    (
        "HbA1c",
        marker_pattern!(
            r"\b(?:hba1c|hb\s+a1c|a1c|ha?emoglobin\s+a1c|glycated\s+ha?emoglobin|glycohemoglobin)\b"
        ),
        1,
    ),
    // Lipids
    (
        "Total Cholesterol",
        marker_pattern!(r"\b(?:total\s+cholesterol|cholesterol,?\s+total)\b"),
        1,
    ),
    ("HDL", marker_pattern!(r"\bhdl(?:[\s-]*c(?:holesterol)?)?\b"), 1),
    ("LDL", marker_pattern!(r"\bldl(?:[\s-]*c(?:holesterol)?)?\b"), 1),
    ("Triglycerides", marker_pattern!(r"\btriglycerides?\b"), 1),
    // Renal
    ("Creatinine", marker_pattern!(r"\bcreatinine\b"), 1),
    (
        "BUN",
        marker_pattern!(r"\b(?:bun|blood\s+urea\s+nitrogen|urea\s+nitrogen)\b"),
        1,
    ),
    // Electrolytes. The element symbols also label unrelated tests
    // ("Vitamin K", "CA 19-9"), so a bare symbol only counts at the start
    // of a line with its own `:` or `=`.
    (
        "Sodium",
        marker_pattern!(r"(?:\bsodium\b|(?m:^)[^\S\n]*na[^\S\n]*[:=])"),
        1,
    ),
    (
        "Potassium",
        marker_pattern!(r"(?:\bpotassium\b|(?m:^)[^\S\n]*k[^\S\n]*[:=])"),
        1,
    ),
    (
        "Calcium",
        marker_pattern!(r"(?:\bcalcium\b|(?m:^)[^\S\n]*ca[^\S\n]*[:=])"),
        1,
    ),
    // Thyroid
    ("TSH", marker_pattern!(r"\b(?:tsh|thyroid\s+stimulating\s+hormone)\b"), 1),
    // Vitamins: group 1 is the label variant, group 2 the value.
    (
        "Vitamin D",
        marker_pattern!(r"\b(vitamin\s*d3?|25[\s-]?oh[\s-]?(?:vitamin\s*)?d3?)\b"),
        2,
    ),
    (
        "Vitamin B12",
        marker_pattern!(r"\b(?:vitamin\s*b[\s-]?12|b12|cobalamin)\b"),
        1,
    ),
    // Liver
    (
        "ALT",
        marker_pattern!(r"\b(?:alt|sgpt|alanine\s+amino\s?transferase)\b"),
        1,
    ),
    (
        "AST",
        marker_pattern!(r"\b(?:ast|sgot|aspartate\s+amino\s?transferase)\b"),
        1,
    ),
];

/// One marker rule as configuration: a unique name, a pattern with one or
/// more capture groups, and the group holding the numeric value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerDefinition {
    pub name: String,
    pub pattern: String,
    pub value_group_index: usize,
}

struct CompiledMarker {
    definition: MarkerDefinition,
    regex: Regex,
}

/// Ordered, compiled set of marker rules. Matching is case-insensitive.
pub struct MarkerRegistry {
    markers: Vec<CompiledMarker>,
}

static STANDARD_REGISTRY: LazyLock<MarkerRegistry> = LazyLock::new(|| {
    MarkerRegistry::from_definitions(standard_definitions())
        .expect("Invalid built-in marker definition")
});

/// The built-in marker definitions in registry order.
pub fn standard_definitions() -> Vec<MarkerDefinition> {
    MARKER_TABLE
        .iter()
        .map(|&(name, pattern, group)| MarkerDefinition {
            name: name.to_string(),
            pattern: pattern.to_string(),
            value_group_index: group,
        })
        .collect()
}

impl MarkerRegistry {
    /// The compiled built-in registry.
    pub fn standard() -> &'static MarkerRegistry {
        &STANDARD_REGISTRY
    }

    /// Compile and validate a custom registry.
    ///
    /// Fails on a pattern that does not compile, a value group the pattern
    /// does not have, or a repeated (case-insensitive) name.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = MarkerDefinition>,
    ) -> Result<Self, ExtractionError> {
        let mut seen = HashSet::new();
        let mut markers = Vec::new();

        for definition in definitions {
            if !seen.insert(definition.name.to_lowercase()) {
                return Err(ExtractionError::DuplicateMarker(definition.name));
            }

            let regex = RegexBuilder::new(&definition.pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| ExtractionError::InvalidPattern {
                    marker: definition.name.clone(),
                    reason: e.to_string(),
                })?;

            // captures_len() counts the implicit whole-match group 0.
            let available = regex.captures_len() - 1;
            if definition.value_group_index == 0 || definition.value_group_index > available {
                return Err(ExtractionError::InvalidGroup {
                    marker: definition.name,
                    group: definition.value_group_index,
                    available,
                });
            }

            markers.push(CompiledMarker { definition, regex });
        }

        Ok(Self { markers })
    }

    /// Leftmost match of one marker's pattern, read from its value group.
    pub fn find_value<'t>(&self, marker: &str, text: &'t str) -> Option<&'t str> {
        self.markers
            .iter()
            .find(|m| m.definition.name == marker)
            .and_then(|m| read_value(m, text))
    }

    /// Every marker whose pattern matches, each evaluated on its own.
    pub fn match_all<'r, 't>(
        &'r self,
        text: &'t str,
    ) -> impl Iterator<Item = (&'r str, &'t str)> {
        self.markers
            .iter()
            .filter_map(move |m| read_value(m, text).map(|v| (m.definition.name.as_str(), v)))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.markers.iter().map(|m| m.definition.name.as_str())
    }

    /// Position of a marker in registry order.
    pub fn position(&self, marker: &str) -> Option<usize> {
        self.markers.iter().position(|m| m.definition.name == marker)
    }

    pub fn definitions(&self) -> impl Iterator<Item = &MarkerDefinition> {
        self.markers.iter().map(|m| &m.definition)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

fn read_value<'t>(marker: &CompiledMarker, text: &'t str) -> Option<&'t str> {
    marker
        .regex
        .captures(text)
        .and_then(|caps| caps.get(marker.definition.value_group_index))
        .map(|m| m.as_str())
}
