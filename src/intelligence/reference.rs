use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use super::types::ReferenceDataError;

/// Bundled reference ranges, versioned alongside the crate.
const BUNDLED_RANGES_JSON: &str = include_str!("../../resources/reference_ranges.json");

/// File name looked up in the app data directory for an override table.
pub const REFERENCE_RANGES_FILE: &str = "reference_ranges.json";

/// Acceptable numeric interval for one marker, inclusive at both ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRange {
    pub marker: String,
    pub min: f64,
    pub max: f64,
    pub unit: String,
}

impl ReferenceRange {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ReferenceRangeFile {
    version: u32,
    ranges: Vec<ReferenceRange>,
}

/// Read-only marker → range lookup, loaded from JSON data.
#[derive(Debug, Clone)]
pub struct ReferenceRangeTable {
    version: u32,
    ranges: Vec<ReferenceRange>,
}

static STANDARD_TABLE: LazyLock<ReferenceRangeTable> = LazyLock::new(|| {
    ReferenceRangeTable::bundled().expect("Bundled reference_ranges.json is invalid")
});

impl ReferenceRangeTable {
    /// The bundled table, parsed once.
    pub fn standard() -> &'static ReferenceRangeTable {
        &STANDARD_TABLE
    }

    /// Parse the bundled table.
    pub fn bundled() -> Result<Self, ReferenceDataError> {
        Self::from_json("bundled reference_ranges.json", BUNDLED_RANGES_JSON)
    }

    /// Load a table from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ReferenceDataError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ReferenceDataError::Load(path.display().to_string(), e.to_string()))?;
        Self::from_json(&path.display().to_string(), &json)
    }

    /// Prefer `reference_ranges.json` in `dir`, fall back to the bundled table
    /// when the file does not exist. A present but invalid file is an error.
    pub fn load_or_bundled(dir: &Path) -> Result<Self, ReferenceDataError> {
        let path = dir.join(REFERENCE_RANGES_FILE);
        if path.is_file() {
            let table = Self::load(&path)?;
            tracing::info!(
                path = %path.display(),
                version = table.version,
                entries = table.len(),
                "Loaded reference range override"
            );
            Ok(table)
        } else {
            Self::bundled()
        }
    }

    /// Parse and validate a table from JSON text. `source` names the
    /// origin in error messages.
    pub fn from_json(source: &str, json: &str) -> Result<Self, ReferenceDataError> {
        let file: ReferenceRangeFile = serde_json::from_str(json)
            .map_err(|e| ReferenceDataError::Parse(source.to_string(), e.to_string()))?;
        Self::new(file.version, file.ranges)
    }

    /// Build a validated table: finite bounds, `min <= max`, unique names.
    pub fn new(version: u32, ranges: Vec<ReferenceRange>) -> Result<Self, ReferenceDataError> {
        let mut seen = HashSet::new();
        for range in &ranges {
            if !range.min.is_finite() || !range.max.is_finite() {
                return Err(ReferenceDataError::InvalidRange {
                    marker: range.marker.clone(),
                    reason: "bounds must be finite numbers".into(),
                });
            }
            if range.min > range.max {
                return Err(ReferenceDataError::InvalidRange {
                    marker: range.marker.clone(),
                    reason: format!("min {} is greater than max {}", range.min, range.max),
                });
            }
            if !seen.insert(range.marker.to_lowercase()) {
                return Err(ReferenceDataError::DuplicateMarker(range.marker.clone()));
            }
        }
        Ok(Self { version, ranges })
    }

    /// Look up a marker's range (case-insensitive).
    pub fn get(&self, marker: &str) -> Option<&ReferenceRange> {
        let lower = marker.to_lowercase();
        self.ranges
            .iter()
            .find(|r| r.marker.to_lowercase() == lower)
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReferenceRange> {
        self.ranges.iter()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

impl Default for ReferenceRangeTable {
    fn default() -> Self {
        Self::standard().clone()
    }
}
