use serde::{Deserialize, Serialize};

use super::ExtractionError;

/// Incremental recognition progress reported by the OCR engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrProgress {
    /// Engine-reported stage, e.g. "recognizing text".
    pub status: String,
    /// Whole percent in 0..=100.
    pub percent: u8,
}

impl OcrProgress {
    /// Build a progress event from the engine's fractional percentage.
    /// Out-of-range values are clamped, non-finite values read as 0.
    pub fn new(status: impl Into<String>, percent: f64) -> Self {
        let percent = if percent.is_finite() {
            percent.round().clamp(0.0, 100.0) as u8
        } else {
            0
        };
        Self {
            status: status.into(),
            percent,
        }
    }

    pub fn is_done(&self) -> bool {
        self.percent == 100
    }
}

/// OCR engine abstraction (allows mocking for tests).
///
/// The engine owns recognition; this crate only consumes the final text
/// or the failure.
pub trait OcrEngine {
    fn recognize(
        &self,
        image_bytes: &[u8],
        progress: &mut dyn FnMut(OcrProgress),
    ) -> Result<String, ExtractionError>;
}
