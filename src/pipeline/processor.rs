//! Lab report processing orchestrator.
//!
//! Single entry point that drives one extraction cycle:
//! recognize (optional) → sanitize → normalize → extract.
//!
//! The OCR engine is injected through the `OcrEngine` trait so the
//! orchestrator stays testable with mock implementations.

use serde::Serialize;

use crate::models::ExtractedData;
use crate::pipeline::extraction::{
    extract_with, normalize, sanitize_ocr_text, ExtractionError, MarkerRegistry, OcrEngine,
    OcrProgress,
};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionError),
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Output of one upload. Replaces the previous cycle as a whole.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionCycle {
    /// Sanitized and corrected text; this, not the engine output, is what
    /// later stages and the session handoff see.
    pub normalized_text: String,
    pub extracted: ExtractedData,
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

pub struct LabProcessor<'r> {
    registry: &'r MarkerRegistry,
}

impl LabProcessor<'static> {
    /// Processor over the built-in marker registry.
    pub fn new() -> Self {
        Self {
            registry: MarkerRegistry::standard(),
        }
    }
}

impl Default for LabProcessor<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'r> LabProcessor<'r> {
    pub fn with_registry(registry: &'r MarkerRegistry) -> Self {
        Self { registry }
    }

    /// Run one cycle over already-recognized text.
    ///
    /// Text that is empty after sanitation is rejected before any
    /// extraction happens.
    pub fn process_text(&self, raw: &str) -> Result<ExtractionCycle, ProcessingError> {
        let sanitized = sanitize_ocr_text(raw);
        if sanitized.trim().is_empty() {
            return Err(ExtractionError::EmptyText.into());
        }

        let normalized_text = normalize(&sanitized);
        let extracted = extract_with(self.registry, &normalized_text);

        tracing::info!(
            text_length = raw.len(),
            markers = extracted.marker_count(),
            "Extraction cycle complete"
        );

        Ok(ExtractionCycle {
            normalized_text,
            extracted,
        })
    }

    /// Recognize an uploaded image, then run `process_text` on the result.
    ///
    /// An empty upload is rejected without calling the engine. Engine
    /// failures propagate unchanged and produce no partial cycle.
    pub fn process_image(
        &self,
        engine: &dyn OcrEngine,
        image_bytes: &[u8],
        progress: &mut dyn FnMut(OcrProgress),
    ) -> Result<ExtractionCycle, ProcessingError> {
        if image_bytes.is_empty() {
            tracing::warn!("No file selected for recognition");
            return Err(ExtractionError::EmptyText.into());
        }

        let raw = engine.recognize(image_bytes, progress).map_err(|e| {
            tracing::warn!(error = %e, "OCR recognition failed");
            e
        })?;

        self.process_text(&raw)
    }
}
