pub mod types;
pub mod sanitize;
pub mod normalize;
pub mod markers;
pub mod extractor;

pub use types::*;
pub use sanitize::*;
pub use normalize::*;
pub use markers::*;
pub use extractor::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("No text to analyse: the recognized text is empty")]
    EmptyText,

    #[error("OCR processing failed: {0}")]
    OcrFailed(String),

    #[error("Invalid pattern for marker {marker}: {reason}")]
    InvalidPattern { marker: String, reason: String },

    #[error("Marker {marker} reads capture group {group} but its pattern has only {available}")]
    InvalidGroup {
        marker: String,
        group: usize,
        available: usize,
    },

    #[error("Marker defined more than once: {0}")]
    DuplicateMarker(String),
}
