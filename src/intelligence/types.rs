use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReferenceDataError {
    #[error("Failed to load reference data from {0}: {1}")]
    Load(String, String),

    #[error("Failed to parse reference data {0}: {1}")]
    Parse(String, String),

    #[error("Invalid reference range for {marker}: {reason}")]
    InvalidRange { marker: String, reason: String },

    #[error("Reference range defined more than once: {0}")]
    DuplicateMarker(String),
}
