//! Session-scoped key-value handoff between pipeline stages.
//!
//! The host environment keeps a small string store per browser/app session.
//! `SessionStore` abstracts it so the pipeline can be exercised without a
//! host, and `MemoryStore` backs tests and headless use.
//!
//! Key properties:
//! - Exactly four keys are written per cycle
//! - Extracted data and profile are stored as JSON
//! - Missing profile or data entries restore as empty values

use std::collections::HashMap;
use std::sync::RwLock;

use crate::models::{ExtractedData, UserProfile};
use crate::session_state::SessionContext;

pub const OCR_TEXT_KEY: &str = "ocrText";
pub const EXTRACTED_DATA_KEY: &str = "extractedData";
pub const IMAGE_DATA_KEY: &str = "imageData";
pub const USER_PROFILE_KEY: &str = "userProfile";

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session value could not be serialized: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Session entry missing: {0}")]
    MissingEntry(String),

    #[error("Narrative was generated for revision {basis}, session is at {current}")]
    StaleNarrative { basis: u64, current: u64 },

    #[error("Session lock poisoned")]
    LockPoisoned,
}

// ═══════════════════════════════════════════════════════════
// SessionStore
// ═══════════════════════════════════════════════════════════

/// String key-value store scoped to one user session (allows mocking).
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError>;
    fn set(&self, key: &str, value: String) -> Result<(), SessionError>;
    fn remove(&self, key: &str) -> Result<(), SessionError>;
}

/// In-memory store, dropped with the session.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        let entries = self.entries.read().map_err(|_| SessionError::LockPoisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), SessionError> {
        let mut entries = self.entries.write().map_err(|_| SessionError::LockPoisoned)?;
        entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        let mut entries = self.entries.write().map_err(|_| SessionError::LockPoisoned)?;
        entries.remove(key);
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════
// Persist / restore
// ═══════════════════════════════════════════════════════════

/// Write the session's text, data, image and profile for the next stage.
///
/// All four keys are written every time. A context without an image
/// stores an empty string, replacing any image left by a previous cycle.
pub fn persist_cycle(store: &dyn SessionStore, ctx: &SessionContext) -> Result<(), SessionError> {
    store.set(OCR_TEXT_KEY, ctx.ocr_text.clone())?;
    store.set(EXTRACTED_DATA_KEY, serde_json::to_string(&ctx.extracted)?)?;
    store.set(IMAGE_DATA_KEY, ctx.image_data.clone().unwrap_or_default())?;
    store.set(USER_PROFILE_KEY, serde_json::to_string(&ctx.profile)?)?;

    tracing::debug!(
        session_id = %ctx.id,
        markers = ctx.extracted.marker_count(),
        "Session cycle persisted"
    );
    Ok(())
}

/// Rebuild a context from the store. The recognized text is required;
/// extracted data and profile fall back to empty values.
pub fn restore_session(store: &dyn SessionStore) -> Result<SessionContext, SessionError> {
    let ocr_text = store
        .get(OCR_TEXT_KEY)?
        .ok_or_else(|| SessionError::MissingEntry(OCR_TEXT_KEY.to_string()))?;

    let extracted: ExtractedData = match store.get(EXTRACTED_DATA_KEY)? {
        Some(json) => serde_json::from_str(&json)?,
        None => ExtractedData::new(),
    };
    let profile: UserProfile = match store.get(USER_PROFILE_KEY)? {
        Some(json) => serde_json::from_str(&json)?,
        None => UserProfile::new(),
    };
    let image_data = store.get(IMAGE_DATA_KEY)?.filter(|image| !image.is_empty());

    Ok(SessionContext {
        ocr_text,
        extracted,
        image_data,
        profile,
        ..SessionContext::new()
    })
}
