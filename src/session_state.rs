//! Per-session application state.
//!
//! `SessionContext` is the explicit context object handed between the
//! pipeline stages. `SessionState` holds the current context behind an
//! `RwLock<Arc<_>>`: readers take a cheap snapshot, writers build a new
//! context and swap it in, so a reader never sees a half-applied update.

use std::sync::{Arc, RwLock};

use serde::Serialize;
use uuid::Uuid;

use crate::models::{ExtractedData, UserProfile};
use crate::pipeline::processor::ExtractionCycle;
use crate::session_store::SessionError;

// ═══════════════════════════════════════════════════════════
// SessionContext
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    pub id: Uuid,
    /// Bumped whenever the narrative inputs (data or profile) change.
    pub revision: u64,
    /// Recognized text of the latest upload.
    pub ocr_text: String,
    pub extracted: ExtractedData,
    /// Encoded upload as handed over by the host, if any.
    pub image_data: Option<String>,
    /// Survives across extraction cycles.
    pub profile: UserProfile,
    /// Narrative for the current revision. Cleared when data or profile change.
    pub narrative: Option<String>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            revision: 0,
            ocr_text: String::new(),
            extracted: ExtractedData::new(),
            image_data: None,
            profile: UserProfile::new(),
            narrative: None,
        }
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════
// SessionState
// ═══════════════════════════════════════════════════════════

pub struct SessionState {
    context: RwLock<Arc<SessionContext>>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::from_context(SessionContext::new())
    }

    pub fn from_context(context: SessionContext) -> Self {
        Self {
            context: RwLock::new(Arc::new(context)),
        }
    }

    /// Current context. Later updates do not affect the returned value.
    pub fn snapshot(&self) -> Result<Arc<SessionContext>, SessionError> {
        let guard = self.context.read().map_err(|_| SessionError::LockPoisoned)?;
        Ok(Arc::clone(&guard))
    }

    /// Build the next context from the current one and swap it in.
    fn update(
        &self,
        f: impl FnOnce(&SessionContext) -> SessionContext,
    ) -> Result<Arc<SessionContext>, SessionError> {
        let mut guard = self.context.write().map_err(|_| SessionError::LockPoisoned)?;
        let next = Arc::new(f(&guard));
        *guard = Arc::clone(&next);
        Ok(next)
    }

    /// Replace text and data with a new extraction cycle. The profile is
    /// kept; the previous narrative no longer matches and is dropped.
    pub fn apply_cycle(
        &self,
        cycle: ExtractionCycle,
        image_data: Option<String>,
    ) -> Result<Arc<SessionContext>, SessionError> {
        let next = self.update(|ctx| SessionContext {
            revision: ctx.revision + 1,
            ocr_text: cycle.normalized_text,
            extracted: cycle.extracted,
            image_data,
            narrative: None,
            ..ctx.clone()
        })?;
        tracing::info!(
            session_id = %next.id,
            markers = next.extracted.marker_count(),
            "Session cycle replaced"
        );
        Ok(next)
    }

    /// Apply a profile edit, e.g. `|p| p.with_age(42)`. The narrative was
    /// written for the old profile and is dropped.
    pub fn update_profile(
        &self,
        edit: impl FnOnce(&UserProfile) -> UserProfile,
    ) -> Result<Arc<SessionContext>, SessionError> {
        self.update(|ctx| SessionContext {
            revision: ctx.revision + 1,
            profile: edit(&ctx.profile),
            narrative: None,
            ..ctx.clone()
        })
    }

    /// Attach a narrative generated from `basis`, a snapshot taken before
    /// the request. Rejected when the session moved on in the meantime.
    pub fn set_narrative(
        &self,
        basis: &SessionContext,
        narrative: String,
    ) -> Result<Arc<SessionContext>, SessionError> {
        let mut guard = self.context.write().map_err(|_| SessionError::LockPoisoned)?;
        if guard.id != basis.id || guard.revision != basis.revision {
            tracing::debug!(
                session_id = %guard.id,
                revision = guard.revision,
                basis_revision = basis.revision,
                "Dropping narrative for an outdated snapshot"
            );
            return Err(SessionError::StaleNarrative {
                basis: basis.revision,
                current: guard.revision,
            });
        }
        let next = Arc::new(SessionContext {
            narrative: Some(narrative),
            ..SessionContext::clone(&guard)
        });
        *guard = Arc::clone(&next);
        Ok(next)
    }

    /// Start over with a fresh session id and empty context.
    pub fn reset(&self) -> Result<Arc<SessionContext>, SessionError> {
        self.update(|_| SessionContext::new())
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
