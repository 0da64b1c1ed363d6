//! Asynchronous narrative requests with supersede/cancel semantics.
//!
//! Narrative text itself is a synchronous computation; the delay here
//! stands in for a future remote scoring call. At most one request is in
//! flight per service: a new request supersedes the outstanding one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::oneshot;

use crate::intelligence::generate;
use crate::models::{ExtractedData, UserProfile};

/// Default latency of the simulated analysis call.
const DEFAULT_SIMULATED_DELAY_MS: u64 = 1500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NarrativeError {
    #[error("Profile is incomplete: age, weight, height and sex are required")]
    IncompleteProfile,

    #[error("Narrative request superseded by a newer request")]
    Superseded,

    #[error("Narrative request cancelled")]
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct NarrativeConfig {
    pub simulated_delay: Duration,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            simulated_delay: Duration::from_millis(DEFAULT_SIMULATED_DELAY_MS),
        }
    }
}

/// Outstanding request: its id plus the channel that ends it early.
type InFlight = (u64, oneshot::Sender<NarrativeError>);

pub struct NarrativeService {
    config: NarrativeConfig,
    in_flight: Mutex<Option<InFlight>>,
    next_id: AtomicU64,
}

impl NarrativeService {
    pub fn new(config: NarrativeConfig) -> Self {
        Self {
            config,
            in_flight: Mutex::new(None),
            next_id: AtomicU64::new(1),
        }
    }

    /// Generate a narrative after the configured delay.
    ///
    /// Rejects an incomplete profile up front. Resolves to `Superseded`
    /// if another request starts before this one finishes, or `Cancelled`
    /// after `cancel()`.
    pub async fn request(
        &self,
        extracted: &ExtractedData,
        profile: &UserProfile,
    ) -> Result<String, NarrativeError> {
        let profile = profile.complete().ok_or(NarrativeError::IncompleteProfile)?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (stop_tx, stop_rx) = oneshot::channel::<NarrativeError>();
        if let Ok(mut guard) = self.in_flight.lock() {
            if let Some((previous, previous_tx)) = guard.replace((id, stop_tx)) {
                tracing::info!(previous, request = id, "Superseding narrative request");
                let _ = previous_tx.send(NarrativeError::Superseded);
            }
        }

        let outcome = tokio::select! {
            reason = stop_rx => Err(reason.unwrap_or(NarrativeError::Cancelled)),
            _ = tokio::time::sleep(self.config.simulated_delay) => {
                Ok(generate(extracted, &profile))
            }
        };

        // Release the slot unless a newer request already owns it.
        if let Ok(mut guard) = self.in_flight.lock() {
            if matches!(guard.as_ref(), Some((current, _)) if *current == id) {
                *guard = None;
            }
        }

        match &outcome {
            Ok(text) => tracing::info!(request = id, length = text.len(), "Narrative ready"),
            Err(e) => tracing::debug!(request = id, reason = %e, "Narrative request ended early"),
        }
        outcome
    }

    /// End the outstanding request, if any. Returns whether one was pending.
    pub fn cancel(&self) -> bool {
        let taken = self.in_flight.lock().ok().and_then(|mut guard| guard.take());
        match taken {
            Some((id, tx)) => {
                tracing::info!(request = id, "Cancelling narrative request");
                let _ = tx.send(NarrativeError::Cancelled);
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }
}

impl Default for NarrativeService {
    fn default() -> Self {
        Self::new(NarrativeConfig::default())
    }
}
