pub mod config;
pub mod models;
pub mod pipeline;
pub mod intelligence; // reference ranges, classification, narrative
pub mod session_state;
pub mod session_store;
pub mod narrative_service;

use tracing_subscriber::EnvFilter;

pub use intelligence::{bmi, build_report, build_report_with, classify, generate, ReferenceRangeTable};
pub use models::{ClassificationStatus, CompleteProfile, ExtractedData, Sex, UserProfile};
pub use pipeline::extraction::{extract, normalize};
pub use pipeline::processor::{ExtractionCycle, LabProcessor};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `config::default_log_filter()`. Calling this again
/// after a subscriber is installed does nothing.
pub fn init_tracing() {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_tracing_twice_is_harmless() {
        init_tracing();
        init_tracing();
    }

    #[test]
    fn upload_to_narrative_flow() {
        let store = session_store::MemoryStore::new();
        let state = session_state::SessionState::new();

        let cycle = LabProcessor::new()
            .process_text("Patient: Jane Doe\nDate: 12/05/2024\nGlucose : 250 rng/d1\nHemoglobin: 13,5")
            .unwrap();
        state.apply_cycle(cycle, None).unwrap();
        state
            .update_profile(|p| {
                p.with_age(55)
                    .with_weight_kg(80.0)
                    .with_height_cm(160.0)
                    .with_sex(Sex::Male)
            })
            .unwrap();

        let ctx = state.snapshot().unwrap();
        session_store::persist_cycle(&store, &ctx).unwrap();
        let restored = session_store::restore_session(&store).unwrap();

        let report = build_report(&restored.extracted, ReferenceRangeTable::standard());
        assert_eq!(
            report.lines(),
            vec![
                "Hemoglobin: 13.5 g/dL (Normal, range 12-16)",
                "Glucose: 250 mg/dL (High, range 70-99)",
            ]
        );

        let profile = restored.profile.complete().unwrap();
        let narrative = generate(&restored.extracted, &profile);
        assert!(narrative.starts_with("1 marker needs attention: Glucose."));
        assert!(narrative.contains("Your BMI is 31.3."));
    }
}
