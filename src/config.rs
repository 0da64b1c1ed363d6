use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Blood Result Analyzer";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Directory name under the home directory.
const APP_DIR_NAME: &str = "BloodResultAnalyzer";

/// Filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "blood_analyzer_lib=debug"
    } else {
        "blood_analyzer_lib=info"
    }
}

/// Get the application data directory (~/BloodResultAnalyzer/).
/// `None` when the home directory cannot be determined.
pub fn app_data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(APP_DIR_NAME))
}

/// Where a reference-range override is looked up.
pub fn reference_ranges_override_path() -> Option<PathBuf> {
    app_data_dir().map(|dir| dir.join(crate::intelligence::REFERENCE_RANGES_FILE))
}
