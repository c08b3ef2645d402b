use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::SplibResult;

/// What a batch does when encoding one measurement file fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Record the fault in the batch report and keep going.
    Continue,
    /// Return the first fault and stop the batch.
    Abort,
}

/// Settings shared by the batch encoder and the CLI.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Encoded records land in `<output_root>/<category>/`.
    pub output_root: PathBuf,
    /// Library sub-folders that hold no measurement files.
    pub excluded_folders: Vec<String>,
    pub failure_policy: FailurePolicy,
    /// Refuse a second, different wavelength/bandpass file for one instrument
    /// instead of overwriting the first.
    pub reject_duplicate_calibration: bool,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("data"),
            excluded_folders: vec!["errorbars".to_string()],
            failure_policy: FailurePolicy::Continue,
            reject_duplicate_calibration: false,
        }
    }
}

impl LibraryConfig {
    /// Load a config from a JSON file. Missing keys take their defaults.
    pub fn from_json_file(path: &Path) -> SplibResult<Self> {
        let text = crate::data::text::read_text(path)?;
        let config = serde_json::from_str(&text)?;
        Ok(config)
    }

    /// Directory that receives the records of one category.
    pub fn category_dir(&self, category: &str) -> PathBuf {
        self.output_root.join(category)
    }
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailurePolicy::Continue => write!(f, "continue"),
            FailurePolicy::Abort => write!(f, "abort"),
        }
    }
}
