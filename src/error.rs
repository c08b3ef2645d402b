use std::path::PathBuf;

use thiserror::Error;

/// Result alias for library operations.
pub type SplibResult<T> = std::result::Result<T, SplibError>;

/// Faults raised while grouping, encoding or reading spectral files.
#[derive(Debug, Error)]
pub enum SplibError {
    /// A referenced path does not exist.
    #[error("{} does not exist", .0.display())]
    MissingFile(PathBuf),

    /// The path exists but could not be read as text.
    #[error("{} is not readable: {source}", .path.display())]
    UnreadableFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The first line lacks the expected tokens or markers.
    #[error("{}: malformed header: {reason}", .path.display())]
    MalformedHeader { path: PathBuf, reason: String },

    /// A data line could not be parsed as a float.
    #[error("{}:{line}: '{value}' is not a number", .path.display())]
    NonNumericData {
        path: PathBuf,
        line: usize,
        value: String,
    },

    /// A measurement file name matched zero or several instrument patterns.
    #[error("{} matches {} instruments {matches:?}, expected exactly one", .path.display(), .matches.len())]
    AmbiguousInstrument { path: PathBuf, matches: Vec<String> },

    /// The auxiliary wavenumber file is missing or not unique.
    #[error("expected exactly one '{marker}' file in {}, found {found}", .dir.display())]
    AuxiliaryFile {
        dir: PathBuf,
        marker: String,
        found: usize,
    },

    /// A calibration path was assigned twice to the same instrument.
    #[error("{instrument} already has {kind} file {}, refusing {}", .existing.display(), .incoming.display())]
    DuplicateCalibration {
        instrument: String,
        kind: String,
        existing: PathBuf,
        incoming: PathBuf,
    },

    /// Two instrument patterns are not mutually exclusive as substrings.
    #[error("instrument pattern '{0}' overlaps with '{1}'")]
    OverlappingPatterns(String, String),

    /// The file set carries no reflectance path.
    #[error("no reflectance file given")]
    MissingReflectance,

    /// Data columns of a record differ in length.
    #[error("column '{column}' has {found} samples, expected {expected}")]
    ColumnLengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    /// An encoded record does not follow the section layout.
    #[error("{}: malformed record: {reason}", .path.display())]
    MalformedRecord { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl SplibError {
    pub fn malformed_header<P: Into<PathBuf>, S: Into<String>>(path: P, reason: S) -> Self {
        Self::MalformedHeader {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn malformed_record<P: Into<PathBuf>, S: Into<String>>(path: P, reason: S) -> Self {
        Self::MalformedRecord {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
