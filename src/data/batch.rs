use std::path::{Path, PathBuf};

use crate::config::{FailurePolicy, LibraryConfig};
use crate::data::encoder::{encode, SpectreFiles};
use crate::data::grouper::{discover_calibration, group_by_instrument};
use crate::data::instrument::InstrumentRegistry;
use crate::error::{SplibError, SplibResult};

/// Outcome of encoding one category.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub category: String,
    /// Written records, in encoding order.
    pub encoded: Vec<PathBuf>,
    /// Measurement files that matched zero or several instruments.
    pub unmatched: Vec<SplibError>,
    /// Measurement files whose encoding failed.
    pub failures: Vec<(PathBuf, SplibError)>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.unmatched.is_empty() && self.failures.is_empty()
    }
}

/// `ChapterM_Minerals` → `Minerals`.
pub fn category_of(measurements_dir: &Path) -> String {
    let name = measurements_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.rsplit_once('_') {
        Some((_, tail)) => tail.to_string(),
        None => name,
    }
}

/// Delete `dir` if present and create it empty.
fn recreate_dir(dir: &Path) -> SplibResult<()> {
    if dir.is_dir() {
        std::fs::remove_dir_all(dir)?;
    }
    std::fs::create_dir_all(dir)?;
    Ok(())
}

/// Encode every measurement file of `measurements_dir` with the calibration
/// files found in `instruments_dir`.
///
/// The category output directory is recreated from scratch; two batches
/// writing the same category must not run at the same time.
pub fn encode_all(
    instruments_dir: &Path,
    measurements_dir: &Path,
    config: &LibraryConfig,
) -> SplibResult<BatchReport> {
    let abort = config.failure_policy == FailurePolicy::Abort;

    let mut registry = InstrumentRegistry::new(config.reject_duplicate_calibration)?;
    discover_calibration(&mut registry, instruments_dir)?;
    let mut unmatched = group_by_instrument(&mut registry, measurements_dir)?;
    if abort && !unmatched.is_empty() {
        return Err(unmatched.remove(0));
    }

    let category = category_of(measurements_dir);
    let output_dir = config.category_dir(&category);
    recreate_dir(&output_dir)?;
    log::info!(
        "encoding {} measurement files of '{category}' into {}",
        registry.reflectance_count(),
        output_dir.display()
    );

    let mut report = BatchReport {
        category,
        unmatched,
        ..Default::default()
    };

    for instrument in registry.iter() {
        if instrument.reflectance.is_empty() {
            continue;
        }
        if instrument.wavelength.is_none() || instrument.bandpass.is_none() {
            log::warn!(
                "{}: encoding without {}",
                instrument.id,
                match (&instrument.wavelength, &instrument.bandpass) {
                    (None, None) => "wavelength and bandpass",
                    (None, _) => "wavelength",
                    _ => "bandpass",
                }
            );
        }
        for reflectance in &instrument.reflectance {
            let files = SpectreFiles::triple(
                reflectance.clone(),
                instrument.wavelength.clone(),
                instrument.bandpass.clone(),
            );
            match encode(&files, &output_dir) {
                Ok(path) => report.encoded.push(path),
                Err(e) if abort => return Err(e),
                Err(e) => {
                    log::error!("{}: {e}", reflectance.display());
                    report.failures.push((reflectance.clone(), e));
                }
            }
        }
    }

    log::info!(
        "'{}': {} encoded, {} unmatched, {} failed",
        report.category,
        report.encoded.len(),
        report.unmatched.len(),
        report.failures.len()
    );
    Ok(report)
}

/// Encode every category folder of a library root. Calibration files live
/// in the root itself; folders listed in `config.excluded_folders` are
/// skipped.
pub fn encode_library(root: &Path, config: &LibraryConfig) -> SplibResult<Vec<BatchReport>> {
    if !root.is_dir() {
        return Err(SplibError::MissingFile(root.to_path_buf()));
    }

    let mut folders = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if config.excluded_folders.iter().any(|f| *f == name) {
            log::debug!("skipping excluded folder {name}");
            continue;
        }
        folders.push(path);
    }
    folders.sort();

    folders
        .iter()
        .map(|folder| encode_all(root, folder, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_is_last_underscore_segment() {
        assert_eq!(category_of(Path::new("lib/ChapterM_Minerals")), "Minerals");
        assert_eq!(
            category_of(Path::new("lib/ChapterO_OrganicCompounds")),
            "OrganicCompounds"
        );
        assert_eq!(category_of(Path::new("lib/a_b_Soils")), "Soils");
        assert_eq!(category_of(Path::new("lib/Vegetation")), "Vegetation");
    }

    #[test]
    fn recreate_dir_empties_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("Minerals");
        std::fs::create_dir_all(&out).unwrap();
        std::fs::write(out.join("stale.txt"), "old").unwrap();
        recreate_dir(&out).unwrap();
        assert!(out.is_dir());
        assert_eq!(std::fs::read_dir(&out).unwrap().count(), 0);
    }
}
