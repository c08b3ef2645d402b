use std::path::{Path, PathBuf};

use crate::data::header::{token, BANDPASS_INSTRUMENT_TOKEN, WAVELENGTH_INSTRUMENT_TOKEN};
use crate::data::instrument::{Calibration, InstrumentId, InstrumentRegistry};
use crate::data::text::{read_first_line, txt_files};
use crate::error::{SplibError, SplibResult};

/// File-name marker of the auxiliary wavenumber file.
pub const WAVENUMBER_MARKER: &str = "Wavenumber";
/// Header keyword of wavelength calibration files.
pub const WAVELENGTH_KEYWORD: &str = "Wavelength";
/// Header keyword of bandpass calibration files.
pub const BANDPASS_KEYWORD: &str = "Bandpass";

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Drop the single wavenumber file from a calibration listing.
fn remove_wavenumber_file(dir: &Path, files: &mut Vec<PathBuf>) -> SplibResult<PathBuf> {
    let hits: Vec<usize> = files
        .iter()
        .enumerate()
        .filter(|(_, p)| file_name(p).contains(WAVENUMBER_MARKER))
        .map(|(i, _)| i)
        .collect();
    match hits.as_slice() {
        [i] => Ok(files.remove(*i)),
        _ => Err(SplibError::AuxiliaryFile {
            dir: dir.to_path_buf(),
            marker: WAVENUMBER_MARKER.to_string(),
            found: hits.len(),
        }),
    }
}

/// Scan a calibration directory and record which wavelength and bandpass
/// files belong to which instrument.
pub fn discover_calibration(registry: &mut InstrumentRegistry, dir: &Path) -> SplibResult<()> {
    let mut files = txt_files(dir)?;
    let wavenumber = remove_wavenumber_file(dir, &mut files)?;
    log::debug!("ignoring wavenumber file {}", wavenumber.display());

    for path in files {
        let header = read_first_line(&path)?;

        if header.contains(WAVELENGTH_KEYWORD) {
            let name = token(&path, &header, WAVELENGTH_INSTRUMENT_TOKEN)?;
            if name.contains(InstrumentId::ASD_MARKER) {
                for id in InstrumentId::ASD_FAMILY {
                    registry.assign(id, Calibration::Wavelength, &path)?;
                }
            } else if let Some(id) = InstrumentId::from_name(name) {
                registry.assign(id, Calibration::Wavelength, &path)?;
            } else {
                log::warn!(
                    "{}: wavelength file for unknown instrument '{name}' skipped",
                    path.display()
                );
            }
        } else if header.contains(BANDPASS_KEYWORD) {
            let name = token(&path, &header, BANDPASS_INSTRUMENT_TOKEN)?;
            let id = InstrumentId::from_name(name).ok_or_else(|| {
                SplibError::malformed_header(&path, format!("unknown instrument '{name}'"))
            })?;
            registry.assign(id, Calibration::Bandpass, &path)?;
        } else {
            log::debug!("{}: not a calibration file", path.display());
        }
    }
    Ok(())
}

/// Resolve the one instrument a measurement file belongs to.
pub fn instrument_for(path: &Path) -> SplibResult<InstrumentId> {
    let matches = InstrumentId::matching(&file_name(path));
    match matches.as_slice() {
        [id] => Ok(*id),
        _ => Err(SplibError::AmbiguousInstrument {
            path: path.to_path_buf(),
            matches: matches.iter().map(|id| id.to_string()).collect(),
        }),
    }
}

/// Append every measurement file of `dir` to its instrument's reflectance
/// list. Files matching zero or several instruments are returned with their
/// fault and left out of the registry.
pub fn group_by_instrument(
    registry: &mut InstrumentRegistry,
    dir: &Path,
) -> SplibResult<Vec<SplibError>> {
    let mut rejected = Vec::new();
    for path in txt_files(dir)? {
        match instrument_for(&path) {
            Ok(id) => registry.push_reflectance(id, path),
            Err(e) => {
                log::warn!("{e}");
                rejected.push(e);
            }
        }
    }
    Ok(rejected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
        let p = dir.join(name);
        fs::write(&p, body).unwrap();
        p
    }

    fn calibration_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "splib07a_Wavenumber_ASD.txt", "splib07a Record=3: Wavenumbers ASD\n1\n");
        write(
            dir.path(),
            "splib07a_Wavelengths_ASD.txt",
            "splib07a Record=2: Wavelengths ASD 0.35-2.5 microns\n0.35\n",
        );
        write(
            dir.path(),
            "splib07a_Wavelengths_BECK.txt",
            "splib07a Record=4: Wavelengths BECK Beckman\n0.2\n",
        );
        write(
            dir.path(),
            "splib07a_Bandpass_ASDFR.txt",
            "splib07a Record=5: Bandpass (FWHM) ASDFR StandardResolution\n0.01\n",
        );
        write(dir.path(), "readme.txt", "Library notes\n");
        dir
    }

    #[test]
    fn asd_wavelength_is_shared_by_family() {
        let dir = calibration_dir();
        let mut reg = InstrumentRegistry::new(false).unwrap();
        discover_calibration(&mut reg, dir.path()).unwrap();

        let asd = dir.path().join("splib07a_Wavelengths_ASD.txt");
        for id in InstrumentId::ASD_FAMILY {
            assert_eq!(reg.get(id).wavelength.as_deref(), Some(asd.as_path()));
        }
        assert_eq!(
            reg.get(InstrumentId::AsdFr).bandpass.as_deref(),
            Some(dir.path().join("splib07a_Bandpass_ASDFR.txt").as_path())
        );
        assert!(reg.get(InstrumentId::AsdHr).bandpass.is_none());
    }

    #[test]
    fn named_wavelength_file_is_kept() {
        let dir = calibration_dir();
        let mut reg = InstrumentRegistry::new(false).unwrap();
        discover_calibration(&mut reg, dir.path()).unwrap();
        assert_eq!(
            reg.get(InstrumentId::Beck).wavelength.as_deref(),
            Some(dir.path().join("splib07a_Wavelengths_BECK.txt").as_path())
        );
        assert!(reg.get(InstrumentId::Aviris).wavelength.is_none());
    }

    #[test]
    fn wavenumber_file_must_be_unique() {
        let dir = calibration_dir();
        write(dir.path(), "splib07a_Wavenumber_BECK.txt", "x\n");
        let mut reg = InstrumentRegistry::new(false).unwrap();
        let err = discover_calibration(&mut reg, dir.path()).unwrap_err();
        assert!(matches!(err, SplibError::AuxiliaryFile { found: 2, .. }));
    }

    #[test]
    fn missing_wavenumber_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut reg = InstrumentRegistry::new(false).unwrap();
        let err = discover_calibration(&mut reg, dir.path()).unwrap_err();
        assert!(matches!(err, SplibError::AuxiliaryFile { found: 0, .. }));
    }

    #[test]
    fn short_bandpass_header_is_malformed() {
        let dir = calibration_dir();
        write(dir.path(), "bad.txt", "splib07a Bandpass\n");
        let mut reg = InstrumentRegistry::new(false).unwrap();
        let err = discover_calibration(&mut reg, dir.path()).unwrap_err();
        assert!(matches!(err, SplibError::MalformedHeader { .. }));
    }

    #[test]
    fn empty_calibration_file_is_malformed() {
        let dir = calibration_dir();
        write(dir.path(), "empty.txt", "");
        let mut reg = InstrumentRegistry::new(false).unwrap();
        let err = discover_calibration(&mut reg, dir.path()).unwrap_err();
        assert!(matches!(err, SplibError::MalformedHeader { .. }));
    }

    #[test]
    fn bandpass_for_unknown_instrument_is_malformed() {
        let dir = calibration_dir();
        write(
            dir.path(),
            "splib07a_Bandpass_FOO.txt",
            "splib07a Record=9: Bandpass (FWHM) FOO Std\n0.01\n",
        );
        let mut reg = InstrumentRegistry::new(false).unwrap();
        match discover_calibration(&mut reg, dir.path()).unwrap_err() {
            SplibError::MalformedHeader { reason, .. } => assert!(reason.contains("FOO")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn second_wavelength_file_is_refused_when_configured() {
        let dir = calibration_dir();
        write(
            dir.path(),
            "splib07a_Wavelengths_BECK_2.txt",
            "splib07a Record=7: Wavelengths BECK Beckman\n0.2\n",
        );

        let mut lenient = InstrumentRegistry::new(false).unwrap();
        discover_calibration(&mut lenient, dir.path()).unwrap();

        let mut strict = InstrumentRegistry::new(true).unwrap();
        let err = discover_calibration(&mut strict, dir.path()).unwrap_err();
        assert!(matches!(
            err,
            SplibError::DuplicateCalibration { instrument, .. } if instrument == "BECK"
        ));
    }

    #[test]
    fn measurements_are_grouped_by_file_name() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "splib07a_Actinolite_HS116.3B_ASDFRb_AREF.txt", "");
        write(dir.path(), "splib07a_Albite_GDS30_BECKa_AREF.txt", "");
        write(dir.path(), "splib07a_Mystery_LAB_AREF.txt", "");
        write(dir.path(), "splib07a_Mixed_ASDFR_BECK_AREF.txt", "");

        let mut reg = InstrumentRegistry::new(false).unwrap();
        let rejected = group_by_instrument(&mut reg, dir.path()).unwrap();

        assert_eq!(reg.get(InstrumentId::AsdFr).reflectance.len(), 1);
        assert_eq!(reg.get(InstrumentId::Beck).reflectance.len(), 1);
        assert_eq!(reg.reflectance_count(), 2);
        assert_eq!(rejected.len(), 2);
        assert!(rejected.iter().any(|e| matches!(
            e,
            SplibError::AmbiguousInstrument { matches, .. } if matches.is_empty()
        )));
        assert!(rejected.iter().any(|e| matches!(
            e,
            SplibError::AmbiguousInstrument { matches, .. } if matches.len() == 2
        )));
    }

    #[test]
    fn grouping_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["c_ASDHR.txt", "a_ASDHR.txt", "b_ASDHR.txt"] {
            write(dir.path(), name, "");
        }
        let mut first = InstrumentRegistry::new(false).unwrap();
        let mut second = InstrumentRegistry::new(false).unwrap();
        group_by_instrument(&mut first, dir.path()).unwrap();
        group_by_instrument(&mut second, dir.path()).unwrap();
        assert_eq!(
            first.get(InstrumentId::AsdHr),
            second.get(InstrumentId::AsdHr)
        );
        let names: Vec<_> = first
            .get(InstrumentId::AsdHr)
            .reflectance
            .iter()
            .map(|p| file_name(p))
            .collect();
        assert_eq!(names, vec!["a_ASDHR.txt", "b_ASDHR.txt", "c_ASDHR.txt"]);
    }
}
