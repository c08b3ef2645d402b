use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{SplibError, SplibResult};

// ---------------------------------------------------------------------------
// InstrumentId – the closed set of spectrometers in the library
// ---------------------------------------------------------------------------

/// Spectrometers whose measurements appear in the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InstrumentId {
    AsdNg,
    Beck,
    AsdFr,
    Aviris,
    Nic4,
    AsdHr,
}

impl InstrumentId {
    /// Pattern table, in matching order.
    pub const ALL: [InstrumentId; 6] = [
        InstrumentId::AsdNg,
        InstrumentId::Beck,
        InstrumentId::AsdFr,
        InstrumentId::Aviris,
        InstrumentId::Nic4,
        InstrumentId::AsdHr,
    ];

    /// ASD spectrometers share a single wavelength file.
    pub const ASD_FAMILY: [InstrumentId; 3] =
        [InstrumentId::AsdFr, InstrumentId::AsdHr, InstrumentId::AsdNg];

    /// Marker found in the instrument token of the shared ASD wavelength file.
    pub const ASD_MARKER: &'static str = "ASD";

    /// Name as it appears in file names and headers.
    pub fn as_str(self) -> &'static str {
        match self {
            InstrumentId::AsdNg => "ASDNG",
            InstrumentId::Beck => "BECK",
            InstrumentId::AsdFr => "ASDFR",
            InstrumentId::Aviris => "AVIRIS",
            InstrumentId::Nic4 => "NIC4",
            InstrumentId::AsdHr => "ASDHR",
        }
    }

    /// Exact lookup by header token.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.as_str() == name)
    }

    /// Every instrument whose pattern occurs in `file_name`.
    pub fn matching(file_name: &str) -> Vec<InstrumentId> {
        Self::ALL
            .into_iter()
            .filter(|id| file_name.contains(id.as_str()))
            .collect()
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fail if any pattern occurs inside another; overlapping patterns would
/// make file-name matching order-dependent.
pub fn ensure_disjoint(patterns: &[&str]) -> SplibResult<()> {
    for (i, a) in patterns.iter().enumerate() {
        for b in &patterns[i + 1..] {
            if a.contains(b) || b.contains(a) {
                return Err(SplibError::OverlappingPatterns(a.to_string(), b.to_string()));
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Instrument – calibration and measurement files of one spectrometer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Instrument {
    pub id: InstrumentId,
    pub wavelength: Option<PathBuf>,
    pub bandpass: Option<PathBuf>,
    pub reflectance: Vec<PathBuf>,
}

impl Instrument {
    pub fn new(id: InstrumentId) -> Self {
        Self {
            id,
            wavelength: None,
            bandpass: None,
            reflectance: Vec::new(),
        }
    }

    /// Set the wavelength file, returning the one it replaces.
    pub fn set_wavelength(&mut self, path: &Path) -> Option<PathBuf> {
        self.wavelength.replace(path.to_path_buf())
    }

    /// Set the bandpass file, returning the one it replaces.
    pub fn set_bandpass(&mut self, path: &Path) -> Option<PathBuf> {
        self.bandpass.replace(path.to_path_buf())
    }

    pub fn push_reflectance(&mut self, path: PathBuf) {
        self.reflectance.push(path);
    }
}

/// Which calibration slot of an instrument is being filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Calibration {
    Wavelength,
    Bandpass,
}

impl fmt::Display for Calibration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Calibration::Wavelength => write!(f, "wavelength"),
            Calibration::Bandpass => write!(f, "bandpass"),
        }
    }
}

// ---------------------------------------------------------------------------
// InstrumentRegistry
// ---------------------------------------------------------------------------

/// One [`Instrument`] per [`InstrumentId`], built fresh for each batch.
#[derive(Debug, Clone)]
pub struct InstrumentRegistry {
    instruments: BTreeMap<InstrumentId, Instrument>,
    reject_duplicates: bool,
}

impl InstrumentRegistry {
    /// Build an empty registry after checking the pattern table.
    pub fn new(reject_duplicates: bool) -> SplibResult<Self> {
        let patterns: Vec<&str> = InstrumentId::ALL.iter().map(|id| id.as_str()).collect();
        ensure_disjoint(&patterns)?;

        let instruments = InstrumentId::ALL
            .into_iter()
            .map(|id| (id, Instrument::new(id)))
            .collect();
        Ok(Self {
            instruments,
            reject_duplicates,
        })
    }

    pub fn get(&self, id: InstrumentId) -> &Instrument {
        &self.instruments[&id]
    }

    fn get_mut(&mut self, id: InstrumentId) -> &mut Instrument {
        self.instruments
            .entry(id)
            .or_insert_with(|| Instrument::new(id))
    }

    /// Instruments in pattern-table order.
    pub fn iter(&self) -> impl Iterator<Item = &Instrument> {
        InstrumentId::ALL
            .into_iter()
            .filter_map(|id| self.instruments.get(&id))
    }

    /// Assign a calibration file. A different path replacing an existing one
    /// is refused when the registry rejects duplicates, logged otherwise.
    pub fn assign(
        &mut self,
        id: InstrumentId,
        kind: Calibration,
        path: &Path,
    ) -> SplibResult<()> {
        let reject = self.reject_duplicates;
        let instrument = self.get_mut(id);
        let current = match kind {
            Calibration::Wavelength => &instrument.wavelength,
            Calibration::Bandpass => &instrument.bandpass,
        };
        if let Some(existing) = current.as_deref().filter(|p| *p != path) {
            if reject {
                return Err(SplibError::DuplicateCalibration {
                    instrument: id.to_string(),
                    kind: kind.to_string(),
                    existing: existing.to_path_buf(),
                    incoming: path.to_path_buf(),
                });
            }
            log::warn!(
                "{id}: {kind} file {} replaced by {}",
                existing.display(),
                path.display()
            );
        }
        match kind {
            Calibration::Wavelength => instrument.set_wavelength(path),
            Calibration::Bandpass => instrument.set_bandpass(path),
        };
        Ok(())
    }

    pub fn push_reflectance(&mut self, id: InstrumentId, path: PathBuf) {
        self.get_mut(id).push_reflectance(path);
    }

    /// Total number of measurement files across instruments.
    pub fn reflectance_count(&self) -> usize {
        self.instruments.values().map(|i| i.reflectance.len()).sum()
    }
}
