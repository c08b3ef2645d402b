use std::fmt;
use std::path::{Path, PathBuf};

use crate::data::header::ReflectanceHeader;
use crate::data::text::read_text;
use crate::error::{SplibError, SplibResult};

pub const METADATA_HEADER: &str = "#METADATA ";
pub const DATA_HEADER: &str = "#DATA ";

// ---------------------------------------------------------------------------
// Kind – the three file roles of a record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Reflectance,
    Wavelength,
    Bandpass,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Reflectance => "reflectance",
            Kind::Wavelength => "wavelength",
            Kind::Bandpass => "bandpass",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "reflectance" => Some(Kind::Reflectance),
            "wavelength" => Some(Kind::Wavelength),
            "bandpass" => Some(Kind::Bandpass),
            _ => None,
        }
    }

    /// `#<kind> metadata` section marker.
    pub fn metadata_marker(self) -> String {
        format!("#{} metadata", self.as_str())
    }

    /// `#<kind>` data section marker.
    pub fn data_marker(self) -> String {
        format!("#{}", self.as_str())
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SpectreFiles – ordered kind → path mapping
// ---------------------------------------------------------------------------

/// The files making up one record. Insertion order decides section order;
/// re-inserting a kind keeps its slot and replaces the path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpectreFiles {
    entries: Vec<(Kind, Option<PathBuf>)>,
}

impl SpectreFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// The usual reflectance / wavelength / bandpass triple.
    pub fn triple(
        reflectance: impl Into<PathBuf>,
        wavelength: Option<PathBuf>,
        bandpass: Option<PathBuf>,
    ) -> Self {
        Self::new()
            .with(Kind::Reflectance, Some(reflectance.into()))
            .with(Kind::Wavelength, wavelength)
            .with(Kind::Bandpass, bandpass)
    }

    pub fn insert(&mut self, kind: Kind, path: Option<PathBuf>) {
        match self.entries.iter_mut().find(|(k, _)| *k == kind) {
            Some(slot) => slot.1 = path,
            None => self.entries.push((kind, path)),
        }
    }

    pub fn with(mut self, kind: Kind, path: Option<PathBuf>) -> Self {
        self.insert(kind, path);
        self
    }

    pub fn get(&self, kind: Kind) -> Option<&Path> {
        self.entries
            .iter()
            .find(|(k, _)| *k == kind)
            .and_then(|(_, p)| p.as_deref())
    }

    /// Kinds that carry a path, in insertion order.
    pub fn present(&self) -> impl Iterator<Item = (Kind, &Path)> {
        self.entries
            .iter()
            .filter_map(|(k, p)| p.as_deref().map(|p| (*k, p)))
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// An encoded record held in memory before it is written.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedRecord {
    pub header: ReflectanceHeader,
    pub text: String,
}

impl EncodedRecord {
    pub fn file_name(&self) -> String {
        self.header.encoded_file_name()
    }
}

/// Merge the files of one record into the sectioned text layout. Both
/// section headers end in a single space:
///
/// ```text
/// #METADATA 
/// #reflectance metadata
/// <first line of the reflectance file>
/// ...
/// #DATA 
/// #reflectance
/// <numeric lines>
/// ...
/// ```
pub fn render(files: &SpectreFiles) -> SplibResult<EncodedRecord> {
    files.get(Kind::Reflectance).ok_or(SplibError::MissingReflectance)?;

    let mut metadata = format!("{METADATA_HEADER}\n");
    let mut data = format!("{DATA_HEADER}\n");
    let mut header = None;

    for (kind, path) in files.present() {
        let text = read_text(path)?;
        let mut lines = text.lines();
        let first = lines
            .next()
            .ok_or_else(|| SplibError::malformed_header(path, "file is empty"))?
            .trim();

        if kind == Kind::Reflectance {
            header = Some(ReflectanceHeader::parse(path, first)?);
        }

        metadata.push_str(&kind.metadata_marker());
        metadata.push('\n');
        metadata.push_str(first);
        metadata.push('\n');

        data.push_str(&kind.data_marker());
        data.push('\n');
        for line in lines {
            data.push_str(line);
            data.push('\n');
        }
    }

    let header = header.ok_or(SplibError::MissingReflectance)?;
    metadata.push_str(&data);
    Ok(EncodedRecord {
        header,
        text: metadata,
    })
}

/// Encode one record into `output_dir`, overwriting any file of the same
/// name. Returns the written path.
pub fn encode(files: &SpectreFiles, output_dir: &Path) -> SplibResult<PathBuf> {
    let record = render(files)?;
    let out = output_dir.join(record.file_name());
    std::fs::write(&out, record.text.as_bytes())?;
    log::debug!("encoded {}", out.display());
    Ok(out)
}
