use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::data::reader::DecodedRecord;

// ---------------------------------------------------------------------------
// MetadataValue – a single cell in a metadata column
// ---------------------------------------------------------------------------

/// A dynamically-typed metadata value attached to an exported spectrum.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    String(String),
    Integer(i64),
    Float(f64),
    Null,
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::String(s) => write!(f, "{s}"),
            MetadataValue::Integer(i) => write!(f, "{i}"),
            MetadataValue::Float(v) => write!(f, "{v}"),
            MetadataValue::Null => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Spectrum – one exported row
// ---------------------------------------------------------------------------

/// A single spectrum: reflectance (y) against wavelength (x).
#[derive(Debug, Clone)]
pub struct Spectrum {
    /// Wavelength axis, or the sample index when the record has none.
    pub x: Vec<f64>,
    /// Reflectance – same length as `x`.
    pub y: Vec<f64>,
    /// Metadata columns: column_name → value.
    pub metadata: BTreeMap<String, MetadataValue>,
}

impl Spectrum {
    /// Flatten a decoded record into an exportable row.
    pub fn from_record(record: &DecodedRecord) -> Option<Self> {
        let y: Vec<f64> = record.reflectance()?.values().to_vec();
        let x: Vec<f64> = match record.wavelength() {
            Some(w) => w.values().to_vec(),
            None => (0..y.len()).map(|i| i as f64).collect(),
        };

        let mut metadata = BTreeMap::new();
        metadata.insert(
            "label".to_string(),
            MetadataValue::String(record.label.clone()),
        );
        metadata.insert(
            "id_record".to_string(),
            MetadataValue::String(record.id_record.clone()),
        );
        metadata.insert(
            "samples".to_string(),
            MetadataValue::Integer(y.len() as i64),
        );
        if let Some(bp) = record.bandpass() {
            let bp = bp.values();
            let mean = if bp.is_empty() {
                MetadataValue::Null
            } else {
                MetadataValue::Float(bp.iter().sum::<f64>() / bp.len() as f64)
            };
            metadata.insert("mean_bandpass".to_string(), mean);
        }

        Some(Spectrum { x, y, metadata })
    }
}

// ---------------------------------------------------------------------------
// SpectralDataset – every spectrum of a category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct SpectralDataset {
    pub spectra: Vec<Spectrum>,
    /// Sorted union of metadata column names (excludes x, y).
    pub column_names: Vec<String>,
}

impl SpectralDataset {
    /// Build the column index from the collected spectra.
    pub fn from_spectra(spectra: Vec<Spectrum>) -> Self {
        let names: BTreeSet<&String> = spectra.iter().flat_map(|s| s.metadata.keys()).collect();
        let column_names = names.into_iter().cloned().collect();
        SpectralDataset {
            spectra,
            column_names,
        }
    }

    pub fn len(&self) -> usize {
        self.spectra.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spectra.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spectrum(meta: &[(&str, MetadataValue)]) -> Spectrum {
        Spectrum {
            x: vec![1.0],
            y: vec![0.5],
            metadata: meta
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        }
    }

    #[test]
    fn column_names_are_sorted_union() {
        let ds = SpectralDataset::from_spectra(vec![
            spectrum(&[("label", MetadataValue::String("A".into()))]),
            spectrum(&[
                ("mean_bandpass", MetadataValue::Float(0.1)),
                ("label", MetadataValue::String("B".into())),
            ]),
        ]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.column_names, vec!["label", "mean_bandpass"]);
    }

    #[test]
    fn null_displays_empty() {
        assert_eq!(MetadataValue::Null.to_string(), "");
        assert_eq!(MetadataValue::Integer(3).to_string(), "3");
    }
}
