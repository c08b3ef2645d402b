use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, AsArray, Float64Array};
use arrow::datatypes::{DataType, Field, Float64Type, Schema};
use arrow::record_batch::RecordBatch;

use crate::data::encoder::{Kind, SpectreFiles, DATA_HEADER, METADATA_HEADER};
use crate::data::header::ReflectanceHeader;
use crate::data::text::{parse_values, read_text};
use crate::error::{SplibError, SplibResult};

/// Schema metadata key holding the row index name.
pub const INDEX_NAME_KEY: &str = "index_name";

// ---------------------------------------------------------------------------
// DecodedRecord
// ---------------------------------------------------------------------------

/// A record loaded into a table: one `Float64` column per kind, one row per
/// spectral sample.
#[derive(Debug, Clone)]
pub struct DecodedRecord {
    pub label: String,
    pub id_record: String,
    /// Raw first lines of the source files, deduplicated by content.
    pub metadata: BTreeSet<String>,
    pub data: RecordBatch,
}

impl DecodedRecord {
    /// `<label>_<id_record>`, as stored in the schema metadata.
    pub fn index_name(&self) -> Option<&str> {
        self.data
            .schema_ref()
            .metadata()
            .get(INDEX_NAME_KEY)
            .map(String::as_str)
    }

    pub fn column(&self, name: &str) -> Option<&Float64Array> {
        self.data
            .column_by_name(name)
            .map(|c| c.as_primitive::<Float64Type>())
    }

    /// Reflectance column, named after the record's label.
    pub fn reflectance(&self) -> Option<&Float64Array> {
        self.column(&self.label)
    }

    pub fn wavelength(&self) -> Option<&Float64Array> {
        self.column(Kind::Wavelength.as_str())
    }

    pub fn bandpass(&self) -> Option<&Float64Array> {
        self.column(Kind::Bandpass.as_str())
    }

    pub fn num_samples(&self) -> usize {
        self.data.num_rows()
    }
}

/// One decoded file or section before assembly.
struct Section {
    kind: Kind,
    metadata: String,
    values: Vec<f64>,
}

fn assemble(path: &Path, sections: Vec<Section>) -> SplibResult<DecodedRecord> {
    let reflectance = sections
        .iter()
        .find(|s| s.kind == Kind::Reflectance)
        .ok_or(SplibError::MissingReflectance)?;
    let header = ReflectanceHeader::parse(path, &reflectance.metadata)?;
    let expected = reflectance.values.len();

    let mut fields = Vec::with_capacity(sections.len());
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(sections.len());
    let mut metadata = BTreeSet::new();

    for section in sections {
        let name = match section.kind {
            Kind::Reflectance => header.label.clone(),
            other => other.as_str().to_string(),
        };
        if section.values.len() != expected {
            return Err(SplibError::ColumnLengthMismatch {
                column: name,
                expected,
                found: section.values.len(),
            });
        }
        fields.push(Field::new(name, DataType::Float64, false));
        columns.push(Arc::new(Float64Array::from(section.values)));
        metadata.insert(section.metadata);
    }

    let schema = Schema::new_with_metadata(
        fields,
        HashMap::from([(INDEX_NAME_KEY.to_string(), header.index_name())]),
    );
    let data = RecordBatch::try_new(Arc::new(schema), columns)?;

    Ok(DecodedRecord {
        label: header.label,
        id_record: header.id_record,
        metadata,
        data,
    })
}

// ---------------------------------------------------------------------------
// Raw files
// ---------------------------------------------------------------------------

/// Read a reflectance file and its calibration files as delivered in the
/// library release.
pub fn read_files(files: &SpectreFiles) -> SplibResult<DecodedRecord> {
    let reflectance = files
        .get(Kind::Reflectance)
        .ok_or(SplibError::MissingReflectance)?;

    let mut sections = Vec::new();
    for (kind, path) in files.present() {
        let text = read_text(path)?;
        let mut lines = text.lines();
        let metadata = lines
            .next()
            .ok_or_else(|| SplibError::malformed_header(path, "file is empty"))?
            .trim()
            .to_string();
        let values = parse_values(path, lines, 2)?;
        sections.push(Section {
            kind,
            metadata,
            values,
        });
    }
    assemble(reflectance, sections)
}

// ---------------------------------------------------------------------------
// Encoded records
// ---------------------------------------------------------------------------

fn section_kind(path: &Path, marker: &str, suffix: &str) -> SplibResult<Kind> {
    marker
        .strip_prefix('#')
        .and_then(|m| m.strip_suffix(suffix))
        .and_then(Kind::from_name)
        .ok_or_else(|| SplibError::malformed_record(path, format!("unexpected line '{marker}'")))
}

/// Read a record written by the encoder.
pub fn read_encoded(path: &Path) -> SplibResult<DecodedRecord> {
    let text = read_text(path)?;
    let mut lines = text.lines().enumerate();

    match lines.next() {
        Some((_, l)) if l.trim_end() == METADATA_HEADER.trim_end() => {}
        _ => return Err(SplibError::malformed_record(path, "missing #METADATA header")),
    }

    let mut sections: Vec<Section> = Vec::new();
    loop {
        let Some((_, line)) = lines.next() else {
            return Err(SplibError::malformed_record(path, "missing #DATA header"));
        };
        let line = line.trim();
        if line == DATA_HEADER.trim_end() {
            break;
        }
        let kind = section_kind(path, line, " metadata")?;
        let (_, metadata) = lines.next().ok_or_else(|| {
            SplibError::malformed_record(path, format!("no metadata line after '{line}'"))
        })?;
        sections.push(Section {
            kind,
            metadata: metadata.trim().to_string(),
            values: Vec::new(),
        });
    }

    let mut current: Option<usize> = None;
    for (i, line) in lines {
        if line.starts_with('#') {
            let kind = section_kind(path, line.trim(), "")?;
            let slot = sections.iter().position(|s| s.kind == kind).ok_or_else(|| {
                SplibError::malformed_record(path, format!("data for '{kind}' without metadata"))
            })?;
            current = Some(slot);
            continue;
        }
        let slot = current.ok_or_else(|| {
            SplibError::malformed_record(path, "data line before any section marker")
        })?;
        let mut parsed = parse_values(path, [line], i + 1)?;
        sections[slot].values.append(&mut parsed);
    }

    assemble(path, sections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn raw_triple_is_read_into_columns() {
        let dir = tempfile::tempdir().unwrap();
        let r = dir.path().join("r.txt");
        let w = dir.path().join("w.txt");
        let b = dir.path().join("b.txt");
        fs::write(&r, "splib07a Record=6: Actinolite HS116.3B ASDFRb AREF\n0.1\n0.2\n").unwrap();
        fs::write(&w, "splib07a Record=2: Wavelengths ASD\n0.35\n0.36\n").unwrap();
        fs::write(&b, "splib07a Record=5: Bandpass (FWHM) ASDFR\n0.001\n0.001\n").unwrap();

        let record = read_files(&SpectreFiles::triple(r, Some(w), Some(b))).unwrap();
        assert_eq!(record.label, "Actinolite");
        assert_eq!(record.id_record, "Record=6");
        assert_eq!(record.index_name(), Some("Actinolite_Record=6"));
        assert_eq!(record.num_samples(), 2);
        assert_eq!(record.metadata.len(), 3);

        let names: Vec<_> = record
            .data
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect();
        assert_eq!(names, vec!["Actinolite", "wavelength", "bandpass"]);
        assert_eq!(record.reflectance().unwrap().values().to_vec(), vec![0.1, 0.2]);
        assert_eq!(record.wavelength().unwrap().values().to_vec(), vec![0.35, 0.36]);
    }

    #[test]
    fn non_numeric_line_is_a_fault() {
        let dir = tempfile::tempdir().unwrap();
        let r = dir.path().join("r.txt");
        fs::write(&r, "splib07a Record=6: Actinolite\n0.1\nN/A\n").unwrap();
        let err = read_files(&SpectreFiles::triple(r, None, None)).unwrap_err();
        assert!(matches!(err, SplibError::NonNumericData { line: 3, .. }));
    }

    #[test]
    fn unequal_columns_are_a_fault() {
        let dir = tempfile::tempdir().unwrap();
        let r = dir.path().join("r.txt");
        let w = dir.path().join("w.txt");
        fs::write(&r, "splib07a Record=6: Actinolite\n0.1\n0.2\n").unwrap();
        fs::write(&w, "splib07a Record=2: Wavelengths ASD\n0.35\n").unwrap();
        let err = read_files(&SpectreFiles::triple(r, Some(w), None)).unwrap_err();
        assert!(matches!(
            err,
            SplibError::ColumnLengthMismatch { expected: 2, found: 1, .. }
        ));
    }

    #[test]
    fn identical_metadata_lines_are_deduplicated() {
        let dir = tempfile::tempdir().unwrap();
        let r = dir.path().join("r.txt");
        fs::write(&r, "splib07a Record=6: Actinolite\n0.1\n").unwrap();
        let files = SpectreFiles::new()
            .with(Kind::Reflectance, Some(r.clone()))
            .with(Kind::Wavelength, Some(r));
        let record = read_files(&files).unwrap();
        assert_eq!(record.metadata.len(), 1);
        assert_eq!(record.data.num_columns(), 2);
    }

    #[test]
    fn encoded_record_sections_are_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("quartz_record_1.txt");
        fs::write(
            &p,
            "#METADATA \n\
             #reflectance metadata\n\
             splib07a Record=1: Quartz GDS31\n\
             #wavelength metadata\n\
             splib07a Record=2: Wavelengths ASD\n\
             #DATA \n\
             #reflectance\n0.5\n0.6\n\
             #wavelength\n1.0\n2.0\n",
        )
        .unwrap();
        let record = read_encoded(&p).unwrap();
        assert_eq!(record.label, "Quartz");
        assert_eq!(record.reflectance().unwrap().values().to_vec(), vec![0.5, 0.6]);
        assert_eq!(record.wavelength().unwrap().values().to_vec(), vec![1.0, 2.0]);
        assert!(record.bandpass().is_none());
    }

    #[test]
    fn encoded_record_without_data_header_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("bad.txt");
        fs::write(&p, "#METADATA \n#reflectance metadata\nsplib07a Record=1: Quartz\n").unwrap();
        assert!(matches!(
            read_encoded(&p),
            Err(SplibError::MalformedRecord { .. })
        ));
    }
}
