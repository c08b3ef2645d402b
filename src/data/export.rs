use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    ArrayRef, Float64Array, Float64Builder, Int64Array, ListBuilder, StringArray,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde_json::{Map, Value as JsonValue};

use super::model::{MetadataValue, SpectralDataset, Spectrum};
use super::reader::read_encoded;
use super::text::txt_files;

// ---------------------------------------------------------------------------
// Collecting encoded records
// ---------------------------------------------------------------------------

/// Read every encoded record of a category directory into a dataset.
pub fn collect_dataset(dir: &Path) -> Result<SpectralDataset> {
    let files = txt_files(dir).with_context(|| format!("listing {}", dir.display()))?;

    let mut spectra = Vec::with_capacity(files.len());
    for path in &files {
        let record =
            read_encoded(path).with_context(|| format!("decoding {}", path.display()))?;
        let spectrum = Spectrum::from_record(&record)
            .with_context(|| format!("{}: no reflectance column", path.display()))?;
        spectra.push(spectrum);
    }
    log::info!("collected {} spectra from {}", spectra.len(), dir.display());

    Ok(SpectralDataset::from_spectra(spectra))
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Write a dataset to a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – `x` and `y` list columns plus one column per metadata key
/// * `.json`    – `[{ "x": [...], "y": [...], ...meta }, ...]`
/// * `.csv`     – columns `x` and `y` containing semicolon-separated floats
pub fn export_file(dataset: &SpectralDataset, path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    for (i, sp) in dataset.spectra.iter().enumerate() {
        if sp.x.len() != sp.y.len() {
            bail!("Row {i}: x has {} values but y has {}", sp.x.len(), sp.y.len());
        }
    }

    match ext.as_str() {
        "parquet" | "pq" => write_parquet(dataset, path),
        "json" => write_json(dataset, path),
        "csv" => write_csv(dataset, path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// JSON writer
// ---------------------------------------------------------------------------

fn metadata_to_json(val: &MetadataValue) -> JsonValue {
    match val {
        MetadataValue::String(s) => JsonValue::String(s.clone()),
        MetadataValue::Integer(i) => JsonValue::from(*i),
        MetadataValue::Float(f) => JsonValue::from(*f),
        MetadataValue::Null => JsonValue::Null,
    }
}

/// Records-oriented JSON, one object per spectrum.
fn write_json(dataset: &SpectralDataset, path: &Path) -> Result<()> {
    let records: Vec<JsonValue> = dataset
        .spectra
        .iter()
        .map(|sp| {
            let mut obj = Map::new();
            obj.insert("x".to_string(), JsonValue::from(sp.x.clone()));
            obj.insert("y".to_string(), JsonValue::from(sp.y.clone()));
            for (key, val) in &sp.metadata {
                obj.insert(key.clone(), metadata_to_json(val));
            }
            JsonValue::Object(obj)
        })
        .collect();

    let file = std::fs::File::create(path).context("creating JSON file")?;
    serde_json::to_writer_pretty(file, &records).context("writing JSON")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV writer
// ---------------------------------------------------------------------------

fn join_semicolon(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(";")
}

/// Header row `x,y,<metadata columns>`; x and y hold semicolon-separated
/// floats, missing metadata cells are left empty.
fn write_csv(dataset: &SpectralDataset, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;

    let mut header = vec!["x".to_string(), "y".to_string()];
    header.extend(dataset.column_names.iter().cloned());
    writer.write_record(&header).context("writing CSV header")?;

    for (row_no, sp) in dataset.spectra.iter().enumerate() {
        let mut row = vec![join_semicolon(&sp.x), join_semicolon(&sp.y)];
        for col in &dataset.column_names {
            row.push(sp.metadata.get(col).map(|v| v.to_string()).unwrap_or_default());
        }
        writer
            .write_record(&row)
            .with_context(|| format!("CSV row {row_no}"))?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Parquet writer
// ---------------------------------------------------------------------------

fn list_column(rows: impl Iterator<Item = Vec<f64>>) -> ArrayRef {
    let mut builder = ListBuilder::new(Float64Builder::new());
    for row in rows {
        builder.values().append_slice(&row);
        builder.append(true);
    }
    Arc::new(builder.finish())
}

/// Pick the narrowest Arrow type that holds every value of a column.
fn metadata_column(dataset: &SpectralDataset, col: &str) -> (DataType, ArrayRef) {
    let cells: Vec<Option<&MetadataValue>> = dataset
        .spectra
        .iter()
        .map(|sp| sp.metadata.get(col).filter(|v| **v != MetadataValue::Null))
        .collect();

    let all_int = cells
        .iter()
        .all(|c| matches!(c, None | Some(MetadataValue::Integer(_))));
    let all_num = cells.iter().all(|c| {
        matches!(
            c,
            None | Some(MetadataValue::Integer(_)) | Some(MetadataValue::Float(_))
        )
    });

    if all_int {
        let arr: Int64Array = cells
            .iter()
            .map(|c| match c {
                Some(MetadataValue::Integer(i)) => Some(*i),
                _ => None,
            })
            .collect();
        (DataType::Int64, Arc::new(arr))
    } else if all_num {
        let arr: Float64Array = cells
            .iter()
            .map(|c| match c {
                Some(MetadataValue::Integer(i)) => Some(*i as f64),
                Some(MetadataValue::Float(f)) => Some(*f),
                _ => None,
            })
            .collect();
        (DataType::Float64, Arc::new(arr))
    } else {
        let arr: StringArray = cells.iter().map(|c| c.map(|v| v.to_string())).collect();
        (DataType::Utf8, Arc::new(arr))
    }
}

/// Parquet layout readable by Pandas and Polars:
/// - `x`: List<Float64> – wavelengths
/// - `y`: List<Float64> – reflectance
/// - one nullable column per metadata key
fn write_parquet(dataset: &SpectralDataset, path: &Path) -> Result<()> {
    let item = Arc::new(Field::new("item", DataType::Float64, true));
    let mut fields = vec![
        Field::new("x", DataType::List(item.clone()), false),
        Field::new("y", DataType::List(item), false),
    ];
    let mut columns = vec![
        list_column(dataset.spectra.iter().map(|sp| sp.x.clone())),
        list_column(dataset.spectra.iter().map(|sp| sp.y.clone())),
    ];
    for col in &dataset.column_names {
        let (dtype, array) = metadata_column(dataset, col);
        fields.push(Field::new(col, dtype, true));
        columns.push(array);
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}
