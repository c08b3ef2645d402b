/// Data layer: instrument grouping, record encoding, reading and export.
///
/// Architecture:
/// ```text
///  calibration dir        measurement dir
///        │                       │
///        ▼                       ▼
///   ┌───────────┐
///   │  grouper  │  InstrumentRegistry: wavelength / bandpass / reflectance per instrument
///   └───────────┘
///        │
///        ▼
///   ┌───────────┐
///   │  batch    │  recreate data/<category>/, one encode per reflectance file
///   └───────────┘
///        │
///        ▼
///   ┌───────────┐
///   │  encoder  │  #METADATA / #DATA sectioned text record
///   └───────────┘
///        │
///        ▼
///   ┌───────────┐
///   │  reader   │  record → DecodedRecord (Arrow RecordBatch)
///   └───────────┘
///        │
///        ▼
///   ┌───────────┐
///   │  export   │  category → SpectralDataset → parquet / json / csv
///   └───────────┘
/// ```

pub mod batch;
pub mod encoder;
pub mod export;
pub mod grouper;
pub mod header;
pub mod instrument;
pub mod model;
pub mod reader;
pub mod text;
