//! Encoder and readers for the USGS Spectral Library Version 7 text files.
//!
//! Each reflectance measurement of the library is joined with the wavelength
//! and bandpass calibration files of its spectrometer into one sectioned text
//! record under `data/<category>/`. Records (or the raw release files) can be
//! read back into Arrow tables.
//!
//! Kokaly, R.F., Clark, R.N., Swayze, G.A., et al., 2017, USGS Spectral
//! Library Version 7 Data: U.S. Geological Survey data release,
//! https://dx.doi.org/10.5066/F7RR1WDJ.

pub mod config;
pub mod data;
pub mod error;

pub use config::{FailurePolicy, LibraryConfig};
pub use data::batch::{encode_all, encode_library, BatchReport};
pub use data::encoder::{encode, Kind, SpectreFiles};
pub use data::instrument::{Instrument, InstrumentId, InstrumentRegistry};
pub use data::reader::{read_encoded, read_files, DecodedRecord};
pub use error::{SplibError, SplibResult};
