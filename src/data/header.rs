use std::path::Path;

use crate::error::{SplibError, SplibResult};

/// Word position of the instrument name in a wavelength header.
pub const WAVELENGTH_INSTRUMENT_TOKEN: usize = 3;
/// Word position of the instrument name in a bandpass header.
pub const BANDPASS_INSTRUMENT_TOKEN: usize = 4;

/// Label and record id carried by a reflectance file's first line,
/// e.g. `splib07a Record=6: Actinolite HS116.3B ASDFRb AREF`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectanceHeader {
    pub id_record: String,
    pub label: String,
}

impl ReflectanceHeader {
    pub fn parse(path: &Path, line: &str) -> SplibResult<Self> {
        let id_tok = token(path, line, 1)?;
        let label = token(path, line, 2)?;

        // The id token ends with a separator (`Record=6:`).
        let mut id_record = id_tok.to_string();
        id_record.pop();
        if id_record.is_empty() {
            return Err(SplibError::malformed_header(
                path,
                format!("record id token '{id_tok}' is too short"),
            ));
        }

        Ok(Self {
            id_record,
            label: label.to_string(),
        })
    }

    /// `Actinolite` / `Record=6` → `actinolite_record_6.txt`.
    pub fn encoded_file_name(&self) -> String {
        format!(
            "{}_{}.txt",
            self.label.to_lowercase().replace('/', "-"),
            self.id_record.to_lowercase().replace('=', "_"),
        )
    }

    /// Row index name of a decoded table.
    pub fn index_name(&self) -> String {
        format!("{}_{}", self.label, self.id_record)
    }
}

/// Return the whitespace-separated word at `pos` of a header line.
pub fn token<'a>(path: &Path, line: &'a str, pos: usize) -> SplibResult<&'a str> {
    line.split_whitespace().nth(pos).ok_or_else(|| {
        SplibError::malformed_header(path, format!("expected at least {} words", pos + 1))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p() -> &'static Path {
        Path::new("sample.txt")
    }

    #[test]
    fn parses_usgs_reflectance_header() {
        let h = ReflectanceHeader::parse(
            p(),
            "splib07a Record=6: Actinolite HS116.3B         ASDFRb AREF",
        )
        .unwrap();
        assert_eq!(h.id_record, "Record=6");
        assert_eq!(h.label, "Actinolite");
        assert_eq!(h.encoded_file_name(), "actinolite_record_6.txt");
        assert_eq!(h.index_name(), "Actinolite_Record=6");
    }

    #[test]
    fn file_name_folds_case_and_separators() {
        let h = ReflectanceHeader::parse(p(), "splib07a ID12: Actinolite  more").unwrap();
        assert_eq!(h.encoded_file_name(), "actinolite_id12.txt");

        let h = ReflectanceHeader::parse(p(), "x Rec=A=B: Sand/Gravel").unwrap();
        assert_eq!(h.encoded_file_name(), "sand-gravel_rec_a_b.txt");
    }

    #[test]
    fn short_header_is_malformed() {
        let err = ReflectanceHeader::parse(p(), "splib07a Record=6:").unwrap_err();
        assert!(matches!(err, SplibError::MalformedHeader { .. }));
    }

    #[test]
    fn token_positions() {
        let line = "splib07a Record=2: Wavelengths ASD 0.35-2.5 microns";
        assert_eq!(token(p(), line, WAVELENGTH_INSTRUMENT_TOKEN).unwrap(), "ASD");
        let line = "splib07a Record=5: Bandpass (FWHM) ASDFR StandardResolution";
        assert_eq!(token(p(), line, BANDPASS_INSTRUMENT_TOKEN).unwrap(), "ASDFR");
    }
}
