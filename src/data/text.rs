use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::{SplibError, SplibResult};

// ---------------------------------------------------------------------------
// Checked file access
// ---------------------------------------------------------------------------

fn ensure_exists(path: &Path) -> SplibResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(SplibError::MissingFile(path.to_path_buf()))
    }
}

fn unreadable(path: &Path, source: std::io::Error) -> SplibError {
    SplibError::UnreadableFile {
        path: path.to_path_buf(),
        source,
    }
}

/// Read a whole text file, separating "missing" from "unreadable".
pub fn read_text(path: &Path) -> SplibResult<String> {
    ensure_exists(path)?;
    std::fs::read_to_string(path).map_err(|e| unreadable(path, e))
}

/// Read only the first line of a file, without its line terminator.
/// A zero-byte file has no header line and is rejected.
pub fn read_first_line(path: &Path) -> SplibResult<String> {
    ensure_exists(path)?;
    let file = File::open(path).map_err(|e| unreadable(path, e))?;
    let mut line = String::new();
    let read = BufReader::new(file)
        .read_line(&mut line)
        .map_err(|e| unreadable(path, e))?;
    if read == 0 {
        return Err(SplibError::malformed_header(path, "file is empty"));
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// List the `.txt` files directly inside `dir`, sorted by path.
pub fn txt_files(dir: &Path) -> SplibResult<Vec<PathBuf>> {
    ensure_exists(dir)?;
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_txt = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("txt"));
        if is_txt && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Parse payload lines as floats. `first_line` is the 1-based line number of
/// `lines[0]` in the source file, used for error reporting.
pub fn parse_values<'a, I>(path: &Path, lines: I, first_line: usize) -> SplibResult<Vec<f64>>
where
    I: IntoIterator<Item = &'a str>,
{
    lines
        .into_iter()
        .enumerate()
        .map(|(i, raw)| {
            let tok = raw.trim();
            tok.parse::<f64>().map_err(|_| SplibError::NonNumericData {
                path: path.to_path_buf(),
                line: first_line + i,
                value: tok.to_string(),
            })
        })
        .collect()
}
