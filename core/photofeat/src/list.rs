use std::io::BufRead;
use std::path::{Path, PathBuf};

use crate::error::FeatError;

/// One line of the input list: where to read the image, and the identifier to
/// report it under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePathEntry {
    /// Image file on the local filesystem.
    pub local_path: PathBuf,
    /// Identifier echoed as `path` in the output record.
    pub output_path: String,
}

impl ImagePathEntry {
    /// Build an entry from its two halves.
    pub fn new(local_path: impl Into<PathBuf>, output_path: impl Into<String>) -> Self {
        Self {
            local_path: local_path.into(),
            output_path: output_path.into(),
        }
    }

    /// Parse a single `<local_path>\t<output_path>` line.
    ///
    /// Surrounding whitespace is trimmed and the split happens on the first TAB,
    /// so the output path may itself contain tabs but the local path may not.
    /// Returns `Ok(None)` for blank lines. `line_number` is 1-based and only used
    /// in the error.
    pub fn parse_line(line: &str, line_number: usize) -> Result<Option<Self>, FeatError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (local, output) = line
            .split_once('\t')
            .ok_or(FeatError::MalformedEntry { line: line_number })?;
        Ok(Some(Self::new(local, output)))
    }
}

/// Parse a whole list. Any malformed line rejects the entire list.
pub fn parse_list<R: BufRead>(reader: R) -> Result<Vec<ImagePathEntry>, FeatError> {
    let mut entries = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        if let Some(entry) = ImagePathEntry::parse_line(&line?, idx + 1)? {
            entries.push(entry);
        }
    }
    Ok(entries)
}

/// Read and parse the list file at `path`.
pub fn read_list(path: &Path) -> Result<Vec<ImagePathEntry>, FeatError> {
    let file = std::fs::File::open(path).map_err(|source| FeatError::OpenError {
        path: path.to_path_buf(),
        source,
    })?;
    parse_list(std::io::BufReader::new(file))
}
