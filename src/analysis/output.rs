use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::Error;

/// Output destination of an analysis.
///
/// Only the path is part of the persisted state; the open handle is a
/// runtime resource, excluded from serialization and reacquired lazily on
/// the first write after construction or restoration. Reopening never
/// truncates, so a restored analysis does not lose what it wrote before
/// being snapshotted.
#[derive(Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Output {
    path: PathBuf,
    #[serde(skip)]
    file: Option<File>,
}

impl Output {
    /// Create a new output writing to the given `path`
    pub fn new(path: impl Into<PathBuf>) -> Output {
        Output {
            path: path.into(),
            file: None,
        }
    }

    /// Get the path this output writes to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the open file handle, opening the file on first use
    pub fn handle(&mut self) -> Result<&mut File, Error> {
        if self.file.is_none() {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .open(&self.path)?;
            self.file = Some(file);
        }

        match &mut self.file {
            Some(file) => Ok(file),
            None => Err(Error::Internal("output file handle was not opened".into())),
        }
    }
}
