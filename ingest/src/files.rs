//! Enumeration of raw interaction files.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};

/// The raw files found in an input directory, in load order.
#[derive(Debug, Clone)]
pub struct InputFiles {
    pub dir: PathBuf,
    /// File names relative to `dir`, sorted bytewise. Kept as `OsString` so names
    /// that are not valid UTF-8 still resolve to the file on disk.
    pub names: Vec<OsString>,
}

impl InputFiles {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Full paths, in load order.
    pub fn paths(&self) -> impl Iterator<Item = PathBuf> + '_ {
        self.names.iter().map(|n| self.dir.join(n))
    }
}

/// List every non-directory entry of `dir`.
///
/// No extension or content filtering is done. Names are sorted so that load order,
/// and with it the first-appearance order of user names, is reproducible for a
/// given set of files.
pub fn list_input_files(dir: &Path) -> Result<InputFiles> {
    let missing = |source: std::io::Error| IngestError::MissingInput {
        path: dir.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(missing)? {
        let entry = entry.map_err(missing)?;
        if entry.file_type().map_err(missing)?.is_dir() {
            continue;
        }
        names.push(entry.file_name());
    }
    names.sort();

    Ok(InputFiles {
        dir: dir.to_path_buf(),
        names,
    })
}
