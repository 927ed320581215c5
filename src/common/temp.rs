//! Output directory preparation.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Make sure `dir` exists and is empty.
///
/// An existing directory keeps its inode and permissions; only its entries
/// are removed. Leftovers from a previous build never mix with new output.
pub fn prepare_clean_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        return fs::create_dir_all(dir).map_err(|e| Error::io(dir, e));
    }
    if !dir.is_dir() {
        return Err(Error::Configuration(format!(
            "destination {} exists and is not a directory",
            dir.display()
        )));
    }

    for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| Error::io(&path, e))?;
        let removed = if file_type.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        removed.map_err(|e| Error::io(&path, e))?;
    }

    Ok(())
}
