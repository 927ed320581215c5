//! Checked file operations.
//!
//! Every copy verifies its source before touching the destination and its
//! target afterwards, so a failing step reports the exact path involved.

use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Copy a single file, creating parent directories as needed.
///
/// Overwrites an existing target. Fails with `MissingInput` if `src` is not
/// a file and with `CopyFailed` if the target is not present afterwards.
pub fn copy_file(src: &Path, dst: &Path) -> Result<()> {
    if !src.is_file() {
        return Err(Error::MissingInput(src.to_path_buf()));
    }
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::copy(dst, e))?;
    }
    fs::copy(src, dst).map_err(|e| Error::copy(dst, e))?;
    verify_copied(dst)
}

/// Copy a file and set its mode on the copy.
pub fn copy_file_mode(src: &Path, dst: &Path, mode: u32) -> Result<()> {
    copy_file(src, dst)?;
    set_mode(dst, mode)
}

/// Set Unix permission bits on an existing path.
pub fn set_mode(path: &Path, mode: u32) -> Result<()> {
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|e| Error::io(path, e))
}

/// Add the execute bits to a file, keeping the rest of its mode.
pub fn make_executable(path: &Path) -> Result<()> {
    let mode = fs::metadata(path)
        .map_err(|e| Error::io(path, e))?
        .permissions()
        .mode();
    set_mode(path, mode | 0o111)
}

/// Returns true if any execute bit is set on `path`.
pub fn is_executable(path: &Path) -> bool {
    fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Recursively copy the contents of `src` into `dst`.
///
/// `dst` is created if needed. Existing files are overwritten, files already
/// in `dst` but not in `src` are left alone. Symlinks are recreated rather
/// than followed.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    if !src.is_dir() {
        return Err(Error::MissingInput(src.to_path_buf()));
    }
    fs::create_dir_all(dst).map_err(|e| Error::copy(dst, e))?;

    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry.map_err(|e| Error::io(src, io::Error::other(e)))?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| Error::io(entry.path(), io::Error::other(e)))?;
        let target = dst.join(rel);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target).map_err(|e| Error::copy(&target, e))?;
        } else if file_type.is_symlink() {
            let link = fs::read_link(entry.path()).map_err(|e| Error::io(entry.path(), e))?;
            remove_file_if_present(&target)?;
            std::os::unix::fs::symlink(&link, &target).map_err(|e| Error::copy(&target, e))?;
        } else {
            copy_file(entry.path(), &target)?;
        }
    }

    Ok(())
}

/// Remove a file. Returns whether something was removed; absence is not an error.
pub fn remove_file_if_present(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Remove a directory tree. Returns whether something was removed.
pub fn remove_dir_if_present(path: &Path) -> Result<bool> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io(path, e)),
    }
}

fn verify_copied(dst: &Path) -> Result<()> {
    if dst.exists() {
        Ok(())
    } else {
        Err(Error::copy(
            dst,
            io::Error::new(io::ErrorKind::NotFound, "target missing after copy"),
        ))
    }
}
