//! Package tarball creation and extraction.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::layout::{tarball_path, tree_dir, PRODUCT};

/// Archive `<dest>/tas_agent/` into `<dest>/tas_agent.tar.gz`.
///
/// Entries carry the `tas_agent/` prefix so extracting the tarball anywhere
/// reproduces the tree the installer expects. A partially written tarball is
/// removed on failure.
pub fn create_tarball(dest: &Path) -> Result<PathBuf> {
    let tree = tree_dir(dest);
    let tarball = tarball_path(dest);
    println!("Creating {}...", tarball.display());

    if let Err(source) = write_tarball(&tree, &tarball) {
        let _ = fs::remove_file(&tarball);
        return Err(Error::ArchiveFailure {
            path: tarball,
            source,
        });
    }

    Ok(tarball)
}

fn write_tarball(tree: &Path, tarball: &Path) -> io::Result<()> {
    let file = File::create(tarball)?;
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
    builder.follow_symlinks(false);
    builder.append_dir_all(PRODUCT, tree)?;
    builder.into_inner()?.finish()?;
    Ok(())
}

/// Extract a package tarball into `into`, returning the package tree path.
pub fn extract_tarball(tarball: &Path, into: &Path) -> Result<PathBuf> {
    let file = File::open(tarball).map_err(|e| Error::io(tarball, e))?;
    fs::create_dir_all(into).map_err(|e| Error::io(into, e))?;
    tar::Archive::new(GzDecoder::new(file))
        .unpack(into)
        .map_err(|e| Error::io(tarball, e))?;
    Ok(into.join(PRODUCT))
}

/// Hex SHA-256 digest of a file.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).map_err(|e| Error::io(path, e))?;
    Ok(format!("{:x}", hasher.finalize()))
}
