//! Extract command - unpacks a package tarball for installation or inspection.

use anyhow::{bail, Result};
use std::path::Path;

use tas_pkg::layout::{PackageManifest, Platform};
use tas_pkg::package;

/// Execute the extract command.
pub fn cmd_extract(tarball: &Path, output: &Path, platform: Platform) -> Result<()> {
    if !tarball.is_file() {
        bail!(
            "Tarball not found: {}\nRun 'tas-pkg package' first to build it.",
            tarball.display()
        );
    }

    println!("Extracting {} to {}...", tarball.display(), output.display());
    let tree = package::extract_tarball(tarball, output)?;
    PackageManifest::new(platform).validate(&tree)?;

    println!("\nInspect or install from: {}", tree.display());
    Ok(())
}
