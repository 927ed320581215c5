//! Package command - builds the agent and writes the package tarball.

use anyhow::Result;

use tas_pkg::package::{self, PackageOptions};

/// Execute the package command.
pub fn cmd_package(opts: &PackageOptions) -> Result<()> {
    let output = package::package(opts)?;

    println!("\n=== Package complete ===");
    println!("  Tarball: {}", output.tarball.display());
    println!("  Size:    {:.2} MB", output.size as f64 / 1024.0 / 1024.0);
    println!("  SHA-256: {}", output.sha256);
    println!("\nInstall on the target with:");
    println!("  tar -xzf {} && sudo ./tas_agent/install.sh -u", output.tarball.display());
    Ok(())
}
