//! Preflight command - checks packaging inputs.

use anyhow::Result;

use tas_pkg::package::PackageOptions;
use tas_pkg::preflight;

/// Execute the preflight command.
pub fn cmd_preflight(opts: &PackageOptions, strict: bool) -> Result<()> {
    if strict {
        preflight::run_preflight_or_fail(opts)?;
    } else {
        let report = preflight::run_preflight(opts);
        report.print();
        if !report.all_passed() {
            println!("Some checks failed. Use --strict to fail with exit code 1.");
        }
    }
    Ok(())
}
