//! Preflight checks for packaging.
//!
//! Validates the packager's inputs without touching the destination.
//! Run with `tas-pkg preflight` before `tas-pkg package`.

mod checks;
mod types;

pub use checks::{
    check_config, check_install_script, check_prebuilt, check_root_cert, check_scripts,
    check_toolchain,
};
pub use types::{CheckResult, CheckStatus, PreflightReport};

use crate::error::{Error, Result};
use crate::package::{AgentSource, PackageOptions};

/// Run all preflight checks for a packaging run.
pub fn run_preflight(opts: &PackageOptions) -> PreflightReport {
    let mut checks = Vec::new();

    println!("Running preflight checks...\n");

    checks.push(match &opts.agent {
        AgentSource::Build { toolchain } => check_toolchain(toolchain.as_deref()),
        AgentSource::Prebuilt(path) => check_prebuilt(path),
    });
    checks.push(check_root_cert(&opts.root_cert));
    checks.push(check_config(&opts.config));
    checks.extend(check_scripts(&opts.scripts_dir(), opts.platform));
    checks.push(check_install_script(&opts.install_script()));

    PreflightReport { checks }
}

/// Run preflight and fail if any check fails.
pub fn run_preflight_or_fail(opts: &PackageOptions) -> Result<()> {
    let report = run_preflight(opts);
    report.print();

    if !report.all_passed() {
        return Err(Error::Configuration(format!(
            "preflight failed: {} check(s) failed",
            report.fail_count()
        )));
    }

    println!("All preflight checks passed!\n");
    Ok(())
}
