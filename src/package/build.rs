//! Agent build step.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::layout::BINARY_NAME;
use crate::process::Cmd;
use crate::timing::Timer;

/// Default build tool looked up on `PATH`.
pub const DEFAULT_TOOLCHAIN: &str = "cargo";

/// Resolve the build tool.
///
/// An explicit value may be a bare program name or a path; without one,
/// `cargo` is looked up on `PATH`.
pub fn locate_toolchain(explicit: Option<&Path>) -> Result<PathBuf> {
    let wanted = explicit.unwrap_or(Path::new(DEFAULT_TOOLCHAIN));
    which::which(wanted)
        .map_err(|e| Error::ToolchainMissing(format!("{}: {}", wanted.display(), e)))
}

/// Where a release build of the agent lands inside its checkout.
pub fn release_output(source_dir: &Path) -> PathBuf {
    source_dir.join("target/release").join(BINARY_NAME)
}

/// Clean release build of the agent in `source_dir`.
///
/// Release artifacts are removed first so nothing from an earlier build is
/// reused. Returns the path of the built binary.
pub fn build_agent(cargo: &Path, source_dir: &Path) -> Result<PathBuf> {
    println!("Building {} (release, clean)...", BINARY_NAME);
    let timer = Timer::start("Agent build");

    Cmd::new(cargo)
        .args(["clean", "--release"])
        .dir(source_dir)
        .error_msg("cargo clean failed")
        .run_interactive()
        .map_err(|e| Error::BuildFailure(format!("{e:#}")))?;

    Cmd::new(cargo)
        .args(["build", "--release"])
        .dir(source_dir)
        .error_msg("cargo build --release failed")
        .run_interactive()
        .map_err(|e| Error::BuildFailure(format!("{e:#}")))?;

    timer.finish();

    let output = release_output(source_dir);
    if !output.is_file() {
        return Err(Error::BuildOutputMissing(output));
    }
    Ok(output)
}
