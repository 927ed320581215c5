//! Initramfs regeneration through initramfs-tools.

use std::path::Path;

use crate::error::{Error, Result};
use crate::process::{self, Cmd};
use crate::timing::Timer;

/// Host tool that regenerates the initramfs.
pub const UPDATE_TOOL: &str = "update-initramfs";

/// Outcome of an initramfs regeneration request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitramfsUpdate {
    /// Regenerated for the given kernel version.
    Updated { kernel: String },
    /// The host has no regeneration tool. Not an error.
    Skipped,
}

/// Regenerate the initramfs of the running kernel.
pub fn update_initramfs() -> Result<InitramfsUpdate> {
    update_initramfs_with(UPDATE_TOOL)
}

/// Regenerate the initramfs with `tool` (a program name or a path).
pub fn update_initramfs_with(tool: &str) -> Result<InitramfsUpdate> {
    let Some(tool_path) = process::which(tool) else {
        println!("{} not found, skipping initramfs update.", tool);
        return Ok(InitramfsUpdate::Skipped);
    };

    let kernel = running_kernel()?;
    println!("Updating initramfs for kernel {}...", kernel);
    let timer = Timer::start("Initramfs update");

    run_update(&tool_path, &kernel)?;

    timer.finish();
    Ok(InitramfsUpdate::Updated { kernel })
}

fn run_update(tool: &Path, kernel: &str) -> Result<()> {
    Cmd::new(tool)
        .args(["-u", "-k", kernel])
        .error_msg(format!("{} -u -k {} failed", UPDATE_TOOL, kernel))
        .run_interactive()
        .map_err(|e| Error::InitramfsUpdateFailed(format!("{e:#}")))?;
    Ok(())
}

/// Kernel release of the running system (`uname -r`).
pub fn running_kernel() -> Result<String> {
    let result = Cmd::new("uname")
        .arg("-r")
        .run()
        .map_err(|e| Error::InitramfsUpdateFailed(format!("{e:#}")))?;
    let kernel = result.stdout_trimmed();
    if kernel.is_empty() {
        return Err(Error::InitramfsUpdateFailed(
            "uname -r printed nothing".to_string(),
        ));
    }
    Ok(kernel.to_string())
}
