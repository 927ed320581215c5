//! Install command - installs or removes an extracted package.

use anyhow::Result;

use tas_pkg::install::{self, Action, InitramfsUpdate, InstallOptions};

/// Execute the install command.
pub fn cmd_install(opts: &InstallOptions) -> Result<()> {
    let outcome = install::execute(opts)?;

    match &outcome.action {
        Action::Installed(report) => {
            println!("Installed {} paths.", report.installed.len());
            if report.replaced_modules {
                println!("  Note: the previous initramfs module list was replaced, not merged.");
            }
        }
        Action::Removed(report) => {
            println!("Removed {} paths.", report.removed.len());
        }
    }

    if let Some(InitramfsUpdate::Updated { kernel }) = &outcome.initramfs {
        println!("Initramfs regenerated for {}.", kernel);
    }
    Ok(())
}
