//! Individual packager input checks.
//!
//! These look at what the file will be used for, not only whether it exists:
//! a certificate must be PEM, an initramfs script must be runnable by sh.

use std::fs;
use std::path::Path;

use crate::config::AgentConfig;
use crate::layout::Platform;
use crate::package::locate_toolchain;

use super::types::CheckResult;

const PEM_CERT_MARKER: &str = "-----BEGIN CERTIFICATE-----";

pub fn check_toolchain(explicit: Option<&Path>) -> CheckResult {
    match locate_toolchain(explicit) {
        Ok(path) => CheckResult::pass_with("Build toolchain", &path.display().to_string()),
        Err(e) => CheckResult::fail("Build toolchain", &e.to_string()),
    }
}

pub fn check_prebuilt(path: &Path) -> CheckResult {
    if path.is_file() {
        CheckResult::pass_with("Prebuilt agent", &path.display().to_string())
    } else {
        CheckResult::fail("Prebuilt agent", &format!("{} not found", path.display()))
    }
}

pub fn check_root_cert(path: &Path) -> CheckResult {
    let name = "Root certificate";
    match fs::read_to_string(path) {
        Ok(content) if content.contains(PEM_CERT_MARKER) => {
            CheckResult::pass_with(name, &path.display().to_string())
        }
        Ok(_) => CheckResult::warn(
            name,
            &format!("{} has no PEM certificate block", path.display()),
        ),
        Err(_) => CheckResult::fail(
            name,
            &format!("Root certificate not found: {}", path.display()),
        ),
    }
}

pub fn check_config(path: &Path) -> CheckResult {
    let name = "Agent configuration";
    match AgentConfig::load(path) {
        Ok(config) => {
            let warnings = config.warnings();
            if warnings.is_empty() {
                CheckResult::pass_with(name, &path.display().to_string())
            } else {
                CheckResult::warn(name, &warnings.join("; "))
            }
        }
        Err(e) => CheckResult::fail(name, &e.to_string()),
    }
}

/// Check the platform's initramfs scripts under `scripts_dir`.
pub fn check_scripts(scripts_dir: &Path, platform: Platform) -> Vec<CheckResult> {
    let name = format!("{} initramfs scripts", platform);
    if !scripts_dir.is_dir() {
        return vec![CheckResult::fail(
            &name,
            &format!("{} not found", scripts_dir.display()),
        )];
    }

    let mut results = Vec::new();
    for rel in ["hooks/tas_agent", "init-premount/tas_agent"] {
        let path = scripts_dir.join(rel);
        results.push(check_shell_script(&path, rel));
    }

    let modules = scripts_dir.join("modules");
    results.push(if modules.is_file() {
        CheckResult::pass("modules")
    } else {
        CheckResult::fail("modules", &format!("{} not found", modules.display()))
    });

    results
}

pub fn check_install_script(path: &Path) -> CheckResult {
    check_shell_script(path, "install.sh")
}

fn check_shell_script(path: &Path, name: &str) -> CheckResult {
    match fs::read_to_string(path) {
        Ok(content) if content.starts_with("#!") => CheckResult::pass(name),
        Ok(_) => CheckResult::warn(name, "no #! interpreter line"),
        Err(_) => CheckResult::fail(name, &format!("{} not found", path.display())),
    }
}
