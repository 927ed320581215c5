//! Shared test utilities for tas-pkg tests.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use tas_pkg::package::{AgentSource, PackageOptions};

pub const AGENT_CONFIG: &str = "TAS_SERVER_URI=https://tas.example:5001\n\
TAS_SERVER_API_KEY=test-api-key\n\
TAS_KEY_ID=b2b3c6f1\n\
TAS_SERVER_ROOT_CERT=/etc/tas_agent/root_cert.pem\n";

pub const ROOT_CERT: &str = "-----BEGIN CERTIFICATE-----\nMIIBszCCAVmgAwIBAgIU\n-----END CERTIFICATE-----\n";

/// Test environment with an agent checkout, packaging inputs, and a scratch
/// target root.
pub struct TestEnv {
    /// Temporary directory (kept alive for lifetime of TestEnv)
    pub _temp_dir: TempDir,
    pub base: PathBuf,
    /// Mock agent checkout with `ubuntu/` scripts and `install.sh`
    pub checkout: PathBuf,
    /// Prebuilt agent binary
    pub agent: PathBuf,
    pub config: PathBuf,
    pub root_cert: PathBuf,
    /// Stand-in for the tas-pkg executable shipped in the tree
    pub tool: PathBuf,
    /// Packager destination
    pub dest: PathBuf,
    /// Scratch target root
    pub root: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let base = temp_dir.path().to_path_buf();
        let checkout = base.join("checkout");

        create_mock_checkout(&checkout);

        let agent = base.join("build/tas_agent");
        write_mode(&agent, "#!/bin/sh\necho agent\n", 0o644);
        let config = base.join("inputs/conf");
        write_mode(&config, AGENT_CONFIG, 0o600);
        let root_cert = base.join("inputs/cert.pem");
        write_mode(&root_cert, ROOT_CERT, 0o644);
        let tool = base.join("build/tas-pkg");
        write_mode(&tool, "#!/bin/sh\n", 0o755);

        Self {
            _temp_dir: temp_dir,
            dest: base.join("pkg"),
            root: base.join("root"),
            base,
            checkout,
            agent,
            config,
            root_cert,
            tool,
        }
    }

    /// Packager options using the prebuilt agent.
    pub fn package_options(&self) -> PackageOptions {
        let mut opts = PackageOptions::new(self.tool.clone());
        opts.dest = self.dest.clone();
        opts.root_cert = self.root_cert.clone();
        opts.config = self.config.clone();
        opts.source_dir = self.checkout.clone();
        opts.agent = AgentSource::Prebuilt(self.agent.clone());
        opts
    }

    /// Extraction directory for round trips.
    pub fn extract_dir(&self) -> PathBuf {
        self.base.join("extracted")
    }
}

/// Create an agent checkout with the platform scripts and the shipped install shim.
///
/// Script modes are deliberately 0644 so tests can see the installer set
/// the execute bits.
pub fn create_mock_checkout(checkout: &Path) {
    let shim = fs::read_to_string(shipped_install_script()).expect("Failed to read install.sh");
    write_mode(&checkout.join("install.sh"), &shim, 0o755);
    write_mode(&checkout.join("ubuntu/hooks/tas_agent"), "#!/bin/sh\ncopy_exec /sbin/tas_agent /sbin\n", 0o644);
    write_mode(&checkout.join("ubuntu/init-premount/tas_agent"), "#!/bin/sh\nconfigure_networking\n", 0o644);
    write_mode(&checkout.join("ubuntu/modules"), "tpm_crb\ntpm_tis\n", 0o644);
}

/// The `install.sh` shim shipped at the repository root.
pub fn shipped_install_script() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("install.sh")
}

/// Kernel release of the test host.
pub fn host_kernel() -> String {
    let output = std::process::Command::new("uname")
        .arg("-r")
        .output()
        .expect("Failed to run uname");
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Create a complete extracted package tree without going through the packager.
pub fn create_mock_tree(tree: &Path) {
    write_mode(&tree.join("sbin/tas_agent"), "#!/bin/sh\necho agent\n", 0o644);
    write_mode(&tree.join("etc/tas_agent/config"), AGENT_CONFIG, 0o600);
    write_mode(&tree.join("etc/tas_agent/root_cert.pem"), ROOT_CERT, 0o644);
    write_mode(&tree.join("ubuntu/hooks/tas_agent"), "#!/bin/sh\n", 0o644);
    write_mode(&tree.join("ubuntu/init-premount/tas_agent"), "#!/bin/sh\n", 0o644);
    write_mode(&tree.join("ubuntu/modules"), "tpm_crb\n", 0o644);
}

/// Write a file with parents and the given mode.
pub fn write_mode(path: &Path, content: &str, mode: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    fs::write(path, content).expect("Failed to write file");
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).expect("Failed to set mode");
}

/// All regular files under `dir`, relative to it, sorted.
pub fn list_files(dir: &Path) -> Vec<String> {
    let mut files: Vec<String> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(dir)
                .expect("entry under dir")
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    files.sort();
    files
}

/// Assert that a file exists and has all execute bits set.
pub fn assert_executable(path: &Path) {
    let mode = fs::metadata(path)
        .unwrap_or_else(|_| panic!("Expected file to exist: {}", path.display()))
        .permissions()
        .mode();
    assert_eq!(
        mode & 0o111,
        0o111,
        "Expected {} to be executable, mode {:o}",
        path.display(),
        mode
    );
}

/// Assert that a file contains expected content.
pub fn assert_file_contains(path: &Path, expected: &str) {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|_| panic!("Failed to read file: {}", path.display()));
    assert!(
        content.contains(expected),
        "File {} does not contain expected content.\nExpected to find: {}\nActual content: {}",
        path.display(),
        expected,
        content
    );
}

pub fn assert_file_exists(path: &Path) {
    assert!(path.exists(), "Expected file to exist: {}", path.display());
}

pub fn assert_not_exists(path: &Path) {
    assert!(!path.exists(), "Expected {} to be absent", path.display());
}
