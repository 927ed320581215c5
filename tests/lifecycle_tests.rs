//! Package → extract → install → remove, through the library API.
//!
//! Uses a prebuilt agent binary so no toolchain is needed.

mod helpers;

use helpers::{
    assert_executable, assert_file_contains, assert_file_exists, assert_not_exists,
    create_mock_tree, list_files, write_mode, TestEnv,
};
use std::fs;
use tas_pkg::install::{self, Action, InstallOptions, Mode};
use tas_pkg::layout::{PackageManifest, Platform, TargetLayout};
use tas_pkg::package::{self, extract_tarball};
use tas_pkg::Error;

const INSTALLED_FILES: [&str; 6] = [
    "etc/initramfs-tools/modules",
    "etc/tas_agent/config",
    "etc/tas_agent/root_cert.pem",
    "sbin/tas_agent",
    "usr/share/initramfs-tools/hooks/tas_agent",
    "usr/share/initramfs-tools/scripts/init-premount/tas_agent",
];

// =============================================================================
// Packager
// =============================================================================

#[test]
fn test_package_produces_single_tarball() {
    let env = TestEnv::new();

    let output = package::package(&env.package_options()).unwrap();

    assert_eq!(output.tarball, env.dest.join("tas_agent.tar.gz"));
    assert_eq!(output.sha256.len(), 64);
    assert!(output.size > 0);

    let tarballs: Vec<_> = fs::read_dir(&env.dest)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tar.gz"))
        .collect();
    assert_eq!(tarballs.len(), 1);
}

#[test]
fn test_package_tree_layout() {
    let env = TestEnv::new();

    let output = package::package(&env.package_options()).unwrap();

    assert_eq!(
        list_files(&output.tree),
        vec![
            "etc/tas_agent/config",
            "etc/tas_agent/root_cert.pem",
            "install.sh",
            "sbin/tas_agent",
            "tas-pkg",
            "ubuntu/hooks/tas_agent",
            "ubuntu/init-premount/tas_agent",
            "ubuntu/modules",
        ]
    );
    assert_executable(&output.tree.join("sbin/tas_agent"));
    assert_executable(&output.tree.join("install.sh"));
    assert_executable(&output.tree.join("tas-pkg"));
}

#[test]
fn test_package_purges_destination() {
    let env = TestEnv::new();
    write_mode(&env.dest.join("unrelated.txt"), "old", 0o644);
    write_mode(&env.dest.join("tas_agent/stale/leftover"), "old", 0o644);

    package::package(&env.package_options()).unwrap();

    let mut entries: Vec<String> = fs::read_dir(&env.dest)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    entries.sort();
    assert_eq!(entries, vec!["tas_agent", "tas_agent.tar.gz"]);
    assert_not_exists(&env.dest.join("tas_agent/stale"));
}

#[test]
fn test_package_missing_root_cert_produces_no_tarball() {
    let env = TestEnv::new();
    let mut opts = env.package_options();
    opts.root_cert = env.base.join("nonexistent.pem");

    let err = package::package(&opts).unwrap_err();

    assert!(matches!(err, Error::MissingRootCert(_)));
    assert!(err.to_string().contains("Root certificate not found"));
    assert_not_exists(&env.dest.join("tas_agent.tar.gz"));
}

#[test]
fn test_package_missing_config_is_configuration_error() {
    let env = TestEnv::new();
    let mut opts = env.package_options();
    opts.config = env.base.join("missing.env");

    let err = package::package(&opts).unwrap_err();

    assert!(matches!(err, Error::Configuration(_)));
    assert_not_exists(&env.dest.join("tas_agent.tar.gz"));
}

#[test]
fn test_package_incomplete_scripts_rejected() {
    let env = TestEnv::new();
    fs::remove_file(env.checkout.join("ubuntu/modules")).unwrap();

    let err = package::package(&env.package_options()).unwrap_err();

    match err {
        Error::IncompletePackage { missing } => {
            assert_eq!(missing, vec![std::path::PathBuf::from("ubuntu/modules")]);
        }
        other => panic!("expected IncompletePackage, got {other:?}"),
    }
    assert_not_exists(&env.dest.join("tas_agent.tar.gz"));
}

#[test]
fn test_package_missing_toolchain() {
    let env = TestEnv::new();
    let mut opts = env.package_options();
    opts.agent = package::AgentSource::Build {
        toolchain: Some(env.base.join("no-such-cargo")),
    };

    let err = package::package(&opts).unwrap_err();

    assert!(matches!(err, Error::ToolchainMissing(_)));
    assert_not_exists(&env.dest.join("tas_agent.tar.gz"));
}

#[test]
fn test_package_extracts_to_valid_tree() {
    let env = TestEnv::new();
    let output = package::package(&env.package_options()).unwrap();

    let tree = extract_tarball(&output.tarball, &env.extract_dir()).unwrap();

    assert_eq!(tree, env.extract_dir().join("tas_agent"));
    PackageManifest::new(Platform::Ubuntu).validate(&tree).unwrap();
    assert_file_contains(&tree.join("etc/tas_agent/config"), "TAS_KEY_ID=b2b3c6f1");
}

// =============================================================================
// Installer
// =============================================================================

#[test]
fn test_round_trip_install() {
    let env = TestEnv::new();
    let output = package::package(&env.package_options()).unwrap();
    let tree = extract_tarball(&output.tarball, &env.extract_dir()).unwrap();

    let report = install::install(&InstallOptions::new(&env.root, &tree)).unwrap();

    assert_eq!(report.installed.len(), 5);
    assert!(!report.replaced_modules);
    assert_eq!(list_files(&env.root), INSTALLED_FILES);

    let layout = TargetLayout::new(&env.root);
    assert_executable(&layout.binary());
    assert_executable(&layout.hook());
    assert_executable(&layout.init_premount());
    assert_file_contains(&layout.modules(), "tpm_crb");
}

#[test]
fn test_install_refuses_each_missing_member() {
    let manifest = PackageManifest::new(Platform::Ubuntu);

    for member in manifest.members() {
        let env = TestEnv::new();
        let tree = env.base.join("tree");
        create_mock_tree(&tree);
        fs::remove_file(tree.join(member)).unwrap();
        write_mode(&env.root.join("existing"), "keep", 0o644);

        let err = install::install(&InstallOptions::new(&env.root, &tree)).unwrap_err();

        match err {
            Error::IncompletePackage { missing } => assert_eq!(missing, vec![member.to_path_buf()]),
            other => panic!("expected IncompletePackage for {member:?}, got {other:?}"),
        }
        assert_eq!(list_files(&env.root), vec!["existing"]);
    }
}

#[test]
fn test_install_creates_missing_root() {
    let env = TestEnv::new();
    let tree = env.base.join("tree");
    create_mock_tree(&tree);
    let root = env.base.join("new/root");

    install::install(&InstallOptions::new(&root, &tree)).unwrap();

    assert!(root.join("sbin").is_dir());
    assert!(root.join("etc").is_dir());
    assert_eq!(list_files(&root), INSTALLED_FILES);
}

#[test]
fn test_install_overwrites_module_list() {
    let env = TestEnv::new();
    let tree = env.base.join("tree");
    create_mock_tree(&tree);
    let layout = TargetLayout::new(&env.root);
    write_mode(&layout.modules(), "nvme\n", 0o644);

    let report = install::install(&InstallOptions::new(&env.root, &tree)).unwrap();

    assert!(report.replaced_modules);
    assert_eq!(fs::read_to_string(layout.modules()).unwrap(), "tpm_crb\n");
}

#[test]
fn test_reinstall_is_idempotent() {
    let env = TestEnv::new();
    let tree = env.base.join("tree");
    create_mock_tree(&tree);
    let opts = InstallOptions::new(&env.root, &tree);

    install::install(&opts).unwrap();
    install::install(&opts).unwrap();

    assert_eq!(list_files(&env.root), INSTALLED_FILES);
}

// =============================================================================
// Remover
// =============================================================================

#[test]
fn test_remove_twice() {
    let env = TestEnv::new();
    let tree = env.base.join("tree");
    create_mock_tree(&tree);
    install::install(&InstallOptions::new(&env.root, &tree)).unwrap();
    let layout = TargetLayout::new(&env.root);

    let first = install::remove(&layout).unwrap();
    assert_eq!(first.removed.len(), 5);
    assert!(first.initramfs_artifacts_removed);
    assert!(list_files(&env.root).is_empty());

    let second = install::remove(&layout).unwrap();
    assert!(second.removed.is_empty());
    assert!(!second.initramfs_artifacts_removed);
    assert!(list_files(&env.root).is_empty());
}

#[test]
fn test_remove_binary_only_install() {
    let env = TestEnv::new();
    let layout = TargetLayout::new(&env.root);
    write_mode(&layout.binary(), "agent", 0o755);

    let report = install::remove(&layout).unwrap();

    assert_eq!(report.removed, vec![layout.binary()]);
    assert!(!report.initramfs_artifacts_removed);
    assert_not_exists(&layout.binary());
}

#[test]
fn test_remove_leaves_unrelated_files() {
    let env = TestEnv::new();
    let tree = env.base.join("tree");
    create_mock_tree(&tree);
    install::install(&InstallOptions::new(&env.root, &tree)).unwrap();
    write_mode(&env.root.join("sbin/other"), "other", 0o755);
    write_mode(&env.root.join("usr/share/initramfs-tools/hooks/lvm2"), "#!/bin/sh\n", 0o755);

    install::remove(&TargetLayout::new(&env.root)).unwrap();

    assert_eq!(
        list_files(&env.root),
        vec!["sbin/other", "usr/share/initramfs-tools/hooks/lvm2"]
    );
}

#[test]
fn test_execute_install_then_remove() {
    let env = TestEnv::new();
    let tree = env.base.join("tree");
    create_mock_tree(&tree);
    let mut opts = InstallOptions::new(&env.root, &tree);

    let installed = install::execute(&opts).unwrap();
    assert!(matches!(installed.action, Action::Installed(_)));
    assert!(installed.initramfs.is_none());
    for path in INSTALLED_FILES {
        assert_file_exists(&env.root.join(path));
    }

    opts.mode = Mode::Remove;
    let removed = install::execute(&opts).unwrap();

    match &removed.action {
        Action::Removed(report) => assert!(report.initramfs_artifacts_removed),
        other => panic!("expected removal, got {other:?}"),
    }
    assert!(removed.needs_rebuild_advisory());
    assert_not_exists(&env.root.join("sbin/tas_agent"));
    assert_not_exists(&env.root.join("etc/tas_agent"));
}
