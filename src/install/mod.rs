//! Installer and remover.
//!
//! Install copies an extracted package tree onto a target root in one
//! sequential pass. The package is checked against the manifest before the
//! target is touched; after that, a failing step stops the run and leaves
//! earlier copies in place. Re-running install, or running remove, recovers.

mod initramfs;
mod remove;

use std::fs;
use std::path::{Path, PathBuf};

use crate::common::{copy_dir_recursive, copy_file, make_executable};
use crate::error::{Error, Result};
use crate::layout::{PackageManifest, Platform, TargetLayout, PRODUCT};

pub use initramfs::{
    running_kernel, update_initramfs, update_initramfs_with, InitramfsUpdate, UPDATE_TOOL,
};
pub use remove::{remove, RemoveReport, REBUILD_ADVISORY};

pub const DEFAULT_ROOT: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Install,
    Remove,
}

/// Installer inputs, fixed for the whole run.
#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// Target root directory.
    pub root: PathBuf,
    /// Extracted package tree.
    pub source: PathBuf,
    pub platform: Platform,
    pub mode: Mode,
    /// Regenerate the initramfs after installing or removing.
    pub update_initramfs: bool,
}

impl InstallOptions {
    pub fn new(root: impl Into<PathBuf>, source: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            source: source.into(),
            platform: Platform::default(),
            mode: Mode::default(),
            update_initramfs: false,
        }
    }

    pub fn layout(&self) -> TargetLayout {
        TargetLayout::new(&self.root)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    /// Installed paths in install order.
    pub installed: Vec<PathBuf>,
    /// An existing module list was overwritten.
    pub replaced_modules: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Installed(InstallReport),
    Removed(RemoveReport),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub action: Action,
    /// Set when a regeneration was requested.
    pub initramfs: Option<InitramfsUpdate>,
}

impl Outcome {
    /// Whether the operator should be told to rebuild the initramfs.
    pub fn needs_rebuild_advisory(&self) -> bool {
        match &self.action {
            Action::Removed(report) => report.needs_rebuild_advisory(self.initramfs.is_some()),
            Action::Installed(_) => false,
        }
    }
}

/// Install or remove, then regenerate the initramfs if requested.
pub fn execute(opts: &InstallOptions) -> Result<Outcome> {
    let action = match opts.mode {
        Mode::Install => Action::Installed(install(opts)?),
        Mode::Remove => Action::Removed(remove(&opts.layout())?),
    };

    let initramfs = if opts.update_initramfs {
        Some(update_initramfs()?)
    } else {
        None
    };

    let outcome = Outcome { action, initramfs };
    if outcome.needs_rebuild_advisory() {
        eprintln!("  [WARN] {}", REBUILD_ADVISORY);
    }
    Ok(outcome)
}

/// Copy a validated package tree onto the target root.
pub fn install(opts: &InstallOptions) -> Result<InstallReport> {
    let manifest = PackageManifest::new(opts.platform);
    manifest.validate(&opts.source)?;

    let layout = opts.layout();
    println!("Installing {} to {}...", PRODUCT, layout.root.display());

    if !layout.root.exists() {
        for dir in [layout.sbin_dir(), layout.etc_dir()] {
            fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
        }
    }

    let mut report = InstallReport::default();

    install_executable(&opts.source.join(&manifest.binary), &layout.binary())?;
    report.installed.push(layout.binary());

    let etc_src = opts
        .source
        .join(manifest.config.parent().unwrap_or(Path::new("etc")));
    copy_dir_recursive(&etc_src, &layout.config_dir())?;
    println!("  {}", layout.config_dir().display());
    report.installed.push(layout.config_dir());

    install_executable(&opts.source.join(&manifest.hook), &layout.hook())?;
    report.installed.push(layout.hook());

    install_executable(&opts.source.join(&manifest.init_premount), &layout.init_premount())?;
    report.installed.push(layout.init_premount());

    let modules = layout.modules();
    if modules.exists() {
        println!("  Replacing existing {}", modules.display());
        report.replaced_modules = true;
    }
    copy_file(&opts.source.join(&manifest.modules), &modules)?;
    println!("  {}", modules.display());
    report.installed.push(modules);

    Ok(report)
}

fn install_executable(src: &Path, dst: &Path) -> Result<()> {
    copy_file(src, dst)?;
    make_executable(dst)?;
    println!("  {}", dst.display());
    Ok(())
}
