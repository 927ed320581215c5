//! Removal of an installed agent.
//!
//! Nothing records what was installed, so removal probes the target root
//! directly. Every step treats a missing file as already removed, which makes
//! removal safe after a partial install, after no install, and when repeated.

use std::path::PathBuf;

use crate::common::{remove_dir_if_present, remove_file_if_present};
use crate::error::Result;
use crate::layout::TargetLayout;

/// Printed when boot-image files were removed and no rebuild was requested.
pub const REBUILD_ADVISORY: &str = "Initramfs hooks were removed. The current initramfs still \
contains them; run 'update-initramfs -u' (or re-run with -u) to rebuild it.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoveReport {
    /// Paths that existed and were deleted.
    pub removed: Vec<PathBuf>,
    /// True if a hook, init-premount script or module list was deleted.
    pub initramfs_artifacts_removed: bool,
}

impl RemoveReport {
    /// Whether to warn that the generated initramfs is stale.
    pub fn needs_rebuild_advisory(&self, update_requested: bool) -> bool {
        self.initramfs_artifacts_removed && !update_requested
    }
}

/// Delete the agent's files from `layout.root`.
pub fn remove(layout: &TargetLayout) -> Result<RemoveReport> {
    println!("Removing {} from {}...", crate::layout::PRODUCT, layout.root.display());
    let mut report = RemoveReport::default();

    let binary = layout.binary();
    if remove_file_if_present(&binary)? {
        println!("  Removed {}", binary.display());
        report.removed.push(binary);
    }

    let config_dir = layout.config_dir();
    if remove_dir_if_present(&config_dir)? {
        println!("  Removed {}", config_dir.display());
        report.removed.push(config_dir);
    }

    for artifact in layout.initramfs_artifacts() {
        if remove_file_if_present(&artifact)? {
            println!("  Removed {}", artifact.display());
            report.removed.push(artifact);
            report.initramfs_artifacts_removed = true;
        }
    }

    if report.removed.is_empty() {
        println!("  Nothing to remove.");
    }

    Ok(report)
}
