//! Error kinds for the package lifecycle.
//!
//! Every fatal condition maps to one variant so the failing step and path are
//! visible in the message. `main` turns any of these into exit code 1.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias used by the packager, installer and remover.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Bad or unreadable operator input.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Root certificate not found: {}", .0.display())]
    MissingRootCert(PathBuf),

    /// A source file or directory a copy step depends on is absent.
    #[error("Required input not found: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("Build toolchain not found: {0}")]
    ToolchainMissing(String),

    #[error("Build failed: {0}")]
    BuildFailure(String),

    #[error("Build output missing: {}", .0.display())]
    BuildOutputMissing(PathBuf),

    #[error("Copy failed: {}: {source}", .target.display())]
    CopyFailed {
        target: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Package tree is missing one or more manifest members.
    #[error("Package is incomplete, missing: {}", format_missing(.missing))]
    IncompletePackage { missing: Vec<PathBuf> },

    #[error("Failed to create archive {}: {source}", .path.display())]
    ArchiveFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Initramfs update failed: {0}")]
    InitramfsUpdateFailed(String),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Copy step failed while writing `target`.
    pub fn copy(target: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::CopyFailed {
            target: target.into(),
            source,
        }
    }
}

fn format_missing(missing: &[PathBuf]) -> String {
    missing
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
