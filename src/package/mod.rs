//! Packager: build outputs in, one installable tarball out.
//!
//! Steps run in a fixed order and the first failure aborts the run:
//!
//! 1. Clear (or create) the destination directory
//! 2. Locate the build tool and do a clean release build of the agent
//! 3. Lay out the package tree
//! 4. Check the tree against the package manifest
//! 5. Archive the tree into `<dest>/tas_agent.tar.gz`
//!
//! No tarball exists unless every step succeeded. A half-written tree may
//! remain in the destination; it is cleared on the next run.

mod archive;
mod build;
mod tree;

use std::fs;
use std::path::{Path, PathBuf};

use crate::common::prepare_clean_dir;
use crate::error::{Error, Result};
use crate::layout::{tree_dir, PackageManifest, Platform, INSTALL_SCRIPT};

pub use archive::{create_tarball, extract_tarball, sha256_file};
pub use build::{build_agent, locate_toolchain, release_output, DEFAULT_TOOLCHAIN};
pub use tree::{lay_out_tree, TreeInputs};

pub const DEFAULT_DEST: &str = "./target/package";
pub const DEFAULT_ROOT_CERT: &str = "./config/root_cert.pem";
pub const DEFAULT_CONFIG: &str = ".env";

/// Where the agent binary comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentSource {
    /// Clean release build with the given build tool, or `cargo` on `PATH`.
    Build { toolchain: Option<PathBuf> },
    /// Binary built elsewhere; the build step is skipped.
    Prebuilt(PathBuf),
}

/// Packager inputs, fixed for the whole run.
#[derive(Debug, Clone)]
pub struct PackageOptions {
    pub dest: PathBuf,
    pub root_cert: PathBuf,
    pub config: PathBuf,
    pub platform: Platform,
    /// Agent checkout. Holds the build, the platform scripts and `install.sh`.
    pub source_dir: PathBuf,
    pub agent: AgentSource,
    /// Lifecycle tool copied next to `install.sh`.
    pub tool_binary: PathBuf,
}

impl PackageOptions {
    /// Options with every path at its default, relative to the working directory.
    pub fn new(tool_binary: PathBuf) -> Self {
        Self {
            dest: PathBuf::from(DEFAULT_DEST),
            root_cert: PathBuf::from(DEFAULT_ROOT_CERT),
            config: PathBuf::from(DEFAULT_CONFIG),
            platform: Platform::default(),
            source_dir: PathBuf::from("."),
            agent: AgentSource::Build { toolchain: None },
            tool_binary,
        }
    }

    pub fn scripts_dir(&self) -> PathBuf {
        self.source_dir.join(self.platform.subtree())
    }

    pub fn install_script(&self) -> PathBuf {
        self.source_dir.join(INSTALL_SCRIPT)
    }
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct PackageOutput {
    pub tree: PathBuf,
    pub tarball: PathBuf,
    pub size: u64,
    pub sha256: String,
}

/// Build the agent and produce the package tarball.
pub fn package(opts: &PackageOptions) -> Result<PackageOutput> {
    println!("Preparing {}...", opts.dest.display());
    prepare_clean_dir(&opts.dest)?;

    let binary = resolve_agent(&opts.agent, &opts.source_dir)?;

    let tree = tree_dir(&opts.dest);
    let inputs = TreeInputs {
        config: &opts.config,
        root_cert: &opts.root_cert,
        scripts_dir: opts.scripts_dir(),
        install_script: opts.install_script(),
        tool_binary: &opts.tool_binary,
        platform: opts.platform,
    };
    lay_out_tree(&binary, &inputs, &tree)?;

    PackageManifest::new(opts.platform).validate(&tree)?;

    let tarball = create_tarball(&opts.dest)?;
    let size = fs::metadata(&tarball)
        .map_err(|e| Error::io(&tarball, e))?
        .len();
    let sha256 = sha256_file(&tarball)?;

    Ok(PackageOutput {
        tree,
        tarball,
        size,
        sha256,
    })
}

fn resolve_agent(agent: &AgentSource, source_dir: &Path) -> Result<PathBuf> {
    match agent {
        AgentSource::Build { toolchain } => {
            let cargo = locate_toolchain(toolchain.as_deref())?;
            println!("  Using {}", cargo.display());
            build_agent(&cargo, source_dir)
        }
        AgentSource::Prebuilt(path) => {
            if !path.is_file() {
                return Err(Error::BuildOutputMissing(path.clone()));
            }
            println!("  Using prebuilt {}", path.display());
            Ok(path.clone())
        }
    }
}
