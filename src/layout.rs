//! Filesystem layout shared by the packager and the installer.
//!
//! The package tree and the target root are two views of the same set of
//! files. Both phases derive their paths from here so the tree the packager
//! writes is exactly the tree the installer expects.

use std::fmt;
use std::path::{Path, PathBuf};

use clap::ValueEnum;

use crate::error::{Error, Result};

/// Product name. Names the tree directory, the tarball and `/etc/<product>`.
pub const PRODUCT: &str = "tas_agent";

/// Name of the agent binary and of both initramfs scripts.
pub const BINARY_NAME: &str = "tas_agent";

/// Name of the lifecycle tool shipped next to `install.sh`.
pub const TOOL_NAME: &str = "tas-pkg";

/// Shim at the tree root that runs `tas-pkg install`.
pub const INSTALL_SCRIPT: &str = "install.sh";

pub const CONFIG_FILE: &str = "config";
pub const ROOT_CERT_FILE: &str = "root_cert.pem";

/// Mode given to the binary, the shim and both initramfs scripts.
pub const EXEC_MODE: u32 = 0o755;

/// Target platform. Selects the initramfs subtree inside the package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Platform {
    /// Debian/Ubuntu with initramfs-tools.
    #[default]
    Ubuntu,
}

impl Platform {
    /// Subtree name inside the package tree and in the source checkout.
    pub fn subtree(self) -> &'static str {
        match self {
            Platform::Ubuntu => "ubuntu",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.subtree())
    }
}

/// The six paths, relative to a package tree root, that make a package
/// installable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageManifest {
    pub binary: PathBuf,
    pub config: PathBuf,
    pub root_cert: PathBuf,
    pub hook: PathBuf,
    pub init_premount: PathBuf,
    pub modules: PathBuf,
}

impl PackageManifest {
    pub fn new(platform: Platform) -> Self {
        let etc = Path::new("etc").join(PRODUCT);
        let os = Path::new(platform.subtree());
        Self {
            binary: Path::new("sbin").join(BINARY_NAME),
            config: etc.join(CONFIG_FILE),
            root_cert: etc.join(ROOT_CERT_FILE),
            hook: os.join("hooks").join(BINARY_NAME),
            init_premount: os.join("init-premount").join(BINARY_NAME),
            modules: os.join("modules"),
        }
    }

    /// All members in manifest order.
    pub fn members(&self) -> [&Path; 6] {
        [
            self.binary.as_path(),
            self.config.as_path(),
            self.root_cert.as_path(),
            self.hook.as_path(),
            self.init_premount.as_path(),
            self.modules.as_path(),
        ]
    }

    /// Members absent under `tree`.
    pub fn missing(&self, tree: &Path) -> Vec<PathBuf> {
        self.members()
            .into_iter()
            .filter(|m| !tree.join(m).is_file())
            .map(Path::to_path_buf)
            .collect()
    }

    /// Fail with every missing member unless all six exist under `tree`.
    pub fn validate(&self, tree: &Path) -> Result<()> {
        let missing = self.missing(tree);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::IncompletePackage { missing })
        }
    }
}

/// Where each installed file lives under a target root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetLayout {
    pub root: PathBuf,
}

impl TargetLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn sbin_dir(&self) -> PathBuf {
        self.root.join("sbin")
    }

    pub fn etc_dir(&self) -> PathBuf {
        self.root.join("etc")
    }

    pub fn binary(&self) -> PathBuf {
        self.sbin_dir().join(BINARY_NAME)
    }

    pub fn config_dir(&self) -> PathBuf {
        self.etc_dir().join(PRODUCT)
    }

    pub fn hook(&self) -> PathBuf {
        self.root
            .join("usr/share/initramfs-tools/hooks")
            .join(BINARY_NAME)
    }

    pub fn init_premount(&self) -> PathBuf {
        self.root
            .join("usr/share/initramfs-tools/scripts/init-premount")
            .join(BINARY_NAME)
    }

    pub fn modules(&self) -> PathBuf {
        self.root.join("etc/initramfs-tools/modules")
    }

    /// The three files that end up inside a generated initramfs.
    pub fn initramfs_artifacts(&self) -> [PathBuf; 3] {
        [self.hook(), self.init_premount(), self.modules()]
    }
}

/// Package tree directory inside a packager destination.
pub fn tree_dir(dest: &Path) -> PathBuf {
    dest.join(PRODUCT)
}

/// Tarball path inside a packager destination.
pub fn tarball_path(dest: &Path) -> PathBuf {
    dest.join(format!("{PRODUCT}.tar.gz"))
}
