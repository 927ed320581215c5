//! Package tree layout.
//!
//! Mirrors the target filesystem:
//!
//! ```text
//! tas_agent/
//!   sbin/tas_agent
//!   etc/tas_agent/{config,root_cert.pem}
//!   ubuntu/{hooks/tas_agent,init-premount/tas_agent,modules}
//!   install.sh
//!   tas-pkg
//! ```

use std::path::{Path, PathBuf};

use crate::common::{copy_dir_recursive, copy_file, copy_file_mode};
use crate::config::AgentConfig;
use crate::error::{Error, Result};
use crate::layout::{
    Platform, BINARY_NAME, CONFIG_FILE, EXEC_MODE, INSTALL_SCRIPT, PRODUCT, ROOT_CERT_FILE,
    TOOL_NAME,
};

/// Everything that goes into a package tree besides the agent binary.
#[derive(Debug, Clone)]
pub struct TreeInputs<'a> {
    pub config: &'a Path,
    pub root_cert: &'a Path,
    /// Directory holding `hooks/`, `init-premount/` and `modules`.
    pub scripts_dir: PathBuf,
    pub install_script: PathBuf,
    pub tool_binary: &'a Path,
    pub platform: Platform,
}

/// Copy the binary, configuration, certificate, initramfs scripts and the
/// installer into `tree`.
pub fn lay_out_tree(binary: &Path, inputs: &TreeInputs<'_>, tree: &Path) -> Result<()> {
    println!("Laying out package tree at {}...", tree.display());

    copy_file_mode(binary, &tree.join("sbin").join(BINARY_NAME), EXEC_MODE)?;
    println!("  sbin/{}", BINARY_NAME);

    let etc = tree.join("etc").join(PRODUCT);
    copy_config(inputs.config, &etc.join(CONFIG_FILE))?;
    println!("  etc/{}/{}", PRODUCT, CONFIG_FILE);

    if !inputs.root_cert.is_file() {
        return Err(Error::MissingRootCert(inputs.root_cert.to_path_buf()));
    }
    copy_file(inputs.root_cert, &etc.join(ROOT_CERT_FILE))?;
    println!("  etc/{}/{}", PRODUCT, ROOT_CERT_FILE);

    let subtree = inputs.platform.subtree();
    copy_dir_recursive(&inputs.scripts_dir, &tree.join(subtree))?;
    println!("  {}/", subtree);

    copy_file_mode(&inputs.install_script, &tree.join(INSTALL_SCRIPT), EXEC_MODE)?;
    println!("  {}", INSTALL_SCRIPT);

    copy_file_mode(inputs.tool_binary, &tree.join(TOOL_NAME), EXEC_MODE)?;
    println!("  {}", TOOL_NAME);

    Ok(())
}

/// Copy the agent configuration after checking it parses.
///
/// Missing agent keys and a relocated certificate path are reported but do
/// not stop packaging.
fn copy_config(src: &Path, dst: &Path) -> Result<()> {
    let config = AgentConfig::load(src)?;
    for warning in config.warnings() {
        eprintln!("  [WARN] {} {}", src.display(), warning);
    }
    copy_file(src, dst)
}
