//! CLI command handlers.
//!
//! Each submodule handles one subcommand:
//! - `package` - Build the agent and produce the package tarball
//! - `install` - Install or remove an extracted package
//! - `preflight` - Check packaging inputs
//! - `extract` - Unpack a package tarball

pub mod extract;
pub mod install;
pub mod package;
mod preflight;

pub use extract::cmd_extract;
pub use install::cmd_install;
pub use package::cmd_package;
pub use preflight::cmd_preflight;
