//! tas-pkg library.
//!
//! Package lifecycle for the tas_agent boot-time agent: the packager builds
//! a package tree and tarball, the installer copies an extracted tree onto a
//! target root and registers the initramfs hooks, the remover undoes it.

pub mod common;
pub mod config;
pub mod error;
pub mod install;
pub mod layout;
pub mod package;
pub mod preflight;
pub mod process;
pub mod timing;

pub use error::{Error, Result};
