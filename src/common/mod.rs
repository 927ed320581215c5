//! Shared filesystem helpers for the packager and the installer.

pub mod files;
pub mod temp;

pub use files::{
    copy_dir_recursive, copy_file, copy_file_mode, is_executable, make_executable,
    remove_dir_if_present, remove_file_if_present, set_mode,
};
pub use temp::prepare_clean_dir;
