//! Agent configuration file checks.
//!
//! The configuration is shipped verbatim to `/etc/tas_agent/config`, where
//! the agent reads it as a dotenv file at boot. The packager only checks that
//! it parses and warns about keys the agent cannot start without.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::layout::{PRODUCT, ROOT_CERT_FILE};

/// Keys the agent requires in its configuration.
pub const REQUIRED_KEYS: &[&str] = &[
    "TAS_SERVER_URI",
    "TAS_SERVER_API_KEY",
    "TAS_KEY_ID",
    "TAS_SERVER_ROOT_CERT",
];

/// Parsed agent configuration.
#[derive(Debug, Clone, Default)]
pub struct AgentConfig {
    pub vars: BTreeMap<String, String>,
}

impl AgentConfig {
    /// Parse a dotenv file without touching the process environment.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::Configuration(format!(
                "configuration file not found: {}",
                path.display()
            )));
        }

        let iter = dotenvy::from_path_iter(path).map_err(|e| {
            Error::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;

        let mut vars = BTreeMap::new();
        for item in iter {
            let (key, value) = item.map_err(|e| {
                Error::Configuration(format!("cannot parse {}: {}", path.display(), e))
            })?;
            vars.insert(key, value);
        }

        Ok(Self { vars })
    }

    /// Required keys that are absent or empty.
    pub fn missing_keys(&self) -> Vec<&'static str> {
        REQUIRED_KEYS
            .iter()
            .copied()
            .filter(|key| self.vars.get(*key).map_or(true, |v| v.trim().is_empty()))
            .collect()
    }

    /// Certificate path the agent will load at boot, if configured.
    pub fn root_cert_path(&self) -> Option<&str> {
        self.vars
            .get("TAS_SERVER_ROOT_CERT")
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    /// Problems worth telling the operator about. None of them stop packaging.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings: Vec<String> = self
            .missing_keys()
            .into_iter()
            .map(|key| format!("does not set {key}"))
            .collect();

        let installed = installed_root_cert();
        if let Some(configured) = self.root_cert_path() {
            if Path::new(configured) != installed {
                warnings.push(format!(
                    "sets TAS_SERVER_ROOT_CERT={configured}, but the certificate is installed at {}",
                    installed.display()
                ));
            }
        }
        warnings
    }
}

/// Where the installer puts the root certificate on the target.
pub fn installed_root_cert() -> PathBuf {
    Path::new("/etc").join(PRODUCT).join(ROOT_CERT_FILE)
}
