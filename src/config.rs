//! Fleet configuration.
//!
//! One TOML file describes the devices to check. Credentials are
//! never stored in it; password entries name environment variables
//! resolved at run time.
//!
//! ```toml
//! backup_dir = "/usr/local/san/backups"
//! remediated_hosts = "/usr/local/san/consolidated_hosts.csv"
//!
//! [[devices]]
//! name = "switch01"
//! kind = "cisco-switch"
//! username = "script"
//! password_env = "SAN_SWITCH_PASSWORD"
//!
//! [[devices]]
//! name = "0485"
//! kind = "symmetrix"
//! fa_pairs = { "5EA" = "6EA", "7EA" = "8EA" }
//! ```

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use secrecy::SecretString;
use serde::Deserialize;

use crate::device::DeviceKind;
use crate::error::{ConfigError, Result};
use crate::transport::{AuthMethod, SshConfig};

/// The whole fleet as loaded from the configuration file. Built once
/// at startup, immutable for the rest of the run.
#[derive(Debug, Clone, Deserialize)]
pub struct FleetConfig {
    pub devices: Vec<DeviceConfig>,

    /// Directory for switch running-config backups.
    pub backup_dir: Option<PathBuf>,

    /// Local directory holding already-fetched NAR archives.
    pub archive_dir: Option<PathBuf>,

    /// Identifier-per-line file of hosts already consolidated.
    pub remediated_hosts: Option<PathBuf>,
}

impl FleetConfig {
    /// Load and parse the fleet configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: FleetConfig =
            toml::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source: Box::new(source),
            })?;
        Ok(config)
    }

    /// Devices to run against, honoring an optional `--device` filter.
    ///
    /// Filtering by an unknown name fails before any device is
    /// contacted.
    pub fn select(&self, filter: Option<&str>) -> Result<Vec<&DeviceConfig>> {
        match filter {
            None => Ok(self.devices.iter().collect()),
            Some(name) => {
                let selected: Vec<&DeviceConfig> = self
                    .devices
                    .iter()
                    .filter(|d| d.name.eq_ignore_ascii_case(name))
                    .collect();
                if selected.is_empty() {
                    Err(ConfigError::UnknownDevice {
                        name: name.to_string(),
                    }
                    .into())
                } else {
                    Ok(selected)
                }
            }
        }
    }
}

/// One device entry.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    /// Fleet name (hostname, cluster id, or Symmetrix SID).
    pub name: String,

    pub kind: DeviceKind,

    /// Transport address when it differs from the name.
    pub address: Option<String>,

    /// SSH username for SSH-reached devices.
    pub username: Option<String>,

    /// Name of the environment variable holding the SSH password.
    pub password_env: Option<String>,

    /// Active FA pairs for a Symmetrix: first member mapped to its
    /// redundant partner, in checking order.
    pub fa_pairs: Option<IndexMap<String, String>>,
}

impl DeviceConfig {
    /// Transport address, defaulting to the device name (switch names
    /// resolve through /etc/hosts).
    pub fn address(&self) -> &str {
        self.address.as_deref().unwrap_or(&self.name)
    }

    /// Resolve SSH settings for this device, reading the password
    /// from the configured environment variable.
    pub fn ssh_config(&self) -> Result<SshConfig> {
        let username = self.username.as_deref().unwrap_or("script");
        let auth = match &self.password_env {
            Some(var) => {
                let password =
                    std::env::var(var).map_err(|_| ConfigError::MissingCredential {
                        var: var.clone(),
                        device: self.name.clone(),
                    })?;
                AuthMethod::Password(SecretString::from(password))
            }
            None => AuthMethod::None,
        };
        Ok(SshConfig::new(self.address(), username, auth))
    }
}
