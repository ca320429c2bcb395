//! Process settings loaded via OrthoConfig.
//!
//! Values layer defaults, an optional configuration file, `CMS_*`
//! environment variables, and CLI flags. `CMS_ENV` selects the runtime mode,
//! which in turn picks the documents directory and credential file.

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";

/// Runtime mode selecting storage locations and session strictness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeMode {
    /// Real deployment: persistent session key required.
    Production,
    /// Local development: production paths, relaxed session key handling.
    Development,
    /// Test runs: isolated fixture paths under `test/`.
    Test,
}

impl RuntimeMode {
    /// Whether an ephemeral session key may be generated without opt-in.
    #[must_use]
    pub fn allows_ephemeral_key(self) -> bool {
        !matches!(self, Self::Production)
    }
}

impl fmt::Display for RuntimeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Production => "production",
            Self::Development => "development",
            Self::Test => "test",
        })
    }
}

impl FromStr for RuntimeMode {
    type Err = SettingsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "development" | "dev" => Ok(Self::Development),
            "test" => Ok(Self::Test),
            _ => Err(SettingsError::InvalidMode {
                value: value.to_owned(),
            }),
        }
    }
}

/// Errors raised while interpreting settings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    /// `CMS_ENV` holds an unknown mode.
    #[error("invalid CMS_ENV '{value}'; expected production|development|test")]
    InvalidMode {
        /// Offending value.
        value: String,
    },
    /// `CMS_HOST` is not an IP address.
    #[error("invalid CMS_HOST '{value}'; expected an IP address")]
    InvalidHost {
        /// Offending value.
        value: String,
    },
}

/// Locations of persisted state for one runtime mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePaths {
    /// Directory holding one file per document.
    pub data_dir: PathBuf,
    /// YAML file mapping usernames to bcrypt hashes.
    pub users_file: PathBuf,
}

/// Settings for the CMS server process.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CMS")]
pub struct CmsSettings {
    /// Runtime mode: `production`, `development`, or `test`.
    pub env: Option<String>,
    /// Interface to bind.
    pub host: Option<String>,
    /// TCP port to listen on.
    #[ortho_config(default = 4567)]
    pub port: u16,
    /// Base directory for the default storage layout.
    pub root: Option<PathBuf>,
    /// Explicit documents directory, overriding the mode default.
    pub data_dir: Option<PathBuf>,
    /// Explicit credential file, overriding the mode default.
    pub users_file: Option<PathBuf>,
}

impl CmsSettings {
    /// Parse the configured runtime mode, defaulting to production.
    ///
    /// # Errors
    /// Returns [`SettingsError::InvalidMode`] for unknown values.
    pub fn mode(&self) -> Result<RuntimeMode, SettingsError> {
        self.env
            .as_deref()
            .map_or(Ok(RuntimeMode::Production), RuntimeMode::from_str)
    }

    /// Socket address to bind.
    ///
    /// # Errors
    /// Returns [`SettingsError::InvalidHost`] when the host is not an IP.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let host = self.host.as_deref().unwrap_or(DEFAULT_HOST);
        let ip: IpAddr = host.parse().map_err(|_| SettingsError::InvalidHost {
            value: host.to_owned(),
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Resolve storage locations for `mode`. Explicit overrides win.
    #[must_use]
    pub fn storage_paths(&self, mode: RuntimeMode) -> StoragePaths {
        let root = self.root.clone().unwrap_or_else(|| PathBuf::from("."));
        let base = match mode {
            RuntimeMode::Test => root.join("test"),
            RuntimeMode::Production | RuntimeMode::Development => root,
        };
        StoragePaths {
            data_dir: self
                .data_dir
                .clone()
                .unwrap_or_else(|| base.join("data")),
            users_file: self
                .users_file
                .clone()
                .unwrap_or_else(|| base.join("users.yaml")),
        }
    }
}
