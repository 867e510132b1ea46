//! Transfer configuration loaded from TOML.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading or resolving configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("no issuer configured (set `issuer` in the config file, --issuer or IDP_DATA_ISSUER)")]
    MissingIssuer,
    #[error("no principal configured (set `principal` in the config file, --principal or IDP_DATA_PRINCIPAL)")]
    MissingPrincipal,
}

/// Settings shared by the transfer commands.
///
/// ```toml
/// issuer = "https://id.example/"
/// principal = "admin"
/// indent = "    "
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransferConfig {
    pub issuer: Option<String>,
    pub principal: Option<String>,
    pub indent: Option<String>,
}

impl TransferConfig {
    /// Reads a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads the config file if one was given, otherwise returns defaults.
    pub fn load_optional(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Applies command-line values on top of file values.
    pub fn with_overrides(mut self, issuer: Option<String>, principal: Option<String>) -> Self {
        if issuer.is_some() {
            self.issuer = issuer;
        }
        if principal.is_some() {
            self.principal = principal;
        }
        self
    }

    pub fn issuer(&self) -> Result<&str, ConfigError> {
        non_empty(&self.issuer).ok_or(ConfigError::MissingIssuer)
    }

    pub fn principal(&self) -> Result<&str, ConfigError> {
        non_empty(&self.principal).ok_or(ConfigError::MissingPrincipal)
    }

    /// Indentation for exported documents; `compact` wins over the file value.
    pub fn indent(&self, compact: bool) -> &str {
        if compact {
            ""
        } else {
            self.indent
                .as_deref()
                .unwrap_or(idp_data_core::ExportComposer::DEFAULT_INDENT)
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}
