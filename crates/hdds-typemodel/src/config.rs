// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Container configuration.
//!
//! Supports programmatic, environment and (feature `config-loaders`) YAML
//! configuration.
//!
//! # Example YAML
//!
//! ```yaml
//! # typemodel.yaml
//! max_depth: 128
//! log_transactions: false
//! ```
//!
//! # Environment
//!
//! - `HDDS_TYPEMODEL_MAX_DEPTH`: maximum nested resolution depth
//! - `HDDS_TYPEMODEL_LOG_TRANSACTIONS`: `0`/`false` disables transaction logs

#[cfg(feature = "config-loaders")]
use std::path::Path;

use crate::error::ConfigError;

/// Default maximum nested resolution depth.
pub const DEFAULT_MAX_DEPTH: usize = 256;

pub const ENV_MAX_DEPTH: &str = "HDDS_TYPEMODEL_MAX_DEPTH";
pub const ENV_LOG_TRANSACTIONS: &str = "HDDS_TYPEMODEL_LOG_TRANSACTIONS";

/// Tunables for a [`Container`](crate::Container).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config-loaders", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "config-loaders", serde(default))]
pub struct ContainerConfig {
    /// Deepest chain of nested resolutions one transaction may open.
    pub max_depth: usize,
    /// Emit debug logs at transaction begin/commit.
    pub log_transactions: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            log_transactions: true,
        }
    }
}

impl ContainerConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_log_transactions(mut self, enabled: bool) -> Self {
        self.log_transactions = enabled;
        self
    }

    /// Defaults overridden by `HDDS_TYPEMODEL_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_MAX_DEPTH) {
            config.max_depth = raw.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("{}: not a positive integer: {:?}", ENV_MAX_DEPTH, raw))
            })?;
        }

        if let Some(raw) = lookup(ENV_LOG_TRANSACTIONS) {
            config.log_transactions = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                other => {
                    return Err(ConfigError::Invalid(format!(
                        "{}: expected a boolean, got {:?}",
                        ENV_LOG_TRANSACTIONS, other
                    )))
                }
            };
        }

        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "config-loaders")]
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "config-loaders")]
    pub fn load_yaml<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid("max_depth must be at least 1".into()));
        }
        Ok(())
    }

    /// Configuration with invalid fields replaced by their defaults.
    ///
    /// `max_depth == 0` would fail every cache miss, so it falls back to
    /// [`DEFAULT_MAX_DEPTH`].
    pub fn normalized(mut self) -> Self {
        if let Err(err) = self.validate() {
            log::warn!(
                "[typemodel] {}; using max_depth {}",
                err,
                DEFAULT_MAX_DEPTH
            );
            self.max_depth = DEFAULT_MAX_DEPTH;
        }
        self
    }
}
