// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for model resolution and configuration loading.

use thiserror::Error;

use crate::schema::TypeDescriptor;

/// Reason a model failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct ValidationError {
    pub reason: String,
}

impl ValidationError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Failure modes of `Container::try_create_model`.
///
/// No variant carries a pending validation; that outcome stays inside the
/// validation scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No registered resolver claims the descriptor.
    #[error("no resolver claims type `{descriptor}`")]
    NotResolvable { descriptor: TypeDescriptor },

    /// The type graph is invalid; the whole transaction was rolled back.
    #[error("type `{descriptor}` failed validation: {source}")]
    Validation {
        descriptor: TypeDescriptor,
        #[source]
        source: ValidationError,
    },

    /// Nested resolution went deeper than `ContainerConfig::max_depth`.
    #[error("resolution depth limit {limit} exceeded at type `{descriptor}`")]
    DepthLimitExceeded {
        descriptor: TypeDescriptor,
        limit: usize,
    },

    /// Engine bookkeeping is inconsistent. Never suppressed.
    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),
}

impl ResolveError {
    pub fn validation(descriptor: TypeDescriptor, reason: impl Into<String>) -> Self {
        ResolveError::Validation {
            descriptor,
            source: ValidationError::new(reason),
        }
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        ResolveError::InvariantViolation(msg.into())
    }

    /// Whether `OnError::Suppress` may turn this error into an empty result.
    pub fn is_suppressible(&self) -> bool {
        !matches!(self, ResolveError::InvariantViolation(_))
    }

    /// Descriptor the error is attributed to, if any.
    pub fn descriptor(&self) -> Option<TypeDescriptor> {
        match self {
            ResolveError::NotResolvable { descriptor }
            | ResolveError::Validation { descriptor, .. }
            | ResolveError::DepthLimitExceeded { descriptor, .. } => Some(*descriptor),
            ResolveError::InvariantViolation(_) => None,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "config-loaders")]
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
