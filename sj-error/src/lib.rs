//! Unified error handling for sensorjson
//!
//! This crate provides a single error type used across all sensorjson components.
//! It uses thiserror for ergonomic error definitions with proper Display and Error trait impls.

use std::io;
use std::path::PathBuf;

/// Result type alias using SensorJsonError
pub type Result<T> = std::result::Result<T, SensorJsonError>;

/// Unified error type for all sensorjson operations
#[derive(thiserror::Error, Debug)]
pub enum SensorJsonError {
    // ============================================================================
    // I/O and File System Errors
    // ============================================================================
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: io::Error,
    },

    // ============================================================================
    // Sensor Provider Errors
    // ============================================================================
    #[error("Failed to refresh hardware {hardware}: {reason}")]
    HardwareRead {
        hardware: String,
        reason: String,
    },

    // ============================================================================
    // Sensor Tree Errors
    // ============================================================================
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Malformed sensor tree at {node}: {reason}")]
    MalformedTree {
        node: String,
        reason: String,
    },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidConfig {
        field: String,
        reason: String,
    },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Server Errors
    // ============================================================================
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: io::Error,
    },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Generic(String),
}

impl SensorJsonError {
    /// Create a generic error from a string
    pub fn generic(msg: impl Into<String>) -> Self {
        Self::Generic(msg.into())
    }

    /// Create a config error from a string
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid config error for a named field
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a hardware refresh error
    pub fn hardware_read(hardware: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::HardwareRead {
            hardware: hardware.into(),
            reason: reason.into(),
        }
    }

    /// Create a structural contract violation for the node at `node`
    pub fn malformed(node: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedTree {
            node: node.into(),
            reason: reason.into(),
        }
    }

    /// True for errors raised by the sensor provider while refreshing
    pub fn is_provider_failure(&self) -> bool {
        matches!(self, Self::HardwareRead { .. })
    }
}

// Allow converting from String to SensorJsonError
impl From<String> for SensorJsonError {
    fn from(s: String) -> Self {
        Self::Generic(s)
    }
}

// Allow converting from &str to SensorJsonError
impl From<&str> for SensorJsonError {
    fn from(s: &str) -> Self {
        Self::Generic(s.to_string())
    }
}
