//! Runtime policy configuration
//!
//! Loaded from TOML. Covers the policies the core leaves open: whether
//! partial refunds are accepted, and how often a busy store transaction is
//! retried before giving up.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Accept refund amounts below the full payment amount.
    /// Off by default: the stock policy is full refunds only.
    #[serde(default)]
    pub allow_partial_refunds: bool,

    /// Bounded retry count for transient busy/locked store failures
    #[serde(default = "default_busy_retries")]
    pub busy_retries: u32,
}

fn default_busy_retries() -> u32 {
    3
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            allow_partial_refunds: false,
            busy_retries: default_busy_retries(),
        }
    }
}

impl CoreConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}
