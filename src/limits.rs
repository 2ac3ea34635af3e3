//! Limits Policy
//!
//! Process-wide request limits. Loaded once at startup as part of the configuration and
//! passed by reference to the components that enforce them.

use serde::{Deserialize, Serialize};

/// Request limits, read-only after startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    /// Largest accepted node count
    #[serde(default = "default_max_nodes")]
    pub max_nodes: u64,

    /// Largest accepted number of specs in one batch
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
}

fn default_max_nodes() -> u64 {
    1000
}

fn default_max_batch_size() -> usize {
    100
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_nodes: default_max_nodes(),
            max_batch_size: default_max_batch_size(),
        }
    }
}

impl Limits {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_nodes == 0 {
            return Err("max_nodes must be positive".to_string());
        }
        if self.max_batch_size == 0 {
            return Err("max_batch_size must be positive".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_wire_shape() {
        let limits = Limits {
            max_nodes: 250,
            max_batch_size: 10,
        };
        let value = serde_json::to_value(limits).unwrap();
        assert_eq!(value["max_nodes"], 250);
        assert_eq!(value["max_batch_size"], 10);
    }

    #[test]
    fn test_zero_limits_rejected() {
        let limits = Limits {
            max_nodes: 0,
            max_batch_size: 1,
        };
        assert!(limits.validate().is_err());
        assert!(Limits::default().validate().is_ok());
    }
}
