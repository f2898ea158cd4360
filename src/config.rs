//! Engine configuration

use serde::{Deserialize, Serialize};

use crate::evaluator::Capabilities;

/// Configuration shared by the evaluator, codec and resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum nesting depth of a single evaluation
    pub max_depth: usize,
    /// Fractional digits kept by decimal division, unlimited when `None`
    pub decimal_scale: Option<u32>,
    /// Whether decoded programs are checked for well-formedness
    pub validate_on_decode: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: 256,
            decimal_scale: None,
            validate_on_decode: true,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json_str(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }

    /// Set the maximum evaluation depth
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the decimal division scale
    pub fn with_decimal_scale(mut self, scale: u32) -> Self {
        self.decimal_scale = Some(scale);
        self
    }

    /// Ambient capabilities for evaluation contexts built from this config
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            decimal_scale: self.decimal_scale,
        }
    }
}
