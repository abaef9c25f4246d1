//! Decoder configuration
//!
//! Capacities are fixed when a decoder is built; nothing grows past them
//! while a reply is being decoded.

/// Default number of neighbor cell slots
pub const DEFAULT_NEIGHBOR_CAPACITY: usize = 32;

/// Default number of operator names that can be looked up at once
pub const DEFAULT_OPERATOR_CAPACITY: usize = 16;

/// Default limit for accumulated reply text
pub const DEFAULT_MAX_TEXT_LEN: usize = 1024;

/// Sizing and diagnostics for decoders
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DecoderConfig {
    /// Neighbor cells kept by environment decoders (0 keeps only the serving cell)
    pub neighbor_capacity: usize,
    /// Operators the name cache can hold
    pub operator_capacity: usize,
    /// Maximum characters of reply text a decoder accumulates
    pub max_text_len: usize,
    /// Log every fragment at debug level
    pub enable_debug: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            neighbor_capacity: DEFAULT_NEIGHBOR_CAPACITY,
            operator_capacity: DEFAULT_OPERATOR_CAPACITY,
            max_text_len: DEFAULT_MAX_TEXT_LEN,
            enable_debug: false,
        }
    }
}

impl DecoderConfig {
    /// Set the neighbor cell capacity
    pub fn with_neighbor_capacity(mut self, capacity: usize) -> Self {
        self.neighbor_capacity = capacity;
        self
    }

    /// Set the operator cache capacity
    pub fn with_operator_capacity(mut self, capacity: usize) -> Self {
        self.operator_capacity = capacity;
        self
    }

    /// Set the accumulated text limit
    pub fn with_max_text_len(mut self, max_len: usize) -> Self {
        self.max_text_len = max_len;
        self
    }

    /// Enable or disable fragment logging
    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.enable_debug = enabled;
        self
    }
}
