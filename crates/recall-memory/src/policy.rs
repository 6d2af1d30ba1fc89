use recall_core::{RecallError, Result};

/// Constructor-time knobs for admission and eviction. Immutable for the
/// lifetime of a store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressionPolicy {
    /// Eviction runs as soon as the item count exceeds this.
    pub max_memory_items: usize,
    /// Minimum importance for a turn to be admitted.
    pub compression_threshold: f64,
    /// Fraction of items an eviction pass keeps, in (0, 1].
    pub compression_ratio: f64,
    /// Eviction score lost per whole day of age.
    pub age_decay_factor: f64,
    /// Weight of the (capped) access count in the eviction score.
    pub access_frequency_weight: f64,
}

impl Default for CompressionPolicy {
    fn default() -> Self {
        Self {
            max_memory_items: 1000,
            compression_threshold: 0.3,
            compression_ratio: 0.7,
            age_decay_factor: 0.1,
            access_frequency_weight: 0.3,
        }
    }
}

impl CompressionPolicy {
    pub fn with_capacity(max_memory_items: usize) -> Self {
        Self {
            max_memory_items,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_memory_items == 0 {
            return Err(RecallError::invalid("max_memory_items", "must be greater than 0"));
        }
        if !(self.compression_ratio > 0.0 && self.compression_ratio <= 1.0) {
            return Err(RecallError::invalid(
                "compression_ratio",
                format!("{} is outside (0, 1]", self.compression_ratio),
            ));
        }
        if !(0.0..=1.0).contains(&self.compression_threshold) {
            return Err(RecallError::invalid(
                "compression_threshold",
                format!("{} is outside [0, 1]", self.compression_threshold),
            ));
        }
        if !(self.age_decay_factor >= 0.0 && self.age_decay_factor.is_finite()) {
            return Err(RecallError::invalid(
                "age_decay_factor",
                format!("{} must be a non-negative number", self.age_decay_factor),
            ));
        }
        if !(self.access_frequency_weight >= 0.0 && self.access_frequency_weight.is_finite()) {
            return Err(RecallError::invalid(
                "access_frequency_weight",
                format!("{} must be a non-negative number", self.access_frequency_weight),
            ));
        }
        Ok(())
    }

    /// Number of items an eviction pass keeps out of `count`.
    pub fn retained_after_compression(&self, count: usize) -> usize {
        (count as f64 * self.compression_ratio).floor() as usize
    }
}
