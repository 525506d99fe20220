//! Routing configuration.

/// Configuration parameters for route computation.
#[derive(Debug, Clone)]
pub struct RoutingConfig {
    /// Maximum number of alternative routes offered besides the best one.
    pub max_alternatives: usize,

    /// Number of settled stations reported per progress batch.
    /// Smaller batches give a smoother live overlay at the cost of more messages.
    pub progress_batch_size: usize,
}

impl RoutingConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(max_alternatives: usize, progress_batch_size: usize) -> Self {
        Self {
            max_alternatives,
            progress_batch_size,
        }
    }

    /// Progress batch size, never zero.
    pub fn batch_size(&self) -> usize {
        self.progress_batch_size.max(1)
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            max_alternatives: 3,
            progress_batch_size: 64,
        }
    }
}
