//! Parameters for surface sampling.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters for surface sampling.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SamplingParams {
    /// Total number of points wanted, mesh vertices included.
    /// Default: 1,000,000
    pub target_count: usize,

    /// Seed for the random generator. If None, a thread-local generator is
    /// used and results differ between runs.
    pub seed: Option<u64>,

    /// Whether to sample triangles in parallel. Default: false
    pub parallel: bool,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            target_count: 1_000_000,
            seed: None,
            parallel: false,
        }
    }
}

impl SamplingParams {
    /// Create params targeting a specific point count.
    #[must_use]
    pub fn with_target_count(count: usize) -> Self {
        Self {
            target_count: count,
            ..Default::default()
        }
    }

    /// Create params for reproducible output from a fixed seed.
    #[must_use]
    pub fn reproducible(count: usize, seed: u64) -> Self {
        Self {
            target_count: count,
            seed: Some(seed),
            ..Default::default()
        }
    }

    /// Set the random seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set parallel sampling.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}
