//! Aesthetic scoring.
//!
//! Only a placeholder ships today: [`RandomPlaceholderScorer`] draws from
//! N(5, 1) and carries no information about the image. A learned model
//! implements [`AestheticScorer`] and replaces it through
//! [`crate::FeatureExtractor::aesthetic_scorer`].

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};

use crate::loader::DecodedImage;

/// Lowest possible aesthetic score.
pub const MIN_SCORE: f64 = 0.0;
/// Highest possible aesthetic score.
pub const MAX_SCORE: f64 = 10.0;
/// Score reported when no scorer is available.
pub const DEFAULT_SCORE: f64 = 5.0;

/// Pluggable aesthetic scoring backend. Scores must lie in `[0, 10]`.
pub trait AestheticScorer: Send + Sync {
    /// Score `image`; higher is better.
    fn score(&self, image: &DecodedImage) -> f64;

    /// Whether the backend can run. Unavailable scorers yield [`DEFAULT_SCORE`].
    fn is_available(&self) -> bool {
        true
    }
}

/// Stand-in scorer: `clamp(N(5.0, 1.0), 0, 10)`, independent of the image.
pub struct RandomPlaceholderScorer {
    rng: Mutex<StdRng>,
}

impl RandomPlaceholderScorer {
    /// Seeded from the operating system.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Reproducible sequence, for tests and re-runs.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }
}

impl Default for RandomPlaceholderScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl AestheticScorer for RandomPlaceholderScorer {
    fn score(&self, _image: &DecodedImage) -> f64 {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let z: f64 = StandardNormal.sample(&mut *rng);
        (DEFAULT_SCORE + z).clamp(MIN_SCORE, MAX_SCORE)
    }
}

/// Always returns the same score.
#[derive(Debug, Clone, Copy)]
pub struct FixedScorer(pub f64);

impl AestheticScorer for FixedScorer {
    fn score(&self, _image: &DecodedImage) -> f64 {
        self.0.clamp(MIN_SCORE, MAX_SCORE)
    }
}
