//! Horizon tilt estimation from long straight lines.

use crate::loader::DecodedImage;

/// Bound on the reported tilt, in degrees.
pub const MAX_TILT_DEG: f64 = 10.0;

/// Lines whose normal is within this many degrees of 0° or 180° qualify.
const QUALIFYING_BAND_DEG: f64 = 15.0;

/// Pluggable horizon estimation backend. Results must lie in `[-10, 10]`.
pub trait HorizonEstimator: Send + Sync {
    /// Tilt of the dominant near-vertical line structure, in degrees.
    fn tilt_degrees(&self, image: &DecodedImage) -> f64;

    /// Whether the backend can run. Unavailable estimators yield `0.0`.
    fn is_available(&self) -> bool {
        true
    }
}

/// Reduce Hough line normal angles (degrees, `[0, 180)`) to a tilt in `[-10, 10]`.
///
/// Angles within 15° of 0° or 180° are folded into a deviation (`a` below 90°,
/// `180 - a` otherwise), the deviations are averaged, and the mean is folded a
/// second time (`mean - 180` above 90°) before clamping. Since every deviation
/// is already below 15°, the second fold never fires and the result lies in
/// `[0, 10]`.
pub fn tilt_from_normal_angles(angles_deg: &[f64]) -> f64 {
    let deviations: Vec<f64> = angles_deg
        .iter()
        .copied()
        .filter(|a| a.abs().min((a - 180.0).abs()) < QUALIFYING_BAND_DEG)
        .map(|a| if a < 90.0 { a } else { 180.0 - a })
        .collect();

    if deviations.is_empty() {
        return 0.0;
    }

    let mean = deviations.iter().sum::<f64>() / deviations.len() as f64;
    let folded = if mean <= 90.0 { mean } else { mean - 180.0 };
    folded.clamp(-MAX_TILT_DEG, MAX_TILT_DEG)
}

#[cfg(feature = "horizon")]
pub use hough::HoughHorizon;

#[cfg(feature = "horizon")]
mod hough {
    use imageproc::edges::canny;
    use imageproc::hough::{detect_lines, LineDetectionOptions};
    use tracing::trace;

    use super::{tilt_from_normal_angles, HorizonEstimator};
    use crate::loader::DecodedImage;

    /// Edge/line pipeline parameters.
    ///
    /// `canny` smooths with its own Gaussian (sigma 1.4) before taking
    /// gradients, so the gray image goes in unblurred.
    #[derive(Debug, Clone, Copy)]
    pub struct HoughHorizon {
        /// Lower hysteresis threshold for edge pixels.
        pub canny_low: f32,
        /// Upper hysteresis threshold for edge pixels.
        pub canny_high: f32,
        /// Minimum accumulator votes for a line.
        pub vote_threshold: u32,
        /// Non-maximum suppression radius in the (r, θ) accumulator.
        pub suppression_radius: u32,
    }

    impl Default for HoughHorizon {
        fn default() -> Self {
            Self {
                canny_low: 50.0,
                canny_high: 150.0,
                vote_threshold: 160,
                suppression_radius: 1,
            }
        }
    }

    impl HoughHorizon {
        /// Estimator with the default thresholds.
        pub fn new() -> Self {
            Self::default()
        }

        /// Normal angles, in whole degrees, of every detected line.
        pub fn line_angles(&self, image: &DecodedImage) -> Vec<f64> {
            // canny needs a 3×3 neighbourhood
            if image.width() < 3 || image.height() < 3 {
                return Vec::new();
            }
            let edges = canny(&image.to_gray(), self.canny_low, self.canny_high);
            let lines = detect_lines(
                &edges,
                LineDetectionOptions {
                    vote_threshold: self.vote_threshold,
                    suppression_radius: self.suppression_radius,
                },
            );
            trace!(lines = lines.len(), "hough lines");
            lines
                .iter()
                .map(|line| line.angle_in_degrees as f64)
                .collect()
        }
    }

    impl HorizonEstimator for HoughHorizon {
        fn tilt_degrees(&self, image: &DecodedImage) -> f64 {
            tilt_from_normal_angles(&self.line_angles(image))
        }
    }

}
