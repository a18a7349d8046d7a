//! Per-image heuristic features for photo curation: face boxes, saliency peak,
//! an aesthetic score placeholder and horizon tilt, written as JSON Lines.
//!
//! # Example
//!
//! ```no_run
//! use photofeat::{parse_list, run_batch, FeatureExtractor};
//!
//! let list = std::fs::read_to_string("list.tsv").unwrap();
//! let entries = parse_list(list.as_bytes()).unwrap();
//! let extractor = FeatureExtractor::new()
//!     .max_edge(1200)
//!     .face_model("model/seeta_fd_frontal_v1.0.bin");
//!
//! let mut out = std::fs::File::create("features.jsonl").unwrap();
//! let summary = run_batch(&extractor, &entries, &mut out).unwrap();
//! println!("{} processed, {} failed", summary.processed, summary.failed);
//! ```
#![warn(missing_docs)]

/// Aesthetic scoring trait and the placeholder scorer.
pub mod aesthetic;
mod capability;
mod error;
/// Face detection traits and data types.
pub mod face_detector;
/// Horizon tilt estimation.
pub mod horizon;
mod list;
mod loader;
mod pipeline;
mod record;
#[cfg(feature = "rustface")]
/// Built-in SeetaFace-based face detector backend.
pub mod rustface_backend;
/// Saliency peak detection.
pub mod saliency;

use std::path::Path;

use tracing::warn;

pub use aesthetic::{AestheticScorer, FixedScorer, RandomPlaceholderScorer};
pub use capability::Capabilities;
/// Error type returned by photofeat operations.
pub use error::FeatError;
pub use face_detector::{FaceBounds, FaceDetector};
#[cfg(feature = "horizon")]
pub use horizon::HoughHorizon;
pub use horizon::HorizonEstimator;
pub use list::{parse_list, read_list, ImagePathEntry};
pub use loader::{load_image, DecodedImage, DEFAULT_MAX_EDGE};
pub use pipeline::{process_entry, run_batch, write_record, BatchSummary};
pub use record::{FaceBox, FeatureRecord, ImageFeatures, SaliencyPoint};
#[cfg(feature = "rustface")]
/// Built-in detector that loads a SeetaFace model file.
pub use rustface_backend::RustfaceDetector;
#[cfg(feature = "saliency")]
pub use saliency::SpectralResidual;
pub use saliency::SaliencyDetector;

/// Builder holding the negotiated detector backends.
///
/// [`FeatureExtractor::new`] wires every backend compiled into the crate
/// except face detection, which needs a model file
/// ([`FeatureExtractor::face_model`]) or a custom detector
/// ([`FeatureExtractor::face_detector`]).
pub struct FeatureExtractor {
    max_edge: u32,
    faces: Option<Box<dyn FaceDetector>>,
    saliency: Option<Box<dyn SaliencyDetector>>,
    aesthetic: Option<Box<dyn AestheticScorer>>,
    horizon: Option<Box<dyn HorizonEstimator>>,
}

impl FeatureExtractor {
    /// An extractor with the default backends and a 1200 px maximum edge.
    pub fn new() -> Self {
        Self {
            max_edge: DEFAULT_MAX_EDGE,
            faces: None,
            saliency: Self::default_saliency(),
            aesthetic: Some(Box::new(RandomPlaceholderScorer::new())),
            horizon: Self::default_horizon(),
        }
    }

    /// An extractor with no backends at all; every feature takes its neutral value.
    pub fn bare() -> Self {
        Self {
            max_edge: DEFAULT_MAX_EDGE,
            faces: None,
            saliency: None,
            aesthetic: None,
            horizon: None,
        }
    }

    #[cfg(feature = "saliency")]
    fn default_saliency() -> Option<Box<dyn SaliencyDetector>> {
        Some(Box::new(SpectralResidual::new()))
    }

    #[cfg(not(feature = "saliency"))]
    fn default_saliency() -> Option<Box<dyn SaliencyDetector>> {
        None
    }

    #[cfg(feature = "horizon")]
    fn default_horizon() -> Option<Box<dyn HorizonEstimator>> {
        Some(Box::new(HoughHorizon::new()))
    }

    #[cfg(not(feature = "horizon"))]
    fn default_horizon() -> Option<Box<dyn HorizonEstimator>> {
        None
    }

    /// Set the maximum length of the longer image edge after loading (default: 1200).
    ///
    /// Larger images are downscaled; smaller ones are left alone.
    pub fn max_edge(mut self, max_edge: u32) -> Self {
        self.max_edge = max_edge;
        self
    }

    /// Load the built-in SeetaFace detector from a model file.
    ///
    /// A model that cannot be loaded, or a build without the `rustface`
    /// feature, leaves face detection unavailable and logs a warning.
    pub fn face_model(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        #[cfg(feature = "rustface")]
        {
            match RustfaceDetector::from_path(path) {
                Ok(detector) => self.faces = Some(Box::new(detector)),
                Err(e) => warn!(error = %e, "face detection unavailable"),
            }
        }
        #[cfg(not(feature = "rustface"))]
        {
            warn!(
                path = %path.display(),
                "face detection unavailable: built without the rustface feature"
            );
        }
        self
    }

    /// Provide a custom face detector implementation.
    pub fn face_detector(mut self, detector: Box<dyn FaceDetector>) -> Self {
        self.faces = Some(detector);
        self
    }

    /// Provide a custom saliency detector.
    pub fn saliency_detector(mut self, detector: Box<dyn SaliencyDetector>) -> Self {
        self.saliency = Some(detector);
        self
    }

    /// Replace the aesthetic scorer (the placeholder by default).
    pub fn aesthetic_scorer(mut self, scorer: Box<dyn AestheticScorer>) -> Self {
        self.aesthetic = Some(scorer);
        self
    }

    /// Provide a custom horizon estimator.
    pub fn horizon_estimator(mut self, estimator: Box<dyn HorizonEstimator>) -> Self {
        self.horizon = Some(estimator);
        self
    }

    /// Disable face detection.
    pub fn without_faces(mut self) -> Self {
        self.faces = None;
        self
    }

    /// Disable saliency.
    pub fn without_saliency(mut self) -> Self {
        self.saliency = None;
        self
    }

    /// Disable aesthetic scoring; every image gets 5.0.
    pub fn without_aesthetic(mut self) -> Self {
        self.aesthetic = None;
        self
    }

    /// Disable horizon estimation; every image gets 0.0.
    pub fn without_horizon(mut self) -> Self {
        self.horizon = None;
        self
    }

    /// The configured maximum edge length.
    pub fn max_edge_len(&self) -> u32 {
        self.max_edge
    }

    /// Which backends are present and report themselves available.
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            faces: self.faces.as_deref().is_some_and(|d| d.is_available()),
            saliency: self.saliency.as_deref().is_some_and(|d| d.is_available()),
            aesthetic: self.aesthetic.as_deref().is_some_and(|s| s.is_available()),
            horizon: self.horizon.as_deref().is_some_and(|h| h.is_available()),
        }
    }

    /// Load the image at `path` and extract all features from it.
    pub fn extract(&self, path: &Path) -> Result<ImageFeatures, FeatError> {
        let image = load_image(path, self.max_edge)?;
        Ok(self.extract_decoded(&image))
    }

    /// Extract all features from an already-decoded image.
    pub fn extract_decoded(&self, image: &DecodedImage) -> ImageFeatures {
        pipeline::extract_features(
            image,
            self.faces.as_deref(),
            self.saliency.as_deref(),
            self.aesthetic.as_deref(),
            self.horizon.as_deref(),
        )
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}
