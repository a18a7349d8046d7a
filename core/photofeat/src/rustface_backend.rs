use std::path::Path;

use tracing::debug;

use crate::error::FeatError;
use crate::face_detector::{FaceBounds, FaceDetector};

/// Smallest face, in pixels, the cascade looks for.
const MIN_FACE_SIZE: u32 = 20;

/// Face detector backed by the `rustface` crate (SeetaFace funnel cascade).
///
/// The model is read once at construction; each call to `detect` builds a
/// fresh detector from a clone of it, so no state leaks between images.
pub struct RustfaceDetector {
    model: rustface::Model,
}

impl RustfaceDetector {
    /// Load a SeetaFace model file (e.g. `seeta_fd_frontal_v1.0.bin`).
    pub fn from_path(path: &Path) -> Result<Self, FeatError> {
        let data = std::fs::read(path).map_err(|source| FeatError::OpenError {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = data.len(), "loaded face model");
        Self::from_bytes(&data)
    }

    /// Load a SeetaFace model from memory.
    pub fn from_bytes(model_data: &[u8]) -> Result<Self, FeatError> {
        let model = rustface::read_model(std::io::Cursor::new(model_data))
            .map_err(|e| FeatError::ModelError(e.to_string()))?;
        Ok(Self { model })
    }
}

impl FaceDetector for RustfaceDetector {
    fn detect(&self, gray: &[u8], width: u32, height: u32) -> Vec<FaceBounds> {
        if width < MIN_FACE_SIZE || height < MIN_FACE_SIZE {
            return Vec::new();
        }

        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(MIN_FACE_SIZE);
        detector.set_score_thresh(2.0);
        // ~1.1 step between pyramid levels
        detector.set_pyramid_scale_factor(0.9);
        detector.set_slide_window_step(4, 4);

        let faces = detector.detect(&rustface::ImageData::new(gray, width, height));

        faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                FaceBounds {
                    x: bbox.x() as f64,
                    y: bbox.y() as f64,
                    width: bbox.width() as f64,
                    height: bbox.height() as f64,
                    confidence: face.score(),
                }
            })
            .collect()
    }
}
