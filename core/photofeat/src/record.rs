use serde::{Deserialize, Serialize};

/// A detected face in normalized image coordinates (fractions of width/height).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceBox {
    /// Horizontal center, 0..1.
    pub cx: f64,
    /// Vertical center, 0..1.
    pub cy: f64,
    /// Width as a fraction of image width.
    pub w: f64,
    /// Height as a fraction of image height.
    pub h: f64,
    /// Detector confidence.
    pub score: f64,
}

/// Normalized location of the saliency peak.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SaliencyPoint {
    /// Horizontal position, 0..1 from the left edge.
    pub cx: f64,
    /// Vertical position, 0..1 from the top edge.
    pub cy: f64,
}

/// The four features extracted from one image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFeatures {
    /// Detected faces, empty when none were found or detection is unavailable.
    pub faces: Vec<FaceBox>,
    /// Saliency peak, `None` when the map could not be computed.
    pub saliency: Option<SaliencyPoint>,
    /// Aesthetic score in `[0, 10]`.
    pub aesthetic: f64,
    /// Horizon tilt in degrees, within `[-10, 10]`.
    pub horizon_deg: f64,
}

/// One line of output: either the extracted features or the reason extraction failed.
///
/// Serialized without a tag, so the two shapes are
/// `{"path", "faces", "saliency", "aesthetic", "horizon_deg"}` and `{"path", "error"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureRecord {
    /// Features of an image that loaded successfully.
    Extracted {
        /// Output path from the input list.
        path: String,
        /// See [`ImageFeatures::faces`].
        faces: Vec<FaceBox>,
        /// See [`ImageFeatures::saliency`].
        saliency: Option<SaliencyPoint>,
        /// See [`ImageFeatures::aesthetic`].
        aesthetic: f64,
        /// See [`ImageFeatures::horizon_deg`].
        horizon_deg: f64,
    },
    /// An image that could not be processed.
    Failed {
        /// Output path from the input list.
        path: String,
        /// Human-readable reason.
        error: String,
    },
}

impl FeatureRecord {
    /// Record for a successfully processed image.
    pub fn extracted(path: impl Into<String>, features: ImageFeatures) -> Self {
        FeatureRecord::Extracted {
            path: path.into(),
            faces: features.faces,
            saliency: features.saliency,
            aesthetic: features.aesthetic,
            horizon_deg: features.horizon_deg,
        }
    }

    /// Record for an image that failed.
    pub fn failed(path: impl Into<String>, error: impl Into<String>) -> Self {
        FeatureRecord::Failed {
            path: path.into(),
            error: error.into(),
        }
    }

    /// The output path copied from the input list.
    pub fn path(&self) -> &str {
        match self {
            FeatureRecord::Extracted { path, .. } | FeatureRecord::Failed { path, .. } => path,
        }
    }

    /// Whether this is a failure record.
    pub fn is_error(&self) -> bool {
        matches!(self, FeatureRecord::Failed { .. })
    }

    /// Serialize as a single JSON line without the trailing newline.
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
