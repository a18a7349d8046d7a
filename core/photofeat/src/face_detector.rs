use crate::record::FaceBox;

/// Bounding box of a detected face within an image.
#[derive(Debug, Clone)]
pub struct FaceBounds {
    /// X coordinate of the top-left corner (pixels).
    pub x: f64,
    /// Y coordinate of the top-left corner (pixels).
    pub y: f64,
    /// Width of the bounding box (pixels).
    pub width: f64,
    /// Height of the bounding box (pixels).
    pub height: f64,
    /// Detection confidence score.
    pub confidence: f64,
}

impl FaceBounds {
    /// Convert pixel bounds into center/size fractions of a `width` × `height` image.
    pub fn normalize(&self, width: u32, height: u32) -> FaceBox {
        let (w, h) = (width.max(1) as f64, height.max(1) as f64);
        FaceBox {
            cx: (self.x + self.width / 2.0) / w,
            cy: (self.y + self.height / 2.0) / h,
            w: self.width / w,
            h: self.height / h,
            score: self.confidence,
        }
    }
}

/// Pluggable face detection backend.
///
/// Implement this trait to provide a custom face detector (ONNX, dlib, etc.)
/// and pass it to [`crate::FeatureExtractor::face_detector`].
pub trait FaceDetector: Send + Sync {
    /// Detect faces in a row-major grayscale buffer of `width` × `height` bytes.
    fn detect(&self, gray: &[u8], width: u32, height: u32) -> Vec<FaceBounds>;

    /// Whether the backend can run. Unavailable detectors are skipped and
    /// contribute an empty face list.
    fn is_available(&self) -> bool {
        true
    }
}
