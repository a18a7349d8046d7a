use std::any::Any;
use std::io::Write;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::aesthetic::{AestheticScorer, DEFAULT_SCORE};
use crate::error::FeatError;
use crate::face_detector::FaceDetector;
use crate::horizon::HorizonEstimator;
use crate::list::ImagePathEntry;
use crate::loader::{load_image, DecodedImage};
use crate::record::{FeatureRecord, ImageFeatures};
use crate::saliency::SaliencyDetector;
use crate::FeatureExtractor;

/// Counts for a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Records written, successful or not.
    pub processed: usize,
    /// Records written in the `{path, error}` shape.
    pub failed: usize,
}

impl BatchSummary {
    /// Records written in the feature shape.
    pub fn succeeded(&self) -> usize {
        self.processed - self.failed
    }
}

/// Run every available detector over one decoded image.
///
/// Unavailable detectors contribute their neutral value.
pub(crate) fn extract_features(
    image: &DecodedImage,
    faces: Option<&dyn FaceDetector>,
    saliency: Option<&dyn SaliencyDetector>,
    aesthetic: Option<&dyn AestheticScorer>,
    horizon: Option<&dyn HorizonEstimator>,
) -> ImageFeatures {
    let faces = match faces.filter(|d| d.is_available()) {
        Some(detector) => {
            let gray = image.to_gray();
            detector
                .detect(gray.as_raw(), gray.width(), gray.height())
                .iter()
                .map(|bounds| bounds.normalize(image.width(), image.height()))
                .collect()
        }
        None => Vec::new(),
    };

    let saliency = saliency
        .filter(|d| d.is_available())
        .and_then(|d| d.peak(image));

    let aesthetic = aesthetic
        .filter(|s| s.is_available())
        .map_or(DEFAULT_SCORE, |s| s.score(image));

    let horizon_deg = horizon
        .filter(|h| h.is_available())
        .map_or(0.0, |h| h.tilt_degrees(image));

    ImageFeatures {
        faces,
        saliency,
        aesthetic,
        horizon_deg,
    }
}

/// Produce the record for one list entry. Never fails: load errors and
/// detector panics become a `{path, error}` record.
pub fn process_entry(extractor: &FeatureExtractor, entry: &ImagePathEntry) -> FeatureRecord {
    let start = Instant::now();
    let outcome = catch_unwind(AssertUnwindSafe(|| extractor.extract(&entry.local_path)));

    let record = match outcome {
        Ok(Ok(features)) => FeatureRecord::extracted(entry.output_path.as_str(), features),
        Ok(Err(e)) => {
            warn!(path = %entry.local_path.display(), error = %e, "extraction failed");
            FeatureRecord::failed(entry.output_path.as_str(), e.to_string())
        }
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            warn!(path = %entry.local_path.display(), %message, "detector panicked");
            FeatureRecord::failed(
                entry.output_path.as_str(),
                format!("feature extraction panicked: {message}"),
            )
        }
    };

    debug!(
        path = %entry.output_path,
        elapsed_ms = start.elapsed().as_millis() as u64,
        ok = !record.is_error(),
        "processed entry"
    );
    record
}

/// Process `entries` in order, writing one JSON line per entry to `out`.
///
/// Each line is flushed as soon as it is written. Only I/O and serialization
/// failures on `out` abort the batch.
pub fn run_batch<W: Write>(
    extractor: &FeatureExtractor,
    entries: &[ImagePathEntry],
    out: &mut W,
) -> Result<BatchSummary, FeatError> {
    let start = Instant::now();
    let mut summary = BatchSummary::default();

    for entry in entries {
        let record = process_entry(extractor, entry);
        write_record(out, &record)?;

        summary.processed += 1;
        if record.is_error() {
            summary.failed += 1;
        }
    }

    info!(
        processed = summary.processed,
        failed = summary.failed,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "batch complete"
    );
    Ok(summary)
}

/// Append one record as a JSON line.
pub fn write_record<W: Write>(out: &mut W, record: &FeatureRecord) -> Result<(), FeatError> {
    serde_json::to_writer(&mut *out, record)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
