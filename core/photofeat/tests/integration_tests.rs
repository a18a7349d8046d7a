use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ImageEncoder, RgbImage};
use photofeat::{
    load_image, parse_list, run_batch, FaceBounds, FaceDetector, FeatureExtractor, FeatureRecord,
    ImagePathEntry, RandomPlaceholderScorer,
};
use serde_json::Value;

fn make_test_rgb(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            128,
        ])
    })
}

fn write_jpeg(dir: &Path, name: &str, img: &RgbImage) -> PathBuf {
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, 90)
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();
    let path = dir.join(name);
    std::fs::write(&path, buffer).unwrap();
    path
}

fn write_png(dir: &Path, name: &str, img: &RgbImage) -> PathBuf {
    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();
    let path = dir.join(name);
    std::fs::write(&path, buffer).unwrap();
    path
}

fn seeded_extractor() -> FeatureExtractor {
    FeatureExtractor::new().aesthetic_scorer(Box::new(RandomPlaceholderScorer::seeded(11)))
}

fn run_to_lines(extractor: &FeatureExtractor, entries: &[ImagePathEntry]) -> Vec<String> {
    let mut out = Vec::new();
    run_batch(extractor, entries, &mut out).unwrap();
    String::from_utf8(out)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

fn sorted_keys(line: &str) -> Vec<String> {
    let value: Value = serde_json::from_str(line).unwrap();
    let mut keys: Vec<String> = value.as_object().unwrap().keys().cloned().collect();
    keys.sort();
    keys
}

#[test]
fn valid_jpeg_and_missing_file_give_two_records() {
    let dir = tempfile::tempdir().unwrap();
    let jpeg = write_jpeg(dir.path(), "photo.jpg", &make_test_rgb(320, 240));
    let missing = dir.path().join("missing.jpg");

    let list = format!(
        "{}\tAlbum/photo.jpg\n{}\tAlbum/missing.jpg\n",
        jpeg.display(),
        missing.display()
    );
    let entries = parse_list(list.as_bytes()).unwrap();
    let lines = run_to_lines(&seeded_extractor(), &entries);

    assert_eq!(lines.len(), 2);
    assert_eq!(
        sorted_keys(&lines[0]),
        ["aesthetic", "faces", "horizon_deg", "path", "saliency"]
    );
    assert_eq!(sorted_keys(&lines[1]), ["error", "path"]);

    let first: Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(first["path"], "Album/photo.jpg");
    let second: Value = serde_json::from_str(&lines[1]).unwrap();
    assert_eq!(second["path"], "Album/missing.jpg");
    assert!(second["error"].as_str().unwrap().contains("missing.jpg"));
}

#[test]
fn one_record_per_entry_in_input_order() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_png(dir.path(), "good.png", &make_test_rgb(64, 64));
    let corrupt = dir.path().join("corrupt.jpg");
    std::fs::write(&corrupt, b"\xFF\xD8 truncated").unwrap();

    let entries = vec![
        ImagePathEntry::new(&good, "a"),
        ImagePathEntry::new(&corrupt, "b"),
        ImagePathEntry::new(dir.path().join("nope.png"), "c"),
        ImagePathEntry::new(&good, "d"),
    ];
    let lines = run_to_lines(&seeded_extractor(), &entries);

    let records: Vec<FeatureRecord> = lines
        .iter()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    let paths: Vec<&str> = records.iter().map(FeatureRecord::path).collect();
    assert_eq!(paths, ["a", "b", "c", "d"]);
    let errors: Vec<bool> = records.iter().map(FeatureRecord::is_error).collect();
    assert_eq!(errors, [false, true, true, false]);
}

#[test]
fn summary_matches_written_records() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_png(dir.path(), "good.png", &make_test_rgb(32, 32));
    let entries = vec![
        ImagePathEntry::new(&good, "ok"),
        ImagePathEntry::new(dir.path().join("gone.png"), "gone"),
    ];
    let mut out = Vec::new();
    let summary = run_batch(&FeatureExtractor::bare(), &entries, &mut out).unwrap();
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.succeeded(), 1);
}

#[test]
fn every_line_is_valid_and_in_range() {
    let dir = tempfile::tempdir().unwrap();
    let mut entries = Vec::new();
    for (i, (w, h)) in [(1, 1), (3, 200), (640, 480), (50, 50)].iter().enumerate() {
        let path = write_png(dir.path(), &format!("{i}.png"), &make_test_rgb(*w, *h));
        entries.push(ImagePathEntry::new(path, format!("img/{i}.png")));
    }

    for line in run_to_lines(&seeded_extractor(), &entries) {
        assert!(!line.is_empty());
        match serde_json::from_str::<FeatureRecord>(&line).unwrap() {
            FeatureRecord::Extracted {
                faces,
                saliency,
                aesthetic,
                horizon_deg,
                ..
            } => {
                assert!(faces.is_empty(), "no face model configured");
                if let Some(point) = saliency {
                    assert!((0.0..=1.0).contains(&point.cx), "{line}");
                    assert!((0.0..=1.0).contains(&point.cy), "{line}");
                }
                assert!((0.0..=10.0).contains(&aesthetic), "{line}");
                assert!((-10.0..=10.0).contains(&horizon_deg), "{line}");
            }
            FeatureRecord::Failed { error, .. } => panic!("unexpected failure: {error}"),
        }
    }
}

#[test]
fn blank_white_image_is_level() {
    let dir = tempfile::tempdir().unwrap();
    let white = RgbImage::from_pixel(400, 300, image::Rgb([255, 255, 255]));
    let path = write_png(dir.path(), "white.png", &white);
    let features = seeded_extractor().extract(&path).unwrap();
    assert_eq!(features.horizon_deg, 0.0);
    assert!(features.faces.is_empty());
}

#[test]
fn large_image_is_downscaled_to_max_edge() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_png(dir.path(), "wide.png", &RgbImage::new(4000, 2000));
    let decoded = load_image(&path, 1200).unwrap();
    assert_eq!(decoded.width(), 1200);
    assert_eq!(decoded.height(), 600);
    assert_eq!(decoded.source_dimensions(), (4000, 2000));
}

#[cfg(feature = "saliency")]
#[test]
fn saliency_present_for_textured_image() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_jpeg(dir.path(), "tex.jpg", &make_test_rgb(300, 200));
    let features = seeded_extractor().extract(&path).unwrap();
    let point = features.saliency.expect("saliency point");
    assert!((0.0..=1.0).contains(&point.cx));
    assert!((0.0..=1.0).contains(&point.cy));
}

/// Mock face detector for integration tests.
struct MockDetector {
    faces: Vec<FaceBounds>,
}

impl FaceDetector for MockDetector {
    fn detect(&self, _gray: &[u8], _width: u32, _height: u32) -> Vec<FaceBounds> {
        self.faces.clone()
    }
}

#[test]
fn custom_face_detector_is_normalized() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_png(dir.path(), "face.png", &make_test_rgb(200, 100));
    let extractor = seeded_extractor().face_detector(Box::new(MockDetector {
        faces: vec![FaceBounds {
            x: 50.0,
            y: 25.0,
            width: 20.0,
            height: 30.0,
            confidence: 0.8,
        }],
    }));
    assert!(extractor.capabilities().faces);

    let features = extractor.extract(&path).unwrap();
    assert_eq!(features.faces.len(), 1);
    let face = features.faces[0];
    assert!((face.cx - 0.3).abs() < 1e-9);
    assert!((face.cy - 0.4).abs() < 1e-9);
    assert!((face.w - 0.1).abs() < 1e-9);
    assert!((face.h - 0.3).abs() < 1e-9);
    assert_eq!(face.score, 0.8);
}

struct PanickingDetector;

impl FaceDetector for PanickingDetector {
    fn detect(&self, _gray: &[u8], _width: u32, _height: u32) -> Vec<FaceBounds> {
        panic!("model exploded");
    }
}

#[test]
fn detector_panic_is_isolated_to_its_record() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_png(dir.path(), "a.png", &make_test_rgb(32, 32));
    let extractor = FeatureExtractor::bare().face_detector(Box::new(PanickingDetector));
    let entries = vec![
        ImagePathEntry::new(&path, "first"),
        ImagePathEntry::new(&path, "second"),
    ];
    let lines = run_to_lines(&extractor, &entries);
    assert_eq!(lines.len(), 2);
    for line in &lines {
        let record: FeatureRecord = serde_json::from_str(line).unwrap();
        match record {
            FeatureRecord::Failed { error, .. } => assert!(error.contains("model exploded")),
            other => panic!("expected failure, got {other:?}"),
        }
    }
}

#[cfg(feature = "rustface")]
#[test]
fn unreadable_face_model_leaves_faces_empty() {
    let dir = tempfile::tempdir().unwrap();
    let model = dir.path().join("bogus.bin");
    std::fs::write(&model, b"").unwrap();
    let path = write_png(dir.path(), "a.png", &make_test_rgb(64, 64));

    let extractor = seeded_extractor().face_model(&model);
    assert!(!extractor.capabilities().faces);
    assert!(extractor.extract(&path).unwrap().faces.is_empty());
}
