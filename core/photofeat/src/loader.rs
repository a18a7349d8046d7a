use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, ImageError, RgbImage, RgbaImage};

use crate::error::FeatError;

/// Default upper bound for the longer image edge, in pixels.
pub const DEFAULT_MAX_EDGE: u32 = 1200;

/// An RGB image decoded from disk and downscaled for feature extraction.
///
/// Owned by the processing of a single entry; detectors only ever borrow it.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    rgb: RgbImage,
    source_width: u32,
    source_height: u32,
}

impl DecodedImage {
    /// Wrap an already-decoded RGB buffer (no resizing is applied).
    pub fn from_rgb(rgb: RgbImage) -> Self {
        let (source_width, source_height) = rgb.dimensions();
        Self {
            rgb,
            source_width,
            source_height,
        }
    }

    /// Width of the processed buffer in pixels.
    pub fn width(&self) -> u32 {
        self.rgb.width()
    }

    /// Height of the processed buffer in pixels.
    pub fn height(&self) -> u32 {
        self.rgb.height()
    }

    /// Dimensions of the image before downscaling.
    pub fn source_dimensions(&self) -> (u32, u32) {
        (self.source_width, self.source_height)
    }

    /// The RGB pixel buffer.
    pub fn rgb(&self) -> &RgbImage {
        &self.rgb
    }

    /// A freshly computed single-channel luma copy of the buffer.
    pub fn to_gray(&self) -> GrayImage {
        image::imageops::grayscale(&self.rgb)
    }
}

/// Read, decode and downscale the image at `path`.
pub fn load_image(path: &Path, max_edge: u32) -> Result<DecodedImage, FeatError> {
    if max_edge == 0 {
        return Err(FeatError::InvalidMaxEdge);
    }

    let bytes = std::fs::read(path).map_err(|source| FeatError::OpenError {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = decode_image(&bytes)?;

    if decoded.width() == 0 || decoded.height() == 0 {
        return Err(FeatError::ZeroDimensions);
    }

    let (source_width, source_height) = (decoded.width(), decoded.height());
    let resized = downscale_to_fit(decoded, max_edge);

    Ok(DecodedImage {
        rgb: flatten_alpha(&resized),
        source_width,
        source_height,
    })
}

/// Decode input bytes into a `DynamicImage`.
pub(crate) fn decode_image(input: &[u8]) -> Result<DynamicImage, FeatError> {
    image::load_from_memory(input).map_err(|e| match e {
        ImageError::Unsupported(_) => FeatError::UnsupportedFormat,
        other => FeatError::DecodeError(other.to_string()),
    })
}

/// Target dimensions after fitting the longer edge into `max_edge`.
///
/// Never upscales. Dimensions are truncated, not rounded, and never drop below 1.
pub(crate) fn fit_dimensions(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    let longer = width.max(height);
    if longer <= max_edge {
        return (width, height);
    }
    let scale = max_edge as f64 / longer as f64;
    let w = ((width as f64 * scale) as u32).max(1);
    let h = ((height as f64 * scale) as u32).max(1);
    (w, h)
}

/// Shrink the image so its longer edge is at most `max_edge`, keeping the aspect ratio.
pub(crate) fn downscale_to_fit(image: DynamicImage, max_edge: u32) -> DynamicImage {
    let (new_w, new_h) = fit_dimensions(image.width(), image.height(), max_edge);
    if (new_w, new_h) == (image.width(), image.height()) {
        return image;
    }
    image.resize_exact(new_w, new_h, FilterType::CatmullRom)
}

/// Flatten alpha channel by compositing onto a white background.
pub(crate) fn flatten_alpha(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }

    let rgba: RgbaImage = image.to_rgba8();
    let mut rgb = RgbImage::new(rgba.width(), rgba.height());

    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = a as f32 / 255.0;
        let inv_alpha = 1.0 - alpha;
        let out_r = (r as f32 * alpha + 255.0 * inv_alpha).round() as u8;
        let out_g = (g as f32 * alpha + 255.0 * inv_alpha).round() as u8;
        let out_b = (b as f32 * alpha + 255.0 * inv_alpha).round() as u8;
        rgb.put_pixel(x, y, image::Rgb([out_r, out_g, out_b]));
    }

    rgb
}
