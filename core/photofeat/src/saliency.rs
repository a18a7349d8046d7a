//! Static saliency: where in the frame the eye is drawn first.

use crate::loader::DecodedImage;
use crate::record::SaliencyPoint;

/// Pluggable saliency backend.
pub trait SaliencyDetector: Send + Sync {
    /// Location of the saliency peak, or `None` when it cannot be computed.
    fn peak(&self, image: &DecodedImage) -> Option<SaliencyPoint>;

    /// Whether the backend can run. Unavailable detectors yield no saliency point.
    fn is_available(&self) -> bool {
        true
    }
}

/// Index of the largest finite value, first occurrence wins.
#[cfg_attr(not(feature = "saliency"), allow(dead_code))]
pub(crate) fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        if !v.is_finite() {
            return None;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(feature = "saliency")]
pub use spectral::SpectralResidual;

#[cfg(feature = "saliency")]
mod spectral {
    use image::imageops::FilterType;
    use image::{ImageBuffer, Luma};
    use imageproc::filter::gaussian_blur_f32;
    use rustfft::num_complex::Complex;
    use rustfft::{FftDirection, FftPlanner};

    use super::{argmax, SaliencyDetector};
    use crate::loader::DecodedImage;
    use crate::record::SaliencyPoint;

    type FloatImage = ImageBuffer<Luma<f32>, Vec<f32>>;

    /// Working resolution of the spectrum.
    const SPECTRUM_SIZE: u32 = 64;
    /// Smoothing applied to the reconstructed map.
    const MAP_BLUR_SIGMA: f32 = 3.0;

    /// Spectral-residual saliency (Hou & Zhang, 2007).
    ///
    /// The log-amplitude spectrum of a 64×64 thumbnail minus its local 3×3
    /// average is transformed back with the original phase; the squared
    /// magnitude of the result, blurred and upsampled to the image size, is the
    /// saliency map.
    ///
    /// Amplitudes are taken as `ln(1 + |F|)`, so exactly empty frequency bins
    /// stay finite and do not dominate their 3×3 neighbourhood.
    #[derive(Debug, Default, Clone)]
    pub struct SpectralResidual;

    impl SpectralResidual {
        /// Create the detector. It holds no state.
        pub fn new() -> Self {
            Self
        }

        /// Full-resolution saliency map normalized to 0..1.
        pub fn saliency_map(&self, image: &DecodedImage) -> Option<FloatImage> {
            let (width, height) = (image.width(), image.height());
            if width == 0 || height == 0 {
                return None;
            }

            let gray = image.to_gray();
            let small =
                image::imageops::resize(&gray, SPECTRUM_SIZE, SPECTRUM_SIZE, FilterType::Triangle);
            let n = SPECTRUM_SIZE as usize;

            let mut spectrum: Vec<Complex<f64>> = small
                .pixels()
                .map(|p| Complex::new(p.0[0] as f64 / 255.0, 0.0))
                .collect();
            fft2d(&mut spectrum, n, n, FftDirection::Forward);

            let log_amplitude: Vec<f64> = spectrum
                .iter()
                .map(|c| c.norm().ln_1p())
                .collect();
            let averaged = mean3x3(&log_amplitude, n, n);

            for (i, c) in spectrum.iter_mut().enumerate() {
                let residual = (log_amplitude[i] - averaged[i]).exp();
                *c = Complex::from_polar(residual, c.arg());
            }
            fft2d(&mut spectrum, n, n, FftDirection::Inverse);

            // f32 buffers are clamped to 0..1 by imageops, so scale before filtering.
            let energy: Vec<f64> = spectrum.iter().map(|c| c.norm_sqr()).collect();
            let peak = normalizer(energy.iter().copied())?;
            let energy: FloatImage = ImageBuffer::from_fn(SPECTRUM_SIZE, SPECTRUM_SIZE, |x, y| {
                Luma([(energy[y as usize * n + x as usize] / peak) as f32])
            });

            let blurred = gaussian_blur_f32(&energy, MAP_BLUR_SIGMA);
            let mut map = image::imageops::resize(&blurred, width, height, FilterType::Triangle);

            let peak = normalizer(map.pixels().map(|p| p.0[0] as f64))?;
            for p in map.pixels_mut() {
                p.0[0] = (p.0[0] as f64 / peak) as f32;
            }
            Some(map)
        }
    }

    impl SaliencyDetector for SpectralResidual {
        fn peak(&self, image: &DecodedImage) -> Option<SaliencyPoint> {
            let map = self.saliency_map(image)?;
            let (width, height) = map.dimensions();
            let idx = argmax(map.as_raw())?;
            let (x, y) = (idx % width as usize, idx / width as usize);
            Some(SaliencyPoint {
                cx: x as f64 / width as f64,
                cy: y as f64 / height as f64,
            })
        }
    }

    /// Largest value of a map, when it is finite and positive.
    fn normalizer(values: impl Iterator<Item = f64>) -> Option<f64> {
        let mut max = 0.0f64;
        for v in values {
            if !v.is_finite() {
                return None;
            }
            max = max.max(v);
        }
        (max > 0.0).then_some(max)
    }

    /// In-place 2-D FFT over a row-major `width` × `height` buffer.
    fn fft2d(data: &mut [Complex<f64>], width: usize, height: usize, direction: FftDirection) {
        let mut planner = FftPlanner::<f64>::new();

        let row_fft = planner.plan_fft(width, direction);
        for row in data.chunks_exact_mut(width) {
            row_fft.process(row);
        }

        let col_fft = planner.plan_fft(height, direction);
        let mut column = vec![Complex::new(0.0, 0.0); height];
        for x in 0..width {
            for y in 0..height {
                column[y] = data[y * width + x];
            }
            col_fft.process(&mut column);
            for y in 0..height {
                data[y * width + x] = column[y];
            }
        }
    }

    /// 3×3 box mean with edge replication.
    fn mean3x3(values: &[f64], width: usize, height: usize) -> Vec<f64> {
        let mut out = vec![0.0; values.len()];
        for y in 0..height {
            for x in 0..width {
                let mut sum = 0.0;
                for dy in -1i64..=1 {
                    for dx in -1i64..=1 {
                        let sx = (x as i64 + dx).clamp(0, width as i64 - 1) as usize;
                        let sy = (y as i64 + dy).clamp(0, height as i64 - 1) as usize;
                        sum += values[sy * width + sx];
                    }
                }
                out[y * width + x] = sum / 9.0;
            }
        }
        out
    }

}
