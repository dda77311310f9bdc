//! Sharpness, contrast and brightness.

use image::{DynamicImage, GrayImage};
use serde::Serialize;

/// Laplacian variance at which sharpness saturates to 1.0.
const SHARPNESS_SCALE: f64 = 1000.0;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QualityReport {
    /// Normalised Laplacian variance, in [0, 1].
    pub sharpness: f64,
    /// Mean luma, in [0, 1].
    pub brightness: f64,
    /// Luma standard deviation, in [0, 1].
    pub contrast: f64,
    /// `0.5 * sharpness + 0.3 * contrast + 0.2 * (1 - |brightness - 0.5|)`.
    pub overall: f64,
    pub good_quality: bool,
}

impl QualityReport {
    pub fn measure(image: &DynamicImage, threshold: f64) -> Self {
        let gray = image.to_luma8();
        let sharpness = (laplacian_variance(&gray) / SHARPNESS_SCALE).min(1.0);
        let (mean, std_dev) = mean_and_std(gray.as_raw().iter().map(|&p| f64::from(p)));
        let brightness = mean / 255.0;
        let contrast = std_dev / 255.0;
        let overall = sharpness * 0.5 + contrast * 0.3 + (1.0 - (brightness - 0.5).abs()) * 0.2;
        Self {
            sharpness,
            brightness,
            contrast,
            overall,
            good_quality: overall > threshold,
        }
    }
}

/// Variance of the absolute response to the 3x3 Laplacian kernel
/// `[-1 -1 -1; -1 8 -1; -1 -1 -1]` over interior pixels.
fn laplacian_variance(gray: &GrayImage) -> f64 {
    let (w, h) = gray.dimensions();
    if w < 3 || h < 3 {
        return 0.0;
    }
    let at = |x: u32, y: u32| f64::from(gray.get_pixel(x, y).0[0]);
    let responses = (1..h - 1).flat_map(|y| {
        (1..w - 1).map(move |x| {
            let mut sum = 8.0 * at(x, y);
            for (dx, dy) in [(-1i32, -1i32), (0, -1), (1, -1), (-1, 0), (1, 0), (-1, 1), (0, 1), (1, 1)] {
                sum -= at((x as i32 + dx) as u32, (y as i32 + dy) as u32);
            }
            sum.abs()
        })
    });
    mean_and_std(responses).1.powi(2)
}

fn mean_and_std(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (mut n, mut sum, mut sum_sq) = (0usize, 0.0, 0.0);
    for v in values {
        n += 1;
        sum += v;
        sum_sq += v * v;
    }
    if n == 0 {
        return (0.0, 0.0);
    }
    let mean = sum / n as f64;
    let variance = (sum_sq / n as f64 - mean * mean).max(0.0);
    (mean, variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{checkerboard, flat};

    #[test]
    fn flat_gray_is_poor_quality() {
        let img = DynamicImage::ImageRgb8(flat(64, 64, [128, 128, 128]));
        let q = QualityReport::measure(&img, 0.4);
        assert_eq!(q.sharpness, 0.0);
        assert_eq!(q.contrast, 0.0);
        assert!(q.overall < 0.21);
        assert!(!q.good_quality);
    }

    #[test]
    fn checkerboard_is_sharp() {
        let img = DynamicImage::ImageRgb8(checkerboard(64, 64, 4));
        let q = QualityReport::measure(&img, 0.4);
        assert_eq!(q.sharpness, 1.0);
        assert!((q.contrast - 0.5).abs() < 0.01);
        assert!((q.brightness - 0.5).abs() < 0.01);
        assert!(q.good_quality);
    }

    #[test]
    fn tiny_images_have_zero_sharpness() {
        let img = DynamicImage::ImageRgb8(checkerboard(2, 2, 1));
        assert_eq!(QualityReport::measure(&img, 0.4).sharpness, 0.0);
    }
}
