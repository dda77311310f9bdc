//! Image cleanup ahead of OCR.

use image::imageops;
use image::{DynamicImage, GrayImage, Luma};

/// Unsharp mask parameters.
const SHARPEN_SIGMA: f32 = 2.0;
const SHARPEN_THRESHOLD: i32 = 3;

/// Grayscale, 3x3 median filter, then unsharp mask.
pub fn preprocess(image: &DynamicImage) -> GrayImage {
    let gray = image.to_luma8();
    let denoised = median3(&gray);
    imageops::unsharpen(&denoised, SHARPEN_SIGMA, SHARPEN_THRESHOLD)
}

/// 3x3 median with edge pixels clamped.
fn median3(src: &GrayImage) -> GrayImage {
    let (w, h) = src.dimensions();
    GrayImage::from_fn(w, h, |x, y| {
        let mut window = [0u8; 9];
        let mut i = 0;
        for dy in -1i64..=1 {
            for dx in -1i64..=1 {
                let nx = (i64::from(x) + dx).clamp(0, i64::from(w) - 1) as u32;
                let ny = (i64::from(y) + dy).clamp(0, i64::from(h) - 1) as u32;
                window[i] = src.get_pixel(nx, ny).0[0];
                i += 1;
            }
        }
        window.sort_unstable();
        Luma([window[4]])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn median_removes_salt_noise() {
        let mut img = GrayImage::from_pixel(9, 9, Luma([50]));
        img.put_pixel(4, 4, Luma([255]));
        let out = median3(&img);
        assert_eq!(out.get_pixel(4, 4).0[0], 50);
    }

    #[test]
    fn output_is_grayscale_of_same_size() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(20, 10, Rgb([10, 200, 30])));
        let out = preprocess(&img);
        assert_eq!(out.dimensions(), (20, 10));
    }

    #[test]
    fn single_pixel_image() {
        let out = median3(&GrayImage::from_pixel(1, 1, Luma([7])));
        assert_eq!(out.get_pixel(0, 0).0[0], 7);
    }
}
