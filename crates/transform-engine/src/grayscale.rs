//! Image loading and normalization

use image::imageops::FilterType;
use image::{GrayImage, Luma, RgbImage};
use ndarray::Array2;
use std::path::Path;

/// Load an image from disk as 8-bit grayscale
pub fn load_grayscale(path: &Path) -> Result<GrayImage, image::ImageError> {
    let img = image::open(path)?;
    Ok(to_grayscale(&img.to_rgb8()))
}

/// Convert RGB to grayscale with the BT.601 luma weights
pub fn to_grayscale(rgb: &RgbImage) -> GrayImage {
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let p = rgb.get_pixel(x, y);
        // Luminance formula: 0.299*R + 0.587*G + 0.114*B
        let y = p[0] as f32 * 0.299 + p[1] as f32 * 0.587 + p[2] as f32 * 0.114;
        Luma([y.round().clamp(0.0, 255.0) as u8])
    })
}

/// Resize to a `size`×`size` square with bilinear filtering
pub fn resize_square(gray: &GrayImage, size: u32) -> GrayImage {
    if gray.width() == size && gray.height() == size {
        return gray.clone();
    }
    image::imageops::resize(gray, size, size, FilterType::Triangle)
}

/// Raw intensities (0..255) as a real grid indexed `[row, col]`
pub fn to_grid(gray: &GrayImage) -> Array2<f64> {
    let (width, height) = gray.dimensions();
    Array2::from_shape_fn((height as usize, width as usize), |(row, col)| {
        gray.get_pixel(col as u32, row as u32)[0] as f64
    })
}

/// Load, convert and resize an image into the grid handed to an engine
pub fn prepare(path: &Path, size: u32) -> Result<Array2<f64>, image::ImageError> {
    let gray = load_grayscale(path)?;
    Ok(to_grid(&resize_square(&gray, size)))
}
