//! Image optimization and thumbnails for uploaded files.
//!
//! Works on in-memory bytes so the caller decides where the result goes.
//! All functions are CPU bound; call them from a blocking task.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

use crate::error::CoreError;

/// Widest an optimized image may be.
pub const MAX_WIDTH: u32 = 1920;

/// JPEG quality for optimized uploads.
pub const OPTIMIZE_QUALITY: u8 = 85;

/// Edge length of gallery thumbnails.
pub const THUMBNAIL_SIZE: u32 = 300;

/// JPEG quality for thumbnails.
pub const THUMBNAIL_QUALITY: u8 = 80;

fn decode(bytes: &[u8]) -> Result<DynamicImage, CoreError> {
    image::load_from_memory(bytes)
        .map_err(|e| CoreError::Validation(format!("Unreadable image: {e}")))
}

/// Composite any transparency onto a white background.
pub fn flatten_onto_white(img: &DynamicImage) -> RgbImage {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut out = RgbImage::new(width, height);

    for (x, y, px) in rgba.enumerate_pixels() {
        let [r, g, b, a] = px.0;
        let alpha = u16::from(a);
        let blend = |c: u8| ((u16::from(c) * alpha + 255 * (255 - alpha)) / 255) as u8;
        out.put_pixel(x, y, Rgb([blend(r), blend(g), blend(b)]));
    }
    out
}

fn encode_jpeg(img: &RgbImage, quality: u8) -> Result<Vec<u8>, CoreError> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality)
        .encode_image(img)
        .map_err(|e| CoreError::Internal(format!("JPEG encoding failed: {e}")))?;
    Ok(buf)
}

fn format_for_extension(ext: &str) -> Option<ImageFormat> {
    match ext {
        "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
        "png" => Some(ImageFormat::Png),
        "webp" => Some(ImageFormat::WebP),
        _ => None,
    }
}

/// Flatten, downscale to [`MAX_WIDTH`] and re-encode in the format implied
/// by `ext`. JPEG output uses [`OPTIMIZE_QUALITY`].
pub fn optimize(bytes: &[u8], ext: &str) -> Result<Vec<u8>, CoreError> {
    let format = format_for_extension(ext)
        .ok_or_else(|| CoreError::Validation(format!("Cannot optimize '.{ext}' files")))?;

    let img = decode(bytes)?;
    let mut flat = DynamicImage::ImageRgb8(flatten_onto_white(&img));

    if flat.width() > MAX_WIDTH {
        let ratio = f64::from(MAX_WIDTH) / f64::from(flat.width());
        let height = ((f64::from(flat.height()) * ratio) as u32).max(1);
        flat = flat.resize_exact(MAX_WIDTH, height, FilterType::Lanczos3);
    }

    match format {
        ImageFormat::Jpeg => encode_jpeg(&flat.to_rgb8(), OPTIMIZE_QUALITY),
        other => {
            let mut buf = Cursor::new(Vec::new());
            flat.write_to(&mut buf, other)
                .map_err(|e| CoreError::Internal(format!("Image encoding failed: {e}")))?;
            Ok(buf.into_inner())
        }
    }
}

/// Build a square JPEG thumbnail: fit into the box, centre-crop, then
/// resize to exactly [`THUMBNAIL_SIZE`] on each edge.
pub fn thumbnail(bytes: &[u8]) -> Result<Vec<u8>, CoreError> {
    let img = decode(bytes)?;
    let mut thumb =
        DynamicImage::ImageRgb8(flatten_onto_white(&img)).thumbnail(THUMBNAIL_SIZE, THUMBNAIL_SIZE);

    let (width, height) = (thumb.width(), thumb.height());
    if width != height {
        let side = width.min(height);
        thumb = thumb.crop_imm((width - side) / 2, (height - side) / 2, side, side);
    }
    if thumb.width() != THUMBNAIL_SIZE {
        thumb = thumb.resize_exact(THUMBNAIL_SIZE, THUMBNAIL_SIZE, FilterType::Lanczos3);
    }

    encode_jpeg(&thumb.to_rgb8(), THUMBNAIL_QUALITY)
}

#[cfg(test)]
mod tests {
    use image::{GenericImageView, Rgba, RgbaImage};

    use super::*;

    fn png_bytes(width: u32, height: u32, pixel: Rgba<u8>) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, pixel));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn transparent_pixels_become_white() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0])));
        let flat = flatten_onto_white(&img);
        assert_eq!(flat.get_pixel(0, 0), &Rgb([255, 255, 255]));

        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([10, 20, 30, 255])));
        assert_eq!(flatten_onto_white(&img).get_pixel(0, 0), &Rgb([10, 20, 30]));
    }

    #[test]
    fn optimize_downscales_wide_images() {
        let bytes = png_bytes(2400, 1200, Rgba([200, 100, 50, 255]));
        let out = optimize(&bytes, "jpg").unwrap();
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!(decoded.dimensions(), (1920, 960));
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn optimize_keeps_png_format_and_small_size() {
        let bytes = png_bytes(40, 30, Rgba([1, 2, 3, 128]));
        let out = optimize(&bytes, "png").unwrap();
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Png);
        assert_eq!(image::load_from_memory(&out).unwrap().dimensions(), (40, 30));
    }

    #[test]
    fn optimize_rejects_garbage() {
        assert!(optimize(b"definitely not an image", "jpg").is_err());
        assert!(optimize(&png_bytes(1, 1, Rgba([0, 0, 0, 255])), "gif").is_err());
    }

    #[test]
    fn thumbnail_is_square() {
        let bytes = png_bytes(900, 400, Rgba([0, 128, 255, 255]));
        let thumb = thumbnail(&bytes).unwrap();
        let decoded = image::load_from_memory(&thumb).unwrap();
        assert_eq!(decoded.dimensions(), (THUMBNAIL_SIZE, THUMBNAIL_SIZE));
    }
}
