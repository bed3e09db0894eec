//! Decoding and normalizing uploaded photos before they are sent upstream.

use crate::config::{JPEG_QUALITY, MAX_DIMENSION};
use base64::{engine::general_purpose, Engine as _};
use image::{DynamicImage, ImageOutputFormat};
use std::io::Cursor;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ImagingError {
    #[error("data URL has no base64 payload")]
    MissingPayload,

    #[error("invalid base64 image data: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("don't know how to read that image: {0}")]
    Unreadable(image::ImageError),

    #[error("failed to re-encode image: {0}")]
    Encode(image::ImageError),
}

/// Run the full decode -> normalize -> transport-encode pipeline on one
/// uploaded photo.
///
/// Takes the `data:<mime>;base64,<payload>` URL posted by the page and
/// returns a `data:image/jpeg;base64,...` URL holding the normalized image:
/// both dimensions capped at [`MAX_DIMENSION`], aspect ratio preserved,
/// alpha channel flattened away.
pub fn prepare_for_inference(data_url: &str) -> Result<String, ImagingError> {
    let raw = decode_data_url(data_url)?;
    let img = image::load_from_memory(&raw).map_err(ImagingError::Unreadable)?;
    let img = downscale_to_fit(img);

    debug!(
        "normalized upload to {}x{} ({} raw bytes in)",
        img.width(),
        img.height(),
        raw.len()
    );

    // JPEG carries no alpha channel, so flatten everything to RGB first
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());

    let mut jpeg = Vec::new();
    rgb.write_to(
        &mut Cursor::new(&mut jpeg),
        ImageOutputFormat::Jpeg(JPEG_QUALITY),
    )
    .map_err(ImagingError::Encode)?;

    Ok(format!(
        "data:image/jpeg;base64,{}",
        general_purpose::STANDARD.encode(&jpeg)
    ))
}

/// Split a data URL on its first comma and base64-decode the remainder
fn decode_data_url(data_url: &str) -> Result<Vec<u8>, ImagingError> {
    let (_prefix, payload) = data_url
        .split_once(',')
        .ok_or(ImagingError::MissingPayload)?;
    Ok(general_purpose::STANDARD.decode(payload)?)
}

/// Scale an image to fit within `MAX_DIMENSION` on both axes, preserving
/// aspect ratio. Images already within bounds pass through untouched; this
/// never upscales.
fn downscale_to_fit(img: DynamicImage) -> DynamicImage {
    if img.width() <= MAX_DIMENSION && img.height() <= MAX_DIMENSION {
        return img;
    }
    img.thumbnail(MAX_DIMENSION, MAX_DIMENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn png_data_url(img: &DynamicImage) -> String {
        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), ImageOutputFormat::Png)
            .unwrap();
        format!(
            "data:image/png;base64,{}",
            general_purpose::STANDARD.encode(&png)
        )
    }

    fn decode_result(data_url: &str) -> DynamicImage {
        let bytes = decode_data_url(data_url).unwrap();
        image::load_from_memory(&bytes).unwrap()
    }

    #[test]
    fn downsizes_oversized_preserving_aspect() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(2048, 512, Rgb([90, 120, 40])));
        let out = prepare_for_inference(&png_data_url(&img)).unwrap();
        let out = decode_result(&out);
        assert_eq!((out.width(), out.height()), (1024, 256));
    }

    #[test]
    fn downsizes_tall_images_too() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(500, 2000, Rgb([90, 120, 40])));
        let out = decode_result(&prepare_for_inference(&png_data_url(&img)).unwrap());
        assert_eq!((out.width(), out.height()), (256, 1024));
    }

    #[test]
    fn never_upscales_small_images() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(640, 480, Rgb([10, 20, 30])));
        let out = decode_result(&prepare_for_inference(&png_data_url(&img)).unwrap());
        assert_eq!((out.width(), out.height()), (640, 480));
    }

    #[test]
    fn keeps_exact_boundary_dimensions() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(1024, 1024, Rgb([10, 20, 30])));
        let out = decode_result(&prepare_for_inference(&png_data_url(&img)).unwrap());
        assert_eq!((out.width(), out.height()), (1024, 1024));
    }

    #[test]
    fn flattens_alpha_channel() {
        let img =
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(64, 64, Rgba([200, 100, 50, 128])));
        let out = prepare_for_inference(&png_data_url(&img)).unwrap();
        assert!(out.starts_with("data:image/jpeg;base64,"));
        assert!(!decode_result(&out).color().has_alpha());
    }

    #[test]
    fn rejects_non_image_bytes() {
        let url = format!(
            "data:text/plain;base64,{}",
            general_purpose::STANDARD.encode(b"definitely not a raster image")
        );
        let err = prepare_for_inference(&url).unwrap_err();
        assert!(matches!(err, ImagingError::Unreadable(_)));
        assert!(err.to_string().contains("don't know how to read"));
    }

    #[test]
    fn rejects_data_url_without_payload() {
        let err = prepare_for_inference("no comma in sight").unwrap_err();
        assert!(matches!(err, ImagingError::MissingPayload));
    }

    #[test]
    fn rejects_invalid_base64() {
        let err = prepare_for_inference("data:image/png;base64,!!not-base64!!").unwrap_err();
        assert!(matches!(err, ImagingError::Base64(_)));
    }
}
