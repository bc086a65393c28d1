// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory image codecs used by the analysis pipeline. Nothing here touches
// the filesystem: every encode/decode goes through a `Vec<u8>` owned by the
// caller's stack frame, so concurrent analyses never share a buffer.

use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, RgbImage};
use pruefwerk_core::error::{ForensicsError, Result};
use tracing::{debug, instrument};

/// Fail with `InvalidImage` if either dimension is zero.
pub fn ensure_non_empty(image: &RgbImage) -> Result<()> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(ForensicsError::InvalidImage { width, height });
    }
    Ok(())
}

/// Decode encoded bytes (JPEG, PNG, etc.) into 8-bit RGB.
#[instrument(skip(data), fields(data_len = data.len()))]
pub fn decode_rgb(data: &[u8]) -> Result<RgbImage> {
    let img = image::load_from_memory(data)
        .map_err(|err| ForensicsError::ImageError(format!("failed to decode image: {}", err)))?;
    debug!(
        width = img.width(),
        height = img.height(),
        "Image decoded from bytes"
    );
    Ok(img.to_rgb8())
}

/// Encode an RGB image as JPEG bytes with the given quality (1-100).
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    image
        .write_with_encoder(encoder)
        .map_err(|err| ForensicsError::ImageError(format!("JPEG encoding failed: {}", err)))?;
    Ok(buffer)
}

/// Encode an RGB image as PNG bytes.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    image
        .write_to(&mut cursor, ImageFormat::Png)
        .map_err(|err| ForensicsError::ImageError(format!("PNG encoding failed: {}", err)))?;
    Ok(buffer)
}

/// Save-and-reload an image through JPEG at `quality`, entirely in memory.
#[instrument(skip(image), fields(width = image.width(), height = image.height(), quality))]
pub fn jpeg_round_trip(image: &RgbImage, quality: u8) -> Result<RgbImage> {
    let encoded = encode_jpeg(image, quality)?;
    let decoded = image::load_from_memory_with_format(&encoded, ImageFormat::Jpeg)
        .map_err(|err| ForensicsError::ImageError(format!("JPEG decoding failed: {}", err)))?;
    debug!(encoded_bytes = encoded.len(), "JPEG round trip complete");
    Ok(decoded.to_rgb8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn empty_image_is_invalid() {
        let err = ensure_non_empty(&RgbImage::new(0, 12)).unwrap_err();
        assert!(matches!(
            err,
            ForensicsError::InvalidImage {
                width: 0,
                height: 12
            }
        ));
    }

    #[test]
    fn jpeg_round_trip_preserves_dimensions() {
        let img = RgbImage::from_pixel(37, 23, Rgb([120, 80, 200]));
        let out = jpeg_round_trip(&img, 90).unwrap();
        assert_eq!(out.dimensions(), (37, 23));
    }

    #[test]
    fn png_bytes_decode_back_losslessly() {
        let mut img = RgbImage::from_pixel(8, 8, Rgb([10, 20, 30]));
        img.put_pixel(3, 4, Rgb([250, 0, 7]));
        let decoded = decode_rgb(&encode_png(&img).unwrap()).unwrap();
        assert_eq!(decoded, img);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(matches!(
            decode_rgb(b"definitely not an image"),
            Err(ForensicsError::ImageError(_))
        ));
    }
}
