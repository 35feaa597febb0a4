//! Frame → JPEG → base64.

use base64::{engine::general_purpose::STANDARD, Engine};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use stockscan_core::{EncodedFrame, StockError};
use tracing::debug;

/// Output size and quality of captured frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameEncoding {
    /// Frames wider than this are scaled down to it, aspect preserved.
    pub target_width: u32,
    /// JPEG quality, 1..=100.
    pub jpeg_quality: u8,
}

impl Default for FrameEncoding {
    fn default() -> Self {
        Self {
            target_width: 1280,
            jpeg_quality: 85,
        }
    }
}

/// Output dimensions for a frame. Never upscales.
pub fn target_size(width: u32, height: u32, target_width: u32) -> (u32, u32) {
    if target_width == 0 || width <= target_width {
        return (width, height);
    }
    let scaled = (u64::from(height) * u64::from(target_width) + u64::from(width) / 2)
        / u64::from(width);
    (target_width, scaled.max(1) as u32)
}

/// Encode a frame as base64 JPEG.
pub fn encode_frame(frame: &DynamicImage, encoding: FrameEncoding) -> Result<EncodedFrame, StockError> {
    let (width, height) = frame.dimensions();
    if width == 0 || height == 0 {
        return Err(StockError::Device("captured frame is empty".to_string()));
    }

    let (out_w, out_h) = target_size(width, height, encoding.target_width);
    let rgb = if (out_w, out_h) == (width, height) {
        frame.to_rgb8()
    } else {
        frame.resize_exact(out_w, out_h, FilterType::Triangle).to_rgb8()
    };

    let mut jpeg = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut jpeg, encoding.jpeg_quality.clamp(1, 100));
    rgb.write_with_encoder(encoder)
        .map_err(|e| StockError::Device(format!("JPEG encoding failed: {e}")))?;

    debug!(width = out_w, height = out_h, bytes = jpeg.len(), "Frame encoded");
    Ok(EncodedFrame::jpeg(STANDARD.encode(&jpeg), out_w, out_h))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    #[test]
    fn test_target_size_keeps_aspect() {
        assert_eq!(target_size(1920, 1080, 1280), (1280, 720));
        assert_eq!(target_size(4000, 3000, 1280), (1280, 960));
        assert_eq!(target_size(640, 480, 1280), (640, 480));
        assert_eq!(target_size(5000, 1, 1280), (1280, 1));
    }

    #[test]
    fn test_encode_downscales_and_strips_alpha() {
        let frame = DynamicImage::ImageRgba8(RgbaImage::new(2560, 1440));
        let encoded = encode_frame(&frame, FrameEncoding::default()).unwrap();
        assert_eq!((encoded.width, encoded.height), (1280, 720));
        assert_eq!(encoded.mime_type, "image/jpeg");

        let bytes = STANDARD.decode(&encoded.data_base64).unwrap();
        // JPEG SOI marker.
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_small_frames_are_not_upscaled() {
        let frame = DynamicImage::ImageRgba8(RgbaImage::new(300, 200));
        let encoded = encode_frame(&frame, FrameEncoding::default()).unwrap();
        assert_eq!((encoded.width, encoded.height), (300, 200));
    }
}
