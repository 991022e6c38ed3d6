// src/capture/encode.rs — Frame -> fixed-size JPEG -> data URL

use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;

use crate::infra::config::CaptureConfig;
use crate::infra::errors::MoodChatError;

/// Scales frames to the capture size and encodes them for `/detect_emotion`.
#[derive(Debug, Clone, Copy)]
pub struct FrameEncoder {
    pub width: u32,
    pub height: u32,
    pub quality: u8,
}

impl FrameEncoder {
    pub fn from_config(config: &CaptureConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            quality: config.jpeg_quality,
        }
    }

    /// JPEG bytes of `frame` stretched to exactly `width x height`.
    pub fn encode_jpeg(&self, frame: &DynamicImage) -> Result<Vec<u8>, MoodChatError> {
        let scaled = if frame.width() == self.width && frame.height() == self.height {
            frame.to_rgb8()
        } else {
            frame
                .resize_exact(self.width, self.height, FilterType::Triangle)
                .to_rgb8()
        };

        let mut buf = Vec::new();
        JpegEncoder::new_with_quality(&mut buf, self.quality.clamp(1, 100))
            .encode_image(&scaled)
            .map_err(|e| MoodChatError::Encode(format!("JPEG encode: {e}")))?;
        Ok(buf)
    }

    pub fn encode(&self, frame: &DynamicImage) -> Result<String, MoodChatError> {
        let jpeg = self.encode_jpeg(frame)?;
        Ok(encode_data_url("image/jpeg", &jpeg))
    }
}

pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    let b64 = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{mime};base64,{b64}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn solid(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([200, 120, 40])))
    }

    #[test]
    fn test_output_has_fixed_size() {
        let enc = FrameEncoder {
            width: 64,
            height: 48,
            quality: 80,
        };
        let jpeg = enc.encode_jpeg(&solid(300, 100)).unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 48));
    }

    #[test]
    fn test_data_url_prefix_and_payload() {
        let enc = FrameEncoder {
            width: 8,
            height: 8,
            quality: 90,
        };
        let url = enc.encode(&solid(8, 8)).unwrap();
        let payload = url.strip_prefix("data:image/jpeg;base64,").unwrap();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .unwrap();
        // JPEG SOI marker
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }
}
