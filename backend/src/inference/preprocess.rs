use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use ndarray::Array4;

#[derive(Debug, thiserror::Error)]
pub enum PreprocessError {
    #[error("{0}")]
    Decode(String),
    #[error("unexpected pixel buffer size: got {got}, want {want}")]
    BufferSize { got: usize, want: usize },
}

/// Turns raw uploaded bytes into the normalized (1, H, W, 3) tensor the model
/// consumes. The decode/resize/normalize steps are kept as separate methods so
/// the underlying image crate stays swappable without touching the service.
pub struct Preprocessor {
    width: u32,
    height: u32,
}

impl Preprocessor {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn preprocess(&self, bytes: &[u8]) -> Result<Array4<f32>, PreprocessError> {
        let image = self.decode(bytes)?;
        let resized = self.resize(&image);
        self.normalize(&resized)
    }

    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, PreprocessError> {
        image::load_from_memory(bytes).map_err(|e| PreprocessError::Decode(e.to_string()))
    }

    /// Bilinear resize to the target resolution, dropping any alpha channel.
    fn resize(&self, image: &DynamicImage) -> RgbImage {
        image
            .resize_exact(self.width, self.height, FilterType::Triangle)
            .to_rgb8()
    }

    /// Row-major channel-last pixels, cast to f32 and scaled into [0, 1],
    /// with a leading batch dimension of 1.
    fn normalize(&self, image: &RgbImage) -> Result<Array4<f32>, PreprocessError> {
        let (height, width) = (self.height as usize, self.width as usize);
        let want = height * width * 3;
        let raw = image.as_raw();
        if raw.len() != want {
            return Err(PreprocessError::BufferSize {
                got: raw.len(),
                want,
            });
        }

        let pixels: Vec<f32> = raw.iter().map(|&p| f32::from(p) / 255.0).collect();
        Array4::from_shape_vec((1, height, width, 3), pixels).map_err(|_| {
            PreprocessError::BufferSize {
                got: raw.len(),
                want,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encoded_image(width: u32, height: u32, format: image::ImageFormat) -> Vec<u8> {
        let img = image::RgbaImage::from_fn(width, height, |x, y| {
            image::Rgba([(x % 256) as u8, (y % 256) as u8, 128, 200])
        });
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), format)
            .unwrap();
        buf
    }

    #[test]
    fn png_preprocesses_to_expected_shape_and_range() {
        let pre = Preprocessor::new(224, 224);
        let tensor = pre
            .preprocess(&encoded_image(640, 480, image::ImageFormat::Png))
            .unwrap();
        assert_eq!(tensor.shape(), &[1, 224, 224, 3]);
        assert!(tensor.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn small_image_is_upscaled() {
        let pre = Preprocessor::new(224, 224);
        let tensor = pre
            .preprocess(&encoded_image(16, 16, image::ImageFormat::Png))
            .unwrap();
        assert_eq!(tensor.shape(), &[1, 224, 224, 3]);
    }

    #[test]
    fn alpha_channel_is_dropped() {
        // Input is RGBA; output must have exactly three channels regardless.
        let pre = Preprocessor::new(224, 224);
        let tensor = pre
            .preprocess(&encoded_image(32, 32, image::ImageFormat::Png))
            .unwrap();
        assert_eq!(tensor.shape()[3], 3);
    }

    #[test]
    fn garbage_bytes_fail_with_decode_error() {
        let pre = Preprocessor::new(224, 224);
        let err = pre.preprocess(b"this is definitely not an image").unwrap_err();
        assert!(matches!(err, PreprocessError::Decode(_)));
    }

    #[test]
    fn empty_input_fails_with_decode_error() {
        let pre = Preprocessor::new(224, 224);
        assert!(matches!(
            pre.preprocess(&[]).unwrap_err(),
            PreprocessError::Decode(_)
        ));
    }
}
