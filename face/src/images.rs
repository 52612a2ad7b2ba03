//! PNG-backed skin image provider
//!
//! Resolves `<id>.png` under an asset directory, decodes to RGBA and scales
//! to the display bounds with nearest-neighbor sampling. No caching here:
//! the engine's two mode slots are the cache.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use mascot_core::{ImageError, ImageId, ImageProvider, RgbaImage};
use tracing::debug;

pub struct PngImageProvider {
    asset_dir: PathBuf,
}

impl PngImageProvider {
    pub fn new(asset_dir: impl Into<PathBuf>) -> Self {
        Self {
            asset_dir: asset_dir.into(),
        }
    }
}

impl ImageProvider for PngImageProvider {
    fn decode_scaled(
        &self,
        id: ImageId,
        width: u32,
        height: u32,
    ) -> Result<Arc<RgbaImage>, ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::InvalidBounds { width, height });
        }

        let path = self.asset_dir.join(format!("{id}.png"));
        if !path.exists() {
            return Err(ImageError::NotFound(id));
        }

        let data = fs::read(&path).map_err(|source| ImageError::Read { id, source })?;
        let decoded = decode_png(id, &data)?;
        debug!(%id, width, height, "decoded skin image");
        Ok(Arc::new(scale_nearest(&decoded, width, height)))
    }
}

/// Decode PNG bytes to straight-alpha RGBA
fn decode_png(id: ImageId, data: &[u8]) -> Result<RgbaImage, ImageError> {
    let decode_err = |reason: String| ImageError::Decode { id, reason };

    let decoder = png::Decoder::new(data);
    let mut reader = decoder
        .read_info()
        .map_err(|e| decode_err(e.to_string()))?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader
        .next_frame(&mut buf)
        .map_err(|e| decode_err(e.to_string()))?;

    let width = info.width;
    let height = info.height;

    let pixels = match info.color_type {
        png::ColorType::Rgba => buf[..info.buffer_size()].to_vec(),
        png::ColorType::Rgb => {
            let rgb = &buf[..info.buffer_size()];
            let mut rgba = Vec::with_capacity((width * height * 4) as usize);
            for chunk in rgb.chunks(3) {
                rgba.extend_from_slice(chunk);
                rgba.push(255);
            }
            rgba
        }
        png::ColorType::GrayscaleAlpha => {
            let ga = &buf[..info.buffer_size()];
            let mut rgba = Vec::with_capacity((width * height * 4) as usize);
            for chunk in ga.chunks(2) {
                let gray = chunk[0];
                let alpha = chunk[1];
                rgba.extend_from_slice(&[gray, gray, gray, alpha]);
            }
            rgba
        }
        png::ColorType::Grayscale => {
            let gray_pixels = &buf[..info.buffer_size()];
            let mut rgba = Vec::with_capacity((width * height * 4) as usize);
            for &gray in gray_pixels {
                rgba.extend_from_slice(&[gray, gray, gray, 255]);
            }
            rgba
        }
        png::ColorType::Indexed => {
            return Err(decode_err("indexed PNG not supported".to_string()));
        }
    };

    Ok(RgbaImage {
        width,
        height,
        pixels,
    })
}

/// Rescale to exactly `width` x `height` with nearest-neighbor sampling
fn scale_nearest(src: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    if src.width == width && src.height == height {
        return src.clone();
    }
    if src.width == 0 || src.height == 0 {
        return RgbaImage {
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
        };
    }

    let mut pixels = vec![0u8; (width * height * 4) as usize];
    for y in 0..height {
        let sy = (y as u64 * src.height as u64 / height as u64) as u32;
        for x in 0..width {
            let sx = (x as u64 * src.width as u64 / width as u64) as u32;
            let s = ((sy * src.width + sx) * 4) as usize;
            let d = ((y * width + x) * 4) as usize;
            pixels[d..d + 4].copy_from_slice(&src.pixels[s..s + 4]);
        }
    }

    RgbaImage {
        width,
        height,
        pixels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> RgbaImage {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..width * height {
            pixels.extend_from_slice(&rgba);
        }
        RgbaImage {
            width,
            height,
            pixels,
        }
    }

    #[test]
    fn test_scale_produces_requested_dimensions() {
        let src = solid(10, 20, [1, 2, 3, 4]);
        let out = scale_nearest(&src, 64, 64);
        assert_eq!((out.width, out.height), (64, 64));
        assert_eq!(out.pixels.len(), 64 * 64 * 4);
        assert_eq!(&out.pixels[..4], &[1, 2, 3, 4]);
    }

    #[test]
    fn test_scale_identity_is_a_copy() {
        let src = solid(8, 8, [9, 9, 9, 255]);
        let out = scale_nearest(&src, 8, 8);
        assert_eq!(out, src);
    }

    #[test]
    fn test_scale_samples_nearest_source_pixel() {
        // Left half red, right half blue
        let mut src = solid(2, 1, [255, 0, 0, 255]);
        src.pixels[4..8].copy_from_slice(&[0, 0, 255, 255]);

        let out = scale_nearest(&src, 4, 2);
        assert_eq!(&out.pixels[0..4], &[255, 0, 0, 255]);
        assert_eq!(&out.pixels[4..8], &[255, 0, 0, 255]);
        assert_eq!(&out.pixels[8..12], &[0, 0, 255, 255]);
        assert_eq!(&out.pixels[12..16], &[0, 0, 255, 255]);
    }

    #[test]
    fn test_decode_normalizes_rgb_to_rgba() {
        // Encode a tiny RGB fixture in memory
        let mut encoded = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut encoded, 2, 1);
            encoder.set_color(png::ColorType::Rgb);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&[10, 20, 30, 40, 50, 60]).unwrap();
        }

        let image = decode_png(ImageId("fixture"), &encoded).unwrap();
        assert_eq!((image.width, image.height), (2, 1));
        assert_eq!(image.pixels, vec![10, 20, 30, 255, 40, 50, 60, 255]);
    }

    #[test]
    fn test_missing_asset_is_not_found() {
        let provider = PngImageProvider::new("/nonexistent-assets");
        let err = provider.decode_scaled(ImageId("mascot1"), 10, 10).unwrap_err();
        assert!(matches!(err, ImageError::NotFound(_)));
    }

    #[test]
    fn test_zero_bounds_rejected() {
        let provider = PngImageProvider::new("/nonexistent-assets");
        let err = provider.decode_scaled(ImageId("mascot1"), 0, 10).unwrap_err();
        assert!(matches!(err, ImageError::InvalidBounds { .. }));
    }
}
