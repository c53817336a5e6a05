use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    core::{Rgba8, RgbaRaster},
    error::TilegardenResult,
};

/// Outcome of sourcing one sprite's media from a generator or cache.
///
/// Callers must handle every case explicitly; in particular, video media
/// belongs to the encoding pipeline and is not rasterizable by the
/// compositor.
#[derive(Clone, Debug)]
pub enum SpriteMedia {
    /// A rendered video on disk.
    VideoFile(PathBuf),
    /// A still image on disk.
    ImageFile(PathBuf),
    /// Decoded pixels already in memory.
    Buffer(RgbaRaster),
    /// A named built-in stand-in, used when generation produced nothing.
    FallbackSample(String),
}

/// Decode an encoded image (PNG etc.) into a straight-alpha rgba8 raster.
pub fn decode_sprite(bytes: &[u8]) -> TilegardenResult<RgbaRaster> {
    let dyn_img = image::load_from_memory(bytes).context("decode sprite from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    RgbaRaster::from_raw(width, height, rgba.into_raw())
}

/// Read and decode a sprite image from disk.
pub fn load_sprite(path: &Path) -> TilegardenResult<RgbaRaster> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("read sprite '{}'", path.display()))?;
    decode_sprite(&bytes)
}

const SAMPLE_WIDTH: u32 = 48;
const SAMPLE_HEIGHT: u32 = 64;

/// Deterministic stand-in sprite: a small stylized tree whose canopy tint
/// is derived from the sample name. The trunk is the darkest opaque band
/// near the base, so anchor detection lands on it.
pub fn fallback_sample_raster(name: &str) -> TilegardenResult<RgbaRaster> {
    let tint = fnv1a64(name.as_bytes());
    let canopy = Rgba8::new(
        50 + (tint % 40) as u8,
        130 + ((tint >> 8) % 60) as u8,
        40 + ((tint >> 16) % 30) as u8,
        255,
    );
    let trunk = Rgba8::new(70, 50, 35, 255);

    let mut raster = RgbaRaster::new(SAMPLE_WIDTH, SAMPLE_HEIGHT)?;

    // Canopy: filled ellipse around the upper half.
    let (cx, cy, rx, ry) = (24.0f64, 22.0f64, 16.0f64, 14.0f64);
    for y in 0..SAMPLE_HEIGHT {
        for x in 0..SAMPLE_WIDTH {
            let dx = (f64::from(x) - cx) / rx;
            let dy = (f64::from(y) - cy) / ry;
            if dx * dx + dy * dy <= 1.0 {
                raster.put_pixel(x, y, canopy);
            }
        }
    }

    // Trunk: rows 30..60, columns 21..27, leaving transparent padding below.
    for y in 30..60 {
        for x in 21..27 {
            raster.put_pixel(x, y, trunk);
        }
    }

    Ok(raster)
}

fn fnv1a64(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01B3;
    let mut h = OFFSET_BASIS;
    for &b in bytes {
        h ^= u64::from(b);
        h = h.wrapping_mul(PRIME);
    }
    h
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::anchor::detect_anchor;

    #[test]
    fn decode_sprite_keeps_straight_alpha() {
        let src_rgba = vec![100u8, 50u8, 200u8, 128u8];
        let img = image::RgbaImage::from_raw(1, 1, src_rgba.clone()).unwrap();

        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();

        let raster = decode_sprite(&buf).unwrap();
        assert_eq!((raster.width(), raster.height()), (1, 1));
        assert_eq!(raster.data(), src_rgba.as_slice());
    }

    #[test]
    fn decode_sprite_rejects_garbage() {
        assert!(decode_sprite(b"not an image").is_err());
    }

    #[test]
    fn fallback_sample_is_deterministic_and_name_sensitive() {
        let a = fallback_sample_raster("oak").unwrap();
        let b = fallback_sample_raster("oak").unwrap();
        let c = fallback_sample_raster("birch").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn fallback_sample_anchors_on_its_trunk() {
        let sample = fallback_sample_raster("oak").unwrap();
        let anchor = detect_anchor(&sample);
        // Trunk bottom row is 59 in a 64-row raster.
        assert_eq!(anchor.y_padding, 4.0);
        assert_eq!(anchor.content_width, 6.0);
        assert_eq!(anchor.x_offset, (21.0 + 26.0) / 2.0 - 24.0);
    }
}
