//! Immutable RGBA8 raster.
//!
//! [`Raster`] is the in-memory bitmap shared by the loader, the diff engine
//! and the reporter. Pixels are stored row-major with no padding between
//! rows, so `pixels()[y * width + x]` addresses pixel `(x, y)`.

use std::io::Cursor;

use imgref::ImgVec;
use rgb::RGBA8;

use crate::error::{Error, Result};

/// Decoded bitmap: width x height grid of RGBA8 pixels.
///
/// A raster never changes after construction; the diff engine reads from
/// shared references and always allocates a fresh raster for its output.
#[derive(Clone)]
pub struct Raster {
    img: ImgVec<RGBA8>,
}

impl Raster {
    /// Create a raster from row-major pixels.
    ///
    /// Both dimensions must be non-zero.
    pub fn new(width: usize, height: usize, pixels: Vec<RGBA8>) -> Result<Self> {
        if width == 0 || height == 0 || pixels.len() != width * height {
            return Err(Error::InvalidRaster {
                width,
                height,
                len: pixels.len(),
            });
        }
        Ok(Self {
            img: ImgVec::new(pixels, width, height),
        })
    }

    /// Create a raster from a flat `[r, g, b, a, r, g, b, a, ...]` buffer.
    pub fn from_rgba_bytes(width: usize, height: usize, bytes: &[u8]) -> Result<Self> {
        if width == 0 || height == 0 || bytes.len() != width * height * 4 {
            return Err(Error::InvalidRaster {
                width,
                height,
                len: bytes.len() / 4,
            });
        }
        let pixels = bytes
            .chunks_exact(4)
            .map(|c| RGBA8::new(c[0], c[1], c[2], c[3]))
            .collect();
        Self::new(width, height, pixels)
    }

    /// Create a raster with every pixel set to `pixel`.
    pub fn filled(width: usize, height: usize, pixel: RGBA8) -> Result<Self> {
        Self::new(width, height, vec![pixel; width * height])
    }

    /// Wrap pixels the engine has already sized correctly.
    pub(crate) fn from_parts(width: usize, height: usize, pixels: Vec<RGBA8>) -> Self {
        debug_assert_eq!(pixels.len(), width * height);
        Self {
            img: ImgVec::new(pixels, width, height),
        }
    }

    /// Image width.
    #[must_use]
    pub fn width(&self) -> usize {
        self.img.width()
    }

    /// Image height.
    #[must_use]
    pub fn height(&self) -> usize {
        self.img.height()
    }

    /// `(width, height)` pair.
    #[must_use]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    /// Total number of pixels.
    #[must_use]
    pub fn pixel_count(&self) -> usize {
        self.width() * self.height()
    }

    /// Row-major pixel buffer.
    #[must_use]
    pub fn pixels(&self) -> &[RGBA8] {
        self.img.buf()
    }

    /// One row of pixels.
    #[must_use]
    pub fn row(&self, y: usize) -> &[RGBA8] {
        let w = self.width();
        &self.img.buf()[y * w..(y + 1) * w]
    }

    /// Pixel at `(x, y)`, or `None` outside the raster bounds.
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> Option<RGBA8> {
        if x < self.width() && y < self.height() {
            Some(self.img.buf()[y * self.width() + x])
        } else {
            None
        }
    }

    /// Flatten to `[r, g, b, a, ...]` bytes.
    #[must_use]
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.img
            .pixels()
            .flat_map(|p| [p.r, p.g, p.b, p.a])
            .collect()
    }

    /// Encode as PNG bytes.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let width = u32::try_from(self.width())
            .map_err(|_| Error::Encode(format!("width {} exceeds u32", self.width())))?;
        let height = u32::try_from(self.height())
            .map_err(|_| Error::Encode(format!("height {} exceeds u32", self.height())))?;

        let buffer = image::RgbaImage::from_raw(width, height, self.to_rgba_bytes())
            .ok_or_else(|| Error::Encode("pixel buffer does not match dimensions".to_string()))?;

        let mut out = Cursor::new(Vec::new());
        buffer
            .write_to(&mut out, image::ImageFormat::Png)
            .map_err(|e| Error::Encode(e.to_string()))?;
        Ok(out.into_inner())
    }
}

impl PartialEq for Raster {
    fn eq(&self, other: &Self) -> bool {
        self.dimensions() == other.dimensions() && self.pixels() == other.pixels()
    }
}

impl Eq for Raster {}

impl std::fmt::Debug for Raster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_wrong_length() {
        let err = Raster::new(2, 2, vec![RGBA8::new(0, 0, 0, 255); 3]).unwrap_err();
        assert!(matches!(err, Error::InvalidRaster { width: 2, height: 2, len: 3 }));
    }

    #[test]
    fn test_new_rejects_empty() {
        assert!(Raster::new(0, 0, Vec::new()).is_err());
        assert!(Raster::filled(0, 5, RGBA8::new(0, 0, 0, 0)).is_err());
    }

    #[test]
    fn test_from_rgba_bytes() {
        let raster = Raster::from_rgba_bytes(2, 1, &[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        assert_eq!(raster.dimensions(), (2, 1));
        assert_eq!(raster.pixel(1, 0), Some(RGBA8::new(5, 6, 7, 8)));
        assert_eq!(raster.pixel(2, 0), None);
        assert_eq!(raster.to_rgba_bytes(), vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_row_access() {
        let pixels: Vec<RGBA8> = (0..6).map(|i| RGBA8::new(i, 0, 0, 255)).collect();
        let raster = Raster::new(3, 2, pixels).unwrap();
        assert_eq!(raster.row(1)[0].r, 3);
        assert_eq!(raster.row(1).len(), 3);
    }

    #[test]
    fn test_png_encode_decodes_back() {
        let raster = Raster::filled(4, 3, RGBA8::new(10, 20, 30, 255)).unwrap();
        let png = raster.to_png().unwrap();
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));

        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (4, 3));
        assert_eq!(decoded.get_pixel(2, 1).0, [10, 20, 30, 255]);
    }
}
