//! Bitmap types

/// Samples per pixel of every [`Bitmap`]: R, G, B, A
pub const CHANNELS: usize = 4;

/// 8-bit RGBA raster, rows stored top to bottom with no padding.
///
/// `data.len() == width * height * 4` holds for every bitmap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl Bitmap {
    /// Wraps an existing RGBA buffer, returning `None` if its length does not match the dimensions.
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Option<Self> {
        let want = width.checked_mul(height)?.checked_mul(CHANNELS)?;
        (data.len() == want).then_some(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// RGBA values of the pixel at (`x`, `y`), or `None` outside the bitmap.
    pub fn pixel(&self, x: usize, y: usize) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = (y * self.width + x) * CHANNELS;
        self.data.get(start..start + CHANNELS)
    }

    /// Converts into an [`image::RgbaImage`] without copying.
    ///
    /// Returns `None` only if the dimensions do not fit in `u32`.
    pub fn into_rgba_image(self) -> Option<image::RgbaImage> {
        let width = u32::try_from(self.width).ok()?;
        let height = u32::try_from(self.height).ok()?;
        image::RgbaImage::from_raw(width, height, self.data)
    }
}
