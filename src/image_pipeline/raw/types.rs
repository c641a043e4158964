//! RAW image data types

/// 2x2 Bayer colour filter layouts, named from the top-left photosite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CfaPattern {
    Rggb,
    Bggr,
    Grbg,
    Gbrg,
}

impl CfaPattern {
    /// Matches the colours of a 2x2 cell (0 = red, 1 = green, 2 = blue) in row-major order.
    pub fn from_colors(cell: [usize; 4]) -> Option<Self> {
        match cell {
            [0, 1, 1, 2] => Some(CfaPattern::Rggb),
            [2, 1, 1, 0] => Some(CfaPattern::Bggr),
            [1, 0, 2, 1] => Some(CfaPattern::Grbg),
            [1, 2, 0, 1] => Some(CfaPattern::Gbrg),
            _ => None,
        }
    }

    /// Colour index of the photosite at (`row`, `col`).
    pub fn color_at(self, row: usize, col: usize) -> usize {
        let cell = match self {
            CfaPattern::Rggb => [0, 1, 1, 2],
            CfaPattern::Bggr => [2, 1, 1, 0],
            CfaPattern::Grbg => [1, 0, 2, 1],
            CfaPattern::Gbrg => [1, 2, 0, 1],
        };
        cell[(row % 2) * 2 + col % 2]
    }
}

/// How the sensor samples colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorLayout {
    /// One sample per photosite behind a 2x2 colour filter
    Bayer(CfaPattern),
    /// One sample per photosite behind a larger filter array, such as X-Trans
    Mosaic,
    /// One sample per photosite, no colour filter
    Monochrome,
    /// Three samples per pixel, already demosaiced by the camera
    Linear,
}

/// Geometry and sampling of an unpacked sensor readout, after cropping to the active area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorInfo {
    /// Width of the active area in pixels
    pub width: usize,
    /// Height of the active area in pixels
    pub height: usize,
    pub layout: SensorLayout,
    /// Actual bits per sample from the sensor (e.g., 12, 14, or 16)
    pub bits_per_sample: u32,
}

/// Pixel data copied out of an engine's in-memory image, with its descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawDecodeResult {
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
    pub colors: u32,
    pub bits_per_sample: u32,
    /// Capture time in seconds since the epoch, 0 if unknown
    pub timestamp: i64,
}
