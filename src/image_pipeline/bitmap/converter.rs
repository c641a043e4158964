//! Packed pixel buffer to [`Bitmap`] conversion.
//!
//! Engines hand back interleaved samples with no row padding, either one byte per sample
//! or two little-endian bytes per sample for deeper output. Everything is normalized to
//! 8-bit RGBA with an opaque alpha channel.

use tracing::debug;

use crate::image_pipeline::bitmap::types::Bitmap;
use crate::image_pipeline::common::error::ConversionError;

/// Deepest sample size the converter accepts; deeper samples do not fit in two bytes.
const MAX_BITS_PER_SAMPLE: u32 = 16;

/// Converts packed 8- or 16-bit RGB samples into an 8-bit RGBA [`Bitmap`].
///
/// For samples deeper than 8 bits the high-order bits are kept: each little-endian sample
/// is shifted right by `bits_per_sample - 8`.
///
/// # Errors
///
/// * [`ConversionError::InvalidDimensions`] if either dimension is zero
/// * [`ConversionError::UnsupportedBitDepth`] outside `8..=16`
/// * [`ConversionError::SizeMismatch`] if `bytes` is not exactly `width * height * 3` samples
pub fn convert_to_image(
    bytes: &[u8],
    width: usize,
    height: usize,
    bits_per_sample: u32,
) -> Result<Bitmap, ConversionError> {
    convert_samples(bytes, width, height, 3, bits_per_sample)
}

/// Same as [`convert_to_image`] for any engine colour count; single-channel output is
/// replicated into R, G and B.
pub(crate) fn convert_samples(
    bytes: &[u8],
    width: usize,
    height: usize,
    colors: u32,
    bits_per_sample: u32,
) -> Result<Bitmap, ConversionError> {
    if width == 0 || height == 0 {
        return Err(ConversionError::InvalidDimensions(width, height));
    }
    if !matches!(colors, 1 | 3) {
        return Err(ConversionError::UnsupportedChannels(colors));
    }
    if !(8..=MAX_BITS_PER_SAMPLE).contains(&bits_per_sample) {
        return Err(ConversionError::UnsupportedBitDepth(bits_per_sample));
    }

    let bytes_per_sample = if bits_per_sample == 8 { 1 } else { 2 };
    let want = width
        .checked_mul(height)
        .and_then(|px| px.checked_mul(colors as usize))
        .and_then(|samples| samples.checked_mul(bytes_per_sample))
        .ok_or(ConversionError::InvalidDimensions(width, height))?;
    if bytes.len() != want {
        return Err(ConversionError::SizeMismatch {
            got: bytes.len(),
            want,
        });
    }

    debug!(
        "Converting {}x{} buffer: {} colors, {} bits per sample",
        width, height, colors, bits_per_sample
    );

    let data = if bytes_per_sample == 1 {
        expand_to_rgba(bytes, colors)
    } else {
        expand_to_rgba(&downsample_to_8bit(bytes, bits_per_sample), colors)
    };

    Bitmap::from_raw(width, height, data)
        .ok_or(ConversionError::InvalidDimensions(width, height))
}

/// Keeps the top 8 significant bits of every little-endian sample.
///
/// The output holds exactly `bytes.len() / 2` bytes; callers guarantee an even length.
fn downsample_to_8bit(bytes: &[u8], bits_per_sample: u32) -> Vec<u8> {
    let shift = bits_per_sample - 8;
    bytes
        .chunks_exact(2)
        .map(|sample| {
            let value = u16::from_le_bytes([sample[0], sample[1]]) >> shift;
            // Samples wider than the declared depth would otherwise wrap around
            value.min(u8::MAX as u16) as u8
        })
        .collect()
}

fn expand_to_rgba(samples: &[u8], colors: u32) -> Vec<u8> {
    if colors == 1 {
        samples.iter().flat_map(|&v| [v, v, v, u8::MAX]).collect()
    } else {
        samples
            .chunks_exact(3)
            .flat_map(|px| [px[0], px[1], px[2], u8::MAX])
            .collect()
    }
}
