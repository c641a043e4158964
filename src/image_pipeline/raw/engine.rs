//! Contract between the decode session and a RAW decoding engine.
//!
//! An engine hands out one [`RawContext`] per decode. Dropping the context releases
//! everything the engine allocated for it, and the in-memory image borrows the context,
//! so it is always released first.

use std::path::Path;

use crate::image_pipeline::common::error::EngineError;
use crate::image_pipeline::processor::ProcessorOptions;

/// Factory for per-decode engine contexts.
///
/// Implementations must be shareable across threads; all per-decode state lives in the context.
pub trait RawEngine: Send + Sync {
    type Context: RawContext;

    /// Allocates a fresh context configured from `options`.
    fn init(&self, options: &ProcessorOptions) -> Result<Self::Context, EngineError>;
}

/// One engine processing state, released on drop.
pub trait RawContext {
    type Image<'a>: MemImage
    where
        Self: 'a;

    /// Opens and identifies the file at `path`.
    fn open_file(&mut self, path: &Path) -> Result<(), EngineError>;

    /// Unpacks the sensor readout into the context.
    fn unpack(&mut self) -> Result<(), EngineError>;

    /// Runs the processing pipeline (demosaic, white balance, output colour space).
    fn process(&mut self) -> Result<(), EngineError>;

    /// Exports the processed image into engine-owned memory.
    fn make_mem_image(&self) -> Result<Self::Image<'_>, EngineError>;

    /// Capture time in seconds since the epoch, 0 if unknown.
    fn timestamp(&self) -> i64;
}

/// Engine-owned output image, released on drop.
pub trait MemImage {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    /// Samples per pixel, 3 for RGB output.
    fn colors(&self) -> u32;
    fn bits(&self) -> u32;
    /// Packed samples; 16-bit samples are little-endian.
    fn data(&self) -> &[u8];

    fn data_size(&self) -> usize {
        self.data().len()
    }
}
