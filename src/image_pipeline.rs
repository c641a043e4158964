//! Image processing pipeline module
//!
//! RAW decoding is split into the engine layer (`raw`), the packed-buffer to bitmap
//! conversion (`bitmap`) and the public façade that ties them together (`processor`).

pub mod bitmap;
pub mod common;
pub mod metadata;
pub mod processor;
pub mod raw;

#[cfg(test)]
mod testing;

pub use common::{
    ConversionError,
    DecodeError,
    EngineError,
    Result,
};

pub use bitmap::{
    Bitmap,
    convert_to_image,
};

pub use metadata::Metadata;

pub use processor::{
    OutputBits,
    PipelineTimings,
    Processor,
    ProcessorOptions,
    ProcessorOptionsBuilder,
};

pub use raw::{
    MemImage,
    RawContext,
    RawEngine,
    RawloaderEngine,
};

#[cfg(feature = "libraw")]
pub use raw::LibrawEngine;
