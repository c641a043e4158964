use std::path::PathBuf;

use thiserror::Error;

/// Failure reported by a RAW engine: its native status code plus the message it maps to.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} (code {code})")]
pub struct EngineError {
    pub code: i32,
    pub message: String,
}

impl EngineError {
    // Status codes shared by all engines, numbered as LibRaw numbers them
    pub const UNSPECIFIED: i32 = -1;
    pub const FILE_UNSUPPORTED: i32 = -2;
    pub const OUT_OF_ORDER_CALL: i32 = -4;
    pub const NOT_IMPLEMENTED: i32 = -8;
    pub const INSUFFICIENT_MEMORY: i32 = -100007;
    pub const DATA_ERROR: i32 = -100008;
    pub const IO_ERROR: i32 = -100009;

    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Errors raised while turning a packed pixel buffer into a [`Bitmap`](crate::image_pipeline::Bitmap).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("Pixel buffer size mismatch: got {got} bytes, want {want}")]
    SizeMismatch { got: usize, want: usize },

    #[error("Unsupported bit depth: {0} bits per sample")]
    UnsupportedBitDepth(u32),

    #[error("Unsupported channel count: {0}")]
    UnsupportedChannels(u32),

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Failed to initialize RAW engine: {0}")]
    EngineInit(EngineError),

    #[error("Failed to open {}: {message}", path.display())]
    Open { path: PathBuf, message: EngineError },

    #[error("Failed to unpack sensor data: {0}")]
    Unpack(EngineError),

    #[error("Failed to process RAW image: {0}")]
    Process(EngineError),

    #[error("Failed to export processed image: {0}")]
    Export(EngineError),

    #[error("Failed to convert pixel buffer: {0}")]
    Conversion(#[from] ConversionError),
}

impl DecodeError {
    /// The engine error behind this failure, if it came from the engine.
    pub fn engine_error(&self) -> Option<&EngineError> {
        match self {
            DecodeError::EngineInit(e)
            | DecodeError::Open { message: e, .. }
            | DecodeError::Unpack(e)
            | DecodeError::Process(e)
            | DecodeError::Export(e) => Some(e),
            DecodeError::Conversion(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, DecodeError>;
