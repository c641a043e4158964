//! Decode camera RAW files (NEF, CR2, ARW, DNG, ...) into 8-bit RGBA bitmaps with their
//! capture time.
//!
//! ```no_run
//! use rawbitmap::image_pipeline::{Processor, ProcessorOptions};
//!
//! let processor = Processor::new(ProcessorOptions::default());
//! let (bitmap, metadata) = processor.process_raw("DSC_0001.NEF")?;
//! assert_eq!(bitmap.as_raw().len(), bitmap.width() * bitmap.height() * 4);
//! println!("captured at {:?}", metadata.capture_date_string());
//! # Ok::<(), rawbitmap::image_pipeline::DecodeError>(())
//! ```

pub mod image_pipeline;
pub mod logger;
