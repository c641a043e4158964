//! Processor module
//!
//! The public entry point: configuration, the decode façade and its per-call timings.

mod pipeline;
mod timing;
pub mod types;


pub use pipeline::Processor;
pub use timing::{PipelineTimings, StepTiming};
pub use types::{OutputBits, ProcessorOptions, ProcessorOptionsBuilder};
