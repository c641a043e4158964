//! RAW image reading module
//!
//! Engine abstraction, the engines themselves and the session that drives them.

mod capture_time;
mod engine;
#[cfg(feature = "libraw")]
mod libraw_engine;
mod rawloader_engine;
mod session;
pub mod types;

pub use engine::{MemImage, RawContext, RawEngine};
#[cfg(feature = "libraw")]
pub use libraw_engine::LibrawEngine;
pub use rawloader_engine::{RawloaderContext, RawloaderEngine};
pub(crate) use session::DecodeSession;
pub use types::{CfaPattern, SensorInfo, SensorLayout};
