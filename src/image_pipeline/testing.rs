//! In-memory engine used by the unit tests.
//!
//! Produces a deterministic image with a capture time derived from the opened path, can
//! fail at any decode step, and tracks how many contexts and exported images are still alive.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::image_pipeline::common::error::EngineError;
use crate::image_pipeline::processor::{OutputBits, ProcessorOptions};
use crate::image_pipeline::raw::{MemImage, RawContext, RawEngine};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    Init,
    Open,
    Unpack,
    Process,
    Export,
}

impl Step {
    pub const ALL: [Step; 5] = [Step::Init, Step::Open, Step::Unpack, Step::Process, Step::Export];
}

#[derive(Debug, Clone, Default)]
pub(crate) struct HandleCounters {
    pub live_contexts: i64,
    pub live_images: i64,
    pub contexts_created: u64,
    pub release_order: Vec<&'static str>,
}

impl HandleCounters {
    pub fn is_clean(&self) -> bool {
        self.live_contexts == 0 && self.live_images == 0
    }
}

pub(crate) struct MockEngine {
    width: usize,
    height: usize,
    colors: u32,
    fail_at: Option<Step>,
    empty_export: bool,
    counters: Arc<Mutex<HandleCounters>>,
}

impl MockEngine {
    pub const TIMESTAMP: i64 = 1_700_000_000;
    pub const FAILURE_CODE: i32 = EngineError::DATA_ERROR;

    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            colors: 3,
            fail_at: None,
            empty_export: false,
            counters: Arc::new(Mutex::new(HandleCounters::default())),
        }
    }

    /// Capture time reported for `path`: `TIMESTAMP` plus a hash of the path.
    pub fn timestamp_for(path: impl AsRef<Path>) -> i64 {
        let mut hasher = DefaultHasher::new();
        path.as_ref().hash(&mut hasher);
        Self::TIMESTAMP + (hasher.finish() % 1_000_000) as i64
    }

    pub fn failing_at(mut self, step: Step) -> Self {
        self.fail_at = Some(step);
        self
    }

    /// Reports `colors` samples per pixel without changing the exported bytes.
    pub fn with_colors(mut self, colors: u32) -> Self {
        self.colors = colors;
        self
    }

    pub fn with_empty_export(mut self) -> Self {
        self.empty_export = true;
        self
    }

    pub fn counters(&self) -> HandleCounters {
        self.counters.lock().unwrap().clone()
    }

    /// The 8-bit RGB samples every successful decode exports.
    pub fn expected_pixels(&self) -> Vec<u8> {
        (0..self.width * self.height * 3)
            .map(|i| (i % 251) as u8)
            .collect()
    }

    fn fail(&self, step: Step, what: &str) -> Result<(), EngineError> {
        if self.fail_at == Some(step) {
            Err(EngineError::new(Self::FAILURE_CODE, format!("mock {} failure", what)))
        } else {
            Ok(())
        }
    }
}

impl RawEngine for MockEngine {
    type Context = MockContext;

    fn init(&self, options: &ProcessorOptions) -> Result<MockContext, EngineError> {
        self.fail(Step::Init, "init")?;

        let pixels = match options.output_bits {
            OutputBits::Eight => self.expected_pixels(),
            // High byte carries the 8-bit value, low byte is noise the converter drops
            OutputBits::Sixteen => self
                .expected_pixels()
                .into_iter()
                .flat_map(|v| [0x7F, v])
                .collect(),
        };

        let mut counters = self.counters.lock().unwrap();
        counters.live_contexts += 1;
        counters.contexts_created += 1;

        Ok(MockContext {
            width: self.width,
            height: self.height,
            colors: self.colors,
            bits: options.output_bits.bits(),
            pixels,
            path: None,
            fail_at: self.fail_at,
            empty_export: self.empty_export,
            counters: Arc::clone(&self.counters),
        })
    }
}

pub(crate) struct MockContext {
    width: usize,
    height: usize,
    colors: u32,
    bits: u32,
    pixels: Vec<u8>,
    path: Option<PathBuf>,
    fail_at: Option<Step>,
    empty_export: bool,
    counters: Arc<Mutex<HandleCounters>>,
}

impl MockContext {
    fn fail(&self, step: Step, what: &str) -> Result<(), EngineError> {
        if self.fail_at == Some(step) {
            Err(EngineError::new(MockEngine::FAILURE_CODE, format!("mock {} failure", what)))
        } else {
            Ok(())
        }
    }
}

impl RawContext for MockContext {
    type Image<'a> = MockImage<'a>;

    fn open_file(&mut self, path: &Path) -> Result<(), EngineError> {
        self.fail(Step::Open, "open")?;
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    fn unpack(&mut self) -> Result<(), EngineError> {
        self.fail(Step::Unpack, "unpack")
    }

    fn process(&mut self) -> Result<(), EngineError> {
        self.fail(Step::Process, "process")
    }

    fn make_mem_image(&self) -> Result<MockImage<'_>, EngineError> {
        self.fail(Step::Export, "export")?;
        self.counters.lock().unwrap().live_images += 1;

        let data: &[u8] = if self.empty_export { &[] } else { &self.pixels };
        Ok(MockImage { context: self, data })
    }

    fn timestamp(&self) -> i64 {
        self.path.as_ref().map_or(0, MockEngine::timestamp_for)
    }
}

impl Drop for MockContext {
    fn drop(&mut self) {
        let mut counters = self.counters.lock().unwrap();
        counters.live_contexts -= 1;
        counters.release_order.push("context");
    }
}

pub(crate) struct MockImage<'a> {
    context: &'a MockContext,
    data: &'a [u8],
}

impl MemImage for MockImage<'_> {
    fn width(&self) -> usize {
        self.context.width
    }

    fn height(&self) -> usize {
        self.context.height
    }

    fn colors(&self) -> u32 {
        self.context.colors
    }

    fn bits(&self) -> u32 {
        self.context.bits
    }

    fn data(&self) -> &[u8] {
        self.data
    }
}

impl Drop for MockImage<'_> {
    fn drop(&mut self) {
        let mut counters = self.context.counters.lock().unwrap();
        counters.live_images -= 1;
        counters.release_order.push("image");
    }
}
