//! Processor configuration types

/// Sample depth requested from the engine's in-memory export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputBits {
    /// 8 bits per sample (engine default)
    Eight,
    /// 16 bits per sample, downsampled to 8 bits by the converter
    Sixteen,
}

impl OutputBits {
    pub fn bits(self) -> u32 {
        match self {
            OutputBits::Eight => 8,
            OutputBits::Sixteen => 16,
        }
    }
}

/// Configuration for RAW decoding.
///
/// The defaults match the engine's own defaults, so `ProcessorOptions::default()`
/// leaves every engine parameter untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessorOptions {
    /// Depth of the exported image
    pub output_bits: OutputBits,
    /// Skip demosaicing and emit one pixel per 2x2 sensor cell
    pub half_size: bool,
    /// Use the as-shot white balance instead of daylight (LibRaw only; imagepipe always does)
    pub use_camera_wb: bool,
    /// Linear brightness multiplier applied before the output curve (LibRaw only)
    pub bright: f32,
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self {
            output_bits: OutputBits::Eight,
            half_size: false,
            use_camera_wb: false,
            bright: 1.0,
        }
    }
}

impl ProcessorOptions {
    pub fn builder() -> ProcessorOptionsBuilder {
        ProcessorOptionsBuilder::default()
    }
}

/// Builder for ProcessorOptions
#[derive(Default)]
pub struct ProcessorOptionsBuilder {
    output_bits: Option<OutputBits>,
    half_size: Option<bool>,
    use_camera_wb: Option<bool>,
    bright: Option<f32>,
}

impl ProcessorOptionsBuilder {
    pub fn output_bits(mut self, output_bits: OutputBits) -> Self {
        self.output_bits = Some(output_bits);
        self
    }

    pub fn half_size(mut self, enable: bool) -> Self {
        self.half_size = Some(enable);
        self
    }

    pub fn use_camera_wb(mut self, enable: bool) -> Self {
        self.use_camera_wb = Some(enable);
        self
    }

    pub fn bright(mut self, bright: f32) -> Self {
        self.bright = Some(bright);
        self
    }

    pub fn build(self) -> ProcessorOptions {
        let default = ProcessorOptions::default();
        ProcessorOptions {
            output_bits: self.output_bits.unwrap_or(default.output_bits),
            half_size: self.half_size.unwrap_or(default.half_size),
            use_camera_wb: self.use_camera_wb.unwrap_or(default.use_camera_wb),
            bright: self.bright.unwrap_or(default.bright),
        }
    }
}
