//! RAW engine implementation using the rawloader library.
//!
//! rawloader parses the container and decodes the sensor readout for most TIFF-based and
//! proprietary formats (ARW, CR2, NEF, DNG, ORF, RAF, ...). imagepipe develops it into sRGB
//! (demosaic, white balance, camera matrix, base curve), and the capture time comes from the
//! file's EXIF block.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use imagepipe::Pipeline;
use rawloader::RawImageData as RawloaderImageData;
use tracing::{debug, info};

use crate::image_pipeline::common::error::EngineError;
use crate::image_pipeline::processor::{OutputBits, ProcessorOptions};
use crate::image_pipeline::raw::capture_time::capture_timestamp;
use crate::image_pipeline::raw::engine::{MemImage, RawContext, RawEngine};
use crate::image_pipeline::raw::types::{CfaPattern, SensorInfo, SensorLayout};

/// Default bit depth when no white level information is available from the RAW file.
const DEFAULT_BITS_PER_SAMPLE: u32 = 16;

/// The bit width of the u16 data type, used for calculating actual bits per sample.
const U16_BITS: u32 = 16;

/// Rows and columns checked to tell a 2x2 Bayer filter from larger mosaics such as X-Trans.
const CFA_PROBE: usize = 6;

/// imagepipe reads a zero bound as "no limit".
const UNBOUNDED: usize = 0;

/// Pure-Rust engine; the default for [`Processor`](crate::image_pipeline::Processor).
///
/// Honours `output_bits` and `half_size`. imagepipe always develops with the as-shot white
/// balance and its own base curve, so `use_camera_wb` and `bright` only affect LibRaw.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawloaderEngine;

impl RawEngine for RawloaderEngine {
    type Context = RawloaderContext;

    fn init(&self, options: &ProcessorOptions) -> Result<RawloaderContext, EngineError> {
        Ok(RawloaderContext {
            output_bits: options.output_bits,
            half_size: options.half_size,
            path: None,
            decoded: None,
            sensor: None,
            developed: None,
            timestamp: 0,
        })
    }
}

/// Decode state for one file. Each step needs the previous step's output.
pub struct RawloaderContext {
    output_bits: OutputBits,
    half_size: bool,
    path: Option<PathBuf>,
    decoded: Option<rawloader::RawImage>,
    sensor: Option<SensorInfo>,
    developed: Option<Developed>,
    timestamp: i64,
}

/// imagepipe output, already packed at the requested depth
struct Developed {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

fn out_of_order(step: &str) -> EngineError {
    EngineError::new(
        EngineError::OUT_OF_ORDER_CALL,
        format!("{} called out of order", step),
    )
}

impl RawContext for RawloaderContext {
    type Image<'a> = RawloaderImage<'a>;

    fn open_file(&mut self, path: &Path) -> Result<(), EngineError> {
        let file = std::fs::read(path)
            .map_err(|e| EngineError::new(EngineError::IO_ERROR, e.to_string()))?;
        debug!("Decoding RAW image, {} bytes", file.len());

        let decoded = rawloader::decode(&mut Cursor::new(&file[..]))
            .map_err(|e| EngineError::new(EngineError::FILE_UNSUPPORTED, e.to_string()))?;
        debug!(
            "Identified {} {}: {}x{}, {} samples per pixel",
            decoded.clean_make, decoded.clean_model, decoded.width, decoded.height, decoded.cpp
        );

        self.timestamp = capture_timestamp(&file);
        self.path = Some(path.to_path_buf());
        self.decoded = Some(decoded);
        Ok(())
    }

    fn unpack(&mut self) -> Result<(), EngineError> {
        let decoded = self.decoded.take().ok_or_else(|| out_of_order("unpack"))?;
        self.sensor = Some(unpack_sensor(&decoded)?);
        Ok(())
    }

    fn process(&mut self) -> Result<(), EngineError> {
        let (Some(path), Some(sensor)) = (self.path.as_deref(), self.sensor.as_ref()) else {
            return Err(out_of_order("process"));
        };

        let (maxwidth, maxheight) = output_bounds(sensor, self.half_size)?;
        info!(
            "Developing {}x{} {:?} sensor (bounds {}x{})",
            sensor.width, sensor.height, sensor.layout, maxwidth, maxheight
        );

        let mut pipeline = Pipeline::new_from_file(path, maxwidth, maxheight, false)
            .map_err(|e| EngineError::new(EngineError::DATA_ERROR, e))?;

        let developed = match self.output_bits {
            OutputBits::Eight => {
                let image = pipeline
                    .output_8bit(None)
                    .map_err(|e| EngineError::new(EngineError::DATA_ERROR, e))?;
                Developed {
                    width: image.width,
                    height: image.height,
                    data: image.data,
                }
            }
            OutputBits::Sixteen => {
                let image = pipeline
                    .output_16bit(None)
                    .map_err(|e| EngineError::new(EngineError::DATA_ERROR, e))?;
                Developed {
                    width: image.width,
                    height: image.height,
                    data: image.data.iter().flat_map(|v| v.to_le_bytes()).collect(),
                }
            }
        };

        self.developed = Some(developed);
        Ok(())
    }

    fn make_mem_image(&self) -> Result<RawloaderImage<'_>, EngineError> {
        let developed = self
            .developed
            .as_ref()
            .ok_or_else(|| out_of_order("make_mem_image"))?;

        Ok(RawloaderImage {
            width: developed.width,
            height: developed.height,
            bits: self.output_bits.bits(),
            data: &developed.data,
        })
    }

    fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

/// Developed RGB output of a [`RawloaderContext`]
pub struct RawloaderImage<'a> {
    width: usize,
    height: usize,
    bits: u32,
    data: &'a [u8],
}

impl MemImage for RawloaderImage<'_> {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn colors(&self) -> u32 {
        3
    }

    fn bits(&self) -> u32 {
        self.bits
    }

    fn data(&self) -> &[u8] {
        self.data
    }
}

/// The parts of a decoded image that unpacking inspects.
struct SensorReadout<'a> {
    width: usize,
    height: usize,
    cpp: usize,
    samples: usize,
    is_float: bool,
    /// Top, right, bottom, left
    crops: [usize; 4],
    whitelevels: [u16; 4],
    cfa_name: &'a str,
    cfa_color: &'a dyn Fn(usize, usize) -> usize,
}

fn unpack_sensor(decoded: &rawloader::RawImage) -> Result<SensorInfo, EngineError> {
    let (samples, is_float) = match &decoded.data {
        RawloaderImageData::Integer(values) => (values.len(), false),
        RawloaderImageData::Float(values) => (values.len(), true),
    };
    let cfa_color = |row: usize, col: usize| decoded.cfa.color_at(row, col);

    describe_sensor(&SensorReadout {
        width: decoded.width,
        height: decoded.height,
        cpp: decoded.cpp,
        samples,
        is_float,
        crops: decoded.crops,
        whitelevels: decoded.whitelevels,
        cfa_name: &decoded.cfa.name,
        cfa_color: &cfa_color,
    })
}

fn describe_sensor(readout: &SensorReadout<'_>) -> Result<SensorInfo, EngineError> {
    let (width, height, cpp) = (readout.width, readout.height, readout.cpp);

    if readout.samples != width * height * cpp {
        return Err(EngineError::new(
            EngineError::DATA_ERROR,
            format!(
                "sensor data holds {} samples, expected {}x{}x{}",
                readout.samples, width, height, cpp
            ),
        ));
    }

    let [top, right, bottom, left] = readout.crops;
    let (top, left, width, height) = if top + bottom < height && left + right < width {
        (top, left, width - left - right, height - top - bottom)
    } else {
        (0, 0, width, height)
    };

    let layout = match cpp {
        3 => SensorLayout::Linear,
        1 if readout.cfa_name.is_empty() => SensorLayout::Monochrome,
        1 => bayer_pattern(readout.cfa_color, top, left)
            .map(SensorLayout::Bayer)
            .unwrap_or(SensorLayout::Mosaic),
        _ => {
            return Err(EngineError::new(
                EngineError::NOT_IMPLEMENTED,
                format!("unsupported {} samples per pixel", cpp),
            ));
        }
    };

    // Float data is normalized 0.0-1.0, the white level is the largest integer value the
    // sensor produces (4095 -> 12 bits, 16383 -> 14 bits)
    let max_white_level = readout.whitelevels.iter().max().copied().unwrap_or(0);
    let bits_per_sample = if readout.is_float || max_white_level == 0 {
        DEFAULT_BITS_PER_SAMPLE
    } else {
        U16_BITS - max_white_level.leading_zeros()
    };

    debug!(
        "Unpacked {}x{} {:?}, {} bits per sample",
        width, height, layout, bits_per_sample
    );

    Ok(SensorInfo {
        width,
        height,
        layout,
        bits_per_sample,
    })
}

/// Size limits handed to imagepipe. Half size bounds both sides by half the longer edge so
/// the scale is 1/2 whichever way the image is rotated.
fn output_bounds(sensor: &SensorInfo, half_size: bool) -> Result<(usize, usize), EngineError> {
    if !half_size {
        return Ok((UNBOUNDED, UNBOUNDED));
    }
    if sensor.width < 2 || sensor.height < 2 {
        return Err(EngineError::new(
            EngineError::DATA_ERROR,
            format!("image {}x{} too small to halve", sensor.width, sensor.height),
        ));
    }
    let bound = sensor.width.max(sensor.height) / 2;
    Ok((bound, bound))
}

/// 2x2 pattern seen from (`top`, `left`), if the mosaic repeats every two photosites.
fn bayer_pattern(color_at: impl Fn(usize, usize) -> usize, top: usize, left: usize) -> Option<CfaPattern> {
    let pattern = CfaPattern::from_colors([
        color_at(top, left),
        color_at(top, left + 1),
        color_at(top + 1, left),
        color_at(top + 1, left + 1),
    ])?;

    let repeats = (0..CFA_PROBE).all(|row| {
        (0..CFA_PROBE).all(|col| color_at(top + row, left + col) == pattern.color_at(row, col))
    });
    repeats.then_some(pattern)
}
