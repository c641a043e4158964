use std::path::Path;

use rayon::prelude::*;
use tracing::{info, instrument};

use crate::image_pipeline::{
    bitmap::{Bitmap, convert_samples},
    common::error::Result,
    metadata::Metadata,
    processor::{
        timing::{PipelineTimings, Timer},
        types::ProcessorOptions,
    },
    raw::{DecodeSession, RawEngine, RawloaderEngine},
};

/// Decodes RAW files into 8-bit RGBA bitmaps.
///
/// A processor only holds configuration. Every call opens its own engine context and
/// releases it before returning, so one instance can be shared freely between threads.
///
/// ```no_run
/// use rawbitmap::image_pipeline::{Processor, ProcessorOptions};
///
/// let processor = Processor::new(ProcessorOptions::default());
/// let (bitmap, metadata) = processor.process_raw("DSC_0001.NEF").unwrap();
/// println!("{}x{} taken {:?}", bitmap.width(), bitmap.height(), metadata.capture_date);
/// ```
pub struct Processor<E: RawEngine = RawloaderEngine> {
    engine: E,
    options: ProcessorOptions,
}

impl Processor<RawloaderEngine> {
    pub fn new(options: ProcessorOptions) -> Self {
        Self {
            engine: RawloaderEngine,
            options,
        }
    }
}

impl<E: RawEngine> Processor<E> {
    pub fn with_engine(engine: E, options: ProcessorOptions) -> Self {
        Self { engine, options }
    }

    /// Decodes the RAW file at `path` into a bitmap and its capture metadata.
    ///
    /// # Errors
    ///
    /// Returns the [`DecodeError`](crate::image_pipeline::DecodeError) of the first step that
    /// failed. No engine resources outlive the call either way.
    pub fn process_raw<P: AsRef<Path>>(&self, path: P) -> Result<(Bitmap, Metadata)> {
        self.process_raw_with_timings(path)
            .map(|(bitmap, metadata, _)| (bitmap, metadata))
    }

    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn process_raw_with_timings<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<(Bitmap, Metadata, PipelineTimings)> {
        let path = path.as_ref();
        let mut timings = PipelineTimings::new();

        let timer = Timer::start("decode");
        let decoded = DecodeSession::new(&self.engine, &self.options).decode(path)?;
        let (name, duration) = timer.stop();
        timings.add_step(name, duration);

        let timer = Timer::start("convert");
        let bitmap = {
            let _span = tracing::info_span!("convert",
                width = decoded.width,
                height = decoded.height
            ).entered();
            convert_samples(
                &decoded.data,
                decoded.width,
                decoded.height,
                decoded.colors,
                decoded.bits_per_sample,
            )?
        };
        let (name, duration) = timer.stop();
        timings.add_step(name, duration);

        let timer = Timer::start("metadata");
        let metadata = Metadata::from_timestamp(decoded.timestamp);
        let (name, duration) = timer.stop();
        timings.add_step(name, duration);

        info!(
            "Processed RAW {} ({}x{}) in {:.3}ms",
            path.display(),
            bitmap.width(),
            bitmap.height(),
            timings.total_duration().as_secs_f64() * 1000.0
        );
        Ok((bitmap, metadata, timings))
    }

    /// Decodes every path on the rayon thread pool. Results are in input order.
    pub fn process_batch<P: AsRef<Path> + Sync>(&self, paths: &[P]) -> Vec<Result<(Bitmap, Metadata)>> {
        info!("Processing batch of {} RAW files", paths.len());
        paths.par_iter().map(|path| self.process_raw(path)).collect()
    }

    pub fn options(&self) -> &ProcessorOptions {
        &self.options
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}
