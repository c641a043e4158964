use std::path::Path;

use tracing::{debug, instrument};

use crate::image_pipeline::common::error::{DecodeError, EngineError, Result};
use crate::image_pipeline::processor::ProcessorOptions;
use crate::image_pipeline::raw::engine::{MemImage, RawContext, RawEngine};
use crate::image_pipeline::raw::types::RawDecodeResult;

/// One open/unpack/process/export pass through an engine.
///
/// The engine context lives only inside [`DecodeSession::decode`]; it is dropped on every
/// return path, after the exported image it lent out.
pub(crate) struct DecodeSession<'a, E: RawEngine> {
    engine: &'a E,
    options: &'a ProcessorOptions,
}

impl<'a, E: RawEngine> DecodeSession<'a, E> {
    pub fn new(engine: &'a E, options: &'a ProcessorOptions) -> Self {
        Self { engine, options }
    }

    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub fn decode(&self, path: &Path) -> Result<RawDecodeResult> {
        let mut context = {
            let _span = tracing::info_span!("engine_init").entered();
            self.engine
                .init(self.options)
                .map_err(DecodeError::EngineInit)?
        };

        {
            let _span = tracing::info_span!("open_file").entered();
            context.open_file(path).map_err(|message| DecodeError::Open {
                path: path.to_path_buf(),
                message,
            })?;
        }

        {
            let _span = tracing::info_span!("unpack").entered();
            context.unpack().map_err(DecodeError::Unpack)?;
        }

        {
            let _span = tracing::info_span!("process").entered();
            context.process().map_err(DecodeError::Process)?;
        }

        let result = {
            let _span = tracing::info_span!("export").entered();
            let image = context.make_mem_image().map_err(DecodeError::Export)?;
            if image.data_size() == 0 || image.width() == 0 || image.height() == 0 {
                return Err(DecodeError::Export(EngineError::new(
                    EngineError::UNSPECIFIED,
                    "engine returned an empty image",
                )));
            }

            debug!(
                width = image.width(),
                height = image.height(),
                colors = image.colors(),
                bits = image.bits(),
                data_size = image.data_size(),
                "Exported in-memory image"
            );

            // Engine memory is gone once the image and context drop, copy it out first
            RawDecodeResult {
                data: image.data().to_vec(),
                width: image.width(),
                height: image.height(),
                colors: image.colors(),
                bits_per_sample: image.bits(),
                timestamp: context.timestamp(),
            }
        };

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_pipeline::testing::{MockEngine, Step};

    fn decode(engine: &MockEngine) -> Result<RawDecodeResult> {
        let options = ProcessorOptions::default();
        DecodeSession::new(engine, &options).decode(Path::new("mock.nef"))
    }

    #[test]
    fn test_successful_decode_copies_pixels() {
        let engine = MockEngine::new(4, 2);
        let result = decode(&engine).unwrap();

        assert_eq!(result.width, 4);
        assert_eq!(result.height, 2);
        assert_eq!(result.colors, 3);
        assert_eq!(result.bits_per_sample, 8);
        assert_eq!(result.data, engine.expected_pixels());
        assert_eq!(result.timestamp, MockEngine::timestamp_for("mock.nef"));
        assert!(engine.counters().is_clean());
    }

    #[test]
    fn test_each_step_failure_maps_to_its_error() {
        for step in Step::ALL {
            let engine = MockEngine::new(4, 2).failing_at(step);
            let err = decode(&engine).unwrap_err();

            let matched = match step {
                Step::Init => matches!(err, DecodeError::EngineInit(_)),
                Step::Open => matches!(err, DecodeError::Open { .. }),
                Step::Unpack => matches!(err, DecodeError::Unpack(_)),
                Step::Process => matches!(err, DecodeError::Process(_)),
                Step::Export => matches!(err, DecodeError::Export(_)),
            };
            assert!(matched, "{:?} produced {:?}", step, err);
            assert_eq!(err.engine_error().map(|e| e.code), Some(MockEngine::FAILURE_CODE));
        }
    }

    #[test]
    fn test_handles_released_after_every_failure() {
        for step in Step::ALL {
            let engine = MockEngine::new(4, 2).failing_at(step);
            for _ in 0..3 {
                assert!(decode(&engine).is_err());
            }
            let counters = engine.counters();
            assert!(counters.is_clean(), "{:?} leaked: {:?}", step, counters);
        }
    }

    #[test]
    fn test_open_error_carries_path() {
        let engine = MockEngine::new(4, 2).failing_at(Step::Open);
        let err = decode(&engine).unwrap_err();

        match err {
            DecodeError::Open { path, message } => {
                assert_eq!(path, Path::new("mock.nef"));
                assert_eq!(message.message, "mock open failure");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_empty_export_is_an_error() {
        let engine = MockEngine::new(4, 2).with_empty_export();
        let err = decode(&engine).unwrap_err();

        assert!(matches!(err, DecodeError::Export(_)));
        assert!(engine.counters().is_clean());
    }

    #[test]
    fn test_image_released_before_context() {
        let engine = MockEngine::new(4, 2);
        decode(&engine).unwrap();

        assert_eq!(engine.counters().release_order, vec!["image", "context"]);
    }
}
