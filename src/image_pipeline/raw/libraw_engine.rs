//! RAW engine backed by the system LibRaw through `libraw-sys`.

use std::ffi::{CStr, CString, c_int};
use std::marker::PhantomData;
use std::path::Path;
use std::slice;

use libraw_sys as sys;
use tracing::debug;

use crate::image_pipeline::common::error::EngineError;
use crate::image_pipeline::processor::ProcessorOptions;
use crate::image_pipeline::raw::engine::{MemImage, RawContext, RawEngine};

/// Engine using LibRaw's own demosaic and colour pipeline.
///
/// Every decode owns its own `libraw_data_t`; LibRaw is safe to use from several threads
/// as long as contexts are not shared.
#[derive(Debug, Clone, Copy, Default)]
pub struct LibrawEngine;

impl RawEngine for LibrawEngine {
    type Context = LibrawContext;

    fn init(&self, options: &ProcessorOptions) -> Result<LibrawContext, EngineError> {
        // SAFETY: libraw_init has no preconditions and returns null on allocation failure.
        let inner = unsafe { sys::libraw_init(0) };
        if inner.is_null() {
            return Err(EngineError::new(
                EngineError::INSUFFICIENT_MEMORY,
                "libraw_init returned null",
            ));
        }
        let context = LibrawContext { inner };

        // SAFETY: inner is a valid, exclusively owned context.
        unsafe {
            let params = &mut (*inner).params;
            params.output_bps = options.output_bits.bits() as c_int;
            params.half_size = c_int::from(options.half_size);
            params.use_camera_wb = c_int::from(options.use_camera_wb);
            params.bright = options.bright;
        }

        Ok(context)
    }
}

fn strerror(code: c_int) -> String {
    // SAFETY: libraw_strerror returns a pointer to a static string, or null.
    let message = unsafe { sys::libraw_strerror(code) };
    if message.is_null() {
        return format!("LibRaw error {}", code);
    }
    // SAFETY: non-null, NUL-terminated and static.
    unsafe { CStr::from_ptr(message) }.to_string_lossy().into_owned()
}

fn check(code: c_int) -> Result<(), EngineError> {
    if code == 0 {
        Ok(())
    } else {
        Err(EngineError::new(code, strerror(code)))
    }
}

/// Owns a `libraw_data_t`; recycled and closed on drop.
#[derive(Debug)]
pub struct LibrawContext {
    inner: *mut sys::libraw_data_t,
}

impl RawContext for LibrawContext {
    type Image<'a> = LibrawImage<'a>;

    fn open_file(&mut self, path: &Path) -> Result<(), EngineError> {
        let path = path
            .to_str()
            .and_then(|p| CString::new(p).ok())
            .ok_or_else(|| {
                EngineError::new(EngineError::IO_ERROR, "path is not valid UTF-8 without NUL bytes")
            })?;

        // SAFETY: inner is valid and path outlives the call.
        check(unsafe { sys::libraw_open_file(self.inner, path.as_ptr()) })
    }

    fn unpack(&mut self) -> Result<(), EngineError> {
        // SAFETY: inner is valid; LibRaw rejects out-of-order calls itself.
        check(unsafe { sys::libraw_unpack(self.inner) })
    }

    fn process(&mut self) -> Result<(), EngineError> {
        // SAFETY: inner is valid; LibRaw rejects out-of-order calls itself.
        check(unsafe { sys::libraw_dcraw_process(self.inner) })
    }

    fn make_mem_image(&self) -> Result<LibrawImage<'_>, EngineError> {
        let mut errc: c_int = 0;
        // SAFETY: inner is valid and errc is a live out-parameter.
        let ptr = unsafe { sys::libraw_dcraw_make_mem_image(self.inner, &mut errc) };

        // Guard first so a non-null image is cleared even when errc reports failure
        let image = LibrawImage {
            ptr,
            _context: PhantomData,
        };
        check(errc)?;
        if ptr.is_null() {
            return Err(EngineError::new(
                EngineError::UNSPECIFIED,
                "libraw_dcraw_make_mem_image returned null",
            ));
        }

        if cfg!(target_endian = "big") && image.bits() == 16 {
            // LibRaw writes host order, consumers expect little-endian
            // SAFETY: ptr is valid for data_size bytes and nothing else references them yet.
            let data = unsafe {
                slice::from_raw_parts_mut((*ptr).data.as_mut_ptr(), (*ptr).data_size as usize)
            };
            data.chunks_exact_mut(2).for_each(|s| s.swap(0, 1));
        }

        debug!(
            "libraw image: {}x{}x{}, {} bits, {} bytes",
            image.width(),
            image.height(),
            image.colors(),
            image.bits(),
            image.data_size()
        );
        Ok(image)
    }

    fn timestamp(&self) -> i64 {
        // SAFETY: inner is valid; `other` is zeroed until a file is opened.
        unsafe { (*self.inner).other.timestamp as i64 }
    }
}

impl Drop for LibrawContext {
    fn drop(&mut self) {
        // SAFETY: inner came from libraw_init and is released exactly once, here.
        // libraw_close recycles the decode buffers before freeing the context.
        unsafe { sys::libraw_close(self.inner) };
    }
}

/// Owns a `libraw_processed_image_t`; cleared on drop, before its context.
pub struct LibrawImage<'a> {
    ptr: *mut sys::libraw_processed_image_t,
    _context: PhantomData<&'a LibrawContext>,
}

impl LibrawImage<'_> {
    fn header(&self) -> &sys::libraw_processed_image_t {
        // SAFETY: only reachable once make_mem_image has checked ptr for null.
        unsafe { &*self.ptr }
    }
}

impl MemImage for LibrawImage<'_> {
    fn width(&self) -> usize {
        self.header().width as usize
    }

    fn height(&self) -> usize {
        self.header().height as usize
    }

    fn colors(&self) -> u32 {
        u32::from(self.header().colors)
    }

    fn bits(&self) -> u32 {
        u32::from(self.header().bits)
    }

    fn data(&self) -> &[u8] {
        // SAFETY: data is a flexible array member holding data_size bytes, valid until drop.
        unsafe {
            slice::from_raw_parts((*self.ptr).data.as_ptr(), self.header().data_size as usize)
        }
    }
}

impl Drop for LibrawImage<'_> {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            // SAFETY: ptr came from libraw_dcraw_make_mem_image and is cleared exactly once.
            unsafe { sys::libraw_dcraw_clear_mem(self.ptr) };
        }
    }
}
