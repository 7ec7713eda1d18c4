mod pixel_buffer;
#[cfg(feature = "preview")]
mod preview;

pub use pixel_buffer::PixelBuffer;
#[cfg(feature = "preview")]
pub use preview::Display;

use crate::format::{Palette, PixelFormat};
use crate::orientation::Orientation;

/// Read-only view of a finished frame, handed to whatever transfers it to
/// the panel. Bytes are packed row-major with no row padding.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    bytes: &'a [u8],
    format: PixelFormat,
    width: u32,
    height: u32,
    orientation: Orientation,
    palette: Option<&'a Palette>,
}

impl<'a> FrameView<'a> {
    pub(crate) fn new(buffer: &'a PixelBuffer) -> Self {
        Self {
            bytes: buffer.as_bytes(),
            format: buffer.format(),
            width: buffer.width(),
            height: buffer.height(),
            orientation: buffer.orientation(),
            palette: buffer.palette(),
        }
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn palette(&self) -> Option<&'a Palette> {
        self.palette
    }

    /// Bit length of one row; rows below 8 bpp need not start on a byte
    pub fn row_bits(&self) -> usize {
        self.width as usize * self.format.bits_per_pixel() as usize
    }
}
