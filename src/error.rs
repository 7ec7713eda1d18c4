//! Error taxonomy for buffer creation, pixel access and drawing.
//!
//! Every failure is a synchronous return value. A failed `fill` or draw has
//! not written any byte of its destination.

use std::fmt;

use crate::format::PixelFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterError {
    /// Width or height was zero or negative at creation, or a scaled draw
    /// collapsed to an empty extent.
    InvalidDimensions { width: i32, height: i32 },
    /// Bit depth, or the pairing of bit depth and channel layout, is not supported.
    UnsupportedFormat {
        bits_per_pixel: u32,
        reason: &'static str,
    },
    /// The converter cannot produce `to` pixels from `from` pixels.
    UnsupportedConversion { from: PixelFormat, to: PixelFormat },
    /// Pixel coordinate outside the buffer's local extent.
    OutOfBounds {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },
}

impl fmt::Display for RasterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimensions { width, height } => {
                write!(f, "invalid dimensions {}x{}", width, height)
            },
            Self::UnsupportedFormat {
                bits_per_pixel,
                reason,
            } => write!(f, "unsupported format ({} bpp): {}", bits_per_pixel, reason),
            Self::UnsupportedConversion { from, to } => {
                write!(f, "unsupported conversion from {} to {}", from, to)
            },
            Self::OutOfBounds {
                x,
                y,
                width,
                height,
            } => write!(f, "pixel ({}, {}) outside {}x{} buffer", x, y, width, height),
        }
    }
}

impl std::error::Error for RasterError {}

pub type Result<T> = std::result::Result<T, RasterError>;
