//! Format conversion between buffers during copy and sampling.
//!
//! Conversions are validated up front with [`plan`], before any destination
//! byte is written; after a successful plan, per-pixel conversion cannot fail.

use crate::color::Color;
use crate::display::PixelBuffer;
use crate::error::{RasterError, Result};
use crate::format::{ChannelLayout, PixelFormat};

/// How pixels move from a source buffer to a destination buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    /// Raw packed values are copied unchanged
    Raw,
    /// Decode to canonical ARGB, then encode for the destination
    Decode,
}

/// Check that `to` pixels can be produced from `from` pixels.
///
/// Any format converts into RGB565 / RGB888 / ARGB8888. Gray and indexed
/// destinations only accept the same layout from an equal or lower depth.
pub fn check(from: PixelFormat, to: PixelFormat) -> Result<()> {
    if to.is_full_color() {
        return Ok(());
    }
    let widening = to.bits_per_pixel() >= from.bits_per_pixel();
    match (from.layout(), to.layout()) {
        (ChannelLayout::Gray, ChannelLayout::Gray)
        | (ChannelLayout::Indexed, ChannelLayout::Indexed)
            if widening =>
        {
            Ok(())
        },
        _ => Err(RasterError::UnsupportedConversion { from, to }),
    }
}

/// Validate a draw from `src` into `dst` and pick how pixels are moved.
/// `blending` is set when output colors are mixed (partial alpha, bilinear).
pub fn plan(src: &PixelBuffer, dst: &PixelBuffer, blending: bool) -> Result<Transfer> {
    let (from, to) = (src.format(), dst.format());
    check(from, to)?;

    if to.is_indexed() {
        let compatible = match (src.palette(), dst.palette()) {
            (Some(s), Some(d)) => s.is_prefix_of(d),
            _ => false,
        };
        if blending || !compatible {
            return Err(RasterError::UnsupportedConversion { from, to });
        }
        return Ok(Transfer::Raw);
    }

    if from == to && !from.is_indexed() {
        Ok(Transfer::Raw)
    } else {
        Ok(Transfer::Decode)
    }
}

/// Pack a canonical color for `dst`
#[inline]
pub fn convert(color: Color, dst: &PixelBuffer) -> Result<u32> {
    dst.encode(color)
}

/// Move one raw source value into the destination's encoding
#[inline]
pub fn convert_raw(
    raw: u32,
    src: &PixelBuffer,
    dst: &PixelBuffer,
    transfer: Transfer,
) -> Result<u32> {
    match transfer {
        Transfer::Raw => Ok(raw),
        Transfer::Decode => convert(src.decode(raw), dst),
    }
}

/// Copy of `src` re-encoded as `to`, same size and orientation
pub fn convert_buffer(src: &PixelBuffer, to: PixelFormat) -> Result<PixelBuffer> {
    check(src.format(), to)?;
    let mut out = PixelBuffer::new(
        src.width() as i32,
        src.height() as i32,
        to,
        src.orientation(),
    )?;
    if to.is_indexed() {
        if let Some(palette) = src.palette() {
            out.set_palette(palette.clone())?;
        }
    }

    let transfer = plan(src, &out, false)?;
    let count = src.width() as usize * src.height() as usize;
    for index in 0..count {
        let raw = convert_raw(src.read_index(index), src, &out, transfer)?;
        out.write_index(index, raw);
    }
    Ok(out)
}
