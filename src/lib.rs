//! Software rasterization into framebuffers of 1 to 32 bits per pixel,
//! with display orientation handled as a rotation of the destination.
//!
//! Callers work in logical (user-visible) coordinates. Each destination
//! buffer carries an [`Orientation`]; every draw maps its rectangle into the
//! buffer's local storage space before any pixel is touched, on either the
//! exact-copy sprite path or the general shader path.

pub mod color;
pub mod convert;
pub mod display;
pub mod error;
pub mod format;
pub mod orientation;
pub mod pattern;
pub mod render;
pub mod scene;
pub mod util;

pub use color::Color;
pub use display::{FrameView, PixelBuffer};
pub use error::{RasterError, Result};
pub use format::{BitDepth, ByteOrder, ChannelLayout, Palette, PixelFormat};
pub use orientation::{
    inverse_transform, transform, transform_normalized, Dims, Orientation, Rect,
};
pub use pattern::Pattern;
pub use render::{
    destination_rect, draw, draw_image, draw_image_scaled_rotated, draw_shader, DrawParams,
    Filter, RenderPath, MAX_EXTENT,
};
pub use scene::Scene;

#[cfg(feature = "preview")]
pub use display::Display;

/// Allocate a zeroed buffer. `width` and `height` are the native (panel)
/// dimensions; both must be positive.
pub fn create_buffer(
    width: i32,
    height: i32,
    format: PixelFormat,
    orientation: Orientation,
) -> Result<PixelBuffer> {
    PixelBuffer::new(width, height, format, orientation)
}

/// Overwrite every pixel of `buffer` with `color`
pub fn fill(buffer: &mut PixelBuffer, color: Color) -> Result<()> {
    buffer.fill(color)
}
