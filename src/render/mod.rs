//! Drawing one buffer into another.
//!
//! Every draw resolves its destination rectangle through
//! [`destination_rect`] and then runs on one of two paths: the sprite path
//! (exact pixel-for-pixel copy) or the shader path (scaling, caller rotation,
//! alpha, filtering). Both produce identical pixels for an identity draw.

mod shader;
mod sprite;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::display::PixelBuffer;
use crate::error::{RasterError, Result};
use crate::orientation::{transform_normalized, Orientation, Rect};

// ============================================================================
// Draw Parameters
// ============================================================================

/// Largest side a scaled draw may have
pub const MAX_EXTENT: i32 = 1 << 20;

/// Source sampling used by the shader path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Filter {
    #[default]
    Nearest,
    /// Interpolates the four nearest source pixels
    Bilinear,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawParams {
    /// Uniform scale factor, must be finite and > 0
    pub scale: f32,
    /// Rotation requested by the caller, on top of the destination's own
    pub rotation: Orientation,
    /// Global opacity in [0, 1]; values outside are clamped
    pub alpha: f32,
    pub filter: Filter,
}

impl Default for DrawParams {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl DrawParams {
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        rotation: Orientation::Rotate0,
        alpha: 1.0,
        filter: Filter::Nearest,
    };

    pub fn new(scale: f32, rotation: Orientation, alpha: f32) -> Self {
        Self {
            scale,
            rotation,
            alpha,
            filter: Filter::Nearest,
        }
    }

    pub fn with_filter(self, filter: Filter) -> Self {
        Self { filter, ..self }
    }

    /// Opacity as 0..=255. NaN counts as opaque.
    pub fn alpha_level(&self) -> u16 {
        if self.alpha.is_nan() {
            return 255;
        }
        (self.alpha.clamp(0.0, 1.0) * 255.0).round() as u16
    }

    /// Source extent after scaling, before caller rotation. Each side must
    /// land in `1..=MAX_EXTENT`.
    pub fn scaled_size(&self, width: i32, height: i32) -> Result<(i32, i32)> {
        let valid_scale = self.scale.is_finite() && self.scale > 0.0;
        let scale = |v: i32| -> i32 {
            if valid_scale {
                // float-to-int casts saturate
                (f64::from(v) * f64::from(self.scale)).round() as i32
            } else {
                0
            }
        };
        let (w, h) = (scale(width), scale(height));
        let in_range = |v: i32| (1..=MAX_EXTENT).contains(&v);
        if !in_range(w) || !in_range(h) {
            return Err(RasterError::InvalidDimensions {
                width: w,
                height: h,
            });
        }
        Ok((w, h))
    }
}

// ============================================================================
// Path Selection
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPath {
    Sprite,
    Shader,
}

impl RenderPath {
    /// Sprite when the drawn extent equals the source extent and no caller
    /// rotation or transparency is involved
    pub fn select(src: &PixelBuffer, params: &DrawParams) -> Self {
        let size = (src.width() as i32, src.height() as i32);
        let exact = params.scaled_size(size.0, size.1).ok() == Some(size);
        if exact && params.rotation == Orientation::Rotate0 && params.alpha_level() == 255 {
            Self::Sprite
        } else {
            Self::Shader
        }
    }
}

// ============================================================================
// Shared geometry
// ============================================================================

/// Local-space rectangle a draw covers: the caller's logical rectangle run
/// through the destination orientation and normalized. Both paths use this.
/// `None` when the rectangle falls outside the `i32` coordinate range.
pub fn destination_rect(dest: &PixelBuffer, rect: Rect) -> Option<Rect> {
    transform_normalized(dest.logical_size(), dest.orientation(), rect)
}

/// Local rectangle of a draw and the part of it inside the buffer. Pixels
/// outside are skipped; `None` when nothing is visible.
fn place(dest: &PixelBuffer, rect: Rect) -> Option<(Rect, Rect)> {
    let Some(dest_rect) = destination_rect(dest, rect) else {
        debug!("draw at {:?} lies beyond the coordinate range", rect);
        return None;
    };
    let clip = dest_rect.intersect(&dest.bounds());
    match clip {
        Some(c) if c != dest_rect => {
            warn!(
                "draw clipped from {:?} to {:?} ({}x{} buffer)",
                dest_rect,
                c,
                dest.width(),
                dest.height()
            );
        },
        None => debug!("draw at {:?} entirely outside buffer", dest_rect),
        _ => {},
    }
    clip.map(|c| (dest_rect, c))
}

// ============================================================================
// Entry points
// ============================================================================

/// Draw `src` with its logical top-left at (x, y), choosing the path from
/// `params`. Returns the path taken.
pub fn draw(
    dest: &mut PixelBuffer,
    src: &PixelBuffer,
    x: i32,
    y: i32,
    params: &DrawParams,
) -> Result<RenderPath> {
    let path = RenderPath::select(src, params);
    debug!(
        "draw {}x{} {} at ({}, {}) onto {}x{} {} {:?} via {:?}",
        src.width(),
        src.height(),
        src.format(),
        x,
        y,
        dest.width(),
        dest.height(),
        dest.format(),
        dest.orientation(),
        path
    );
    match path {
        RenderPath::Sprite => sprite::render(dest, src, x, y, params.rotation)?,
        RenderPath::Shader => shader::render(dest, src, x, y, params)?,
    }
    Ok(path)
}

/// Unscaled, unrotated, opaque draw; always takes the sprite path
pub fn draw_image(dest: &mut PixelBuffer, src: &PixelBuffer, x: i32, y: i32) -> Result<()> {
    draw(dest, src, x, y, &DrawParams::IDENTITY).map(|_| ())
}

/// General draw; always takes the shader path
pub fn draw_image_scaled_rotated(
    dest: &mut PixelBuffer,
    src: &PixelBuffer,
    x: i32,
    y: i32,
    scale: f32,
    rotation: Orientation,
    alpha: f32,
) -> Result<()> {
    draw_shader(dest, src, x, y, &DrawParams::new(scale, rotation, alpha))
}

/// Shader path with full parameters, including the filter
pub fn draw_shader(
    dest: &mut PixelBuffer,
    src: &PixelBuffer,
    x: i32,
    y: i32,
    params: &DrawParams,
) -> Result<()> {
    debug!(
        "shader draw {}x{} at ({}, {}) scale {} rotation {:?} alpha {}",
        src.width(),
        src.height(),
        x,
        y,
        params.scale,
        params.rotation,
        params.alpha
    );
    shader::render(dest, src, x, y, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::PixelFormat;

    fn buffer(w: i32, h: i32) -> PixelBuffer {
        PixelBuffer::new(w, h, PixelFormat::RGB888, Orientation::Rotate0).unwrap()
    }

    #[test]
    fn test_select_sprite_for_identity() {
        let src = buffer(20, 5);
        assert_eq!(RenderPath::select(&src, &DrawParams::IDENTITY), RenderPath::Sprite);
        // Scale that rounds back to the same extent still matches exactly
        let near = DrawParams::new(1.01, Orientation::Rotate0, 1.0);
        assert_eq!(RenderPath::select(&src, &near), RenderPath::Sprite);
    }

    #[test]
    fn test_select_shader_otherwise() {
        let src = buffer(20, 5);
        for params in [
            DrawParams::new(2.0, Orientation::Rotate0, 1.0),
            DrawParams::new(1.0, Orientation::Rotate90, 1.0),
            DrawParams::new(1.0, Orientation::Rotate0, 0.5),
            DrawParams::new(0.0, Orientation::Rotate0, 1.0),
        ] {
            assert_eq!(RenderPath::select(&src, &params), RenderPath::Shader);
        }
    }

    #[test]
    fn test_scaled_size_rejects_degenerate_scale() {
        let p = DrawParams::new(0.01, Orientation::Rotate0, 1.0);
        assert!(matches!(
            p.scaled_size(20, 5),
            Err(RasterError::InvalidDimensions { .. })
        ));
        let p = DrawParams::new(f32::NAN, Orientation::Rotate0, 1.0);
        assert!(p.scaled_size(20, 5).is_err());
        let p = DrawParams::new(1.5, Orientation::Rotate0, 1.0);
        assert_eq!(p.scaled_size(20, 5).unwrap(), (30, 8));
    }

    #[test]
    fn test_scaled_size_caps_extent() {
        let p = DrawParams::new(1.0e9, Orientation::Rotate0, 1.0);
        assert!(matches!(
            p.scaled_size(20, 5),
            Err(RasterError::InvalidDimensions { .. })
        ));
        let p = DrawParams::new(f32::MAX, Orientation::Rotate0, 1.0);
        assert!(p.scaled_size(1, 1).is_err());
        let p = DrawParams::new(MAX_EXTENT as f32, Orientation::Rotate0, 1.0);
        assert_eq!(p.scaled_size(1, 1).unwrap(), (MAX_EXTENT, MAX_EXTENT));
    }

    #[test]
    fn test_alpha_level_clamps() {
        assert_eq!(DrawParams::new(1.0, Orientation::Rotate0, 2.0).alpha_level(), 255);
        assert_eq!(DrawParams::new(1.0, Orientation::Rotate0, -1.0).alpha_level(), 0);
        assert_eq!(DrawParams::new(1.0, Orientation::Rotate0, 0.5).alpha_level(), 128);
    }

    #[test]
    fn test_destination_rect_uses_logical_size() {
        let dest =
            PixelBuffer::new(480, 800, PixelFormat::RGB565, Orientation::Rotate270).unwrap();
        assert_eq!(
            destination_rect(&dest, Rect::new(140, 150, 200, 50)),
            Some(Rect::new(230, 140, 50, 200))
        );
        let dest =
            PixelBuffer::new(480, 800, PixelFormat::RGB565, Orientation::Rotate90).unwrap();
        assert_eq!(
            destination_rect(&dest, Rect::new(140, 150, 200, 50)),
            Some(Rect::new(150, 460, 50, 200))
        );
    }
}
