//! Display orientation as the cyclic group Z4, and the rectangle transform
//! between a destination buffer's logical space and its local storage space.
//!
//! `transform` may produce a negative width (orientation 3). Every caller must
//! pass its result through [`Rect::normalize`] before touching pixels.

use std::ops::Add;

use serde::{Deserialize, Serialize};

// ============================================================================
// Orientation
// ============================================================================

/// Quarter-turn rotation, counter-clockwise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Orientation {
    #[default]
    Rotate0,
    /// 90 degrees counter-clockwise
    Rotate90,
    Rotate180,
    /// 270 degrees counter-clockwise (90 clockwise)
    Rotate270,
}

impl Orientation {
    pub const ALL: [Self; 4] = [Self::Rotate0, Self::Rotate90, Self::Rotate180, Self::Rotate270];

    /// Element of Z4 for any integer (reduced modulo 4)
    pub const fn from_index(index: i32) -> Self {
        match index.rem_euclid(4) {
            0 => Self::Rotate0,
            1 => Self::Rotate90,
            2 => Self::Rotate180,
            _ => Self::Rotate270,
        }
    }

    /// Multiples of 90 degrees only
    pub const fn from_degrees(degrees: i32) -> Option<Self> {
        if degrees % 90 != 0 {
            return None;
        }
        Some(Self::from_index(degrees / 90))
    }

    #[inline]
    pub const fn index(self) -> u8 {
        match self {
            Self::Rotate0 => 0,
            Self::Rotate90 => 1,
            Self::Rotate180 => 2,
            Self::Rotate270 => 3,
        }
    }

    pub const fn degrees(self) -> u32 {
        self.index() as u32 * 90
    }

    /// Group operation: sum modulo 4
    #[inline]
    pub const fn compose(self, other: Self) -> Self {
        Self::from_index(self.index() as i32 + other.index() as i32)
    }

    #[inline]
    pub const fn inverse(self) -> Self {
        Self::from_index(4 - self.index() as i32)
    }

    /// Quarter turns swap width and height
    #[inline]
    pub const fn is_odd(self) -> bool {
        self.index() % 2 == 1
    }

    /// Rotation the source must be read with so that its traversal extent
    /// matches a destination rectangle already transformed by `intrinsic`.
    #[inline]
    pub const fn compensate(requested: Self, intrinsic: Self) -> Self {
        requested.compose(intrinsic)
    }

    /// Extent after rotating a `width` x `height` area
    #[inline]
    pub const fn rotate_size(self, width: i32, height: i32) -> (i32, i32) {
        if self.is_odd() {
            (height, width)
        } else {
            (width, height)
        }
    }

    /// Where source pixel (sx, sy) of a `sw` x `sh` image lands inside the
    /// rotated extent
    #[inline]
    pub const fn map_index(self, sx: i32, sy: i32, sw: i32, sh: i32) -> (i32, i32) {
        match self {
            Self::Rotate0 => (sx, sy),
            Self::Rotate90 => (sy, sw - 1 - sx),
            Self::Rotate180 => (sw - 1 - sx, sh - 1 - sy),
            Self::Rotate270 => (sh - 1 - sy, sx),
        }
    }

    /// Source pixel of a `sw` x `sh` image that lands on (u, v) of the
    /// rotated extent. Inverse of [`Self::map_index`].
    #[inline]
    pub const fn unmap_index(self, u: i32, v: i32, sw: i32, sh: i32) -> (i32, i32) {
        match self {
            Self::Rotate0 => (u, v),
            Self::Rotate90 => (sw - 1 - v, u),
            Self::Rotate180 => (sw - 1 - u, sh - 1 - v),
            Self::Rotate270 => (v, sh - 1 - u),
        }
    }
}

impl Add for Orientation {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.compose(rhs)
    }
}

impl TryFrom<u8> for Orientation {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, String> {
        if value > 3 {
            return Err(format!("orientation must be 0..=3, got {}", value));
        }
        Ok(Self::from_index(i32::from(value)))
    }
}

impl From<Orientation> for u8 {
    fn from(orientation: Orientation) -> Self {
        orientation.index()
    }
}

// ============================================================================
// Rect & Dims
// ============================================================================

/// Logical extent of a destination buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dims {
    pub width: i32,
    pub height: i32,
}

impl Dims {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Signed rectangle. Canonical only when `w >= 0 && h >= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub const fn is_normalized(&self) -> bool {
        self.w >= 0 && self.h >= 0
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Move negative extents into the origin: `x += w; w = -w` (same for y/h).
    /// Edges past the `i32` range saturate.
    pub const fn normalize(self) -> Self {
        Wide::of(self).normalize().saturate()
    }

    #[inline]
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        let r = Wide::of(*self);
        let (x, y) = (x as i64, y as i64);
        x >= r.x && x < r.x + r.w && y >= r.y && y < r.y + r.h
    }

    /// Overlap of two normalized rectangles
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let (a, b) = (Wide::of(*self), Wide::of(*other));
        let x0 = a.x.max(b.x);
        let y0 = a.y.max(b.y);
        let x1 = (a.x + a.w).min(b.x + b.w);
        let y1 = (a.y + a.h).min(b.y + b.h);
        let r = Wide {
            x: x0,
            y: y0,
            w: x1 - x0,
            h: y1 - y0,
        }
        .saturate();
        (!r.is_empty()).then_some(r)
    }
}

/// `Rect` widened to i64 so edge sums of any i32 inputs cannot overflow
#[derive(Clone, Copy)]
struct Wide {
    x: i64,
    y: i64,
    w: i64,
    h: i64,
}

impl Wide {
    const fn of(r: Rect) -> Self {
        Self {
            x: r.x as i64,
            y: r.y as i64,
            w: r.w as i64,
            h: r.h as i64,
        }
    }

    const fn normalize(self) -> Self {
        let mut r = self;
        if r.w < 0 {
            r.x += r.w;
            r.w = -r.w;
        }
        if r.h < 0 {
            r.y += r.h;
            r.h = -r.h;
        }
        r
    }

    const fn saturate(self) -> Rect {
        const fn clamp_i32(v: i64) -> i32 {
            if v > i32::MAX as i64 {
                i32::MAX
            } else if v < i32::MIN as i64 {
                i32::MIN
            } else {
                v as i32
            }
        }
        Rect::new(
            clamp_i32(self.x),
            clamp_i32(self.y),
            clamp_i32(self.w),
            clamp_i32(self.h),
        )
    }

    fn narrow(self) -> Option<Rect> {
        Some(Rect::new(
            i32::try_from(self.x).ok()?,
            i32::try_from(self.y).ok()?,
            i32::try_from(self.w).ok()?,
            i32::try_from(self.h).ok()?,
        ))
    }
}

// ============================================================================
// Transform
// ============================================================================

const fn transform_wide(dims: Dims, orientation: Orientation, rect: Rect) -> Wide {
    let r = Wide::of(rect);
    let (dw, dh) = (dims.width as i64, dims.height as i64);
    match orientation {
        Orientation::Rotate0 => r,
        Orientation::Rotate90 => Wide {
            x: r.y,
            y: dw - r.x - r.w,
            w: r.h,
            h: r.w,
        },
        Orientation::Rotate180 => Wide {
            x: dw - r.x - r.w,
            y: dh - r.y - r.h,
            w: r.w,
            h: r.h,
        },
        // Width comes out negative here
        Orientation::Rotate270 => Wide {
            x: dh - r.y - r.h,
            y: r.x,
            w: -r.h,
            h: r.w,
        },
    }
}

/// Map `rect` from the logical space of a buffer with extent `dims` into the
/// buffer's local space. The result is not normalized. Edges past the `i32`
/// range saturate; use [`transform_normalized`] when that matters.
pub const fn transform(dims: Dims, orientation: Orientation, rect: Rect) -> Rect {
    transform_wide(dims, orientation, rect).saturate()
}

/// Exact inverse of [`transform`] on its un-normalized output
pub const fn inverse_transform(dims: Dims, orientation: Orientation, rect: Rect) -> Rect {
    let r = Wide::of(rect);
    let (dw, dh) = (dims.width as i64, dims.height as i64);
    let wide = match orientation {
        Orientation::Rotate0 => r,
        Orientation::Rotate90 => Wide {
            x: dw - r.y - r.h,
            y: r.x,
            w: r.h,
            h: r.w,
        },
        Orientation::Rotate180 => Wide {
            x: dw - r.x - r.w,
            y: dh - r.y - r.h,
            w: r.w,
            h: r.h,
        },
        Orientation::Rotate270 => Wide {
            x: r.y,
            y: dh - r.x + r.w,
            w: r.h,
            h: -r.w,
        },
    };
    wide.saturate()
}

/// `normalize(transform(..))`, the only form rendering code consumes.
///
/// `None` when the result does not fit in `i32`. Such a rectangle starts past
/// `i32::MAX` or ends before 0, so it never overlaps a buffer.
pub fn transform_normalized(dims: Dims, orientation: Orientation, rect: Rect) -> Option<Rect> {
    transform_wide(dims, orientation, rect).normalize().narrow()
}
