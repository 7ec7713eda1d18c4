//! Canonical color representation shared by every pixel format.

use serde::{Deserialize, Serialize};

/// Alpha blend a single color channel
/// Uses fast approximation: (x + 1 + (x >> 8)) >> 8 instead of x / 255
#[inline]
fn blend_channel(src: u8, dst: u8, alpha: u16) -> u8 {
    let result = src as u16 * alpha + dst as u16 * (255 - alpha);
    ((result + 1 + (result >> 8)) >> 8) as u8
}

/// A color packed as `0xAARRGGBB`, independent of any buffer's bit depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub u32);

impl Color {
    pub const BLACK: Self = Self(0xFF00_0000);
    pub const WHITE: Self = Self(0xFFFF_FFFF);

    #[inline]
    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self((a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    /// Opaque color from RGB channels
    #[inline]
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::from_argb(0xFF, r, g, b)
    }

    #[inline]
    pub const fn a(self) -> u8 {
        (self.0 >> 24) as u8
    }

    #[inline]
    pub const fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[inline]
    pub const fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub const fn b(self) -> u8 {
        self.0 as u8
    }

    /// Same color with alpha forced to fully opaque
    #[inline]
    pub const fn opaque(self) -> Self {
        Self(self.0 | 0xFF00_0000)
    }

    /// Integer luma: (77r + 150g + 29b) >> 8. Exact for gray inputs.
    #[inline]
    pub fn luma(self) -> u8 {
        ((77 * self.r() as u32 + 150 * self.g() as u32 + 29 * self.b() as u32) >> 8) as u8
    }

    /// Per-channel `self * a + dst * (1 - a)`, alpha channel included.
    /// `alpha` is in 0..=255.
    #[inline]
    pub fn blend_over(self, dst: Self, alpha: u16) -> Self {
        let alpha = alpha.min(255);
        Self::from_argb(
            blend_channel(self.a(), dst.a(), alpha),
            blend_channel(self.r(), dst.r(), alpha),
            blend_channel(self.g(), dst.g(), alpha),
            blend_channel(self.b(), dst.b(), alpha),
        )
    }

    /// Bilinear weight combination of four samples (fx, fy in [0, 1])
    pub fn bilerp(c00: Self, c10: Self, c01: Self, c11: Self, fx: f32, fy: f32) -> Self {
        let lerp = |a: u8, b: u8, t: f32| -> f32 { a as f32 + (b as f32 - a as f32) * t };
        let channel = |sel: fn(Self) -> u8| -> u8 {
            let top = lerp(sel(c00), sel(c10), fx);
            let bottom = lerp(sel(c01), sel(c11), fx);
            (top + (bottom - top) * fy).round().clamp(0.0, 255.0) as u8
        };
        Self::from_argb(
            channel(Self::a),
            channel(Self::r),
            channel(Self::g),
            channel(Self::b),
        )
    }
}

impl From<u32> for Color {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Color> for u32 {
    fn from(color: Color) -> Self {
        color.0
    }
}
