//! Pixel formats: bit depth, channel layout and byte order.
//!
//! All pixel storage goes through [`BitDepth::address`]. Packing and unpacking
//! of channels is one explicit arm per bit depth / layout, there is no
//! "everything else" branch.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{RasterError, Result};

// ============================================================================
// Bit Depth & Addressing
// ============================================================================

/// Supported bits per pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitDepth {
    One,
    Two,
    Four,
    Eight,
    Sixteen,
    TwentyFour,
    ThirtyTwo,
}

/// Location of a pixel inside backing storage.
/// `shift` is the intra-byte bit offset and is only non-zero below 8 bpp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelAddress {
    pub byte: usize,
    pub shift: u32,
}

impl BitDepth {
    pub fn from_bits(bits: u32) -> Result<Self> {
        match bits {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            4 => Ok(Self::Four),
            8 => Ok(Self::Eight),
            16 => Ok(Self::Sixteen),
            24 => Ok(Self::TwentyFour),
            32 => Ok(Self::ThirtyTwo),
            _ => Err(RasterError::UnsupportedFormat {
                bits_per_pixel: bits,
                reason: "bits per pixel must be 1, 2, 4, 8, 16, 24 or 32",
            }),
        }
    }

    #[inline]
    pub const fn bits(self) -> u32 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Four => 4,
            Self::Eight => 8,
            Self::Sixteen => 16,
            Self::TwentyFour => 24,
            Self::ThirtyTwo => 32,
        }
    }

    /// Largest raw value a pixel of this depth can hold
    #[inline]
    pub const fn max_value(self) -> u32 {
        match self {
            Self::ThirtyTwo => u32::MAX,
            _ => (1 << self.bits()) - 1,
        }
    }

    #[inline]
    pub const fn is_sub_byte(self) -> bool {
        matches!(self, Self::One | Self::Two | Self::Four)
    }

    /// Bytes needed for `pixels` packed pixels: ceil(pixels * bpp / 8)
    pub fn storage_len(self, pixels: usize) -> usize {
        (pixels * self.bits() as usize).div_ceil(8)
    }

    /// Address of the `index`-th pixel in row-major order.
    ///
    /// Byte-aligned depths use `index * bytes_per_pixel`; sub-byte depths use
    /// `index * bpp / 8` with a shift of `(index * bpp) % 8`.
    #[inline]
    pub const fn address(self, index: usize) -> PixelAddress {
        match self {
            Self::One => Self::packed_address(index, 1),
            Self::Two => Self::packed_address(index, 2),
            Self::Four => Self::packed_address(index, 4),
            Self::Eight => PixelAddress {
                byte: index,
                shift: 0,
            },
            Self::Sixteen => PixelAddress {
                byte: index * 2,
                shift: 0,
            },
            Self::TwentyFour => PixelAddress {
                byte: index * 3,
                shift: 0,
            },
            Self::ThirtyTwo => PixelAddress {
                byte: index * 4,
                shift: 0,
            },
        }
    }

    #[inline]
    const fn packed_address(index: usize, bits: usize) -> PixelAddress {
        let bit = index * bits;
        PixelAddress {
            byte: bit / 8,
            shift: (bit % 8) as u32,
        }
    }
}

// ============================================================================
// Layout & Byte Order
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelLayout {
    /// Luminance, 1/2/4/8 bpp
    Gray,
    /// Palette index, 1/2/4/8 bpp
    Indexed,
    Rgb565,
    Rgb888,
    Argb8888,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ByteOrder {
    #[default]
    Little,
    Big,
}

// ============================================================================
// Palette
// ============================================================================

/// Color table for indexed buffers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette(Vec<Color>);

impl Palette {
    pub fn new(colors: Vec<Color>) -> Self {
        Self(colors)
    }

    /// Evenly spaced gray ramp with one entry per representable index
    pub fn grayscale(depth: BitDepth) -> Self {
        let max = depth.max_value().min(255);
        Self(
            (0..=max)
                .map(|i| {
                    let v = (i * 255 / max) as u8;
                    Color::from_rgb(v, v, v)
                })
                .collect(),
        )
    }

    #[inline]
    pub fn get(&self, index: u32) -> Option<Color> {
        self.0.get(index as usize).copied()
    }

    /// First index holding exactly `color`
    pub fn find(&self, color: Color) -> Option<u32> {
        self.0.iter().position(|&c| c == color).map(|i| i as u32)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn colors(&self) -> &[Color] {
        &self.0
    }

    /// True when every entry of `self` sits at the same index in `other`
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        other.0.starts_with(&self.0)
    }
}

// ============================================================================
// PixelFormat
// ============================================================================

/// Immutable description of how pixels are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "FormatSpec", into = "FormatSpec")]
pub struct PixelFormat {
    depth: BitDepth,
    layout: ChannelLayout,
    order: ByteOrder,
}

/// Serialized form of a [`PixelFormat`], validated on load
#[derive(Serialize, Deserialize)]
struct FormatSpec {
    bits_per_pixel: u32,
    layout: ChannelLayout,
    #[serde(default)]
    order: ByteOrder,
}

impl TryFrom<FormatSpec> for PixelFormat {
    type Error = RasterError;

    fn try_from(spec: FormatSpec) -> Result<Self> {
        Self::new(spec.bits_per_pixel, spec.layout, spec.order)
    }
}

impl From<PixelFormat> for FormatSpec {
    fn from(format: PixelFormat) -> Self {
        Self {
            bits_per_pixel: format.bits_per_pixel(),
            layout: format.layout,
            order: format.order,
        }
    }
}

impl PixelFormat {
    pub const GRAY1: Self = Self::fixed(BitDepth::One, ChannelLayout::Gray);
    pub const GRAY2: Self = Self::fixed(BitDepth::Two, ChannelLayout::Gray);
    pub const GRAY4: Self = Self::fixed(BitDepth::Four, ChannelLayout::Gray);
    pub const GRAY8: Self = Self::fixed(BitDepth::Eight, ChannelLayout::Gray);
    pub const INDEXED1: Self = Self::fixed(BitDepth::One, ChannelLayout::Indexed);
    pub const INDEXED2: Self = Self::fixed(BitDepth::Two, ChannelLayout::Indexed);
    pub const INDEXED4: Self = Self::fixed(BitDepth::Four, ChannelLayout::Indexed);
    pub const INDEXED8: Self = Self::fixed(BitDepth::Eight, ChannelLayout::Indexed);
    pub const RGB565: Self = Self::fixed(BitDepth::Sixteen, ChannelLayout::Rgb565);
    pub const RGB888: Self = Self::fixed(BitDepth::TwentyFour, ChannelLayout::Rgb888);
    pub const ARGB8888: Self = Self::fixed(BitDepth::ThirtyTwo, ChannelLayout::Argb8888);

    const fn fixed(depth: BitDepth, layout: ChannelLayout) -> Self {
        Self {
            depth,
            layout,
            order: ByteOrder::Little,
        }
    }

    /// Validate a bit depth / layout / byte order combination
    pub fn new(bits_per_pixel: u32, layout: ChannelLayout, order: ByteOrder) -> Result<Self> {
        let depth = BitDepth::from_bits(bits_per_pixel)?;
        let matches = match layout {
            ChannelLayout::Gray | ChannelLayout::Indexed => {
                depth.is_sub_byte() || depth == BitDepth::Eight
            },
            ChannelLayout::Rgb565 => depth == BitDepth::Sixteen,
            ChannelLayout::Rgb888 => depth == BitDepth::TwentyFour,
            ChannelLayout::Argb8888 => depth == BitDepth::ThirtyTwo,
        };
        if !matches {
            return Err(RasterError::UnsupportedFormat {
                bits_per_pixel,
                reason: "channel layout does not fit this bit depth",
            });
        }
        Ok(Self {
            depth,
            layout,
            order,
        })
    }

    /// Same format with a different byte order (no effect below 16 bpp)
    pub const fn with_order(self, order: ByteOrder) -> Self {
        Self { order, ..self }
    }

    #[inline]
    pub const fn depth(&self) -> BitDepth {
        self.depth
    }

    #[inline]
    pub const fn bits_per_pixel(&self) -> u32 {
        self.depth.bits()
    }

    #[inline]
    pub const fn layout(&self) -> ChannelLayout {
        self.layout
    }

    #[inline]
    pub const fn order(&self) -> ByteOrder {
        self.order
    }

    pub const fn has_alpha(&self) -> bool {
        matches!(self.layout, ChannelLayout::Argb8888)
    }

    pub const fn is_indexed(&self) -> bool {
        matches!(self.layout, ChannelLayout::Indexed)
    }

    /// RGB565, RGB888 and ARGB8888: formats any source can be converted into
    pub const fn is_full_color(&self) -> bool {
        matches!(
            self.layout,
            ChannelLayout::Rgb565 | ChannelLayout::Rgb888 | ChannelLayout::Argb8888
        )
    }

    // ------------------------------------------------------------------------
    // Raw storage access
    // ------------------------------------------------------------------------

    /// Read the raw packed value of pixel `index` from `bytes`
    #[inline]
    pub fn read(&self, bytes: &[u8], index: usize) -> u32 {
        let PixelAddress { byte, shift } = self.depth.address(index);
        match self.depth {
            BitDepth::One | BitDepth::Two | BitDepth::Four => {
                (u32::from(bytes[byte]) >> shift) & self.depth.max_value()
            },
            BitDepth::Eight => u32::from(bytes[byte]),
            BitDepth::Sixteen => {
                let raw = [bytes[byte], bytes[byte + 1]];
                u32::from(match self.order {
                    ByteOrder::Little => u16::from_le_bytes(raw),
                    ByteOrder::Big => u16::from_be_bytes(raw),
                })
            },
            BitDepth::TwentyFour => {
                let (b0, b1, b2) = (bytes[byte], bytes[byte + 1], bytes[byte + 2]);
                match self.order {
                    ByteOrder::Little => u32::from_le_bytes([b0, b1, b2, 0]),
                    ByteOrder::Big => u32::from_be_bytes([0, b0, b1, b2]),
                }
            },
            BitDepth::ThirtyTwo => {
                let raw = [bytes[byte], bytes[byte + 1], bytes[byte + 2], bytes[byte + 3]];
                match self.order {
                    ByteOrder::Little => u32::from_le_bytes(raw),
                    ByteOrder::Big => u32::from_be_bytes(raw),
                }
            },
        }
    }

    /// Write the raw packed value of pixel `index`. Below 8 bpp only the
    /// pixel's own bits are touched.
    #[inline]
    pub fn write(&self, bytes: &mut [u8], index: usize, raw: u32) {
        let PixelAddress { byte, shift } = self.depth.address(index);
        match self.depth {
            BitDepth::One | BitDepth::Two | BitDepth::Four => {
                let mask = (self.depth.max_value() << shift) as u8;
                let bits = ((raw & self.depth.max_value()) << shift) as u8;
                bytes[byte] = (bytes[byte] & !mask) | bits;
            },
            BitDepth::Eight => bytes[byte] = raw as u8,
            BitDepth::Sixteen => {
                let raw = raw as u16;
                let packed = match self.order {
                    ByteOrder::Little => raw.to_le_bytes(),
                    ByteOrder::Big => raw.to_be_bytes(),
                };
                bytes[byte..byte + 2].copy_from_slice(&packed);
            },
            BitDepth::TwentyFour => {
                let packed = match self.order {
                    ByteOrder::Little => {
                        let [b0, b1, b2, _] = raw.to_le_bytes();
                        [b0, b1, b2]
                    },
                    ByteOrder::Big => {
                        let [_, b0, b1, b2] = raw.to_be_bytes();
                        [b0, b1, b2]
                    },
                };
                bytes[byte..byte + 3].copy_from_slice(&packed);
            },
            BitDepth::ThirtyTwo => {
                let packed = match self.order {
                    ByteOrder::Little => raw.to_le_bytes(),
                    ByteOrder::Big => raw.to_be_bytes(),
                };
                bytes[byte..byte + 4].copy_from_slice(&packed);
            },
        }
    }

    // ------------------------------------------------------------------------
    // Channel packing
    // ------------------------------------------------------------------------

    /// Pack a canonical color into this format's raw value.
    /// Indexed formats need an exact palette match.
    pub fn encode(&self, color: Color, palette: Option<&Palette>) -> Result<u32> {
        match self.layout {
            ChannelLayout::Gray => Ok(u32::from(color.luma()) >> (8 - self.depth.bits())),
            ChannelLayout::Indexed => palette
                .and_then(|p| p.find(color))
                .filter(|&index| index <= self.depth.max_value())
                .ok_or(RasterError::UnsupportedConversion {
                    from: Self::ARGB8888,
                    to: *self,
                }),
            ChannelLayout::Rgb565 => {
                let r = u32::from(color.r() >> 3);
                let g = u32::from(color.g() >> 2);
                let b = u32::from(color.b() >> 3);
                Ok(r << 11 | g << 5 | b)
            },
            ChannelLayout::Rgb888 => Ok(color.0 & 0x00FF_FFFF),
            ChannelLayout::Argb8888 => Ok(color.0),
        }
    }

    /// Unpack a raw value into a canonical color. Formats without alpha
    /// decode as fully opaque.
    pub fn decode(&self, raw: u32, palette: Option<&Palette>) -> Color {
        match self.layout {
            ChannelLayout::Gray => {
                let max = self.depth.max_value();
                let v = ((raw & max) * 255 / max) as u8;
                Color::from_rgb(v, v, v)
            },
            ChannelLayout::Indexed => palette.and_then(|p| p.get(raw)).unwrap_or(Color::BLACK),
            ChannelLayout::Rgb565 => {
                let r = ((raw >> 11) & 0x1F) as u8;
                let g = ((raw >> 5) & 0x3F) as u8;
                let b = (raw & 0x1F) as u8;
                Color::from_rgb(r << 3 | r >> 2, g << 2 | g >> 4, b << 3 | b >> 2)
            },
            ChannelLayout::Rgb888 => Color(raw & 0x00FF_FFFF).opaque(),
            ChannelLayout::Argb8888 => Color(raw),
        }
    }

    /// The color a buffer of this format holds after storing `color`
    pub fn quantize(&self, color: Color, palette: Option<&Palette>) -> Result<Color> {
        Ok(self.decode(self.encode(color, palette)?, palette))
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.layout {
            ChannelLayout::Gray => write!(f, "GRAY{}", self.bits_per_pixel())?,
            ChannelLayout::Indexed => write!(f, "INDEXED{}", self.bits_per_pixel())?,
            ChannelLayout::Rgb565 => write!(f, "RGB565")?,
            ChannelLayout::Rgb888 => write!(f, "RGB888")?,
            ChannelLayout::Argb8888 => write!(f, "ARGB8888")?,
        }
        if self.order == ByteOrder::Big && self.bits_per_pixel() >= 16 {
            write!(f, "_BE")?;
        }
        Ok(())
    }
}
