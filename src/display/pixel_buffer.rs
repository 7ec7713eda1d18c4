use log::trace;

use super::FrameView;
use crate::color::Color;
use crate::error::{RasterError, Result};
use crate::format::{Palette, PixelFormat};
use crate::orientation::{Dims, Orientation, Rect};

// ============================================================================
// PixelBuffer
// ============================================================================

/// Frame buffer of any supported bit depth.
///
/// Pixels are always addressed in local (orientation-0) coordinates,
/// `index = y * width + x`. The orientation only matters when this buffer is
/// the destination of a draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    format: PixelFormat,
    orientation: Orientation,
    palette: Option<Palette>,
}

impl PixelBuffer {
    /// Allocate a zeroed buffer of ceil(width * height * bpp / 8) bytes.
    /// Indexed formats start with a grayscale palette.
    pub fn new(
        width: i32,
        height: i32,
        format: PixelFormat,
        orientation: Orientation,
    ) -> Result<Self> {
        let invalid = RasterError::InvalidDimensions { width, height };
        if width <= 0 || height <= 0 {
            return Err(invalid);
        }
        let count = (width as usize).checked_mul(height as usize).ok_or(invalid)?;
        count
            .checked_mul(format.bits_per_pixel() as usize)
            .ok_or(invalid)?;

        let palette = format
            .is_indexed()
            .then(|| Palette::grayscale(format.depth()));

        Ok(Self {
            pixels: vec![0; format.depth().storage_len(count)],
            width: width as u32,
            height: height as u32,
            format,
            orientation,
            palette,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn palette(&self) -> Option<&Palette> {
        self.palette.as_ref()
    }

    /// Replace the color table of an indexed buffer
    pub fn set_palette(&mut self, palette: Palette) -> Result<()> {
        let bits = self.format.bits_per_pixel();
        if !self.format.is_indexed() {
            return Err(RasterError::UnsupportedFormat {
                bits_per_pixel: bits,
                reason: "only indexed formats carry a palette",
            });
        }
        if palette.len() > self.format.depth().max_value() as usize + 1 {
            return Err(RasterError::UnsupportedFormat {
                bits_per_pixel: bits,
                reason: "palette has more entries than the bit depth can index",
            });
        }
        self.palette = Some(palette);
        Ok(())
    }

    /// Extent a caller drawing into this buffer sees: width and height swap
    /// for quarter-turn orientations.
    pub fn logical_size(&self) -> Dims {
        let (w, h) = self
            .orientation
            .rotate_size(self.width as i32, self.height as i32);
        Dims::new(w, h)
    }

    /// Local-space rectangle covering the whole buffer
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width as i32, self.height as i32)
    }

    /// Check if coordinates are within bounds
    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        self.bounds().contains(x, y)
    }

    /// Row-major pixel index (not a byte offset)
    #[inline]
    pub(crate) fn pixel_index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    fn checked_index(&self, x: i32, y: i32) -> Result<usize> {
        if self.in_bounds(x, y) {
            Ok(self.pixel_index(x as u32, y as u32))
        } else {
            Err(RasterError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            })
        }
    }

    #[inline]
    pub(crate) fn read_index(&self, index: usize) -> u32 {
        self.format.read(&self.pixels, index)
    }

    #[inline]
    pub(crate) fn write_index(&mut self, index: usize, raw: u32) {
        self.format.write(&mut self.pixels, index, raw);
    }

    // ========================================================================
    // Color packing
    // ========================================================================

    /// Pack a canonical color for this buffer
    #[inline]
    pub fn encode(&self, color: Color) -> Result<u32> {
        self.format.encode(color, self.palette.as_ref())
    }

    #[inline]
    pub fn decode(&self, raw: u32) -> Color {
        self.format.decode(raw, self.palette.as_ref())
    }

    /// The color this buffer would hold after storing `color`
    pub fn quantize(&self, color: Color) -> Result<Color> {
        self.format.quantize(color, self.palette.as_ref())
    }

    // ========================================================================
    // Pixel access
    // ========================================================================

    /// Read a pixel as a canonical ARGB color
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Result<Color> {
        let index = self.checked_index(x, y)?;
        Ok(self.decode(self.read_index(index)))
    }

    /// Write a pixel. Below 8 bpp the neighbouring pixels sharing the byte
    /// are left untouched.
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) -> Result<()> {
        let index = self.checked_index(x, y)?;
        let raw = self.encode(color)?;
        self.write_index(index, raw);
        Ok(())
    }

    /// Raw packed value of a pixel
    #[inline]
    pub fn get_raw(&self, x: i32, y: i32) -> Result<u32> {
        Ok(self.read_index(self.checked_index(x, y)?))
    }

    /// Store a raw packed value, masked to the bit depth
    #[inline]
    pub fn set_raw(&mut self, x: i32, y: i32, raw: u32) -> Result<()> {
        let index = self.checked_index(x, y)?;
        self.write_index(index, raw & self.format.depth().max_value());
        Ok(())
    }

    // ========================================================================
    // Fills
    // ========================================================================

    /// Overwrite every pixel with `color`. Nothing is written if the color
    /// cannot be encoded.
    pub fn fill(&mut self, color: Color) -> Result<()> {
        let raw = self.encode(color)?;
        let count = self.width as usize * self.height as usize;
        trace!(
            "fill {}x{} {} with {:#010x}",
            self.width,
            self.height,
            self.format,
            color.0
        );
        for index in 0..count {
            self.write_index(index, raw);
        }
        Ok(())
    }

    /// Fill a local-space rectangle, clipped to the buffer
    pub fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<()> {
        let raw = self.encode(color)?;
        let Some(clip) = rect.normalize().intersect(&self.bounds()) else {
            return Ok(());
        };
        for y in clip.y..clip.y + clip.h {
            let row = self.pixel_index(0, y as u32);
            for x in clip.x..clip.x + clip.w {
                self.write_index(row + x as usize, raw);
            }
        }
        Ok(())
    }

    // ========================================================================
    // Raw storage
    // ========================================================================

    /// Raw bytes for display transfer
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Read-only handoff to a display-transfer collaborator
    pub fn view(&self) -> FrameView<'_> {
        FrameView::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{BitDepth, ByteOrder};

    fn all_formats() -> Vec<PixelFormat> {
        vec![
            PixelFormat::GRAY1,
            PixelFormat::GRAY2,
            PixelFormat::GRAY4,
            PixelFormat::GRAY8,
            PixelFormat::INDEXED1,
            PixelFormat::INDEXED2,
            PixelFormat::INDEXED4,
            PixelFormat::INDEXED8,
            PixelFormat::RGB565,
            PixelFormat::RGB565.with_order(ByteOrder::Big),
            PixelFormat::RGB888,
            PixelFormat::RGB888.with_order(ByteOrder::Big),
            PixelFormat::ARGB8888,
            PixelFormat::ARGB8888.with_order(ByteOrder::Big),
        ]
    }

    /// Colors every format can store: gray levels on the palette ramp, plus
    /// arbitrary colors for the full-color formats
    fn sample_colors(buffer: &PixelBuffer) -> Vec<Color> {
        if buffer.format().is_full_color() {
            vec![
                Color(0xFF12_3456),
                Color(0x80FF_0000),
                Color(0x0000_FF00),
                Color::WHITE,
                Color::BLACK,
            ]
        } else {
            let max = buffer.format().depth().max_value();
            (0..=max)
                .map(|i| {
                    let v = (i * 255 / max) as u8;
                    Color::from_rgb(v, v, v)
                })
                .collect()
        }
    }

    #[test]
    fn test_invalid_dimensions() {
        assert_eq!(
            PixelBuffer::new(0, 10, PixelFormat::RGB888, Orientation::Rotate0),
            Err(RasterError::InvalidDimensions {
                width: 0,
                height: 10
            })
        );
        assert!(PixelBuffer::new(10, -1, PixelFormat::RGB888, Orientation::Rotate0).is_err());
    }

    #[test]
    fn test_storage_size() {
        for format in all_formats() {
            let b = PixelBuffer::new(7, 3, format, Orientation::Rotate0).unwrap();
            let expected = (7 * 3 * format.bits_per_pixel() as usize).div_ceil(8);
            assert_eq!(b.as_bytes().len(), expected, "{}", format);
        }
    }

    #[test]
    fn test_round_trip_all_formats() {
        for format in all_formats() {
            let mut b = PixelBuffer::new(5, 3, format, Orientation::Rotate0).unwrap();
            for color in sample_colors(&b) {
                for y in 0..3 {
                    for x in 0..5 {
                        b.set_pixel(x, y, color).unwrap();
                        let expected = b.quantize(color).unwrap();
                        assert_eq!(b.get_pixel(x, y).unwrap(), expected, "{}", format);
                    }
                }
            }
        }
    }

    #[test]
    fn test_round_trip_exact_for_24_and_32() {
        let mut b = PixelBuffer::new(2, 2, PixelFormat::ARGB8888, Orientation::Rotate0).unwrap();
        b.set_pixel(1, 1, Color(0x7F12_3456)).unwrap();
        assert_eq!(b.get_pixel(1, 1).unwrap(), Color(0x7F12_3456));

        let mut b = PixelBuffer::new(2, 2, PixelFormat::RGB888, Orientation::Rotate0).unwrap();
        b.set_pixel(1, 0, Color(0x0012_3456)).unwrap();
        assert_eq!(b.get_pixel(1, 0).unwrap(), Color(0xFF12_3456));
    }

    #[test]
    fn test_fill_every_depth() {
        for format in all_formats() {
            let mut b = PixelBuffer::new(13, 5, format, Orientation::Rotate90).unwrap();
            let colors = sample_colors(&b);
            let color = colors[colors.len() / 2];
            b.fill(color).unwrap();
            let expected = b.quantize(color).unwrap();
            for y in 0..5 {
                for x in 0..13 {
                    assert_eq!(b.get_pixel(x, y).unwrap(), expected, "{} at {},{}", format, x, y);
                }
            }
        }
    }

    #[test]
    fn test_fill_24bpp_packs_three_bytes_per_pixel() {
        let mut b = PixelBuffer::new(4, 2, PixelFormat::RGB888, Orientation::Rotate0).unwrap();
        b.fill(Color(0x00FF_0000)).unwrap();
        assert_eq!(b.as_bytes().len(), 24);
        for chunk in b.as_bytes().chunks_exact(3) {
            assert_eq!(chunk, [0x00, 0x00, 0xFF]);
        }
        assert_eq!(b.get_pixel(3, 1).unwrap(), Color(0xFFFF_0000));
    }

    #[test]
    fn test_fill_unencodable_writes_nothing() {
        let mut b = PixelBuffer::new(4, 4, PixelFormat::INDEXED2, Orientation::Rotate0).unwrap();
        b.fill(Color::WHITE).unwrap();
        let before = b.as_bytes().to_vec();
        assert!(matches!(
            b.fill(Color::from_rgb(1, 2, 3)),
            Err(RasterError::UnsupportedConversion { .. })
        ));
        assert_eq!(b.as_bytes(), &before[..]);
    }

    #[test]
    fn test_sub_byte_neighbours_untouched() {
        let mut b = PixelBuffer::new(8, 1, PixelFormat::GRAY1, Orientation::Rotate0).unwrap();
        b.set_pixel(3, 0, Color::WHITE).unwrap();
        assert_eq!(b.as_bytes(), &[0b0000_1000]);
        b.set_pixel(4, 0, Color::WHITE).unwrap();
        b.set_pixel(3, 0, Color::BLACK).unwrap();
        assert_eq!(b.as_bytes(), &[0b0001_0000]);
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let mut b = PixelBuffer::new(4, 4, PixelFormat::RGB565, Orientation::Rotate0).unwrap();
        assert!(matches!(
            b.get_pixel(4, 0),
            Err(RasterError::OutOfBounds { x: 4, y: 0, .. })
        ));
        assert!(b.set_pixel(0, -1, Color::WHITE).is_err());
        assert!(b.set_raw(0, 4, 0).is_err());
    }

    #[test]
    fn test_fill_rect_clips() {
        let mut b = PixelBuffer::new(4, 4, PixelFormat::GRAY8, Orientation::Rotate0).unwrap();
        b.fill_rect(Rect::new(2, 2, 10, 10), Color::WHITE).unwrap();
        assert_eq!(b.get_pixel(1, 1).unwrap(), Color::BLACK);
        assert_eq!(b.get_pixel(2, 2).unwrap(), Color::WHITE);
        assert_eq!(b.get_pixel(3, 3).unwrap(), Color::WHITE);
        // Negative extents are normalized first
        b.fill_rect(Rect::new(2, 2, -2, -2), Color::WHITE).unwrap();
        assert_eq!(b.get_pixel(0, 0).unwrap(), Color::WHITE);
        assert_eq!(b.get_pixel(2, 0).unwrap(), Color::BLACK);
    }

    #[test]
    fn test_logical_size_swaps_for_odd_orientation() {
        let b = PixelBuffer::new(480, 800, PixelFormat::RGB565, Orientation::Rotate270).unwrap();
        assert_eq!(b.logical_size(), Dims::new(800, 480));
        let b = PixelBuffer::new(480, 800, PixelFormat::RGB565, Orientation::Rotate180).unwrap();
        assert_eq!(b.logical_size(), Dims::new(480, 800));
    }

    #[test]
    fn test_palette_rules() {
        let mut b = PixelBuffer::new(2, 2, PixelFormat::INDEXED1, Orientation::Rotate0).unwrap();
        let red = Color::from_rgb(255, 0, 0);
        b.set_palette(Palette::new(vec![Color::BLACK, red])).unwrap();
        b.set_pixel(1, 1, red).unwrap();
        assert_eq!(b.get_raw(1, 1).unwrap(), 1);
        assert_eq!(b.get_pixel(1, 1).unwrap(), red);

        let too_many = Palette::grayscale(BitDepth::Two);
        assert!(b.set_palette(too_many).is_err());

        let mut rgb = PixelBuffer::new(2, 2, PixelFormat::RGB888, Orientation::Rotate0).unwrap();
        assert!(rgb.set_palette(Palette::new(vec![red])).is_err());
    }
}
