//! Procedural source images for scenes and tests.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::display::PixelBuffer;
use crate::error::{RasterError, Result};
use crate::util::Rng;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Pattern {
    Solid {
        color: Color,
    },
    /// Alternating `tile` x `tile` squares, `a` at the top-left
    Checkerboard {
        tile: u32,
        a: Color,
        b: Color,
    },
    /// Classic x ^ y gray ramp
    Xor,
    /// Uniformly random raw values, reproducible from `seed`
    Noise {
        seed: u64,
    },
}

impl Default for Pattern {
    fn default() -> Self {
        Self::Solid {
            color: Color::WHITE,
        }
    }
}

impl Pattern {
    /// Paint the whole buffer in native (unrotated) coordinates.
    /// Colors are encoded before anything is written.
    pub fn paint(&self, buffer: &mut PixelBuffer) -> Result<()> {
        let (w, h) = (buffer.width(), buffer.height());
        match *self {
            Self::Solid { color } => buffer.fill(color),
            Self::Checkerboard { tile, a, b } => {
                if tile == 0 {
                    return Err(RasterError::InvalidDimensions {
                        width: 0,
                        height: 0,
                    });
                }
                let raw_a = buffer.encode(a)?;
                let raw_b = buffer.encode(b)?;
                for y in 0..h {
                    for x in 0..w {
                        let checker = ((x / tile) + (y / tile)) % 2 == 0;
                        let index = buffer.pixel_index(x, y);
                        buffer.write_index(index, if checker { raw_a } else { raw_b });
                    }
                }
                Ok(())
            },
            Self::Xor => {
                let format = buffer.format();
                for y in 0..h {
                    for x in 0..w {
                        let v = ((x ^ y) & 0xFF) as u8;
                        let raw = if format.is_indexed() {
                            u32::from(v) & format.depth().max_value()
                        } else {
                            buffer.encode(Color::from_rgb(v, v, v))?
                        };
                        let index = buffer.pixel_index(x, y);
                        buffer.write_index(index, raw);
                    }
                }
                Ok(())
            },
            Self::Noise { seed } => {
                let format = buffer.format();
                let entries = buffer.palette().map_or(0, |p| p.len() as u32);
                let mut rng = Rng::new(seed);
                for index in 0..(w as usize * h as usize) {
                    let mut raw = rng.next_u32() & format.depth().max_value();
                    if format.is_indexed() && entries > 0 {
                        raw %= entries;
                    }
                    if format.has_alpha() {
                        raw |= 0xFF00_0000;
                    }
                    buffer.write_index(index, raw);
                }
                Ok(())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::PixelFormat;
    use crate::orientation::Orientation;

    fn buffer(format: PixelFormat) -> PixelBuffer {
        PixelBuffer::new(8, 4, format, Orientation::Rotate0).unwrap()
    }

    #[test]
    fn test_checkerboard_tiles() {
        let mut buf = buffer(PixelFormat::RGB888);
        let pattern = Pattern::Checkerboard {
            tile: 2,
            a: Color::WHITE,
            b: Color::BLACK,
        };
        pattern.paint(&mut buf).unwrap();
        assert_eq!(buf.get_pixel(0, 0).unwrap(), Color::WHITE);
        assert_eq!(buf.get_pixel(1, 1).unwrap(), Color::WHITE);
        assert_eq!(buf.get_pixel(2, 0).unwrap(), Color::BLACK);
        assert_eq!(buf.get_pixel(2, 2).unwrap(), Color::WHITE);
    }

    #[test]
    fn test_checkerboard_zero_tile_rejected() {
        let mut buf = buffer(PixelFormat::RGB888);
        let before = buf.clone();
        let pattern = Pattern::Checkerboard {
            tile: 0,
            a: Color::WHITE,
            b: Color::BLACK,
        };
        assert!(pattern.paint(&mut buf).is_err());
        assert_eq!(buf, before);
    }

    #[test]
    fn test_noise_is_reproducible() {
        for format in [PixelFormat::GRAY2, PixelFormat::INDEXED4, PixelFormat::ARGB8888] {
            let mut a = buffer(format);
            let mut b = buffer(format);
            Pattern::Noise { seed: 7 }.paint(&mut a).unwrap();
            Pattern::Noise { seed: 7 }.paint(&mut b).unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_noise_argb_is_opaque() {
        let mut buf = buffer(PixelFormat::ARGB8888);
        Pattern::Noise { seed: 3 }.paint(&mut buf).unwrap();
        for y in 0..4 {
            for x in 0..8 {
                assert_eq!(buf.get_pixel(x, y).unwrap().a(), 0xFF);
            }
        }
    }

    #[test]
    fn test_xor_on_indexed() {
        let mut buf = buffer(PixelFormat::INDEXED2);
        Pattern::Xor.paint(&mut buf).unwrap();
        assert_eq!(buf.get_raw(3, 1).unwrap(), 2);
    }

    #[test]
    fn test_pattern_json_tags() {
        let json = r#"{"kind":"checkerboard","tile":4,"a":4294967295,"b":4278190080}"#;
        let pattern: Pattern = serde_json::from_str(json).unwrap();
        assert_eq!(
            pattern,
            Pattern::Checkerboard {
                tile: 4,
                a: Color::WHITE,
                b: Color::BLACK
            }
        );
    }
}
