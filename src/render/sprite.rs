//! Exact copy path: one source pixel per destination pixel.

use log::trace;

use super::place;
use crate::convert;
use crate::display::PixelBuffer;
use crate::error::Result;
use crate::orientation::{Orientation, Rect};

/// Copy `src` into `dest` with its logical top-left at (x, y).
///
/// The destination rectangle has already been turned by the destination's
/// orientation, so the source is read with the compensated rotation
/// `requested + intrinsic`; otherwise a W x H source would be read as H x W.
pub(super) fn render(
    dest: &mut PixelBuffer,
    src: &PixelBuffer,
    x: i32,
    y: i32,
    requested: Orientation,
) -> Result<()> {
    let (sw, sh) = (src.width() as i32, src.height() as i32);
    let (lw, lh) = requested.rotate_size(sw, sh);
    let effective = Orientation::compensate(requested, dest.orientation());
    let transfer = convert::plan(src, dest, false)?;

    let Some((dest_rect, clip)) = place(dest, Rect::new(x, y, lw, lh)) else {
        return Ok(());
    };
    trace!(
        "sprite {:?} -> {:?} effective {:?} {:?}",
        dest_rect,
        clip,
        effective,
        transfer
    );

    for dy in clip.y..clip.y + clip.h {
        let v = dy - dest_rect.y;
        for dx in clip.x..clip.x + clip.w {
            let u = dx - dest_rect.x;
            let (sx, sy) = effective.unmap_index(u, v, sw, sh);
            let raw = src.read_index(src.pixel_index(sx as u32, sy as u32));
            let raw = convert::convert_raw(raw, src, dest, transfer)?;
            let di = dest.pixel_index(dx as u32, dy as u32);
            dest.write_index(di, raw);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::destination_rect;
    use crate::color::Color;
    use crate::format::PixelFormat;

    /// 3x2 source with a distinct color per pixel
    fn numbered_source() -> PixelBuffer {
        let mut src = PixelBuffer::new(3, 2, PixelFormat::ARGB8888, Orientation::Rotate0).unwrap();
        for y in 0..2 {
            for x in 0..3 {
                src.set_pixel(x, y, Color(0xFF00_0000 | (y * 3 + x) as u32)).unwrap();
            }
        }
        src
    }

    #[test]
    fn test_copy_without_orientation() {
        let src = numbered_source();
        let mut dest = PixelBuffer::new(8, 8, PixelFormat::ARGB8888, Orientation::Rotate0).unwrap();
        render(&mut dest, &src, 2, 1, Orientation::Rotate0).unwrap();
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(dest.get_pixel(2 + x, 1 + y).unwrap(), src.get_pixel(x, y).unwrap());
            }
        }
        assert_eq!(dest.get_pixel(5, 1).unwrap(), Color(0));
    }

    #[test]
    fn test_quarter_turn_destination_keeps_full_extent() {
        let src = numbered_source();
        for o in [Orientation::Rotate90, Orientation::Rotate270] {
            let mut dest = PixelBuffer::new(10, 12, PixelFormat::ARGB8888, o).unwrap();
            render(&mut dest, &src, 1, 2, Orientation::Rotate0).unwrap();
            let rect = destination_rect(&dest, Rect::new(1, 2, 3, 2)).unwrap();
            assert_eq!((rect.w, rect.h), (2, 3));
            // every source pixel appears exactly once inside the rect
            let mut seen = [0; 6];
            for y in rect.y..rect.y + rect.h {
                for x in rect.x..rect.x + rect.w {
                    let c = dest.get_pixel(x, y).unwrap();
                    seen[(c.0 & 0xFF) as usize] += 1;
                }
            }
            assert_eq!(seen, [1; 6], "{:?}", o);
        }
    }

    #[test]
    fn test_rotation_follows_index_mapping() {
        let src = numbered_source();
        let mut dest = PixelBuffer::new(6, 6, PixelFormat::ARGB8888, Orientation::Rotate180).unwrap();
        render(&mut dest, &src, 0, 0, Orientation::Rotate0).unwrap();
        let rect = destination_rect(&dest, Rect::new(0, 0, 3, 2)).unwrap();
        for sy in 0..2 {
            for sx in 0..3 {
                let (u, v) = Orientation::Rotate180.map_index(sx, sy, 3, 2);
                assert_eq!(
                    dest.get_pixel(rect.x + u, rect.y + v).unwrap(),
                    src.get_pixel(sx, sy).unwrap()
                );
            }
        }
    }

    #[test]
    fn test_clipped_copy_writes_inside_only() {
        let src = numbered_source();
        let mut dest = PixelBuffer::new(4, 4, PixelFormat::ARGB8888, Orientation::Rotate0).unwrap();
        render(&mut dest, &src, 2, 3, Orientation::Rotate0).unwrap();
        assert_eq!(dest.get_pixel(2, 3).unwrap(), src.get_pixel(0, 0).unwrap());
        assert_eq!(dest.get_pixel(3, 3).unwrap(), src.get_pixel(1, 0).unwrap());
        render(&mut dest, &src, -10, -10, Orientation::Rotate0).unwrap();
    }
}
