//! General path: every destination pixel samples the source through the
//! inverse of scale + rotation, then optionally blends.

use log::trace;

use super::{place, DrawParams, Filter};
use crate::color::Color;
use crate::convert;
use crate::display::PixelBuffer;
use crate::error::Result;
use crate::orientation::{Orientation, Rect};

/// Maps positions in the scaled extent (ew x eh) back onto source pixels
struct Sampler<'a> {
    src: &'a PixelBuffer,
    sw: i32,
    sh: i32,
    ew: i32,
    eh: i32,
}

impl Sampler<'_> {
    #[inline]
    fn pixel(&self, x: i32, y: i32) -> u32 {
        self.src.read_index(self.src.pixel_index(x as u32, y as u32))
    }

    /// Source pixel covering scaled position (a, b)
    #[inline]
    fn nearest_xy(&self, a: i32, b: i32) -> (i32, i32) {
        let sx = (i64::from(a) * i64::from(self.sw) / i64::from(self.ew)) as i32;
        let sy = (i64::from(b) * i64::from(self.sh) / i64::from(self.eh)) as i32;
        (sx.min(self.sw - 1), sy.min(self.sh - 1))
    }

    #[inline]
    fn nearest_raw(&self, a: i32, b: i32) -> u32 {
        let (sx, sy) = self.nearest_xy(a, b);
        self.pixel(sx, sy)
    }

    fn sample(&self, a: i32, b: i32, filter: Filter) -> Color {
        match filter {
            Filter::Nearest => self.src.decode(self.nearest_raw(a, b)),
            Filter::Bilinear => self.sample_bilinear(a, b),
        }
    }

    /// Pixel-center bilinear interpolation, clamped at the source edges
    fn sample_bilinear(&self, a: i32, b: i32) -> Color {
        let fx = ((a as f32 + 0.5) * (self.sw as f32 / self.ew as f32) - 0.5)
            .clamp(0.0, (self.sw - 1) as f32);
        let fy = ((b as f32 + 0.5) * (self.sh as f32 / self.eh as f32) - 0.5)
            .clamp(0.0, (self.sh - 1) as f32);

        let x0 = fx.floor() as i32;
        let y0 = fy.floor() as i32;
        let x1 = (x0 + 1).min(self.sw - 1);
        let y1 = (y0 + 1).min(self.sh - 1);

        let c00 = self.src.decode(self.pixel(x0, y0));
        let c10 = self.src.decode(self.pixel(x1, y0));
        let c01 = self.src.decode(self.pixel(x0, y1));
        let c11 = self.src.decode(self.pixel(x1, y1));

        Color::bilerp(c00, c10, c01, c11, fx - x0 as f32, fy - y0 as f32)
    }
}

pub(super) fn render(
    dest: &mut PixelBuffer,
    src: &PixelBuffer,
    x: i32,
    y: i32,
    params: &DrawParams,
) -> Result<()> {
    let (sw, sh) = (src.width() as i32, src.height() as i32);
    let (ew, eh) = params.scaled_size(sw, sh)?;
    let alpha = params.alpha_level();
    let blending = alpha < 255 || params.filter == Filter::Bilinear;
    let transfer = convert::plan(src, dest, blending)?;
    if alpha == 0 {
        trace!("shader draw fully transparent, nothing to do");
        return Ok(());
    }

    let (lw, lh) = params.rotation.rotate_size(ew, eh);
    let effective = Orientation::compensate(params.rotation, dest.orientation());

    let Some((dest_rect, clip)) = place(dest, Rect::new(x, y, lw, lh)) else {
        return Ok(());
    };
    trace!(
        "shader {:?} -> {:?} scaled {}x{} effective {:?} alpha {} {:?}",
        dest_rect,
        clip,
        ew,
        eh,
        effective,
        alpha,
        params.filter
    );

    let sampler = Sampler {
        src,
        sw,
        sh,
        ew,
        eh,
    };

    for dy in clip.y..clip.y + clip.h {
        let v = dy - dest_rect.y;
        for dx in clip.x..clip.x + clip.w {
            let u = dx - dest_rect.x;
            let (a, b) = effective.unmap_index(u, v, ew, eh);
            let di = dest.pixel_index(dx as u32, dy as u32);

            let raw = if blending {
                let color = sampler.sample(a, b, params.filter);
                let out = if alpha < 255 {
                    color.blend_over(dest.decode(dest.read_index(di)), alpha)
                } else {
                    color
                };
                convert::convert(out, dest)?
            } else {
                let raw = sampler.nearest_raw(a, b);
                convert::convert_raw(raw, src, dest, transfer)?
            };
            dest.write_index(di, raw);
        }
    }
    Ok(())
}
