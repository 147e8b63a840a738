//! Points, lines, rectangles and circles.
//!
//! Every primitive funnels through [`Canvas::set_pixel`], so clipping to the
//! canvas and to the active clip rectangle is handled in one place.

use crate::canvas::{Canvas, Color};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum FillMode {
    #[default]
    Stroke,
    Filled,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LineStyle {
    #[default]
    Solid,
    /// Skips every third pixel of the walk.
    Dotted,
}

/// How a point of `size > 1` grows around its coordinate.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum DotStyle {
    /// `(2 * size - 1)` square centred on the point.
    #[default]
    FillAround,
    /// `size` square with the point as its top-left corner.
    FillRightUp,
}

impl<B> Canvas<B>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    /// Draws a square dot. A `size` of zero is treated as one.
    pub fn draw_point(&mut self, x: i32, y: i32, color: Color, size: u16, style: DotStyle) {
        let size = size.max(1) as i32;

        match style {
            DotStyle::FillAround => {
                let reach = size - 1;
                for dy in -reach..=reach {
                    for dx in -reach..=reach {
                        self.set_pixel(x + dx, y + dy, color);
                    }
                }
            }
            DotStyle::FillRightUp => {
                for dy in 0..size {
                    for dx in 0..size {
                        self.set_pixel(x + dx, y + dy, color);
                    }
                }
            }
        }
    }

    /// Draws a Bresenham line between two inclusive endpoints.
    ///
    /// A thick line stamps a `thickness` square on every step, centred on the
    /// walk and biased up-left for even sizes.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_line(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        color: Color,
        thickness: u16,
        style: LineStyle,
    ) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let mut x = x0;
        let mut y = y0;
        let mut step = 0u32;

        loop {
            let skip = style == LineStyle::Dotted && step % 3 == 2;
            if !skip {
                if thickness <= 1 {
                    self.set_pixel(x, y, color);
                } else {
                    let back = (thickness as i32 - 1) / 2;
                    self.draw_point(x - back, y - back, color, thickness, DotStyle::FillRightUp);
                }
            }

            if x == x1 && y == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
            step = step.wrapping_add(1);
        }
    }

    /// Inclusive span; empty when `x1 < x0`.
    fn draw_hline(&mut self, x0: i32, x1: i32, y: i32, color: Color) {
        for x in x0..=x1 {
            self.set_pixel(x, y, color);
        }
    }

    /// Draws a rectangle given two opposite inclusive corners.
    ///
    /// Stroke thickness grows inward; a thickness that covers the whole
    /// rectangle fills it.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_rect(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        color: Color,
        fill: FillMode,
        thickness: u16,
    ) {
        let (left, right) = (x0.min(x1), x0.max(x1));
        let (top, bottom) = (y0.min(y1), y0.max(y1));

        if fill == FillMode::Filled {
            for y in top..=bottom {
                self.draw_hline(left, right, y, color);
            }
            return;
        }

        let t = thickness.max(1) as i32;
        for y in top..=bottom {
            let near_edge = y - top < t || bottom - y < t;
            if near_edge {
                self.draw_hline(left, right, y, color);
                continue;
            }

            let left_end = (left + t - 1).min(right);
            let right_start = (right - t + 1).max(left);
            self.draw_hline(left, left_end, y, color);
            self.draw_hline(right_start, right, y, color);
        }
    }

    /// Draws a circle of radius `r` centred on `(cx, cy)`.
    ///
    /// A point belongs to the disc when `dx² + dy² <= r² + r`, which matches
    /// the midpoint circle outline. Stroke thickness grows inward.
    pub fn draw_circle(
        &mut self,
        cx: i32,
        cy: i32,
        r: u16,
        color: Color,
        fill: FillMode,
        thickness: u16,
    ) {
        let r = r as i32;
        let inner = match fill {
            FillMode::Filled => -1,
            FillMode::Stroke => r - thickness.max(1) as i32,
        };

        for dy in -r..=r {
            let outer_half = half_width(r, dy);
            if inner < 0 || dy.abs() > inner {
                self.draw_hline(cx - outer_half, cx + outer_half, cy + dy, color);
                continue;
            }

            // Annulus row: two spans between the outer and inner boundaries.
            let inner_half = half_width(inner, dy);
            self.draw_hline(cx - outer_half, cx - inner_half - 1, cy + dy, color);
            self.draw_hline(cx + inner_half + 1, cx + outer_half, cy + dy, color);
        }
    }
}

/// Half span of the disc of radius `r` on row `dy`.
fn half_width(r: i32, dy: i32) -> i32 {
    let squared = r * r + r - dy * dy;
    if squared < 0 { -1 } else { isqrt(squared as u32) as i32 }
}

fn isqrt(value: u32) -> u32 {
    if value < 2 {
        return value;
    }

    let mut x = value;
    let mut y = x.div_ceil(2);
    while y < x {
        x = y;
        y = (x + value / x) / 2;
    }
    x
}
