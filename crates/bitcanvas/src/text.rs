//! Text rendering over an injected glyph source.

use crate::canvas::{Canvas, Color};

/// One glyph bitmap.
///
/// Rows are stored top to bottom, each row `width.div_ceil(8)` bytes long with
/// the left-most column in bit 7.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Glyph<'a> {
    pub width: u16,
    pub height: u16,
    pub rows: &'a [u8],
}

impl<'a> Glyph<'a> {
    pub const fn new(width: u16, height: u16, rows: &'a [u8]) -> Self {
        Self {
            width,
            height,
            rows,
        }
    }

    const fn stride(&self) -> usize {
        (self.width as usize).div_ceil(8)
    }

    /// Returns `true` when the glyph ink covers `(col, row)`.
    ///
    /// Out-of-range coordinates and truncated row data read as blank.
    pub fn is_set(&self, col: u16, row: u16) -> bool {
        if col >= self.width || row >= self.height {
            return false;
        }

        let index = row as usize * self.stride() + col as usize / 8;
        self.rows
            .get(index)
            .is_some_and(|byte| byte & (0x80 >> (col % 8)) != 0)
    }
}

/// Glyph bitmap lookup.
pub trait GlyphSource {
    /// Unscaled cell size `(advance, line height)` in pixels.
    fn cell_size(&self) -> (u16, u16);

    /// Integer magnification applied to every glyph pixel.
    fn scale(&self) -> u16 {
        1
    }

    /// Returns the bitmap for `c`, or `None` if the source has no such glyph.
    fn glyph(&self, c: char) -> Option<Glyph<'_>>;

    /// Scaled cell size.
    fn scaled_cell(&self) -> (u16, u16) {
        let (w, h) = self.cell_size();
        let scale = self.scale().max(1);
        (w.saturating_mul(scale), h.saturating_mul(scale))
    }

    /// Scaled pixel width of `text` on a single line, counting only
    /// characters the source can draw.
    fn text_width(&self, text: &str) -> u32 {
        let (advance, _) = self.scaled_cell();
        text.chars().filter(|c| self.glyph(*c).is_some()).count() as u32 * advance as u32
    }
}

impl<T: GlyphSource + ?Sized> GlyphSource for &T {
    fn cell_size(&self) -> (u16, u16) {
        (**self).cell_size()
    }

    fn scale(&self) -> u16 {
        (**self).scale()
    }

    fn glyph(&self, c: char) -> Option<Glyph<'_>> {
        (**self).glyph(c)
    }
}

impl<B> Canvas<B>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    /// Draws `text` starting at `(x, y)`.
    ///
    /// `bg` of `None` leaves the cell background untouched. `'\n'` starts a new
    /// line; a cell that would cross the right edge wraps to the start column.
    /// Returns the number of characters skipped for lack of a glyph.
    pub fn draw_string<G>(
        &mut self,
        x: i32,
        y: i32,
        text: &str,
        font: &G,
        bg: Option<Color>,
        fg: Color,
    ) -> usize
    where
        G: GlyphSource + ?Sized,
    {
        let (advance, line_height) = font.scaled_cell();
        let (advance, line_height) = (advance as i32, line_height as i32);
        let scale = font.scale().max(1) as i32;
        let (logical_width, _) = self.logical_size();
        let right_edge = logical_width as i32;

        let mut cursor_x = x;
        let mut cursor_y = y;
        let mut skipped = 0usize;

        for c in text.chars() {
            if c == '\n' {
                cursor_x = x;
                cursor_y += line_height;
                continue;
            }

            let Some(glyph) = font.glyph(c) else {
                skipped += 1;
                continue;
            };

            if cursor_x != x && cursor_x + advance > right_edge {
                cursor_x = x;
                cursor_y += line_height;
            }

            if let Some(bg) = bg {
                for dy in 0..line_height {
                    for dx in 0..advance {
                        self.set_pixel(cursor_x + dx, cursor_y + dy, bg);
                    }
                }
            }

            for row in 0..glyph.height {
                for col in 0..glyph.width {
                    if !glyph.is_set(col, row) {
                        continue;
                    }

                    let px = cursor_x + col as i32 * scale;
                    let py = cursor_y + row as i32 * scale;
                    for sy in 0..scale {
                        for sx in 0..scale {
                            self.set_pixel(px + sx, py + sy, fg);
                        }
                    }
                }
            }

            cursor_x += advance;
        }

        skipped
    }
}
