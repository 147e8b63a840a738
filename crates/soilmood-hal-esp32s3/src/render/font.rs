//! Built-in 5x7 bitmap font.
//!
//! Glyphs are kept column-major (bit 0 is the top row, bit 7 a descender
//! row) and transposed into canvas row order at compile time. There is no
//! `%` glyph; the scene draws the percent sign from primitives.

use bitcanvas::{Glyph, GlyphSource};

const GLYPH_WIDTH: u16 = 5;
const GLYPH_HEIGHT: u16 = 8;
const CELL: (u16, u16) = (6, 9);

const COLUMNS: [(char, [u8; 5]); GLYPH_COUNT] = [
    ('A', [0x7E, 0x11, 0x11, 0x11, 0x7E]),
    ('B', [0x7F, 0x49, 0x49, 0x49, 0x36]),
    ('C', [0x3E, 0x41, 0x41, 0x41, 0x22]),
    ('D', [0x7F, 0x41, 0x41, 0x22, 0x1C]),
    ('E', [0x7F, 0x49, 0x49, 0x49, 0x41]),
    ('F', [0x7F, 0x09, 0x09, 0x09, 0x01]),
    ('G', [0x3E, 0x41, 0x49, 0x49, 0x7A]),
    ('H', [0x7F, 0x08, 0x08, 0x08, 0x7F]),
    ('I', [0x00, 0x41, 0x7F, 0x41, 0x00]),
    ('J', [0x20, 0x40, 0x41, 0x3F, 0x01]),
    ('K', [0x7F, 0x08, 0x14, 0x22, 0x41]),
    ('L', [0x7F, 0x40, 0x40, 0x40, 0x40]),
    ('M', [0x7F, 0x02, 0x0C, 0x02, 0x7F]),
    ('N', [0x7F, 0x04, 0x08, 0x10, 0x7F]),
    ('O', [0x3E, 0x41, 0x41, 0x41, 0x3E]),
    ('P', [0x7F, 0x09, 0x09, 0x09, 0x06]),
    ('Q', [0x3E, 0x41, 0x51, 0x21, 0x5E]),
    ('R', [0x7F, 0x09, 0x19, 0x29, 0x46]),
    ('S', [0x46, 0x49, 0x49, 0x49, 0x31]),
    ('T', [0x01, 0x01, 0x7F, 0x01, 0x01]),
    ('U', [0x3F, 0x40, 0x40, 0x40, 0x3F]),
    ('V', [0x1F, 0x20, 0x40, 0x20, 0x1F]),
    ('W', [0x7F, 0x20, 0x18, 0x20, 0x7F]),
    ('X', [0x63, 0x14, 0x08, 0x14, 0x63]),
    ('Y', [0x03, 0x04, 0x78, 0x04, 0x03]),
    ('Z', [0x61, 0x51, 0x49, 0x45, 0x43]),
    ('a', [0x20, 0x54, 0x54, 0x54, 0x78]),
    ('b', [0x7F, 0x48, 0x44, 0x44, 0x38]),
    ('c', [0x38, 0x44, 0x44, 0x44, 0x20]),
    ('d', [0x38, 0x44, 0x44, 0x48, 0x7F]),
    ('e', [0x38, 0x54, 0x54, 0x54, 0x18]),
    ('f', [0x08, 0x7E, 0x09, 0x01, 0x02]),
    ('g', [0x08, 0x14, 0x54, 0x54, 0x3C]),
    ('h', [0x7F, 0x08, 0x04, 0x04, 0x78]),
    ('i', [0x00, 0x44, 0x7D, 0x40, 0x00]),
    ('j', [0x20, 0x40, 0x44, 0x3D, 0x00]),
    ('k', [0x7F, 0x10, 0x28, 0x44, 0x00]),
    ('l', [0x00, 0x41, 0x7F, 0x40, 0x00]),
    ('m', [0x7C, 0x04, 0x18, 0x04, 0x78]),
    ('n', [0x7C, 0x08, 0x04, 0x04, 0x78]),
    ('o', [0x38, 0x44, 0x44, 0x44, 0x38]),
    ('p', [0x7C, 0x14, 0x14, 0x14, 0x08]),
    ('q', [0x08, 0x14, 0x14, 0x18, 0x7C]),
    ('r', [0x7C, 0x08, 0x04, 0x04, 0x08]),
    ('s', [0x48, 0x54, 0x54, 0x54, 0x20]),
    ('t', [0x04, 0x3F, 0x44, 0x40, 0x20]),
    ('u', [0x3C, 0x40, 0x40, 0x20, 0x7C]),
    ('v', [0x1C, 0x20, 0x40, 0x20, 0x1C]),
    ('w', [0x3C, 0x40, 0x30, 0x40, 0x3C]),
    ('x', [0x44, 0x28, 0x10, 0x28, 0x44]),
    ('y', [0x0C, 0x50, 0x50, 0x50, 0x3C]),
    ('z', [0x44, 0x64, 0x54, 0x4C, 0x44]),
    ('0', [0x3E, 0x51, 0x49, 0x45, 0x3E]),
    ('1', [0x00, 0x42, 0x7F, 0x40, 0x00]),
    ('2', [0x42, 0x61, 0x51, 0x49, 0x46]),
    ('3', [0x21, 0x41, 0x45, 0x4B, 0x31]),
    ('4', [0x18, 0x14, 0x12, 0x7F, 0x10]),
    ('5', [0x27, 0x45, 0x45, 0x45, 0x39]),
    ('6', [0x3C, 0x4A, 0x49, 0x49, 0x30]),
    ('7', [0x01, 0x71, 0x09, 0x05, 0x03]),
    ('8', [0x36, 0x49, 0x49, 0x49, 0x36]),
    ('9', [0x06, 0x49, 0x49, 0x29, 0x1E]),
    ('.', [0x00, 0x60, 0x60, 0x00, 0x00]),
    (',', [0x00, 0x80, 0x60, 0x00, 0x00]),
    (';', [0x00, 0x80, 0x66, 0x00, 0x00]),
    ('/', [0x20, 0x10, 0x08, 0x04, 0x02]),
    ('<', [0x08, 0x14, 0x22, 0x41, 0x00]),
    ('>', [0x00, 0x41, 0x22, 0x14, 0x08]),
    ('[', [0x00, 0x7F, 0x41, 0x41, 0x00]),
    (']', [0x00, 0x41, 0x41, 0x7F, 0x00]),
    ('-', [0x08, 0x08, 0x08, 0x08, 0x08]),
    (':', [0x00, 0x36, 0x36, 0x00, 0x00]),
    (' ', [0x00, 0x00, 0x00, 0x00, 0x00]),
    ('!', [0x00, 0x00, 0x5F, 0x00, 0x00]),
    ('?', [0x02, 0x01, 0x51, 0x09, 0x06]),
    ('(', [0x00, 0x1C, 0x22, 0x41, 0x00]),
    (')', [0x00, 0x41, 0x22, 0x1C, 0x00]),
    ('+', [0x08, 0x08, 0x3E, 0x08, 0x08]),
    ('=', [0x14, 0x14, 0x14, 0x14, 0x14]),
    ('\'', [0x00, 0x05, 0x03, 0x00, 0x00]),
    ('_', [0x40, 0x40, 0x40, 0x40, 0x40]),
    ('"', [0x00, 0x07, 0x00, 0x07, 0x00]),
];

const GLYPH_COUNT: usize = 82;

static ROWS: [[u8; GLYPH_HEIGHT as usize]; GLYPH_COUNT] = transpose_all(&COLUMNS);

const fn transpose(columns: &[u8; 5]) -> [u8; GLYPH_HEIGHT as usize] {
    let mut rows = [0u8; GLYPH_HEIGHT as usize];
    let mut col = 0;
    while col < columns.len() {
        let mut row = 0;
        while row < rows.len() {
            if columns[col] & (1 << row) != 0 {
                rows[row] |= 0x80 >> col;
            }
            row += 1;
        }
        col += 1;
    }
    rows
}

const fn transpose_all(
    table: &[(char, [u8; 5]); GLYPH_COUNT],
) -> [[u8; GLYPH_HEIGHT as usize]; GLYPH_COUNT] {
    let mut out = [[0u8; GLYPH_HEIGHT as usize]; GLYPH_COUNT];
    let mut i = 0;
    while i < GLYPH_COUNT {
        out[i] = transpose(&table[i].1);
        i += 1;
    }
    out
}

/// Folds typographic punctuation onto the ASCII glyphs the table has.
fn normalize(c: char) -> char {
    match c {
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '`' | '\u{B4}' => '\'',
        '\u{201C}' | '\u{201D}' | '\u{201E}' => '"',
        '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' => '-',
        _ => c,
    }
}

/// The 5x7 font at an integer scale.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Font5x7 {
    scale: u16,
}

impl Default for Font5x7 {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Font5x7 {
    /// A `scale` of zero draws at scale one.
    pub const fn new(scale: u16) -> Self {
        Self {
            scale: if scale == 0 { 1 } else { scale },
        }
    }
}

impl GlyphSource for Font5x7 {
    fn cell_size(&self) -> (u16, u16) {
        CELL
    }

    fn scale(&self) -> u16 {
        self.scale
    }

    fn glyph(&self, c: char) -> Option<Glyph<'_>> {
        let c = normalize(c);
        let index = COLUMNS.iter().position(|(glyph_char, _)| *glyph_char == c)?;
        Some(Glyph::new(GLYPH_WIDTH, GLYPH_HEIGHT, &ROWS[index]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcanvas::{Canvas, Color, Mirror, Rotation};

    fn ink(font: &Font5x7, c: char) -> std::vec::Vec<(u16, u16)> {
        let glyph = font.glyph(c).unwrap();
        let mut set = std::vec::Vec::new();
        for row in 0..glyph.height {
            for col in 0..glyph.width {
                if glyph.is_set(col, row) {
                    set.push((col, row));
                }
            }
        }
        set
    }

    #[test]
    fn table_has_unique_characters() {
        for (i, (a, _)) in COLUMNS.iter().enumerate() {
            for (b, _) in &COLUMNS[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn percent_sign_is_missing() {
        let font = Font5x7::default();
        assert!(font.glyph('%').is_none());
        assert!(font.glyph('\u{e9}').is_none());
        assert_eq!(font.text_width("50%"), 12);
    }

    #[test]
    fn columns_are_transposed_into_rows() {
        let font = Font5x7::default();
        let a = font.glyph('A').unwrap();

        assert_eq!(a.rows[0], 0b0111_0000);
        assert_eq!(a.rows[1], 0b1000_1000);
        assert_eq!(a.rows[7], 0);

        let dash = ink(&font, '-');
        assert_eq!(dash, [(0, 3), (1, 3), (2, 3), (3, 3), (4, 3)]);
    }

    #[test]
    fn comma_keeps_its_descender() {
        let font = Font5x7::default();
        assert!(ink(&font, ',').contains(&(1, 7)));
    }

    #[test]
    fn typographic_punctuation_folds_to_ascii() {
        let font = Font5x7::default();
        assert_eq!(font.glyph('\u{2014}'), font.glyph('-'));
        assert_eq!(font.glyph('\u{2019}'), font.glyph('\''));
    }

    #[test]
    fn scale_multiplies_cell_and_drawn_pixels() {
        let font = Font5x7::new(2);
        assert_eq!(font.scaled_cell(), (12, 18));
        assert_eq!(Font5x7::new(0).scale(), 1);

        let mut canvas = Canvas::new([0u8; 32], 16, 16, Rotation::Deg0, Mirror::None).unwrap();
        let skipped = canvas.draw_string(0, 0, "I", &font, None, Color::Black);

        assert_eq!(skipped, 0);
        // Stem of 'I' is column 2, drawn at x 4..6 at scale two.
        assert_eq!(canvas.pixel(4, 4), Some(Color::Black));
        assert_eq!(canvas.pixel(5, 4), Some(Color::Black));
        assert_eq!(canvas.pixel(3, 4), Some(Color::White));
    }
}
