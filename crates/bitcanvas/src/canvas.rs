//! Packed 1bpp canvas with fixed rotation and mirroring.

use core::fmt;

/// Pixel colour of a bi-level panel.
///
/// Stored with the panel RAM convention: bit set = white, bit clear = black.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Color {
    Black,
    #[default]
    White,
}

impl Color {
    /// Byte value with all eight pixels set to this colour.
    pub const fn fill_byte(self) -> u8 {
        match self {
            Self::Black => 0x00,
            Self::White => 0xFF,
        }
    }
}

/// Rotation between logical drawing space and panel memory.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Returns `true` when logical width and height are swapped against memory.
    pub const fn swaps_axes(self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }

    pub const fn degrees(self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }
}

/// Mirroring applied after rotation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Mirror {
    #[default]
    None,
    Horizontal,
    Vertical,
    Origin,
}

impl Mirror {
    const fn flips_x(self) -> bool {
        matches!(self, Self::Horizontal | Self::Origin)
    }

    const fn flips_y(self) -> bool {
        matches!(self, Self::Vertical | Self::Origin)
    }
}

/// Rectangle in logical canvas coordinates.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub const fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    /// Exclusive bottom edge.
    pub const fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && y >= self.y && x < self.right() && y < self.bottom()
    }

    /// Shrinks the rectangle by `by` pixels on every side.
    pub const fn inset(&self, by: u32) -> Self {
        let shrink = by.saturating_mul(2);
        Self {
            x: self.x + by as i32,
            y: self.y + by as i32,
            width: self.width.saturating_sub(shrink),
            height: self.height.saturating_sub(shrink),
        }
    }

    pub fn intersect(&self, other: &Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        Rect {
            x,
            y,
            width: (right - x).max(0) as u32,
            height: (bottom - y).max(0) as u32,
        }
    }
}

/// Canvas construction errors.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CanvasError {
    /// Width or height is zero.
    EmptyGeometry,
    /// Backing buffer does not hold exactly `row_bytes * height` bytes.
    BufferLength { expected: usize, actual: usize },
    /// Two canvases that must share geometry do not.
    GeometryMismatch,
}

impl fmt::Display for CanvasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGeometry => f.write_str("canvas width and height must be non-zero"),
            Self::BufferLength { expected, actual } => {
                write!(f, "canvas buffer is {actual} bytes, expected {expected}")
            }
            Self::GeometryMismatch => f.write_str("canvas geometry mismatch"),
        }
    }
}

/// Number of bytes needed to store one memory row of `width` pixels.
pub const fn row_bytes_for(width: u16) -> usize {
    (width as usize).div_ceil(8)
}

/// Number of bytes needed for a `width` x `height` memory frame.
pub const fn buffer_len_for(width: u16, height: u16) -> usize {
    row_bytes_for(width) * height as usize
}

/// 1bpp canvas over a caller-supplied buffer.
///
/// `width`/`height` describe panel memory. Drawing coordinates are logical:
/// they pass through rotation and then mirroring before hitting memory.
/// Bit 7 of each byte is the left-most pixel in that byte.
#[derive(Clone, Debug)]
pub struct Canvas<B> {
    bytes: B,
    width: u16,
    height: u16,
    row_bytes: usize,
    rotation: Rotation,
    mirror: Mirror,
    clip: Option<Rect>,
}

impl<B> Canvas<B>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    /// Wraps `bytes` as a `width` x `height` canvas and clears it to white.
    pub fn new(
        mut bytes: B,
        width: u16,
        height: u16,
        rotation: Rotation,
        mirror: Mirror,
    ) -> Result<Self, CanvasError> {
        if width == 0 || height == 0 {
            return Err(CanvasError::EmptyGeometry);
        }

        let expected = buffer_len_for(width, height);
        let actual = bytes.as_ref().len();
        if actual != expected {
            return Err(CanvasError::BufferLength { expected, actual });
        }

        bytes.as_mut().fill(Color::White.fill_byte());

        Ok(Self {
            bytes,
            width,
            height,
            row_bytes: row_bytes_for(width),
            rotation,
            mirror,
            clip: None,
        })
    }

    /// Memory width in pixels.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Memory height in pixels.
    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn row_bytes(&self) -> usize {
        self.row_bytes
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn mirror(&self) -> Mirror {
        self.mirror
    }

    /// Drawing-space size after rotation.
    pub fn logical_size(&self) -> (u16, u16) {
        if self.rotation.swaps_axes() {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }

    /// Whole drawing area as a rectangle.
    pub fn bounds(&self) -> Rect {
        let (w, h) = self.logical_size();
        Rect::new(0, 0, w as u32, h as u32)
    }

    /// Returns the packed canvas bytes.
    pub fn bytes(&self) -> &[u8] {
        self.bytes.as_ref()
    }

    /// Returns one memory row.
    pub fn row(&self, y: u16) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }

        let start = y as usize * self.row_bytes;
        self.bytes.as_ref().get(start..start + self.row_bytes)
    }

    pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
        self.bytes.as_mut()
    }

    /// Fills the whole buffer, ignoring any active clip.
    pub fn clear(&mut self, color: Color) {
        self.bytes.as_mut().fill(color.fill_byte());
    }

    /// Copies every byte of `other` into this canvas.
    pub fn copy_from<O>(&mut self, other: &Canvas<O>) -> Result<(), CanvasError>
    where
        O: AsRef<[u8]> + AsMut<[u8]>,
    {
        if other.width != self.width || other.height != self.height {
            return Err(CanvasError::GeometryMismatch);
        }

        self.bytes.as_mut().copy_from_slice(other.bytes());
        Ok(())
    }

    /// Runs `draw` with every write restricted to `rect`.
    ///
    /// Nested clips intersect. The previous clip is restored afterwards.
    pub fn with_clip<R>(&mut self, rect: Rect, draw: impl FnOnce(&mut Self) -> R) -> R {
        let previous = self.clip;
        let next = match previous {
            Some(outer) => outer.intersect(&rect),
            None => rect,
        };

        self.clip = Some(next);
        let result = draw(self);
        self.clip = previous;
        result
    }

    /// Active clip rectangle, if any.
    pub fn clip(&self) -> Option<Rect> {
        self.clip
    }

    /// Maps a logical point to memory coordinates.
    pub fn to_memory(&self, x: i32, y: i32) -> Option<(u16, u16)> {
        let (lw, lh) = self.logical_size();
        if x < 0 || y < 0 || x >= lw as i32 || y >= lh as i32 {
            return None;
        }

        let w = self.width as i32;
        let h = self.height as i32;
        let (mut mx, mut my) = match self.rotation {
            Rotation::Deg0 => (x, y),
            Rotation::Deg90 => (w - y - 1, x),
            Rotation::Deg180 => (w - x - 1, h - y - 1),
            Rotation::Deg270 => (y, h - x - 1),
        };

        if self.mirror.flips_x() {
            mx = w - mx - 1;
        }
        if self.mirror.flips_y() {
            my = h - my - 1;
        }

        Some((mx as u16, my as u16))
    }

    /// Maps a memory point back to logical coordinates.
    pub fn to_logical(&self, mx: u16, my: u16) -> Option<(i32, i32)> {
        if mx >= self.width || my >= self.height {
            return None;
        }

        let w = self.width as i32;
        let h = self.height as i32;
        let mut mx = mx as i32;
        let mut my = my as i32;

        if self.mirror.flips_x() {
            mx = w - mx - 1;
        }
        if self.mirror.flips_y() {
            my = h - my - 1;
        }

        Some(match self.rotation {
            Rotation::Deg0 => (mx, my),
            Rotation::Deg90 => (my, w - mx - 1),
            Rotation::Deg180 => (w - mx - 1, h - my - 1),
            Rotation::Deg270 => (h - my - 1, mx),
        })
    }

    /// Logical rectangle covering the memory rectangle `(mx, my, w, h)`.
    ///
    /// Returns `None` when the memory rectangle is empty or leaves the canvas.
    pub fn logical_rect_of(&self, mx: u16, my: u16, w: u16, h: u16) -> Option<Rect> {
        if w == 0 || h == 0 {
            return None;
        }

        let (ax, ay) = self.to_logical(mx, my)?;
        let (bx, by) = self.to_logical(mx.checked_add(w - 1)?, my.checked_add(h - 1)?)?;

        let x = ax.min(bx);
        let y = ay.min(by);
        Some(Rect::new(
            x,
            y,
            (ax.max(bx) - x + 1) as u32,
            (ay.max(by) - y + 1) as u32,
        ))
    }

    /// Sets a pixel state.
    ///
    /// Returns `true` when the pixel was written, `false` when it fell outside
    /// the canvas or the active clip.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) -> bool {
        if let Some(clip) = self.clip
            && !clip.contains(x, y)
        {
            return false;
        }

        let Some((mx, my)) = self.to_memory(x, y) else {
            return false;
        };

        let byte_index = my as usize * self.row_bytes + (mx as usize / 8);
        let bit_mask = 0x80u8 >> (mx % 8);
        let bytes = self.bytes.as_mut();

        match color {
            Color::White => bytes[byte_index] |= bit_mask,
            Color::Black => bytes[byte_index] &= !bit_mask,
        }

        true
    }

    /// Resets a pixel to white.
    pub fn clear_pixel(&mut self, x: i32, y: i32) -> bool {
        self.set_pixel(x, y, Color::White)
    }

    /// Reads a pixel state.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        let (mx, my) = self.to_memory(x, y)?;
        let byte_index = my as usize * self.row_bytes + (mx as usize / 8);
        let bit_mask = 0x80u8 >> (mx % 8);

        if self.bytes.as_ref()[byte_index] & bit_mask != 0 {
            Some(Color::White)
        } else {
            Some(Color::Black)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas(width: u16, height: u16, rotation: Rotation, mirror: Mirror) -> Canvas<Vec<u8>> {
        Canvas::new(
            vec![0u8; buffer_len_for(width, height)],
            width,
            height,
            rotation,
            mirror,
        )
        .unwrap()
    }

    #[test]
    fn new_canvas_is_white_and_sized_by_row_bytes() {
        let c = canvas(13, 4, Rotation::Deg0, Mirror::None);

        assert_eq!(c.row_bytes(), 2);
        assert_eq!(c.bytes().len(), 8);
        assert!(c.bytes().iter().all(|b| *b == 0xFF));
    }

    #[test]
    fn clear_pixel_resets_to_white() {
        let mut c = canvas(16, 4, Rotation::Deg0, Mirror::None);
        c.set_pixel(3, 2, Color::Black);

        assert!(c.clear_pixel(3, 2));
        assert_eq!(c.pixel(3, 2), Some(Color::White));
        assert!(!c.clear_pixel(16, 0));
        assert!(c.bytes().iter().all(|b| *b == 0xFF));
    }

    #[test]
    fn buffer_length_is_checked() {
        let err = Canvas::new([0u8; 10], 16, 4, Rotation::Deg0, Mirror::None).unwrap_err();
        assert_eq!(
            err,
            CanvasError::BufferLength {
                expected: 8,
                actual: 10
            }
        );
        assert_eq!(
            Canvas::new([0u8; 0], 0, 4, Rotation::Deg0, Mirror::None).unwrap_err(),
            CanvasError::EmptyGeometry
        );
    }

    #[test]
    fn pixel_bit_mapping_is_msb_first_within_byte() {
        let mut c = canvas(16, 2, Rotation::Deg0, Mirror::None);

        assert!(c.set_pixel(0, 0, Color::Black));
        assert!(c.set_pixel(7, 0, Color::Black));
        assert!(c.set_pixel(8, 0, Color::Black));

        let row = c.row(0).unwrap();
        assert_eq!(row[0], 0b0111_1110);
        assert_eq!(row[1], 0b0111_1111);
        assert_eq!(c.row(1).unwrap(), &[0xFF, 0xFF]);
    }

    #[test]
    fn out_of_bounds_pixel_is_ignored() {
        let mut c = canvas(16, 4, Rotation::Deg0, Mirror::None);

        assert!(!c.set_pixel(16, 0, Color::Black));
        assert!(!c.set_pixel(0, 4, Color::Black));
        assert!(!c.set_pixel(-1, 0, Color::Black));
        assert!(c.bytes().iter().all(|b| *b == 0xFF));
        assert_eq!(c.pixel(16, 4), None);
    }

    #[test]
    fn rotation_swaps_logical_size_and_maps_corners() {
        let mut c = canvas(16, 8, Rotation::Deg90, Mirror::None);
        assert_eq!(c.logical_size(), (8, 16));

        // Logical origin lands on the right edge of memory row 0.
        assert_eq!(c.to_memory(0, 0), Some((15, 0)));
        assert!(c.set_pixel(0, 0, Color::Black));
        assert_eq!(c.row(0).unwrap()[1], 0b1111_1110);

        assert_eq!(c.to_memory(7, 15), Some((0, 7)));
        assert_eq!(c.to_memory(8, 0), None);
    }

    #[test]
    fn logical_and_memory_mappings_are_inverse() {
        let rotations = [
            Rotation::Deg0,
            Rotation::Deg90,
            Rotation::Deg180,
            Rotation::Deg270,
        ];
        let mirrors = [
            Mirror::None,
            Mirror::Horizontal,
            Mirror::Vertical,
            Mirror::Origin,
        ];

        for rotation in rotations {
            for mirror in mirrors {
                let c = canvas(24, 10, rotation, mirror);
                let (lw, lh) = c.logical_size();
                for y in 0..lh as i32 {
                    for x in 0..lw as i32 {
                        let (mx, my) = c.to_memory(x, y).unwrap();
                        assert_eq!(c.to_logical(mx, my), Some((x, y)));
                    }
                }
            }
        }
    }

    #[test]
    fn mirror_horizontal_flips_memory_column() {
        let c = canvas(16, 4, Rotation::Deg0, Mirror::Horizontal);
        assert_eq!(c.to_memory(0, 1), Some((15, 1)));

        let c = canvas(16, 4, Rotation::Deg0, Mirror::Origin);
        assert_eq!(c.to_memory(0, 0), Some((15, 3)));
    }

    #[test]
    fn logical_rect_of_memory_window_under_rotation() {
        let c = canvas(16, 8, Rotation::Deg270, Mirror::None);
        let rect = c.logical_rect_of(8, 0, 8, 4).unwrap();

        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                let (mx, my) = c.to_memory(x, y).unwrap();
                assert!((8..16).contains(&mx) && my < 4);
            }
        }
        assert_eq!(rect.width * rect.height, 32);
    }

    #[test]
    fn clip_blocks_writes_and_restores() {
        let mut c = canvas(16, 4, Rotation::Deg0, Mirror::None);

        let written = c.with_clip(Rect::new(2, 1, 3, 2), |c| {
            (c.set_pixel(2, 1, Color::Black), c.set_pixel(5, 1, Color::Black))
        });

        assert_eq!(written, (true, false));
        assert_eq!(c.clip(), None);
        assert!(c.set_pixel(5, 1, Color::Black));
    }

    #[test]
    fn nested_clips_intersect() {
        let mut c = canvas(16, 16, Rotation::Deg0, Mirror::None);

        c.with_clip(Rect::new(0, 0, 8, 8), |c| {
            c.with_clip(Rect::new(4, 4, 8, 8), |c| {
                assert_eq!(c.clip(), Some(Rect::new(4, 4, 4, 4)));
                assert!(!c.set_pixel(9, 9, Color::Black));
            });
            assert_eq!(c.clip(), Some(Rect::new(0, 0, 8, 8)));
        });
    }

    #[test]
    fn copy_from_requires_matching_geometry() {
        let mut front = canvas(16, 4, Rotation::Deg0, Mirror::None);
        let mut shadow = canvas(16, 4, Rotation::Deg0, Mirror::None);
        let mut other = canvas(8, 4, Rotation::Deg0, Mirror::None);

        front.set_pixel(3, 3, Color::Black);
        shadow.copy_from(&front).unwrap();
        assert_eq!(shadow.bytes(), front.bytes());
        assert_eq!(
            other.copy_from(&front),
            Err(CanvasError::GeometryMismatch)
        );
    }
}
