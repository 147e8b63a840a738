//! Byte-aligned sub-rectangles and their compact extraction.

use core::fmt;

use crate::canvas::Canvas;

/// Sub-rectangle in memory coordinates.
///
/// `x` and `width` are multiples of 8 so every row maps onto whole bytes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Region {
    x: u16,
    y: u16,
    width: u16,
    height: u16,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RegionError {
    /// `x` or `width` is not a multiple of 8.
    Unaligned { x: u16, width: u16 },
    /// `width` or `height` is zero.
    Empty,
    /// The region leaves the canvas.
    OutOfBounds,
    /// Destination or source byte count does not match the region.
    BufferLength { expected: usize, actual: usize },
}

impl fmt::Display for RegionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unaligned { x, width } => {
                write!(f, "region x={x} width={width} is not byte aligned")
            }
            Self::Empty => f.write_str("region has zero width or height"),
            Self::OutOfBounds => f.write_str("region exceeds canvas bounds"),
            Self::BufferLength { expected, actual } => {
                write!(f, "region buffer is {actual} bytes, expected {expected}")
            }
        }
    }
}

impl Region {
    /// Checks byte alignment and non-zero size.
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Result<Self, RegionError> {
        if x % 8 != 0 || width % 8 != 0 {
            return Err(RegionError::Unaligned { x, width });
        }
        if width == 0 || height == 0 {
            return Err(RegionError::Empty);
        }

        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// Checks that the region fits a `width` x `height` memory frame.
    pub const fn within(self, width: u16, height: u16) -> Result<Self, RegionError> {
        let right = self.x as u32 + self.width as u32;
        let bottom = self.y as u32 + self.height as u32;
        if right > width as u32 || bottom > height as u32 {
            return Err(RegionError::OutOfBounds);
        }

        Ok(self)
    }

    pub const fn x(&self) -> u16 {
        self.x
    }

    pub const fn y(&self) -> u16 {
        self.y
    }

    pub const fn width(&self) -> u16 {
        self.width
    }

    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Bytes per region row.
    pub const fn row_bytes(&self) -> usize {
        self.width as usize / 8
    }

    /// Size of the compact buffer holding the region.
    pub const fn byte_len(&self) -> usize {
        self.row_bytes() * self.height as usize
    }
}

impl<B> Canvas<B>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    /// Builds a region validated against this canvas's memory geometry.
    pub fn region(&self, x: u16, y: u16, width: u16, height: u16) -> Result<Region, RegionError> {
        Region::new(x, y, width, height)?.within(self.width(), self.height())
    }

    /// Writes compact region bytes back into the canvas.
    ///
    /// Ignores rotation and clipping: bytes land exactly where
    /// [`RegionExtractor::extract`] read them from.
    pub fn blit_region(&mut self, region: Region, data: &[u8]) -> Result<(), RegionError> {
        let region = region.within(self.width(), self.height())?;
        if data.len() != region.byte_len() {
            return Err(RegionError::BufferLength {
                expected: region.byte_len(),
                actual: data.len(),
            });
        }

        let canvas_row = self.row_bytes();
        let span = region.row_bytes();
        let offset = region.x as usize / 8;
        let bytes = self.bytes_mut();

        for (row, chunk) in data.chunks_exact(span).enumerate() {
            let start = (region.y as usize + row) * canvas_row + offset;
            bytes[start..start + span].copy_from_slice(chunk);
        }

        Ok(())
    }
}

/// Copies one fixed region of a canvas into a caller-owned buffer.
///
/// The region and buffer are checked once at construction, after which
/// [`extract`](Self::extract) cannot fail.
#[derive(Debug)]
pub struct RegionExtractor<B> {
    region: Region,
    bytes: B,
    canvas_width: u16,
    canvas_height: u16,
}

impl<B> RegionExtractor<B>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    pub fn new<C>(canvas: &Canvas<C>, region: Region, bytes: B) -> Result<Self, RegionError>
    where
        C: AsRef<[u8]> + AsMut<[u8]>,
    {
        let region = region.within(canvas.width(), canvas.height())?;
        let actual = bytes.as_ref().len();
        if actual != region.byte_len() {
            return Err(RegionError::BufferLength {
                expected: region.byte_len(),
                actual,
            });
        }

        Ok(Self {
            region,
            bytes,
            canvas_width: canvas.width(),
            canvas_height: canvas.height(),
        })
    }

    pub fn region(&self) -> Region {
        self.region
    }

    /// Copies the region rows out of `canvas` and returns the compact bytes.
    ///
    /// `canvas` must share the geometry the extractor was built against.
    pub fn extract<C>(&mut self, canvas: &Canvas<C>) -> &[u8]
    where
        C: AsRef<[u8]> + AsMut<[u8]>,
    {
        debug_assert!(
            canvas.width() == self.canvas_width && canvas.height() == self.canvas_height
        );

        let span = self.region.row_bytes();
        let offset = self.region.x as usize / 8;
        let source = canvas.bytes();
        let canvas_row = canvas.row_bytes();
        let region_y = self.region.y as usize;
        let out = self.bytes.as_mut();

        for (row, chunk) in out.chunks_exact_mut(span).enumerate() {
            let start = (region_y + row) * canvas_row + offset;
            chunk.copy_from_slice(&source[start..start + span]);
        }

        self.bytes.as_ref()
    }
}
