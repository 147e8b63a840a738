#![cfg_attr(not(test), no_std)]

//! Packed 1-bit-per-pixel canvas for bi-level panels.
//!
//! The canvas borrows or owns any byte buffer, applies a fixed rotation and
//! mirror mode to every write, and offers the drawing primitives plus
//! byte-aligned region extraction used for partial panel refreshes.

mod canvas;
mod primitives;
mod region;
mod text;

#[cfg(feature = "embedded-graphics")]
mod graphics;

pub use canvas::{
    Canvas, CanvasError, Color, Mirror, Rect, Rotation, buffer_len_for, row_bytes_for,
};
pub use primitives::{DotStyle, FillMode, LineStyle};
pub use region::{Region, RegionError, RegionExtractor};
pub use text::{Glyph, GlyphSource};
