//! Panel driver contract.

use bitcanvas::{Mirror, Region, Rotation};

/// Memory-space window for a partial refresh.
///
/// `x` and `width` are in pixels and byte aligned; `y` and `height` are in
/// lines.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PartialWindow {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl PartialWindow {
    /// Bytes the window occupies when packed one bit per pixel.
    pub const fn byte_len(&self) -> usize {
        (self.width as usize / 8) * self.height as usize
    }
}

impl From<Region> for PartialWindow {
    fn from(region: Region) -> Self {
        Self {
            x: region.x(),
            y: region.y(),
            width: region.width(),
            height: region.height(),
        }
    }
}

/// Blocking bi-level panel.
///
/// Every call returns only once the panel reports idle, or fails.
pub trait PanelDriver {
    type Error;

    fn init_display(&mut self, rotation: Rotation, mirror: Mirror) -> Result<(), Self::Error>;

    /// Sends and latches a whole frame. `shadow` is the frame currently on
    /// the glass.
    fn full_refresh(&mut self, front: &[u8], shadow: &[u8]) -> Result<(), Self::Error>;

    /// Sends only `data`, the packed rows of `window`.
    fn partial_refresh(&mut self, window: PartialWindow, data: &[u8]) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_keeps_width_and_height_apart() {
        let region = Region::new(16, 4, 48, 20).unwrap();
        let window = PartialWindow::from(region);

        assert_eq!(window.width, 48);
        assert_eq!(window.height, 20);
        assert_eq!((window.x, window.y), (16, 4));
        assert_eq!(window.byte_len(), region.byte_len());
    }
}
