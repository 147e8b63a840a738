use core::convert::Infallible;

use embedded_graphics_core::{
    Pixel,
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Size},
    pixelcolor::BinaryColor,
};

use crate::canvas::{Canvas, Color};

impl From<BinaryColor> for Color {
    fn from(color: BinaryColor) -> Self {
        if color.is_on() {
            Color::Black
        } else {
            Color::White
        }
    }
}

impl<B> DrawTarget for Canvas<B>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let _ = self.set_pixel(point.x, point.y, color.into());
        }

        Ok(())
    }
}

impl<B> OriginDimensions for Canvas<B>
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    fn size(&self) -> Size {
        let (width, height) = self.logical_size();
        Size::new(width as u32, height as u32)
    }
}

#[cfg(test)]
mod tests {
    use embedded_graphics_core::geometry::Point;

    use super::*;
    use crate::canvas::{Mirror, Rotation, buffer_len_for};

    #[test]
    fn on_pixels_draw_black_and_negative_points_are_dropped() {
        let mut canvas = Canvas::new(
            vec![0u8; buffer_len_for(16, 8)],
            16,
            8,
            Rotation::Deg90,
            Mirror::None,
        )
        .unwrap();

        canvas
            .draw_iter([
                Pixel(Point::new(0, 0), BinaryColor::On),
                Pixel(Point::new(-1, 3), BinaryColor::On),
            ])
            .unwrap();

        assert_eq!(canvas.size(), Size::new(8, 16));
        assert_eq!(canvas.pixel(0, 0), Some(Color::Black));
        assert_eq!(canvas.bytes().iter().filter(|b| **b != 0xFF).count(), 1);
    }
}
