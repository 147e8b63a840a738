//! Static and dynamic layers of the moisture screen.

use bitcanvas::{
    Canvas, Color, DotStyle, FillMode, GlyphSource, LineStyle, Rect, Region, RegionError,
};
use log::warn;

use crate::{
    config::ConfigError,
    mood::{Decoration, FacePoint, MoodBand},
    percent::Percent,
};

const PAD: i32 = 4;
const BAR_HEIGHT: i32 = 10;
const MOUTH_SEGMENTS: i32 = 8;
/// Gap between the last digit and the percent sign for 1, 2 and 3 digits.
const PERCENT_GAP: [i32; 3] = [2, 3, 4];

/// Screen geometry.
///
/// Title and divider are in logical coordinates. The dynamic region is in
/// memory coordinates so it can be sent as a partial window.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SceneLayout {
    pub title: &'static str,
    pub value_label: &'static str,
    pub title_x: i32,
    pub title_y: i32,
    pub divider_y: i32,
    pub region_x: u16,
    pub region_y: u16,
    pub region_width: u16,
    pub region_height: u16,
    pub outline: u16,
    pub face_radius: u16,
}

impl Default for SceneLayout {
    /// Landscape layout for a 128x296 panel rotated by 90 degrees.
    fn default() -> Self {
        Self {
            title: "SOIL MOOD",
            value_label: "MOISTURE",
            title_x: 8,
            title_y: 6,
            divider_y: 18,
            region_x: 8,
            region_y: 8,
            region_width: 96,
            region_height: 280,
            outline: 1,
            face_radius: 40,
        }
    }
}

impl SceneLayout {
    pub const fn with_title(mut self, title: &'static str, value_label: &'static str) -> Self {
        self.title = title;
        self.value_label = value_label;
        self
    }

    pub const fn with_header(mut self, title_x: i32, title_y: i32, divider_y: i32) -> Self {
        self.title_x = title_x;
        self.title_y = title_y;
        self.divider_y = divider_y;
        self
    }

    pub const fn with_dynamic_region(mut self, x: u16, y: u16, width: u16, height: u16) -> Self {
        self.region_x = x;
        self.region_y = y;
        self.region_width = width;
        self.region_height = height;
        self
    }

    pub const fn with_outline(mut self, outline: u16) -> Self {
        self.outline = outline;
        self
    }

    pub const fn with_face_radius(mut self, face_radius: u16) -> Self {
        self.face_radius = face_radius;
        self
    }

    /// Dynamic region checked against a `width` x `height` memory frame.
    pub const fn dynamic_region(&self, width: u16, height: u16) -> Result<Region, RegionError> {
        match Region::new(
            self.region_x,
            self.region_y,
            self.region_width,
            self.region_height,
        ) {
            Ok(region) => region.within(width, height),
            Err(err) => Err(err),
        }
    }
}

/// Filled pixels of a progress bar interior `inner_width` wide.
pub const fn bar_fill_width(inner_width: u32, percent: Percent) -> u32 {
    inner_width * percent.value() as u32 / 100
}

/// Writes `value` as decimal ASCII and returns it.
fn percent_digits(value: u8, out: &mut [u8; 3]) -> &str {
    let mut len = 0;
    if value >= 100 {
        out[len] = b'0' + value / 100;
        len += 1;
    }
    if value >= 10 {
        out[len] = b'0' + (value / 10) % 10;
        len += 1;
    }
    out[len] = b'0' + value % 10;
    len += 1;

    core::str::from_utf8(&out[..len]).unwrap_or("0")
}

/// Face placement after clamping into a rectangle.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FaceGeometry {
    pub cx: i32,
    pub cy: i32,
    pub radius: i32,
}

impl FaceGeometry {
    /// Places a face of at most `radius` against the right edge of `area`,
    /// vertically centred, shrinking it until it fits.
    pub fn fit(area: Rect, radius: u16) -> Self {
        if area.is_empty() {
            return Self {
                cx: area.x,
                cy: area.y,
                radius: 0,
            };
        }

        let max_radius = (area.width.min(area.height).saturating_sub(1) / 2) as i32;
        let radius = (radius as i32).min(max_radius);

        let cx = (area.right() - 1 - radius - PAD)
            .clamp(area.x + radius, area.right() - 1 - radius);
        let cy = (area.y + area.height as i32 / 2)
            .clamp(area.y + radius, area.bottom() - 1 - radius);

        Self { cx, cy, radius }
    }

    /// Scales a per-mille face point to pixels.
    fn point(&self, p: FacePoint) -> (i32, i32) {
        (
            self.cx + p.dx as i32 * self.radius / 1000,
            self.cy + p.dy as i32 * self.radius / 1000,
        )
    }

    fn scaled(&self, permille: u16) -> i32 {
        permille as i32 * self.radius / 1000
    }
}

/// Draws the moisture screen into the front canvas it owns.
pub struct SceneRenderer<G, B> {
    canvas: Canvas<B>,
    layout: SceneLayout,
    small: G,
    large: G,
    region: Region,
    frame: Rect,
    interior: Rect,
}

impl<G, B> SceneRenderer<G, B>
where
    G: GlyphSource,
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    pub fn new(
        canvas: Canvas<B>,
        layout: SceneLayout,
        small: G,
        large: G,
    ) -> Result<Self, ConfigError> {
        let region = layout.dynamic_region(canvas.width(), canvas.height())?;
        let frame = canvas
            .logical_rect_of(region.x(), region.y(), region.width(), region.height())
            .ok_or(ConfigError::Region(RegionError::OutOfBounds))?;
        let interior = frame.inset(layout.outline.max(1) as u32);
        if interior.is_empty() {
            return Err(ConfigError::Region(RegionError::Empty));
        }

        Ok(Self {
            canvas,
            layout,
            small,
            large,
            region,
            frame,
            interior,
        })
    }

    pub fn canvas(&self) -> &Canvas<B> {
        &self.canvas
    }

    /// Memory-space region rewritten by [`render_dynamic`](Self::render_dynamic).
    pub fn region(&self) -> Region {
        self.region
    }

    /// Logical rectangle of the region outline.
    pub fn frame(&self) -> Rect {
        self.frame
    }

    /// Logical rectangle inside the outline.
    pub fn interior(&self) -> Rect {
        self.interior
    }

    pub fn face(&self) -> FaceGeometry {
        FaceGeometry::fit(self.interior, self.layout.face_radius)
    }

    /// Clears the canvas and draws title, divider and region outline.
    pub fn render_static(&mut self) {
        let layout = self.layout;
        let (logical_width, _) = self.canvas.logical_size();

        self.canvas.clear(Color::White);

        let skipped = self.canvas.draw_string(
            layout.title_x,
            layout.title_y,
            layout.title,
            &self.small,
            None,
            Color::Black,
        );
        if skipped > 0 {
            warn!("scene: title is missing {} glyph(s)", skipped);
        }

        self.canvas.draw_line(
            0,
            layout.divider_y,
            logical_width as i32 - 1,
            layout.divider_y,
            Color::Black,
            1,
            LineStyle::Solid,
        );

        let frame = self.frame;
        self.canvas.draw_rect(
            frame.x,
            frame.y,
            frame.right() - 1,
            frame.bottom() - 1,
            Color::Black,
            FillMode::Stroke,
            layout.outline.max(1),
        );
    }

    /// Redraws everything inside the region outline for `percent`.
    ///
    /// Writes never leave the interior rectangle.
    pub fn render_dynamic(&mut self, percent: Percent, band: &MoodBand) {
        let Self {
            canvas,
            layout,
            small,
            large,
            interior,
            ..
        } = self;
        let interior = *interior;

        let skipped = canvas.with_clip(interior, |canvas| {
            canvas.draw_rect(
                interior.x,
                interior.y,
                interior.right() - 1,
                interior.bottom() - 1,
                Color::White,
                FillMode::Filled,
                1,
            );
            draw_readout(canvas, interior, layout, small, large, percent, band)
        });

        if skipped > 0 {
            warn!(
                "scene: {} glyph(s) missing for {}% {}",
                skipped,
                percent.value(),
                band.label
            );
        }
    }
}

fn draw_readout<G, B>(
    canvas: &mut Canvas<B>,
    interior: Rect,
    layout: &SceneLayout,
    small: &G,
    large: &G,
    percent: Percent,
    band: &MoodBand,
) -> usize
where
    G: GlyphSource,
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    let (_, small_h) = small.scaled_cell();
    let (large_w, large_h) = large.scaled_cell();
    let (small_h, large_w, large_h) = (small_h as i32, large_w as i32, large_h as i32);

    let face = FaceGeometry::fit(interior, layout.face_radius);
    let text_x = interior.x + PAD;
    let mut y = interior.y + PAD;
    let mut skipped = 0;

    skipped += canvas.draw_string(text_x, y, layout.value_label, small, None, Color::Black);
    y += small_h + 2;

    let mut digits = [0u8; 3];
    let digits = percent_digits(percent.value(), &mut digits);
    skipped += canvas.draw_string(text_x, y, digits, large, None, Color::Black);

    let gap = PERCENT_GAP[percent.digit_count() - 1] * large.scale().max(1) as i32;
    let sign_x = text_x + large.text_width(digits) as i32 + gap;
    draw_percent_sign(canvas, sign_x, y, large_w, large_h, large.scale());
    y += large_h + PAD;

    skipped += canvas.draw_string(text_x, y, band.label, small, None, Color::Black);
    y += small_h + PAD;

    let bar_right = face.cx - face.radius - 2 * PAD;
    if bar_right - text_x >= 3 {
        draw_bar(canvas, text_x, y, bar_right, percent);
    }

    draw_face(canvas, &face, band);
    skipped
}

/// Two dots joined by a rising diagonal, drawn in a `width` x `height` cell.
fn draw_percent_sign<B>(
    canvas: &mut Canvas<B>,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    scale: u16,
) where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    let scale = scale.max(1);
    let dot = (width / 6).max(1) as u16;
    let right = x + width - 1 - scale as i32;
    let bottom = y + height - 1 - scale as i32;

    canvas.draw_circle(
        x + dot as i32,
        y + dot as i32,
        dot,
        Color::Black,
        FillMode::Filled,
        1,
    );
    canvas.draw_circle(
        right - dot as i32,
        bottom - dot as i32,
        dot,
        Color::Black,
        FillMode::Filled,
        1,
    );
    canvas.draw_line(
        x,
        bottom,
        right,
        y,
        Color::Black,
        scale.div_ceil(2),
        LineStyle::Solid,
    );
}

fn draw_bar<B>(canvas: &mut Canvas<B>, left: i32, top: i32, right: i32, percent: Percent)
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    let bottom = top + BAR_HEIGHT - 1;
    canvas.draw_rect(left, top, right, bottom, Color::Black, FillMode::Stroke, 1);

    let inner_width = (right - left - 1) as u32;
    let fill = bar_fill_width(inner_width, percent) as i32;
    if fill > 0 {
        canvas.draw_rect(
            left + 1,
            top + 1,
            left + fill,
            bottom - 1,
            Color::Black,
            FillMode::Filled,
            1,
        );
    }
}

fn draw_face<B>(canvas: &mut Canvas<B>, face: &FaceGeometry, band: &MoodBand)
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    let expression = &band.expression;
    let radius = face.radius as u16;
    let stroke = (radius / 20).max(1);
    canvas.draw_circle(face.cx, face.cy, radius, Color::Black, FillMode::Stroke, stroke);

    let eye_dx = face.scaled(expression.eye_dx);
    let eye_y = face.cy + expression.eye_dy as i32 * face.radius / 1000;
    let eye_r = face.scaled(expression.eye_radius).max(1) as u16;
    for eye_x in [face.cx - eye_dx, face.cx + eye_dx] {
        canvas.draw_circle(eye_x, eye_y, eye_r, Color::Black, FillMode::Filled, 1);
    }

    draw_mouth(canvas, face, expression.mouth, stroke);

    if expression.decoration == Some(Decoration::SweatDrops) {
        draw_sweat(canvas, face);
    }
}

/// Quadratic Bezier through `mouth[0]` and `mouth[2]`, sampled into segments.
fn draw_mouth<B>(
    canvas: &mut Canvas<B>,
    face: &FaceGeometry,
    mouth: [FacePoint; 3],
    stroke: u16,
) where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    let [p0, p1, p2] = mouth.map(|p| face.point(p));
    let n = MOUTH_SEGMENTS;
    let n2 = n * n;

    let mut previous = p0;
    for i in 1..=n {
        let a = (n - i) * (n - i);
        let b = 2 * (n - i) * i;
        let c = i * i;
        let x = (a * p0.0 + b * p1.0 + c * p2.0) / n2;
        let y = (a * p0.1 + b * p1.1 + c * p2.1) / n2;

        canvas.draw_line(
            previous.0,
            previous.1,
            x,
            y,
            Color::Black,
            stroke,
            LineStyle::Solid,
        );
        previous = (x, y);
    }
}

fn draw_sweat<B>(canvas: &mut Canvas<B>, face: &FaceGeometry)
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    let drop = face.scaled(80).max(1);
    let tail = face.scaled(140).max(1);

    for side in [-1, 1] {
        let (x, y) = face.point(FacePoint::new(side * 620, -380));
        canvas.draw_circle(x, y, drop as u16, Color::Black, FillMode::Filled, 1);
        canvas.draw_line(x, y - drop, x, y - tail, Color::Black, 1, LineStyle::Solid);
        canvas.draw_point(x, y + drop + 2, Color::Black, 1, DotStyle::FillAround);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{mood::BandTable, test_support::BlockFont};
    use bitcanvas::{Mirror, Rotation, buffer_len_for};

    fn canvas(rotation: Rotation) -> Canvas<Vec<u8>> {
        Canvas::new(vec![0u8; buffer_len_for(128, 296)], 128, 296, rotation, Mirror::None)
            .unwrap()
    }

    fn renderer(rotation: Rotation, layout: SceneLayout) -> SceneRenderer<BlockFont, Vec<u8>> {
        SceneRenderer::new(
            canvas(rotation),
            layout,
            BlockFont::new(1),
            BlockFont::new(3),
        )
        .unwrap()
    }

    fn outside_interior_unchanged(
        before: &Canvas<Vec<u8>>,
        after: &Canvas<Vec<u8>>,
        interior: Rect,
    ) -> bool {
        let (w, h) = before.logical_size();
        (0..h as i32).all(|y| {
            (0..w as i32)
                .all(|x| interior.contains(x, y) || before.pixel(x, y) == after.pixel(x, y))
        })
    }

    #[test]
    fn bar_fill_floors() {
        assert_eq!(bar_fill_width(98, Percent::new(50)), 49);
        assert_eq!(bar_fill_width(98, Percent::new(1)), 0);
        assert_eq!(bar_fill_width(98, Percent::FULL), 98);
        assert_eq!(bar_fill_width(0, Percent::FULL), 0);
    }

    #[test]
    fn digits_are_ascii_decimal() {
        let mut out = [0u8; 3];
        assert_eq!(percent_digits(0, &mut out), "0");
        assert_eq!(percent_digits(7, &mut out), "7");
        assert_eq!(percent_digits(42, &mut out), "42");
        assert_eq!(percent_digits(100, &mut out), "100");
    }

    #[test]
    fn default_region_maps_to_landscape_rect() {
        let r = renderer(Rotation::Deg90, SceneLayout::default());
        assert_eq!(r.frame(), Rect::new(8, 24, 280, 96));
        assert_eq!(r.interior(), Rect::new(9, 25, 278, 94));
    }

    #[test]
    fn face_is_clamped_into_small_interiors() {
        let area = Rect::new(10, 20, 30, 12);
        let face = FaceGeometry::fit(area, 40);

        assert_eq!(face.radius, 5);
        assert!(face.cx - face.radius >= area.x && face.cx + face.radius < area.right());
        assert!(face.cy - face.radius >= area.y && face.cy + face.radius < area.bottom());

        let face = FaceGeometry::fit(Rect::new(0, 0, 200, 100), 10);
        assert_eq!(face.radius, 10);
        assert_eq!(face.cx, 200 - 1 - 10 - PAD);
        assert_eq!(face.cy, 50);
    }

    #[test]
    fn static_layer_draws_outline_and_divider() {
        let mut r = renderer(Rotation::Deg90, SceneLayout::default());
        r.render_static();
        let c = r.canvas();

        assert_eq!(c.pixel(0, 18), Some(Color::Black));
        assert_eq!(c.pixel(295, 18), Some(Color::Black));
        assert_eq!(c.pixel(8, 24), Some(Color::Black));
        assert_eq!(c.pixel(287, 119), Some(Color::Black));
        assert_eq!(c.pixel(100, 60), Some(Color::White));
    }

    #[test]
    fn dynamic_layer_never_leaves_interior() {
        let table = BandTable::five_band();

        for rotation in [Rotation::Deg0, Rotation::Deg90, Rotation::Deg270] {
            for radius in [0u16, 3, 20, 40, 500] {
                let layout = SceneLayout::default().with_face_radius(radius);
                let mut r = renderer(rotation, layout);
                r.render_static();
                let before = r.canvas().clone();
                let interior = r.interior();

                for p in (0..=100u8).step_by(7).chain([100]) {
                    let percent = Percent::new(p);
                    r.render_dynamic(percent, table.classify(percent));
                    assert!(
                        outside_interior_unchanged(&before, r.canvas(), interior),
                        "rotation {rotation:?} radius {radius} percent {p}"
                    );
                }
            }
        }
    }

    #[test]
    fn dynamic_layer_is_a_function_of_percent() {
        let table = BandTable::three_band();
        let mut a = renderer(Rotation::Deg90, SceneLayout::default());
        let mut b = renderer(Rotation::Deg90, SceneLayout::default());
        a.render_static();
        b.render_static();

        a.render_dynamic(Percent::new(12), table.classify(Percent::new(12)));
        a.render_dynamic(Percent::new(88), table.classify(Percent::new(88)));
        b.render_dynamic(Percent::new(88), table.classify(Percent::new(88)));

        assert_eq!(a.canvas().bytes(), b.canvas().bytes());
    }

    #[test]
    fn progress_bar_fill_tracks_percent() {
        let table = BandTable::three_band();
        let mut r = renderer(Rotation::Deg0, SceneLayout::default().with_face_radius(0));
        let interior = r.interior();
        r.render_dynamic(Percent::new(50), table.classify(Percent::new(50)));

        // Bar top row sits below label, digits and status text.
        let text_x = interior.x + PAD;
        let bar_top = interior.y + PAD + (8 + 2) + 24 + PAD + 8 + PAD;
        let face = r.face();
        let bar_right = face.cx - face.radius - 2 * PAD;
        let inner = (bar_right - text_x - 1) as u32;
        let fill = bar_fill_width(inner, Percent::new(50)) as i32;
        let c = r.canvas();

        let row = bar_top + BAR_HEIGHT / 2;
        assert_eq!(c.pixel(text_x + fill, row), Some(Color::Black));
        assert_eq!(c.pixel(text_x + fill + 1, row), Some(Color::White));
        assert_eq!(c.pixel(bar_right, row), Some(Color::Black));
    }

    #[test]
    fn percent_sign_moves_right_with_digit_count() {
        let table = BandTable::three_band();
        let mut leftmost = std::vec::Vec::new();

        for p in [5u8, 55, 100] {
            let mut r = renderer(Rotation::Deg90, SceneLayout::default());
            let percent = Percent::new(p);
            r.render_dynamic(percent, table.classify(percent));

            let interior = r.interior();
            let digits_y = interior.y + PAD + 10;
            let text_x = interior.x + PAD;
            let digits_w = 18 * percent.digit_count() as i32;
            // First black column right of the digits inside the digit row.
            let first = (text_x + digits_w..interior.right())
                .find(|&x| {
                    (digits_y..digits_y + 24)
                        .any(|y| r.canvas().pixel(x, y) == Some(Color::Black))
                })
                .unwrap();
            leftmost.push(first - text_x - digits_w);
        }

        assert!(leftmost[0] < leftmost[1] && leftmost[1] < leftmost[2]);
    }

    #[test]
    fn empty_interior_is_a_config_error() {
        let layout = SceneLayout::default()
            .with_dynamic_region(0, 0, 8, 2)
            .with_outline(1);
        let err = SceneRenderer::new(
            canvas(Rotation::Deg0),
            layout,
            BlockFont::new(1),
            BlockFont::new(1),
        )
        .err();
        assert_eq!(err, Some(ConfigError::Region(RegionError::Empty)));
    }
}
