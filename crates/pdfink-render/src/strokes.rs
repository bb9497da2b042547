//! Stroke rasterization with tiny-skia.

use kurbo::Point;
use pdfink_core::stroke::{Stroke, StrokeKind};
use peniko::Color;
use tiny_skia::{FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Transform};

/// Colors used for each stroke kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub pen: Color,
    pub highlighter: Color,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            pen: StrokeKind::Pen.color(),
            highlighter: StrokeKind::Highlighter.color(),
        }
    }
}

impl StrokeStyle {
    /// Set the pen color.
    pub fn with_pen_color(mut self, color: Color) -> Self {
        self.pen = color;
        self
    }

    /// Set the highlighter color (alpha included).
    pub fn with_highlighter_color(mut self, color: Color) -> Self {
        self.highlighter = color;
        self
    }

    pub fn color(&self, kind: StrokeKind) -> Color {
        match kind {
            StrokeKind::Pen => self.pen,
            StrokeKind::Highlighter => self.highlighter,
        }
    }
}

/// Paints strokes onto a surface at a given scale.
///
/// Stroke points are page coordinates; they are multiplied by the scale and
/// so is the line width, which keeps pen thickness constant in page space.
#[derive(Debug, Clone, Default)]
pub struct StrokeRenderer {
    style: StrokeStyle,
}

impl StrokeRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(style: StrokeStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &StrokeStyle {
        &self.style
    }

    /// Clear the whole surface, then paint `strokes` in order.
    pub fn render(&self, strokes: &[Stroke], surface: &mut Pixmap, scale: f64) {
        surface.fill(tiny_skia::Color::TRANSPARENT);
        self.paint(strokes, surface, scale);
    }

    /// Paint `strokes` in order on top of whatever the surface holds.
    pub fn paint(&self, strokes: &[Stroke], surface: &mut Pixmap, scale: f64) {
        for stroke in strokes {
            self.paint_stroke(stroke, surface, scale);
        }
    }

    fn paint_stroke(&self, stroke: &Stroke, surface: &mut Pixmap, scale: f64) {
        let Some(&first) = stroke.points.first() else {
            return;
        };

        let rgba = self.style.color(stroke.kind).to_rgba8();
        let mut paint = Paint::default();
        paint.set_color_rgba8(rgba.r, rgba.g, rgba.b, rgba.a);
        paint.anti_alias = true;

        let width = (stroke.width * scale) as f32;
        let (x0, y0) = scaled(first, scale);

        // A tap (or a gesture that never moved) has no length to stroke.
        if stroke.points.iter().all(|p| *p == first) {
            if let Some(dot) = PathBuilder::from_circle(x0, y0, width / 2.0) {
                surface.fill_path(&dot, &paint, FillRule::Winding, Transform::identity(), None);
            }
            return;
        }

        let mut pb = PathBuilder::new();
        pb.move_to(x0, y0);
        for &point in &stroke.points[1..] {
            let (x, y) = scaled(point, scale);
            pb.line_to(x, y);
        }
        let Some(path) = pb.finish() else {
            return;
        };

        let line = tiny_skia::Stroke {
            width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Default::default()
        };
        surface.stroke_path(&path, &paint, &line, Transform::identity(), None);
    }
}

fn scaled(point: Point, scale: f64) -> (f32, f32) {
    ((point.x * scale) as f32, (point.y * scale) as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface(width: u32, height: u32) -> Pixmap {
        Pixmap::new(width, height).unwrap()
    }

    fn rgba_at(pixmap: &Pixmap, x: u32, y: u32) -> [u8; 4] {
        let c = pixmap.pixel(x, y).unwrap().demultiply();
        [c.red(), c.green(), c.blue(), c.alpha()]
    }

    fn line(kind: StrokeKind, width: f64, points: &[(f64, f64)]) -> Stroke {
        Stroke::from_points(
            kind,
            width,
            points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
        )
    }

    #[test]
    fn test_pen_paints_opaque_black() {
        let mut pixmap = surface(40, 40);
        let stroke = line(StrokeKind::Pen, 4.0, &[(10.0, 10.0), (30.0, 10.0)]);

        StrokeRenderer::new().render(&[stroke], &mut pixmap, 1.0);

        assert_eq!(rgba_at(&pixmap, 20, 10), [0, 0, 0, 255]);
        assert_eq!(rgba_at(&pixmap, 20, 30)[3], 0);
    }

    #[test]
    fn test_highlighter_is_translucent() {
        let mut pixmap = surface(40, 40);
        let stroke = line(StrokeKind::Highlighter, 8.0, &[(5.0, 20.0), (35.0, 20.0)]);

        StrokeRenderer::new().render(&[stroke], &mut pixmap, 1.0);

        let [r, g, b, a] = rgba_at(&pixmap, 20, 20);
        assert!(r > 250 && g > 250 && b < 5);
        assert!((70..=85).contains(&a), "alpha was {}", a);
    }

    #[test]
    fn test_render_clears_surface() {
        let mut pixmap = surface(20, 20);
        pixmap.fill(tiny_skia::Color::from_rgba8(255, 0, 0, 255));

        StrokeRenderer::new().render(&[], &mut pixmap, 1.0);

        assert_eq!(rgba_at(&pixmap, 5, 5)[3], 0);
    }

    #[test]
    fn test_paint_keeps_background() {
        let mut pixmap = surface(20, 20);
        pixmap.fill(tiny_skia::Color::WHITE);
        let stroke = line(StrokeKind::Pen, 2.0, &[(2.0, 2.0), (18.0, 2.0)]);

        StrokeRenderer::new().paint(&[stroke], &mut pixmap, 1.0);

        assert_eq!(rgba_at(&pixmap, 10, 15), [255, 255, 255, 255]);
        assert_eq!(rgba_at(&pixmap, 10, 2), [0, 0, 0, 255]);
    }

    #[test]
    fn test_single_point_renders_dot() {
        let mut pixmap = surface(20, 20);
        let tap = line(StrokeKind::Pen, 6.0, &[(10.0, 10.0)]);

        StrokeRenderer::new().render(&[tap], &mut pixmap, 1.0);

        assert_eq!(rgba_at(&pixmap, 10, 10), [0, 0, 0, 255]);
        assert_eq!(rgba_at(&pixmap, 18, 18)[3], 0);
    }

    #[test]
    fn test_stationary_gesture_renders_dot() {
        let mut pixmap = surface(20, 20);
        let tap = line(StrokeKind::Pen, 6.0, &[(10.0, 10.0), (10.0, 10.0), (10.0, 10.0)]);

        StrokeRenderer::new().render(&[tap], &mut pixmap, 1.0);

        assert_eq!(rgba_at(&pixmap, 10, 10), [0, 0, 0, 255]);
    }

    #[test]
    fn test_scale_moves_points_and_width() {
        let mut pixmap = surface(80, 80);
        let stroke = line(StrokeKind::Pen, 2.0, &[(10.0, 10.0), (30.0, 10.0)]);

        StrokeRenderer::new().render(&[stroke], &mut pixmap, 2.0);

        // Line now runs along y = 20 from x = 20 to x = 60 with width 4.
        assert_eq!(rgba_at(&pixmap, 40, 20), [0, 0, 0, 255]);
        assert_eq!(rgba_at(&pixmap, 40, 21), [0, 0, 0, 255]);
        assert_eq!(rgba_at(&pixmap, 40, 10)[3], 0);
        assert_eq!(rgba_at(&pixmap, 40, 26)[3], 0);
    }

    #[test]
    fn test_later_stroke_paints_on_top() {
        let renderer = StrokeRenderer::new();
        let pen = line(StrokeKind::Pen, 6.0, &[(5.0, 20.0), (35.0, 20.0)]);
        let highlight = line(StrokeKind::Highlighter, 6.0, &[(5.0, 20.0), (35.0, 20.0)]);

        let mut pen_last = surface(40, 40);
        renderer.render(&[highlight.clone(), pen.clone()], &mut pen_last, 1.0);
        assert_eq!(rgba_at(&pen_last, 20, 20), [0, 0, 0, 255]);

        let mut highlight_last = surface(40, 40);
        renderer.render(&[pen, highlight], &mut highlight_last, 1.0);
        let [r, g, b, a] = rgba_at(&highlight_last, 20, 20);
        assert_eq!(a, 255);
        assert!(r > 50 && g > 50 && b < 5);
    }

    #[test]
    fn test_custom_pen_color() {
        let style = StrokeStyle::default().with_pen_color(Color::from_rgba8(255, 0, 0, 255));
        let mut pixmap = surface(40, 40);
        let pen = line(StrokeKind::Pen, 6.0, &[(5.0, 20.0), (35.0, 20.0)]);

        StrokeRenderer::with_style(style).render(&[pen], &mut pixmap, 1.0);

        assert_eq!(rgba_at(&pixmap, 20, 20), [255, 0, 0, 255]);
    }
}
