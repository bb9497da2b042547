//! Freehand strokes.

use kurbo::Point;
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a stroke.
pub type StrokeId = Uuid;

/// Kind of mark a stroke leaves on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrokeKind {
    /// Opaque black ink.
    Pen,
    /// Translucent yellow marker.
    Highlighter,
}

impl StrokeKind {
    /// Default paint color for this kind.
    pub fn color(self) -> Color {
        match self {
            StrokeKind::Pen => Color::from_rgba8(0, 0, 0, 255),
            // rgba(255, 255, 0, 0.3)
            StrokeKind::Highlighter => Color::from_rgba8(255, 255, 0, 77),
        }
    }
}

/// One continuous freehand gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub(crate) id: StrokeId,
    pub kind: StrokeKind,
    /// Line width in page units.
    pub width: f64,
    /// Points in page-intrinsic coordinates, in draw order.
    pub points: Vec<Point>,
}

impl Stroke {
    /// Create a stroke starting at `first`.
    pub fn new(kind: StrokeKind, width: f64, first: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            width,
            points: vec![first],
        }
    }

    /// Create from existing points.
    pub fn from_points(kind: StrokeKind, width: f64, points: Vec<Point>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            width,
            points,
        }
    }

    pub fn id(&self) -> StrokeId {
        self.id
    }

    /// Add a point to the path.
    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether any recorded point is strictly closer than `radius` to `center`.
    ///
    /// Only the sampled points count, not the segments between them or the
    /// painted line width.
    pub fn touches(&self, center: Point, radius: f64) -> bool {
        if radius <= 0.0 {
            return false;
        }
        self.points.iter().any(|p| p.distance(center) < radius)
    }
}
