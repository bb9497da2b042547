//! Per-page annotation storage.

use crate::stroke::{Stroke, StrokeId, StrokeKind};
use kurbo::Point;
use std::collections::BTreeMap;
use thiserror::Error;

/// Annotation store errors.
#[derive(Debug, Error, PartialEq)]
pub enum AnnotationError {
    #[error("Invalid page number: {0} (pages are numbered from 1)")]
    InvalidPage(u32),
    #[error("Invalid stroke width: {0}")]
    InvalidWidth(f64),
}

/// Handle to the stroke of an in-progress gesture.
///
/// Returned by [`AnnotationStore::begin_stroke`] and passed back to
/// [`AnnotationStore::extend_stroke`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StrokeHandle {
    page: u32,
    id: StrokeId,
}

impl StrokeHandle {
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn stroke_id(&self) -> StrokeId {
        self.id
    }
}

/// Strokes of every page, in paint order.
///
/// Later strokes on a page paint over earlier ones. Page entries are
/// created on the first stroke.
#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    pages: BTreeMap<u32, Vec<Stroke>>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new stroke on `page` and append it on top of existing ones.
    pub fn begin_stroke(
        &mut self,
        page: u32,
        kind: StrokeKind,
        width: f64,
        first_point: Point,
    ) -> Result<StrokeHandle, AnnotationError> {
        if page == 0 {
            return Err(AnnotationError::InvalidPage(page));
        }
        if !width.is_finite() || width <= 0.0 {
            return Err(AnnotationError::InvalidWidth(width));
        }

        let stroke = Stroke::new(kind, width, first_point);
        let handle = StrokeHandle {
            page,
            id: stroke.id(),
        };
        self.pages.entry(page).or_default().push(stroke);
        Ok(handle)
    }

    /// Append a point to the stroke named by `handle`.
    ///
    /// Returns false when that stroke no longer exists, e.g. because it was
    /// erased while the gesture was still running.
    pub fn extend_stroke(&mut self, handle: StrokeHandle, point: Point) -> bool {
        let Some(strokes) = self.pages.get_mut(&handle.page) else {
            return false;
        };
        // The active stroke is almost always the topmost one.
        match strokes.iter_mut().rev().find(|s| s.id == handle.id) {
            Some(stroke) => {
                stroke.add_point(point);
                true
            }
            None => false,
        }
    }

    /// Remove every whole stroke on `page` with a point strictly closer than
    /// `radius` to `center`. Returns the strokes that remain.
    pub fn erase_at(&mut self, page: u32, center: Point, radius: f64) -> &[Stroke] {
        let Some(strokes) = self.pages.get_mut(&page) else {
            return &[];
        };

        let before = strokes.len();
        strokes.retain(|stroke| !stroke.touches(center, radius));
        let removed = before - strokes.len();
        if removed > 0 {
            log::debug!("Erased {} stroke(s) on page {}", removed, page);
        }

        strokes
    }

    /// Strokes of `page` in paint order; empty if the page has none.
    pub fn strokes(&self, page: u32) -> &[Stroke] {
        self.pages.get(&page).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of strokes across all pages.
    pub fn stroke_count(&self) -> usize {
        self.pages.values().map(Vec::len).sum()
    }

    /// Pages that currently carry at least one stroke, ascending.
    pub fn annotated_pages(&self) -> impl Iterator<Item = u32> + '_ {
        self.pages
            .iter()
            .filter(|(_, strokes)| !strokes.is_empty())
            .map(|(page, _)| *page)
    }

    /// Drop every stroke on every page.
    pub fn clear(&mut self) {
        self.pages.clear();
    }
}
