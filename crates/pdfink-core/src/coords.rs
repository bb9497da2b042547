//! Mapping between screen coordinates and page-intrinsic coordinates.
//!
//! Page-intrinsic coordinates are expressed at zoom scale 1. Every stored
//! stroke point lives in this space so the same record renders at any zoom
//! level and at export resolution.

use kurbo::{Affine, Point};

/// Get the affine transform from page space to screen space at `scale`.
pub fn page_to_screen_transform(scale: f64) -> Affine {
    Affine::scale(scale)
}

/// Get the inverse transform, from screen space to page space.
pub fn screen_to_page_transform(scale: f64) -> Affine {
    Affine::scale(1.0 / scale)
}

/// Convert a screen point to page-intrinsic coordinates.
pub fn to_page_coords(screen_point: Point, scale: f64) -> Point {
    screen_to_page_transform(scale) * screen_point
}

/// Convert a page-intrinsic point to screen coordinates.
pub fn to_screen_coords(page_point: Point, scale: f64) -> Point {
    page_to_screen_transform(scale) * page_point
}
