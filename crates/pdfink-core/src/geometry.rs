//! Intrinsic page sizes captured at document load.

use kurbo::Size;
use std::collections::BTreeMap;

/// Intrinsic (scale 1) size of every page, keyed by 1-based page number.
///
/// Captured once when a document is loaded so export can size its surfaces
/// without consulting the current zoom.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageGeometry {
    sizes: BTreeMap<u32, Size>,
}

impl PageGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from sizes listed in page order, starting at page 1.
    pub fn from_sizes(sizes: impl IntoIterator<Item = Size>) -> Self {
        let sizes = sizes
            .into_iter()
            .enumerate()
            .map(|(index, size)| (index as u32 + 1, size))
            .collect();
        Self { sizes }
    }

    pub fn insert(&mut self, page: u32, size: Size) {
        self.sizes.insert(page, size);
    }

    pub fn size(&self, page: u32) -> Option<Size> {
        self.sizes.get(&page).copied()
    }

    pub fn page_count(&self) -> u32 {
        self.sizes.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

/// Largest width or height of any raster surface, in pixels.
pub const MAX_SURFACE_SIDE: u32 = 16_384;
/// Largest pixel count of any raster surface (256 MiB of RGBA).
pub const MAX_SURFACE_PIXELS: u64 = 1 << 26;

/// Whether a `width` x `height` surface is within the raster limits.
pub fn surface_fits(width: u32, height: u32) -> bool {
    width <= MAX_SURFACE_SIDE
        && height <= MAX_SURFACE_SIDE
        && u64::from(width) * u64::from(height) <= MAX_SURFACE_PIXELS
}

/// Pixel dimensions of a viewport for a page of `size` at `scale`.
///
/// Rounded to the nearest pixel, never smaller than 1x1. `None` when the
/// scale is not a positive number or the result exceeds the raster limits.
pub fn viewport_size(size: Size, scale: f64) -> Option<(u32, u32)> {
    if !scale.is_finite() || scale <= 0.0 {
        return None;
    }
    let width = (size.width * scale).round().max(1.0);
    let height = (size.height * scale).round().max(1.0);
    let max_side = f64::from(MAX_SURFACE_SIDE);
    if !(width <= max_side && height <= max_side) {
        return None;
    }
    let (width, height) = (width as u32, height as u32);
    surface_fits(width, height).then_some((width, height))
}
