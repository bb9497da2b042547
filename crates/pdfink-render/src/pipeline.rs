//! Page render pipeline: decoded page plus annotation overlay.

use crate::decoder::{DecodeError, PageDecoder};
use crate::raster::{RasterError, new_surface, pixmap_from_image, pixmap_to_rgba};
use crate::strokes::StrokeRenderer;
use pdfink_core::geometry::viewport_size;
use pdfink_core::stroke::Stroke;
use thiserror::Error;
use tiny_skia::{Pixmap, PixmapPaint, Transform};

/// Page rendering errors.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Decode failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("Raster error: {0}")]
    Raster(#[from] RasterError),
    #[error("Page {page} is too large to rasterize at scale {scale}")]
    ViewportTooLarge { page: u32, scale: f64 },
}

/// Result type for page rendering.
pub type RenderResult<T> = Result<T, RenderError>;

/// A page rasterized at some scale with its annotations composited on top.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// Page number (1-based).
    pub page: u32,
    /// Scale the page was rendered at.
    pub scale: f64,
    /// The composited bitmap, sized to the scaled viewport.
    pub surface: Pixmap,
}

impl RenderedPage {
    pub fn width(&self) -> u32 {
        self.surface.width()
    }

    pub fn height(&self) -> u32 {
        self.surface.height()
    }

    /// Straight-alpha RGBA bytes, ready for a canvas `ImageData`.
    pub fn to_rgba(&self) -> Vec<u8> {
        pixmap_to_rgba(&self.surface)
    }
}

/// Rasterize `page` at `scale` and composite `strokes` over it.
///
/// The decoder's bitmap is awaited in full before any stroke is painted, so
/// a late page paint can never cover the annotations.
pub async fn render_page<D>(
    decoder: &D,
    page: u32,
    scale: f64,
    strokes: &[Stroke],
    renderer: &StrokeRenderer,
) -> RenderResult<RenderedPage>
where
    D: PageDecoder + ?Sized,
{
    let (width, height) = viewport_size(decoder.page_size(page)?, scale)
        .ok_or(RenderError::ViewportTooLarge { page, scale })?;
    let bitmap = decoder.render_page(page, scale).await?;

    let mut surface = new_surface(width, height)?;
    let decoded = pixmap_from_image(&bitmap)?;
    surface.draw_pixmap(
        0,
        0,
        decoded.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );

    let overlay = render_overlay(strokes, width, height, scale, renderer)?;
    surface.draw_pixmap(
        0,
        0,
        overlay.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );

    Ok(RenderedPage {
        page,
        scale,
        surface,
    })
}

/// Render only the annotation layer, on a transparent surface.
pub fn render_overlay(
    strokes: &[Stroke],
    width: u32,
    height: u32,
    scale: f64,
    renderer: &StrokeRenderer,
) -> Result<Pixmap, RasterError> {
    let mut overlay = new_surface(width, height)?;
    renderer.render(strokes, &mut overlay, scale);
    Ok(overlay)
}
