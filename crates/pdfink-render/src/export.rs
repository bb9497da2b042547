//! Export: flatten every page with its annotations into a new PDF.

use crate::decoder::PageDecoder;
use crate::encoder::{EncodeError, PdfEncoder};
use crate::pipeline::{RenderError, render_page};
use crate::raster::{RasterError, new_surface, surface_to_png};
use crate::strokes::StrokeRenderer;
use pdfink_core::annotations::AnnotationStore;
use pdfink_core::geometry::{PageGeometry, viewport_size};
use thiserror::Error;
use tiny_skia::{FilterQuality, Pixmap, PixmapPaint, Transform};

/// Default name of the downloaded file.
pub const EXPORT_FILE_NAME: &str = "annotated.pdf";

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Document has no pages to export")]
    EmptyDocument,
    #[error("No geometry recorded for page {0}")]
    MissingGeometry(u32),
    #[error("Render failed: {0}")]
    Render(#[from] RenderError),
    #[error("Raster error: {0}")]
    Raster(#[from] RasterError),
    #[error("Encode failed: {0}")]
    Encode(#[from] EncodeError),
}

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// A finished export, ready to be handed to the browser.
#[derive(Debug, Clone)]
pub struct ExportedPdf {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub page_count: u32,
}

/// Flatten every page of the document and encode the result with `E`.
///
/// Pages are rendered at scale 1 one after another, so the output never
/// depends on the interactive zoom and only one page bitmap is alive at a
/// time. Output page N has the intrinsic size of source page N.
pub async fn export_document<D, E>(
    decoder: &D,
    geometry: &PageGeometry,
    store: &AnnotationStore,
    renderer: &StrokeRenderer,
) -> ExportResult<ExportedPdf>
where
    D: PageDecoder + ?Sized,
    E: PdfEncoder,
{
    let page_count = geometry.page_count();
    if page_count == 0 {
        log::warn!("Export declined: document has no pages");
        return Err(ExportError::EmptyDocument);
    }

    let first_size = geometry.size(1).ok_or(ExportError::MissingGeometry(1))?;
    let mut encoder = E::new(first_size)?;
    for page in 1..=page_count {
        let size = geometry.size(page).ok_or(ExportError::MissingGeometry(page))?;
        let flattened = flatten_page(decoder, geometry, store, renderer, page).await?;
        let png = surface_to_png(&flattened)?;

        if page > 1 {
            encoder.add_page(size)?;
        }
        encoder.place_image(&png)?;
        log::debug!("Flattened page {}/{}", page, page_count);
    }

    let bytes = encoder.finish()?;
    log::info!("Exported {} page(s), {} bytes", page_count, bytes.len());

    Ok(ExportedPdf {
        file_name: EXPORT_FILE_NAME.to_string(),
        bytes,
        page_count,
    })
}

/// Render one page at scale 1 with its strokes onto a fresh white surface
/// sized to the page's intrinsic geometry.
pub async fn flatten_page<D>(
    decoder: &D,
    geometry: &PageGeometry,
    store: &AnnotationStore,
    renderer: &StrokeRenderer,
    page: u32,
) -> ExportResult<Pixmap>
where
    D: PageDecoder + ?Sized,
{
    let size = geometry.size(page).ok_or(ExportError::MissingGeometry(page))?;
    let (width, height) = viewport_size(size, 1.0)
        .ok_or(RenderError::ViewportTooLarge { page, scale: 1.0 })?;
    let rendered = render_page(decoder, page, 1.0, store.strokes(page), renderer).await?;

    let mut target = new_surface(width, height)?;
    target.fill(tiny_skia::Color::WHITE);

    let sx = width as f32 / rendered.width() as f32;
    let sy = height as f32 / rendered.height() as f32;
    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..Default::default()
    };
    target.draw_pixmap(
        0,
        0,
        rendered.surface.as_ref(),
        &paint,
        Transform::from_scale(sx, sy),
        None,
    );
    Ok(target)
}
