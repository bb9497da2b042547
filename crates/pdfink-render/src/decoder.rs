//! PDF page decoding.
//!
//! [`PageDecoder`] is the seam to whatever rasterizes PDF content. Decoding
//! is asynchronous so browser-side renderers can plug in; the futures are not
//! `Send` because everything runs on the single UI thread.

use crate::content::{PageFrame, paint_page};
use crate::raster::pixmap_to_rgba;
use image::RgbaImage;
use kurbo::Size;
use lopdf::{Dictionary, Document, Object, ObjectId};
use pdfink_core::geometry::viewport_size;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;
use tiny_skia::Pixmap;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Page size used when a page carries no usable MediaBox (US Letter).
pub const FALLBACK_PAGE_SIZE: Size = Size::new(612.0, 792.0);

/// Decoding errors.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("PDF parse error: {0}")]
    Parse(#[from] lopdf::Error),
    #[error("Encrypted PDFs are not supported")]
    Encrypted,
    #[error("Document has no pages")]
    NoPages,
    #[error("Page {page} out of range (page_count={page_count})")]
    PageOutOfRange { page: u32, page_count: u32 },
    #[error("Invalid render scale: {0}")]
    InvalidScale(f64),
    #[error("Page {page} is too large to rasterize at scale {scale}")]
    TooLarge { page: u32, scale: f64 },
    #[error("Decoder backend error: {0}")]
    Backend(String),
}

/// Result type for decoding operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// A decoded PDF document able to rasterize its pages.
///
/// Pages are numbered from 1.
pub trait PageDecoder {
    /// Decode a document from its raw bytes.
    fn open(bytes: Vec<u8>) -> BoxFuture<'static, DecodeResult<Self>>
    where
        Self: Sized;

    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// Intrinsic page size at scale 1, in PDF points.
    fn page_size(&self, page: u32) -> DecodeResult<Size>;

    /// Rasterize a page at `scale` into a bitmap sized to the scaled viewport.
    fn render_page(&self, page: u32, scale: f64) -> BoxFuture<'_, DecodeResult<RgbaImage>>;
}

#[derive(Debug, Clone, Copy)]
struct PageEntry {
    id: ObjectId,
    frame: PageFrame,
}

/// Decoder backed by `lopdf`.
///
/// Reads the page tree and page geometry (MediaBox and Rotate, including
/// values inherited from parent nodes) and paints page content with the
/// interpreter in [`crate::content`] on white paper.
#[derive(Debug, Clone)]
pub struct LopdfDecoder {
    doc: Document,
    pages: Vec<PageEntry>,
}

impl LopdfDecoder {
    /// Parse a document synchronously.
    pub fn from_bytes(bytes: &[u8]) -> DecodeResult<Self> {
        if bytes.windows(b"/Encrypt".len()).any(|window| window == b"/Encrypt") {
            return Err(DecodeError::Encrypted);
        }

        let doc = Document::load_mem(bytes)?;
        let pages: Vec<PageEntry> = doc
            .get_pages()
            .into_values()
            .map(|id| PageEntry {
                id,
                frame: page_frame(&doc, id),
            })
            .collect();

        if pages.is_empty() {
            return Err(DecodeError::NoPages);
        }

        log::debug!("Parsed PDF with {} page(s)", pages.len());
        Ok(Self { doc, pages })
    }

    fn entry(&self, page: u32) -> DecodeResult<&PageEntry> {
        page.checked_sub(1)
            .and_then(|index| self.pages.get(index as usize))
            .ok_or(DecodeError::PageOutOfRange {
                page,
                page_count: self.page_count(),
            })
    }

    fn rasterize(&self, page: u32, scale: f64) -> DecodeResult<RgbaImage> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(DecodeError::InvalidScale(scale));
        }
        let entry = self.entry(page)?;
        let (width, height) = viewport_size(entry.frame.size(), scale)
            .ok_or(DecodeError::TooLarge { page, scale })?;

        let mut surface =
            Pixmap::new(width, height).ok_or(DecodeError::TooLarge { page, scale })?;
        surface.fill(tiny_skia::Color::WHITE);
        paint_page(&self.doc, entry.id, entry.frame.transform(scale), &mut surface)?;

        RgbaImage::from_raw(width, height, pixmap_to_rgba(&surface))
            .ok_or_else(|| DecodeError::Backend(format!("page {} bitmap size mismatch", page)))
    }
}

impl PageDecoder for LopdfDecoder {
    fn open(bytes: Vec<u8>) -> BoxFuture<'static, DecodeResult<Self>> {
        Box::pin(async move { Self::from_bytes(&bytes) })
    }

    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_size(&self, page: u32) -> DecodeResult<Size> {
        self.entry(page).map(|entry| entry.frame.size())
    }

    fn render_page(&self, page: u32, scale: f64) -> BoxFuture<'_, DecodeResult<RgbaImage>> {
        let result = self.rasterize(page, scale);
        Box::pin(async move { result })
    }
}

/// MediaBox and rotation of a page. A missing or degenerate MediaBox falls
/// back to US Letter.
fn page_frame(doc: &Document, page_id: ObjectId) -> PageFrame {
    let media_box = inherited(doc, page_id, b"MediaBox")
        .and_then(|obj| media_box(doc, obj))
        .unwrap_or([0.0, 0.0, FALLBACK_PAGE_SIZE.width, FALLBACK_PAGE_SIZE.height]);
    let rotate = inherited(doc, page_id, b"Rotate")
        .and_then(obj_to_f64)
        .unwrap_or(0.0) as i64;
    PageFrame::new(media_box, rotate)
}

/// Look up a page attribute, walking up the page tree through `Parent`.
pub(crate) fn inherited<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut current = Some(page_id);
    while let Some(id) = current {
        let dict: &Dictionary = doc.get_object(id).and_then(|o| o.as_dict()).ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(value);
        }
        current = dict.get(b"Parent").and_then(|p| p.as_reference()).ok();
    }
    None
}

fn media_box(doc: &Document, raw: &Object) -> Option<[f64; 4]> {
    let resolved = match raw {
        Object::Reference(id) => doc.get_object(*id).ok()?,
        other => other,
    };
    let arr = resolved.as_array().ok()?;
    if arr.len() != 4 {
        return None;
    }
    let llx = obj_to_f64(&arr[0])?;
    let lly = obj_to_f64(&arr[1])?;
    let urx = obj_to_f64(&arr[2])?;
    let ury = obj_to_f64(&arr[3])?;
    let corners = [llx, lly, urx, ury];
    if corners.iter().all(|v| v.is_finite()) && urx != llx && ury != lly {
        Some(corners)
    } else {
        None
    }
}

pub(crate) fn obj_to_f64(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(f) => Some((*f).into()),
        _ => None,
    }
}
