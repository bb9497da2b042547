//! PdfInk Render Library
//!
//! Rasterization side of PdfInk: strokes painted with tiny-skia, PDF pages
//! decoded behind the [`PageDecoder`] trait (with a built-in content
//! interpreter for the lopdf backend), and flattened documents written back
//! out behind the [`PdfEncoder`] trait.

pub mod content;
pub mod decoder;
pub mod encoder;
pub mod export;
pub mod pipeline;
pub mod raster;
pub mod strokes;

pub use content::{PageFrame, paint_page};
pub use decoder::{BoxFuture, DecodeError, DecodeResult, LopdfDecoder, PageDecoder};
pub use encoder::{EncodeError, LopdfEncoder, PdfEncoder};
pub use export::{EXPORT_FILE_NAME, ExportError, ExportedPdf, export_document, flatten_page};
pub use pipeline::{RenderError, RenderedPage, render_overlay, render_page};
pub use raster::{RasterError, encode_png, surface_to_png};
pub use strokes::{StrokeRenderer, StrokeStyle};
