//! PdfInk Application
//!
//! The session controller tying document loading, pointer input, page
//! rendering and export together, plus the browser bindings.

mod config;
mod session;

pub use config::{PDF_MIME, SessionConfig};
pub use session::{
    ExportJob, LoadedDocument, OpenJob, RenderJob, Session, SessionError, SessionResult,
};

#[cfg(target_arch = "wasm32")]
mod pdfjs;
#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use pdfjs::PdfJsDecoder;
#[cfg(target_arch = "wasm32")]
pub use web::{WebSession, run_wasm};
