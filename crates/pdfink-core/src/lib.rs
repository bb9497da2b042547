//! PdfInk Core Library
//!
//! Platform-agnostic annotation model for the PdfInk PDF annotator: strokes
//! and their per-page storage, view state, page geometry and the mapping
//! between screen and page coordinates.

pub mod annotations;
pub mod coords;
pub mod geometry;
pub mod render_gate;
pub mod stroke;
pub mod tools;
pub mod view;

pub use annotations::{AnnotationError, AnnotationStore, StrokeHandle};
pub use coords::{to_page_coords, to_screen_coords};
pub use geometry::{
    MAX_SURFACE_PIXELS, MAX_SURFACE_SIDE, PageGeometry, surface_fits, viewport_size,
};
pub use render_gate::{RenderGate, RenderTicket};
pub use stroke::{Stroke, StrokeId, StrokeKind};
pub use tools::{Tool, ToolKind};
pub use view::ViewState;
