//! The annotation session: one loaded document and everything drawn on it.
//!
//! Async work is split into jobs. `prepare_*` borrows the session briefly and
//! hands back a self-contained job; the job's `run()` future owns everything
//! it needs, so the caller never keeps the session borrowed across an await.

use crate::config::SessionConfig;
use kurbo::Point;
use pdfink_core::annotations::{AnnotationError, AnnotationStore, StrokeHandle};
use pdfink_core::coords::to_page_coords;
use pdfink_core::geometry::{PageGeometry, viewport_size};
use pdfink_core::render_gate::{RenderGate, RenderTicket};
use pdfink_core::stroke::Stroke;
use pdfink_core::tools::{Tool, ToolKind};
use pdfink_core::view::ViewState;
use pdfink_render::decoder::{DecodeError, PageDecoder};
use pdfink_render::encoder::{LopdfEncoder, PdfEncoder};
use pdfink_render::export::{ExportError, ExportedPdf, export_document};
use pdfink_render::pipeline::{RenderError, RenderedPage, render_overlay, render_page};
use pdfink_render::strokes::StrokeRenderer;
use std::marker::PhantomData;
use std::rc::Rc;
use thiserror::Error;
use tiny_skia::Pixmap;

/// Session errors.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Unsupported file type: {0:?}")]
    InvalidFileType(String),
    #[error("Failed to decode PDF: {0}")]
    Decode(#[from] DecodeError),
    #[error("Document has no pages")]
    EmptyDocument,
    #[error("No document loaded")]
    NoDocument,
    #[error("Annotation error: {0}")]
    Annotation(#[from] AnnotationError),
    #[error("Render failed: {0}")]
    Render(#[from] RenderError),
    #[error("Export failed: {0}")]
    Export(#[from] ExportError),
}

impl SessionError {
    /// Short text suitable for showing to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            SessionError::InvalidFileType(_) => "Please select a PDF file.",
            SessionError::Decode(_) => "This PDF could not be opened.",
            SessionError::EmptyDocument => "This PDF has no pages.",
            SessionError::NoDocument => "Open a PDF first.",
            SessionError::Annotation(_) => "The annotation could not be added.",
            SessionError::Render(_) => "The page could not be displayed.",
            SessionError::Export(_) => "The annotated PDF could not be saved.",
        }
    }
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// A decoded document with the page sizes captured when it was loaded.
pub struct LoadedDocument<D> {
    decoder: Rc<D>,
    geometry: PageGeometry,
}

impl<D: PageDecoder> LoadedDocument<D> {
    pub fn page_count(&self) -> u32 {
        self.geometry.page_count()
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }
}

/// Decodes a file into a [`LoadedDocument`].
pub struct OpenJob<D> {
    bytes: Vec<u8>,
    decoder: PhantomData<fn() -> D>,
}

impl<D: PageDecoder> OpenJob<D> {
    pub async fn run(self) -> SessionResult<LoadedDocument<D>> {
        let decoder = D::open(self.bytes).await?;
        let page_count = decoder.page_count();
        if page_count == 0 {
            return Err(SessionError::EmptyDocument);
        }

        let sizes = (1..=page_count)
            .map(|page| decoder.page_size(page))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(LoadedDocument {
            decoder: Rc::new(decoder),
            geometry: PageGeometry::from_sizes(sizes),
        })
    }
}

/// Renders the current page with its annotations.
pub struct RenderJob<D> {
    ticket: RenderTicket,
    page: u32,
    scale: f64,
    decoder: Rc<D>,
    strokes: Vec<Stroke>,
    renderer: StrokeRenderer,
}

impl<D: PageDecoder> RenderJob<D> {
    pub fn ticket(&self) -> RenderTicket {
        self.ticket
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub async fn run(self) -> SessionResult<RenderedPage> {
        let page = render_page(
            self.decoder.as_ref(),
            self.page,
            self.scale,
            &self.strokes,
            &self.renderer,
        )
        .await?;
        Ok(page)
    }
}

/// Flattens the whole document into a new PDF.
pub struct ExportJob<D> {
    decoder: Rc<D>,
    geometry: PageGeometry,
    store: AnnotationStore,
    renderer: StrokeRenderer,
    file_name: String,
}

impl<D: PageDecoder> ExportJob<D> {
    /// Export with the default `lopdf` writer.
    pub async fn run(self) -> SessionResult<ExportedPdf> {
        self.run_with::<LopdfEncoder>().await
    }

    /// Export with a specific encoder.
    pub async fn run_with<E: PdfEncoder>(self) -> SessionResult<ExportedPdf> {
        let mut exported = export_document::<D, E>(
            self.decoder.as_ref(),
            &self.geometry,
            &self.store,
            &self.renderer,
        )
        .await?;
        exported.file_name = self.file_name;
        Ok(exported)
    }
}

/// Single controller of the annotator.
///
/// Owns the view state, the annotation store and the loaded document, and
/// turns pointer and button input into store mutations.
pub struct Session<D: PageDecoder> {
    config: SessionConfig,
    view: ViewState,
    store: AnnotationStore,
    document: Option<LoadedDocument<D>>,
    /// Stroke being drawn by the current pen/highlighter gesture.
    active_stroke: Option<StrokeHandle>,
    /// Eraser is pressed and erases on every move.
    erasing: bool,
    gate: RenderGate,
    renderer: StrokeRenderer,
}

impl<D: PageDecoder> Default for Session<D> {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl<D: PageDecoder> Session<D> {
    pub fn new(config: SessionConfig) -> Self {
        let mut view = ViewState::new();
        if config.initial_zoom.is_finite() && config.initial_zoom > 0.0 {
            view.scale = config.initial_zoom;
        }
        if config.min_zoom.is_finite() && config.min_zoom > 0.0 {
            view.min_zoom = config.min_zoom;
            view.scale = view.scale.max(config.min_zoom);
        }
        if config.zoom_step.is_finite() && config.zoom_step > 0.0 {
            view.zoom_step = config.zoom_step;
        }
        view.set_brush_width(config.brush_width);

        Self {
            config,
            view,
            store: AnnotationStore::new(),
            document: None,
            active_stroke: None,
            erasing: false,
            gate: RenderGate::new(),
            renderer: StrokeRenderer::new(),
        }
    }

    /// Replace the stroke palette.
    pub fn with_renderer(mut self, renderer: StrokeRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn document(&self) -> Option<&LoadedDocument<D>> {
        self.document.as_ref()
    }

    /// Number of pages of the loaded document, 0 if none.
    pub fn page_count(&self) -> u32 {
        self.document.as_ref().map_or(0, |doc| doc.page_count())
    }

    pub fn current_page(&self) -> u32 {
        self.view.page
    }

    pub fn scale(&self) -> f64 {
        self.view.scale
    }

    // --- Document loading ---

    /// Check the file type and prepare decoding. Nothing changes yet.
    pub fn prepare_open(&self, bytes: Vec<u8>, mime: &str) -> SessionResult<OpenJob<D>> {
        if mime != self.config.accepted_mime {
            log::warn!("Rejected file of type {:?}", mime);
            return Err(SessionError::InvalidFileType(mime.to_string()));
        }
        Ok(OpenJob {
            bytes,
            decoder: PhantomData,
        })
    }

    /// Swap in a freshly decoded document, dropping all annotations of the
    /// previous one. Returns the page count.
    pub fn install_document(&mut self, document: LoadedDocument<D>) -> u32 {
        let page_count = document.page_count();
        self.end_gesture();
        self.store.clear();
        self.view.reset_page();
        self.gate.invalidate();
        self.document = Some(document);
        log::info!("Loaded PDF with {} page(s)", page_count);
        page_count
    }

    /// Open a file in one go. A failure leaves the current document as is.
    pub async fn open_file(&mut self, bytes: Vec<u8>, mime: &str) -> SessionResult<u32> {
        let job = self.prepare_open(bytes, mime)?;
        let document = job.run().await.inspect_err(|e| {
            log::warn!("Failed to open PDF: {}", e);
        })?;
        Ok(self.install_document(document))
    }

    // --- Pointer input ---

    /// Start a gesture at a screen point of the page canvas.
    pub fn pointer_down(&mut self, screen_point: Point) -> SessionResult<()> {
        if self.document.is_none() {
            return Ok(());
        }
        self.end_gesture();

        let point = to_page_coords(screen_point, self.view.scale);
        match self.view.active_tool() {
            Tool::Eraser { radius } => {
                self.erasing = true;
                self.store.erase_at(self.view.page, point, radius);
            }
            tool => {
                if let Some((kind, width)) = tool.paint() {
                    let handle = self.store.begin_stroke(self.view.page, kind, width, point)?;
                    log::debug!("Began {:?} stroke on page {}", kind, handle.page());
                    self.active_stroke = Some(handle);
                }
            }
        }
        Ok(())
    }

    /// Continue the current gesture. Ignored when no gesture is active.
    pub fn pointer_move(&mut self, screen_point: Point) {
        let point = to_page_coords(screen_point, self.view.scale);
        if self.erasing {
            let radius = self.view.brush_width;
            self.store.erase_at(self.view.page, point, radius);
        } else if let Some(handle) = self.active_stroke {
            if !self.store.extend_stroke(handle, point) {
                self.active_stroke = None;
            }
        }
    }

    pub fn pointer_up(&mut self) {
        self.end_gesture();
    }

    /// Whether a pen, highlighter or eraser gesture is in progress.
    pub fn is_drawing(&self) -> bool {
        self.active_stroke.is_some() || self.erasing
    }

    fn end_gesture(&mut self) {
        if let Some(handle) = self.active_stroke.take() {
            log::debug!("Ended stroke {} on page {}", handle.stroke_id(), handle.page());
        }
        self.erasing = false;
    }

    // --- Controls ---

    pub fn zoom_in(&mut self) {
        self.end_gesture();
        self.view.zoom_in();
        self.gate.invalidate();
    }

    pub fn zoom_out(&mut self) {
        self.end_gesture();
        self.view.zoom_out();
        self.gate.invalidate();
    }

    /// Go to the next page. Returns false on the last page.
    pub fn next_page(&mut self) -> bool {
        self.end_gesture();
        let moved = self.view.next_page(self.page_count());
        if moved {
            self.gate.invalidate();
        }
        moved
    }

    /// Go to the previous page. Returns false on the first page.
    pub fn prev_page(&mut self) -> bool {
        self.end_gesture();
        let moved = self.view.prev_page();
        if moved {
            self.gate.invalidate();
        }
        moved
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        self.end_gesture();
        self.view.set_tool(tool);
    }

    /// Set the brush width. Returns false if the value was ignored.
    pub fn set_brush_width(&mut self, width: f64) -> bool {
        self.end_gesture();
        let accepted = self.view.set_brush_width(width);
        if !accepted {
            log::warn!("Ignored brush width {}", width);
        }
        accepted
    }

    // --- Rendering ---

    /// Prepare a render of the current page at the current zoom.
    ///
    /// Issuing a job makes every earlier job stale.
    pub fn prepare_render(&mut self) -> SessionResult<RenderJob<D>> {
        let document = self.document.as_ref().ok_or(SessionError::NoDocument)?;
        let page = self.view.page;
        Ok(RenderJob {
            ticket: self.gate.issue(),
            page,
            scale: self.view.scale,
            decoder: Rc::clone(&document.decoder),
            strokes: self.store.strokes(page).to_vec(),
            renderer: self.renderer.clone(),
        })
    }

    /// Accept a finished render if nothing newer was requested since.
    pub fn finish_render(
        &self,
        ticket: RenderTicket,
        page: RenderedPage,
    ) -> Option<RenderedPage> {
        if self.gate.is_current(ticket) {
            Some(page)
        } else {
            log::debug!(
                "Discarded stale render of page {} (generation {})",
                page.page,
                ticket.generation()
            );
            None
        }
    }

    /// Render and accept the current page in one go.
    pub async fn render_current_page(&mut self) -> SessionResult<Option<RenderedPage>> {
        let job = self.prepare_render()?;
        let ticket = job.ticket();
        let page = job.run().await?;
        Ok(self.finish_render(ticket, page))
    }

    /// Annotation layer of the current page at the current zoom, on a
    /// transparent surface sized like the page.
    pub fn render_annotations(&self) -> SessionResult<Pixmap> {
        let document = self.document.as_ref().ok_or(SessionError::NoDocument)?;
        let page = self.view.page;
        let scale = self.view.scale;
        let size = document
            .geometry
            .size(page)
            .ok_or(DecodeError::PageOutOfRange {
                page,
                page_count: document.page_count(),
            })
            .map_err(RenderError::from)?;
        let (width, height) =
            viewport_size(size, scale).ok_or(RenderError::ViewportTooLarge { page, scale })?;
        let overlay = render_overlay(
            self.store.strokes(page),
            width,
            height,
            scale,
            &self.renderer,
        )
        .map_err(RenderError::from)?;
        Ok(overlay)
    }

    // --- Export ---

    /// Snapshot the document and its annotations for export.
    pub fn prepare_export(&self) -> SessionResult<ExportJob<D>> {
        let Some(document) = self.document.as_ref() else {
            log::warn!("Export declined: no document loaded");
            return Err(SessionError::NoDocument);
        };
        Ok(ExportJob {
            decoder: Rc::clone(&document.decoder),
            geometry: document.geometry.clone(),
            store: self.store.clone(),
            renderer: self.renderer.clone(),
            file_name: self.config.export_file_name.clone(),
        })
    }

    /// Export in one go.
    pub async fn export(&self) -> SessionResult<ExportedPdf> {
        self.prepare_export()?.run().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;
    use lopdf::Document;
    use pdfink_render::decoder::LopdfDecoder;
    use pdfink_render::raster::encode_png;

    /// A PDF with white full-page images, built with the crate's own writer.
    fn sample_pdf(sizes: &[(f64, f64)]) -> Vec<u8> {
        let white = encode_png(&[255; 4], 1, 1).unwrap();
        let mut encoder = LopdfEncoder::new(Size::new(sizes[0].0, sizes[0].1)).unwrap();
        encoder.place_image(&white).unwrap();
        for &(width, height) in &sizes[1..] {
            encoder.add_page(Size::new(width, height)).unwrap();
            encoder.place_image(&white).unwrap();
        }
        encoder.finish().unwrap()
    }

    fn open_session(sizes: &[(f64, f64)]) -> Session<LopdfDecoder> {
        let mut session = Session::default();
        pollster::block_on(session.open_file(sample_pdf(sizes), "application/pdf")).unwrap();
        session
    }

    fn draw(session: &mut Session<LopdfDecoder>, points: &[(f64, f64)]) {
        session
            .pointer_down(Point::new(points[0].0, points[0].1))
            .unwrap();
        for &(x, y) in &points[1..] {
            session.pointer_move(Point::new(x, y));
        }
        session.pointer_up();
    }

    #[test]
    fn test_open_captures_geometry() {
        let session = open_session(&[(40.0, 30.0), (50.0, 60.0)]);
        assert_eq!(session.page_count(), 2);
        assert_eq!(session.current_page(), 1);
        let geometry = session.document().unwrap().geometry();
        assert_eq!(geometry.size(2), Some(Size::new(50.0, 60.0)));
    }

    #[test]
    fn test_wrong_mime_is_rejected() {
        let mut session: Session<LopdfDecoder> = Session::default();
        let result = pollster::block_on(session.open_file(sample_pdf(&[(10.0, 10.0)]), "image/png"));

        let err = result.unwrap_err();
        assert!(matches!(err, SessionError::InvalidFileType(_)));
        assert_eq!(err.user_message(), "Please select a PDF file.");
        assert!(session.document().is_none());
    }

    #[test]
    fn test_failed_decode_keeps_previous_document() {
        let mut session = open_session(&[(40.0, 30.0), (50.0, 60.0)]);
        draw(&mut session, &[(5.0, 5.0), (10.0, 10.0)]);

        let result =
            pollster::block_on(session.open_file(b"garbage".to_vec(), "application/pdf"));

        assert!(matches!(result, Err(SessionError::Decode(_))));
        assert_eq!(session.page_count(), 2);
        assert_eq!(session.store().stroke_count(), 1);
    }

    #[test]
    fn test_loading_resets_page_and_annotations() {
        let mut session = open_session(&[(40.0, 30.0), (50.0, 60.0)]);
        assert!(session.next_page());
        draw(&mut session, &[(5.0, 5.0), (10.0, 10.0)]);

        pollster::block_on(session.open_file(sample_pdf(&[(20.0, 20.0)]), "application/pdf"))
            .unwrap();

        assert_eq!(session.current_page(), 1);
        assert_eq!(session.page_count(), 1);
        assert_eq!(session.store().stroke_count(), 0);
    }

    #[test]
    fn test_pointer_without_document_is_ignored() {
        let mut session: Session<LopdfDecoder> = Session::default();
        session.pointer_down(Point::new(1.0, 1.0)).unwrap();
        session.pointer_move(Point::new(2.0, 2.0));
        session.pointer_up();
        assert_eq!(session.store().stroke_count(), 0);
        assert!(!session.is_drawing());
    }

    #[test]
    fn test_points_are_stored_in_page_coordinates() {
        let mut session = open_session(&[(100.0, 100.0)]);
        for _ in 0..4 {
            session.zoom_in();
        }
        assert!((session.scale() - 2.0).abs() < f64::EPSILON);

        draw(&mut session, &[(20.0, 20.0), (40.0, 60.0)]);

        let stroke = &session.store().strokes(1)[0];
        assert_eq!(stroke.points, vec![Point::new(10.0, 10.0), Point::new(20.0, 30.0)]);
    }

    #[test]
    fn test_highlighter_stroke_uses_brush_width() {
        let mut session = open_session(&[(100.0, 100.0)]);
        session.set_tool(ToolKind::Highlighter);
        assert!(session.set_brush_width(8.0));
        draw(&mut session, &[(10.0, 10.0), (30.0, 10.0)]);

        let stroke = &session.store().strokes(1)[0];
        assert_eq!(stroke.kind, pdfink_core::stroke::StrokeKind::Highlighter);
        assert!((stroke.width - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_eraser_drag_removes_touched_strokes() {
        let mut session = open_session(&[(100.0, 100.0)]);
        draw(&mut session, &[(10.0, 10.0), (20.0, 10.0)]);
        draw(&mut session, &[(10.0, 50.0), (20.0, 50.0)]);
        draw(&mut session, &[(10.0, 90.0), (20.0, 90.0)]);

        session.set_tool(ToolKind::Eraser);
        session.set_brush_width(3.0);
        session.pointer_down(Point::new(50.0, 10.0)).unwrap();
        assert_eq!(session.store().strokes(1).len(), 3);
        session.pointer_move(Point::new(21.0, 11.0));
        session.pointer_move(Point::new(19.0, 51.0));
        session.pointer_up();
        session.pointer_move(Point::new(11.0, 90.0));

        let remaining = session.store().strokes(1);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].points[0], Point::new(10.0, 90.0));
    }

    #[test]
    fn test_controls_end_the_gesture() {
        let mut session = open_session(&[(100.0, 100.0), (100.0, 100.0)]);
        session.pointer_down(Point::new(10.0, 10.0)).unwrap();
        assert!(session.is_drawing());

        session.zoom_in();
        session.pointer_move(Point::new(50.0, 50.0));

        assert!(!session.is_drawing());
        assert_eq!(session.store().strokes(1)[0].len(), 1);
    }

    #[test]
    fn test_page_navigation_is_clamped() {
        let mut session = open_session(&[(10.0, 10.0), (10.0, 10.0)]);
        assert!(!session.prev_page());
        assert!(session.next_page());
        assert!(!session.next_page());
        assert_eq!(session.current_page(), 2);
    }

    #[test]
    fn test_stale_render_is_discarded() {
        let mut session = open_session(&[(40.0, 30.0)]);
        let first = session.prepare_render().unwrap();
        session.zoom_in();
        let second = session.prepare_render().unwrap();

        let first_ticket = first.ticket();
        let second_ticket = second.ticket();
        let first_page = pollster::block_on(first.run()).unwrap();
        let second_page = pollster::block_on(second.run()).unwrap();

        assert!(session.finish_render(first_ticket, first_page).is_none());
        let accepted = session.finish_render(second_ticket, second_page).unwrap();
        assert_eq!((accepted.width(), accepted.height()), (50, 38));
    }

    #[test]
    fn test_render_without_document() {
        let mut session: Session<LopdfDecoder> = Session::default();
        assert!(matches!(session.prepare_render(), Err(SessionError::NoDocument)));
        assert!(matches!(session.render_annotations(), Err(SessionError::NoDocument)));
    }

    #[test]
    fn test_render_annotations_without_page_geometry() {
        let mut session = open_session(&[(40.0, 30.0)]);
        let decoder = Rc::clone(&session.document().unwrap().decoder);
        session.install_document(LoadedDocument {
            decoder,
            geometry: PageGeometry::new(),
        });

        let err = session.render_annotations().unwrap_err();
        assert!(matches!(
            err,
            SessionError::Render(RenderError::Decode(DecodeError::PageOutOfRange {
                page: 1,
                page_count: 0
            }))
        ));
        assert_eq!(err.user_message(), "The page could not be displayed.");
    }

    #[test]
    fn test_oversized_zoom_is_a_render_error() {
        let config = SessionConfig {
            initial_zoom: 1e6,
            ..SessionConfig::default()
        };
        let mut session: Session<LopdfDecoder> = Session::new(config);
        pollster::block_on(session.open_file(sample_pdf(&[(40.0, 30.0)]), "application/pdf"))
            .unwrap();

        assert!(matches!(
            session.render_annotations(),
            Err(SessionError::Render(RenderError::ViewportTooLarge { page: 1, .. }))
        ));
        let rendered = pollster::block_on(session.render_current_page());
        assert!(matches!(
            rendered,
            Err(SessionError::Render(RenderError::ViewportTooLarge { .. }))
        ));
    }

    #[test]
    fn test_render_annotations_follows_zoom() {
        let mut session = open_session(&[(40.0, 30.0)]);
        session.set_brush_width(2.0);
        draw(&mut session, &[(5.0, 10.0), (35.0, 10.0)]);
        session.zoom_in();
        session.zoom_in();
        session.zoom_in();
        session.zoom_in();

        let overlay = session.render_annotations().unwrap();
        assert_eq!((overlay.width(), overlay.height()), (80, 60));
        // Drawn at zoom 1 along page y = 10, now at screen y = 20.
        assert_eq!(overlay.pixel(40, 20).unwrap().alpha(), 255);
        assert_eq!(overlay.pixel(40, 50).unwrap().alpha(), 0);
    }

    #[test]
    fn test_export_without_document() {
        let session: Session<LopdfDecoder> = Session::default();
        let err = session.prepare_export().err().unwrap();
        assert!(matches!(err, SessionError::NoDocument));
    }

    #[test]
    fn test_annotate_then_export_scenario() {
        let mut session = open_session(&[(40.0, 30.0), (50.0, 60.0)]);
        session.set_brush_width(2.0);
        draw(&mut session, &[(10.0, 10.0), (20.0, 20.0)]);
        assert!(session.next_page());
        session.zoom_in();

        let exported = pollster::block_on(session.export()).unwrap();
        assert_eq!(exported.file_name, "annotated.pdf");
        assert_eq!(exported.page_count, 2);

        let doc = Document::load_mem(&exported.bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
        let reopened = LopdfDecoder::from_bytes(&exported.bytes).unwrap();
        assert_eq!(reopened.page_size(1).unwrap(), Size::new(40.0, 30.0));
        assert_eq!(reopened.page_size(2).unwrap(), Size::new(50.0, 60.0));
    }

    #[test]
    fn test_export_uses_configured_file_name() {
        let config = SessionConfig {
            export_file_name: "notes.pdf".to_string(),
            ..SessionConfig::default()
        };
        let mut session: Session<LopdfDecoder> = Session::new(config);
        pollster::block_on(session.open_file(sample_pdf(&[(10.0, 10.0)]), "application/pdf"))
            .unwrap();

        let exported = pollster::block_on(session.export()).unwrap();
        assert_eq!(exported.file_name, "notes.pdf");
    }

    #[test]
    fn test_config_drives_view() {
        let config = SessionConfig {
            initial_zoom: 2.0,
            min_zoom: 1.0,
            zoom_step: 0.5,
            brush_width: 3.0,
            ..SessionConfig::default()
        };
        let mut session: Session<LopdfDecoder> = Session::new(config);
        assert!((session.view().brush_width - 3.0).abs() < f64::EPSILON);
        session.zoom_out();
        session.zoom_out();
        session.zoom_out();
        assert!((session.scale() - 1.0).abs() < f64::EPSILON);
        session.zoom_in();
        assert!((session.scale() - 1.5).abs() < f64::EPSILON);
    }
}
