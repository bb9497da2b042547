//! WebAssembly entry point and browser bindings.

use crate::config::{PDF_MIME, SessionConfig};
use crate::pdfjs::PdfJsDecoder;
use crate::session::{Session, SessionError};
use kurbo::Point;
use pdfink_core::tools::ToolKind;
use pdfink_render::raster::pixmap_to_rgba;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::Clamped;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

/// Initialize logging and panic reporting for the WASM module.
#[wasm_bindgen(start)]
pub fn run_wasm() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();

    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }

    log::info!("Starting PdfInk (WASM)");
}

fn to_js(err: SessionError) -> JsValue {
    log::error!("{}", err);
    JsValue::from_str(err.user_message())
}

fn image_data(rgba: &[u8], width: u32, height: u32) -> Result<web_sys::ImageData, JsValue> {
    web_sys::ImageData::new_with_u8_clamped_array_and_sh(Clamped(rgba), width, height)
}

/// Session handle for the hosting page.
///
/// Pointer coordinates are CSS pixels relative to the page canvas.
#[wasm_bindgen]
pub struct WebSession {
    inner: Rc<RefCell<Session<PdfJsDecoder>>>,
}

#[wasm_bindgen]
impl WebSession {
    /// Create a session, optionally from a JSON config.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<WebSession, JsValue> {
        let config = match config_json {
            Some(json) => SessionConfig::from_json(&json)
                .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?,
            None => SessionConfig::default(),
        };
        Ok(WebSession {
            inner: Rc::new(RefCell::new(Session::new(config))),
        })
    }

    /// Open a file. Resolves to the page count; rejects with a message for
    /// the user.
    pub fn open_file(&self, bytes: Vec<u8>, mime: String) -> js_sys::Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            let job = inner.borrow().prepare_open(bytes, &mime).map_err(to_js)?;
            let document = job.run().await.map_err(to_js)?;
            let page_count = inner.borrow_mut().install_document(document);
            Ok(JsValue::from(page_count))
        })
    }

    pub fn pointer_down(&self, x: f64, y: f64) -> Result<(), JsValue> {
        self.inner
            .borrow_mut()
            .pointer_down(Point::new(x, y))
            .map_err(to_js)
    }

    pub fn pointer_move(&self, x: f64, y: f64) {
        self.inner.borrow_mut().pointer_move(Point::new(x, y));
    }

    pub fn pointer_up(&self) {
        self.inner.borrow_mut().pointer_up();
    }

    pub fn zoom_in(&self) {
        self.inner.borrow_mut().zoom_in();
    }

    pub fn zoom_out(&self) {
        self.inner.borrow_mut().zoom_out();
    }

    pub fn next_page(&self) -> bool {
        self.inner.borrow_mut().next_page()
    }

    pub fn prev_page(&self) -> bool {
        self.inner.borrow_mut().prev_page()
    }

    /// Select "pen", "highlighter" or "eraser". Unknown names are ignored.
    pub fn set_tool(&self, name: &str) -> bool {
        match ToolKind::from_id(name) {
            Some(tool) => {
                self.inner.borrow_mut().set_tool(tool);
                true
            }
            None => {
                log::warn!("Unknown tool {:?}", name);
                false
            }
        }
    }

    pub fn set_brush_width(&self, width: f64) -> bool {
        self.inner.borrow_mut().set_brush_width(width)
    }

    pub fn current_page(&self) -> u32 {
        self.inner.borrow().current_page()
    }

    pub fn page_count(&self) -> u32 {
        self.inner.borrow().page_count()
    }

    pub fn scale(&self) -> f64 {
        self.inner.borrow().scale()
    }

    pub fn tool(&self) -> String {
        self.inner.borrow().view().tool.id().to_string()
    }

    /// Render the current page with its annotations. Resolves to
    /// `ImageData`, or `undefined` when a newer render superseded this one.
    pub fn render_page(&self) -> js_sys::Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            let job = inner.borrow_mut().prepare_render().map_err(to_js)?;
            let ticket = job.ticket();
            let rendered = job.run().await.map_err(to_js)?;
            match inner.borrow().finish_render(ticket, rendered) {
                Some(page) => Ok(image_data(&page.to_rgba(), page.width(), page.height())?.into()),
                None => Ok(JsValue::UNDEFINED),
            }
        })
    }

    /// Annotation layer only, at the current zoom.
    pub fn render_annotations(&self) -> Result<web_sys::ImageData, JsValue> {
        let overlay = self.inner.borrow().render_annotations().map_err(to_js)?;
        image_data(&pixmap_to_rgba(&overlay), overlay.width(), overlay.height())
    }

    /// Flatten the document and download it.
    pub fn save(&self) -> js_sys::Promise {
        let inner = Rc::clone(&self.inner);
        future_to_promise(async move {
            let job = inner.borrow().prepare_export().map_err(to_js)?;
            let exported = job.run().await.map_err(to_js)?;
            download_binary_file(&exported.file_name, &exported.bytes, PDF_MIME)?;
            Ok(JsValue::from(exported.page_count))
        })
    }
}

/// Trigger a browser download of `data` through a Blob URL.
fn download_binary_file(filename: &str, data: &[u8], mime_type: &str) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("No document"))?;

    let uint8_array = js_sys::Uint8Array::from(data);
    let blob_parts = js_sys::Array::new();
    blob_parts.push(&uint8_array);

    let options = web_sys::BlobPropertyBag::new();
    options.set_type(mime_type);

    let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&blob_parts, &options)?;
    let url = web_sys::Url::create_object_url_with_blob(&blob)?;

    let a = document
        .create_element("a")?
        .dyn_into::<web_sys::HtmlAnchorElement>()?;
    a.set_href(&url);
    a.set_download(filename);
    a.click();

    web_sys::Url::revoke_object_url(&url).ok();
    log::info!("Downloaded {} ({} bytes)", filename, data.len());
    Ok(())
}
