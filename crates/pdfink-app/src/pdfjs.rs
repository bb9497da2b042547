//! Page decoding through pdf.js in the hosting page.
//!
//! Expects the `pdfjsLib` global that the pdf.js script installs. Pages are
//! rendered into an `OffscreenCanvas` and read back as RGBA.

use image::RgbaImage;
use kurbo::Size;
use pdfink_core::geometry::viewport_size;
use pdfink_render::decoder::{BoxFuture, DecodeError, DecodeResult, PageDecoder};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = pdfjsLib, js_name = getDocument)]
    fn get_document(params: &JsValue) -> LoadingTask;

    type LoadingTask;

    #[wasm_bindgen(method, getter = promise)]
    fn loaded(this: &LoadingTask) -> js_sys::Promise;

    type PdfDocumentProxy;

    #[wasm_bindgen(method, getter = numPages)]
    fn num_pages(this: &PdfDocumentProxy) -> u32;

    #[wasm_bindgen(method, js_name = getPage)]
    fn get_page(this: &PdfDocumentProxy, number: u32) -> js_sys::Promise;

    type PdfPageProxy;

    #[wasm_bindgen(method, js_name = getViewport)]
    fn get_viewport(this: &PdfPageProxy, params: &JsValue) -> PageViewport;

    #[wasm_bindgen(method)]
    fn render(this: &PdfPageProxy, params: &JsValue) -> RenderTask;

    type PageViewport;

    #[wasm_bindgen(method, getter)]
    fn width(this: &PageViewport) -> f64;

    #[wasm_bindgen(method, getter)]
    fn height(this: &PageViewport) -> f64;

    type RenderTask;

    #[wasm_bindgen(method, getter = promise)]
    fn finished(this: &RenderTask) -> js_sys::Promise;
}

/// Turn a pdf.js rejection into a decode error.
fn js_error(err: JsValue) -> DecodeError {
    let name = js_sys::Reflect::get(&err, &"name".into())
        .ok()
        .and_then(|name| name.as_string());
    if name.as_deref() == Some("PasswordException") {
        return DecodeError::Encrypted;
    }
    match err.dyn_ref::<js_sys::Error>() {
        Some(error) => DecodeError::Backend(String::from(error.message())),
        None => DecodeError::Backend(format!("{:?}", err)),
    }
}

fn object(entries: &[(&str, &JsValue)]) -> DecodeResult<JsValue> {
    let object = js_sys::Object::new();
    for (key, value) in entries {
        js_sys::Reflect::set(&object, &JsValue::from_str(key), value).map_err(js_error)?;
    }
    Ok(object.into())
}

/// [`PageDecoder`] rendering with pdf.js.
pub struct PdfJsDecoder {
    document: PdfDocumentProxy,
    page_sizes: Vec<Size>,
}

impl PdfJsDecoder {
    async fn load(bytes: Vec<u8>) -> DecodeResult<Self> {
        let data = js_sys::Uint8Array::from(bytes.as_slice());
        let task = get_document(&object(&[("data", &data.into())])?);
        let document: PdfDocumentProxy = JsFuture::from(task.loaded())
            .await
            .map_err(js_error)?
            .unchecked_into();

        let page_count = document.num_pages();
        if page_count == 0 {
            return Err(DecodeError::NoPages);
        }

        let unit = object(&[("scale", &JsValue::from_f64(1.0))])?;
        let mut page_sizes = Vec::with_capacity(page_count as usize);
        for number in 1..=page_count {
            let viewport = fetch_page(&document, number).await?.get_viewport(&unit);
            page_sizes.push(Size::new(viewport.width(), viewport.height()));
        }

        log::debug!("pdf.js opened {} page(s)", page_count);
        Ok(Self {
            document,
            page_sizes,
        })
    }

    async fn rasterize(&self, page: u32, scale: f64) -> DecodeResult<RgbaImage> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(DecodeError::InvalidScale(scale));
        }
        let (width, height) = viewport_size(self.page_size(page)?, scale)
            .ok_or(DecodeError::TooLarge { page, scale })?;

        let canvas = web_sys::OffscreenCanvas::new(width, height).map_err(js_error)?;
        let context: web_sys::OffscreenCanvasRenderingContext2d = canvas
            .get_context("2d")
            .map_err(js_error)?
            .ok_or_else(|| DecodeError::Backend("2d context unavailable".to_string()))?
            .unchecked_into();

        let proxy = fetch_page(&self.document, page).await?;
        let viewport = proxy.get_viewport(&object(&[("scale", &JsValue::from_f64(scale))])?);
        let params = object(&[
            ("canvasContext", context.as_ref()),
            ("viewport", viewport.as_ref()),
            ("background", &JsValue::from_str("white")),
        ])?;
        JsFuture::from(proxy.render(&params).finished())
            .await
            .map_err(js_error)?;

        let pixels = context
            .get_image_data(0.0, 0.0, f64::from(width), f64::from(height))
            .map_err(js_error)?
            .data();
        RgbaImage::from_raw(width, height, pixels.0)
            .ok_or_else(|| DecodeError::Backend(format!("page {} bitmap size mismatch", page)))
    }
}

async fn fetch_page(document: &PdfDocumentProxy, number: u32) -> DecodeResult<PdfPageProxy> {
    let page = JsFuture::from(document.get_page(number))
        .await
        .map_err(js_error)?;
    Ok(page.unchecked_into())
}

impl PageDecoder for PdfJsDecoder {
    fn open(bytes: Vec<u8>) -> BoxFuture<'static, DecodeResult<Self>> {
        Box::pin(Self::load(bytes))
    }

    fn page_count(&self) -> u32 {
        self.page_sizes.len() as u32
    }

    fn page_size(&self, page: u32) -> DecodeResult<Size> {
        page.checked_sub(1)
            .and_then(|index| self.page_sizes.get(index as usize))
            .copied()
            .ok_or(DecodeError::PageOutOfRange {
                page,
                page_count: self.page_count(),
            })
    }

    fn render_page(&self, page: u32, scale: f64) -> BoxFuture<'_, DecodeResult<RgbaImage>> {
        Box::pin(self.rasterize(page, scale))
    }
}
