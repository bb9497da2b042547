//! Page content rasterization.
//!
//! Interprets the operators of a page's content streams onto a tiny-skia
//! surface: paths, fills and strokes in gray, RGB and CMYK, clipping,
//! constant alpha from `ExtGState`, image XObjects and form XObjects.
//! Text and shadings are not drawn.

use crate::raster::{RasterError, pixmap_from_image};
use image::{ImageFormat, RgbaImage};
use kurbo::Size;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use pdfink_core::geometry::surface_fits;
use std::rc::Rc;
use tiny_skia::{
    Color, FillRule, FilterQuality, LineCap, LineJoin, Mask, Paint, Path, PathBuilder, Pixmap,
    PixmapPaint, Transform,
};

/// Nesting limit for form XObjects.
const MAX_FORM_DEPTH: u32 = 16;

/// Where a page sits in PDF user space and how it is turned for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFrame {
    /// MediaBox as `[llx, lly, urx, ury]`, normalized so `ll < ur`.
    pub media_box: [f64; 4],
    /// Clockwise rotation in degrees: 0, 90, 180 or 270.
    pub rotate: u32,
}

impl PageFrame {
    pub fn new(media_box: [f64; 4], rotate: i64) -> Self {
        let [x0, y0, x1, y1] = media_box;
        Self {
            media_box: [x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)],
            rotate: (rotate.rem_euclid(360) / 90 * 90) as u32,
        }
    }

    /// Displayed size at scale 1, swapped for quarter turns.
    pub fn size(&self) -> Size {
        let [llx, lly, urx, ury] = self.media_box;
        let (width, height) = (urx - llx, ury - lly);
        if self.rotate % 180 == 90 {
            Size::new(height, width)
        } else {
            Size::new(width, height)
        }
    }

    /// Map PDF user space to device pixels at `scale`, y pointing down.
    pub fn transform(&self, scale: f64) -> Transform {
        let s = scale as f32;
        let [llx, lly, urx, ury] = self.media_box.map(|v| v as f32);
        match self.rotate {
            90 => Transform::from_row(0.0, s, s, 0.0, -s * lly, -s * llx),
            180 => Transform::from_row(-s, 0.0, 0.0, s, s * urx, -s * lly),
            270 => Transform::from_row(0.0, -s, -s, 0.0, s * ury, s * urx),
            _ => Transform::from_row(s, 0.0, 0.0, -s, -s * llx, s * ury),
        }
    }
}

/// Paint the content streams of `page_id` onto `target` through `base`.
pub fn paint_page(
    doc: &Document,
    page_id: ObjectId,
    base: Transform,
    target: &mut Pixmap,
) -> Result<(), lopdf::Error> {
    let content = doc.get_page_content(page_id)?;
    let operations = Content::decode(&content)?.operations;
    let resources = crate::decoder::inherited(doc, page_id, b"Resources")
        .and_then(|obj| resolve(doc, obj).as_dict().ok());

    let mut painter = Painter::new(doc, target, base);
    painter.run(&operations, resources, 0);
    log::debug!(
        "Painted {} content operation(s) for object {:?}",
        operations.len(),
        page_id
    );
    Ok(())
}

#[derive(Clone)]
struct GraphicsState {
    ctm: Transform,
    fill: Color,
    stroke: Color,
    fill_alpha: f32,
    stroke_alpha: f32,
    line_width: f32,
    line_cap: LineCap,
    line_join: LineJoin,
    miter_limit: f32,
    clip: Option<Rc<Mask>>,
}

impl GraphicsState {
    fn new(ctm: Transform) -> Self {
        Self {
            ctm,
            fill: Color::BLACK,
            stroke: Color::BLACK,
            fill_alpha: 1.0,
            stroke_alpha: 1.0,
            line_width: 1.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            miter_limit: 10.0,
            clip: None,
        }
    }
}

struct Painter<'a, 'p> {
    doc: &'a Document,
    target: &'p mut Pixmap,
    state: GraphicsState,
    saved: Vec<GraphicsState>,
    path: PathBuilder,
    /// Current point, in user space.
    current: Option<(f32, f32)>,
    /// Clip rule set by `W` / `W*`, applied at the next painting operator.
    pending_clip: Option<FillRule>,
}

impl<'a, 'p> Painter<'a, 'p> {
    fn new(doc: &'a Document, target: &'p mut Pixmap, base: Transform) -> Self {
        Self {
            doc,
            target,
            state: GraphicsState::new(base),
            saved: Vec::new(),
            path: PathBuilder::new(),
            current: None,
            pending_clip: None,
        }
    }

    fn run(&mut self, operations: &[Operation], resources: Option<&'a Dictionary>, depth: u32) {
        for op in operations {
            let operands = op.operands.as_slice();
            match op.operator.as_str() {
                "q" => self.saved.push(self.state.clone()),
                "Q" => {
                    if let Some(state) = self.saved.pop() {
                        self.state = state;
                    }
                }
                "cm" => {
                    if let Some([a, b, c, d, e, f]) = numbers::<6>(operands) {
                        let m = Transform::from_row(a, b, c, d, e, f);
                        self.state.ctm = self.state.ctm.pre_concat(m);
                    }
                }
                "w" => {
                    if let Some([width]) = numbers::<1>(operands) {
                        self.state.line_width = width.max(0.0);
                    }
                }
                "J" => {
                    if let Some([cap]) = numbers::<1>(operands) {
                        self.state.line_cap = match cap as i32 {
                            1 => LineCap::Round,
                            2 => LineCap::Square,
                            _ => LineCap::Butt,
                        };
                    }
                }
                "j" => {
                    if let Some([join]) = numbers::<1>(operands) {
                        self.state.line_join = match join as i32 {
                            1 => LineJoin::Round,
                            2 => LineJoin::Bevel,
                            _ => LineJoin::Miter,
                        };
                    }
                }
                "M" => {
                    if let Some([limit]) = numbers::<1>(operands) {
                        self.state.miter_limit = limit.max(1.0);
                    }
                }
                "gs" => {
                    if let Some(Object::Name(name)) = operands.first() {
                        self.apply_ext_gstate(resources, name);
                    }
                }

                // Path construction
                "m" => {
                    if let Some([x, y]) = numbers::<2>(operands) {
                        self.path.move_to(x, y);
                        self.current = Some((x, y));
                    }
                }
                "l" => {
                    if let Some([x, y]) = numbers::<2>(operands) {
                        self.path.line_to(x, y);
                        self.current = Some((x, y));
                    }
                }
                "c" => {
                    if let Some([x1, y1, x2, y2, x3, y3]) = numbers::<6>(operands) {
                        self.path.cubic_to(x1, y1, x2, y2, x3, y3);
                        self.current = Some((x3, y3));
                    }
                }
                "v" => {
                    if let Some([x2, y2, x3, y3]) = numbers::<4>(operands) {
                        let (x1, y1) = self.current.unwrap_or((x2, y2));
                        self.path.cubic_to(x1, y1, x2, y2, x3, y3);
                        self.current = Some((x3, y3));
                    }
                }
                "y" => {
                    if let Some([x1, y1, x3, y3]) = numbers::<4>(operands) {
                        self.path.cubic_to(x1, y1, x3, y3, x3, y3);
                        self.current = Some((x3, y3));
                    }
                }
                "h" => self.path.close(),
                "re" => {
                    if let Some([x, y, w, h]) = numbers::<4>(operands) {
                        self.path.move_to(x, y);
                        self.path.line_to(x + w, y);
                        self.path.line_to(x + w, y + h);
                        self.path.line_to(x, y + h);
                        self.path.close();
                        self.current = Some((x, y));
                    }
                }

                // Path painting
                "f" | "F" => self.paint(Some(FillRule::Winding), false, false),
                "f*" => self.paint(Some(FillRule::EvenOdd), false, false),
                "S" => self.paint(None, true, false),
                "s" => self.paint(None, true, true),
                "B" => self.paint(Some(FillRule::Winding), true, false),
                "B*" => self.paint(Some(FillRule::EvenOdd), true, false),
                "b" => self.paint(Some(FillRule::Winding), true, true),
                "b*" => self.paint(Some(FillRule::EvenOdd), true, true),
                "n" => self.paint(None, false, false),
                "W" => self.pending_clip = Some(FillRule::Winding),
                "W*" => self.pending_clip = Some(FillRule::EvenOdd),

                // Color
                "g" => set_color(&mut self.state.fill, operands),
                "G" => set_color(&mut self.state.stroke, operands),
                "rg" => set_color(&mut self.state.fill, operands),
                "RG" => set_color(&mut self.state.stroke, operands),
                "k" => set_color(&mut self.state.fill, operands),
                "K" => set_color(&mut self.state.stroke, operands),
                "sc" | "scn" => set_color(&mut self.state.fill, operands),
                "SC" | "SCN" => set_color(&mut self.state.stroke, operands),
                "cs" => self.state.fill = Color::BLACK,
                "CS" => self.state.stroke = Color::BLACK,

                "Do" => {
                    if let Some(Object::Name(name)) = operands.first() {
                        self.draw_xobject(resources, name, depth);
                    }
                }
                _ => {}
            }
        }
    }

    fn paint(&mut self, fill: Option<FillRule>, stroke: bool, close: bool) {
        if close {
            self.path.close();
        }
        let builder = std::mem::replace(&mut self.path, PathBuilder::new());
        self.current = None;
        let path = builder.finish();

        if let Some(path) = &path {
            if let Some(rule) = fill {
                let paint = solid_paint(self.state.fill, self.state.fill_alpha);
                self.target.fill_path(
                    path,
                    &paint,
                    rule,
                    self.state.ctm,
                    self.state.clip.as_deref(),
                );
            }
            if stroke {
                let paint = solid_paint(self.state.stroke, self.state.stroke_alpha);
                let style = tiny_skia::Stroke {
                    width: self.state.line_width,
                    line_cap: self.state.line_cap,
                    line_join: self.state.line_join,
                    miter_limit: self.state.miter_limit,
                    ..Default::default()
                };
                self.target.stroke_path(
                    path,
                    &paint,
                    &style,
                    self.state.ctm,
                    self.state.clip.as_deref(),
                );
            }
        }

        if let Some(rule) = self.pending_clip.take() {
            self.clip_to(path.as_ref(), rule);
        }
    }

    /// Intersect the clip with `path`. A missing path clips everything away.
    fn clip_to(&mut self, path: Option<&Path>, rule: FillRule) {
        let Some(mut mask) = Mask::new(self.target.width(), self.target.height()) else {
            return;
        };
        if let Some(path) = path {
            mask.fill_path(path, rule, true, self.state.ctm);
        }
        if let Some(existing) = &self.state.clip {
            for (coverage, outer) in mask.data_mut().iter_mut().zip(existing.data()) {
                *coverage = ((u16::from(*coverage) * u16::from(*outer) + 127) / 255) as u8;
            }
        }
        self.state.clip = Some(Rc::new(mask));
    }

    fn apply_ext_gstate(&mut self, resources: Option<&'a Dictionary>, name: &[u8]) {
        let Some(params) = lookup(self.doc, resources, b"ExtGState", name)
            .and_then(|obj| obj.as_dict().ok())
        else {
            log::debug!("Unknown graphics state {:?}", String::from_utf8_lossy(name));
            return;
        };
        let number = |key: &[u8]| params.get(key).ok().and_then(crate::decoder::obj_to_f64);
        if let Some(alpha) = number(b"CA") {
            self.state.stroke_alpha = (alpha as f32).clamp(0.0, 1.0);
        }
        if let Some(alpha) = number(b"ca") {
            self.state.fill_alpha = (alpha as f32).clamp(0.0, 1.0);
        }
        if let Some(width) = number(b"LW") {
            self.state.line_width = (width as f32).max(0.0);
        }
    }

    fn draw_xobject(&mut self, resources: Option<&'a Dictionary>, name: &[u8], depth: u32) {
        let Some(stream) =
            lookup(self.doc, resources, b"XObject", name).and_then(|obj| obj.as_stream().ok())
        else {
            log::debug!("Missing XObject {:?}", String::from_utf8_lossy(name));
            return;
        };

        match name_of(&stream.dict, b"Subtype") {
            Some(b"Image") => match decode_image(self.doc, stream) {
                Some(image) => self.draw_image(&image),
                None => log::debug!("Skipped image {:?}", String::from_utf8_lossy(name)),
            },
            Some(b"Form") => self.draw_form(stream, resources, depth),
            _ => {}
        }
    }

    fn draw_image(&mut self, image: &RgbaImage) {
        let pixmap = match pixmap_from_image(image) {
            Ok(pixmap) => pixmap,
            Err(RasterError::InvalidSize { width, height }) => {
                log::debug!("Skipped {}x{} image", width, height);
                return;
            }
            Err(err) => {
                log::debug!("Skipped image: {}", err);
                return;
            }
        };
        let (w, h) = (pixmap.width() as f32, pixmap.height() as f32);
        // Images fill the unit square, first row at the top.
        let unit = Transform::from_row(1.0 / w, 0.0, 0.0, -1.0 / h, 0.0, 1.0);
        let paint = PixmapPaint {
            opacity: self.state.fill_alpha,
            quality: FilterQuality::Bilinear,
            ..Default::default()
        };
        self.target.draw_pixmap(
            0,
            0,
            pixmap.as_ref(),
            &paint,
            self.state.ctm.pre_concat(unit),
            self.state.clip.as_deref(),
        );
    }

    fn draw_form(&mut self, form: &'a Stream, parent: Option<&'a Dictionary>, depth: u32) {
        if depth >= MAX_FORM_DEPTH {
            log::warn!("Form XObjects nested deeper than {}", MAX_FORM_DEPTH);
            return;
        }
        let Some(operations) = stream_data(form)
            .and_then(|data| Content::decode(&data).ok())
            .map(|content| content.operations)
        else {
            return;
        };
        let resources = form
            .dict
            .get(b"Resources")
            .ok()
            .and_then(|obj| resolve(self.doc, obj).as_dict().ok())
            .or(parent);

        let outer = std::mem::take(&mut self.saved);
        let state = self.state.clone();
        let matrix = form
            .dict
            .get(b"Matrix")
            .ok()
            .and_then(|obj| obj.as_array().ok())
            .and_then(|items| numbers::<6>(items));
        if let Some([a, b, c, d, e, f]) = matrix {
            self.state.ctm = self.state.ctm.pre_concat(Transform::from_row(a, b, c, d, e, f));
        }
        let path = std::mem::replace(&mut self.path, PathBuilder::new());
        // A form sees its own q/Q stack, so unbalanced operators stay inside.
        self.run(&operations, resources, depth + 1);
        self.path = path;
        self.saved = outer;
        self.state = state;
    }
}

fn solid_paint(mut color: Color, alpha: f32) -> Paint<'static> {
    color.set_alpha(alpha);
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    paint
}

/// Set a device color from gray, RGB or CMYK operands. Pattern names and
/// other component counts leave the color unchanged.
fn set_color(color: &mut Color, operands: &[Object]) {
    if operands.iter().any(|obj| matches!(obj, Object::Name(_))) {
        return;
    }
    let values: Option<Vec<f32>> = operands
        .iter()
        .map(|obj| crate::decoder::obj_to_f64(obj).map(|v| v as f32))
        .collect();
    let rgb = match values.as_deref() {
        Some(&[gray]) => [gray; 3],
        Some(&[r, g, b]) => [r, g, b],
        Some(&[c, m, y, k]) => cmyk_to_rgb(c, m, y, k),
        _ => return,
    };
    let [r, g, b] = rgb.map(|v| v.clamp(0.0, 1.0));
    if let Some(device) = Color::from_rgba(r, g, b, 1.0) {
        *color = device;
    }
}

fn cmyk_to_rgb(c: f32, m: f32, y: f32, k: f32) -> [f32; 3] {
    [(1.0 - c) * (1.0 - k), (1.0 - m) * (1.0 - k), (1.0 - y) * (1.0 - k)]
}

/// First `N` operands as numbers.
fn numbers<const N: usize>(operands: &[Object]) -> Option<[f32; N]> {
    if operands.len() < N {
        return None;
    }
    let mut out = [0.0; N];
    for (slot, obj) in out.iter_mut().zip(operands) {
        *slot = crate::decoder::obj_to_f64(obj)? as f32;
    }
    Some(out)
}

/// Follow indirect references.
fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    let mut current = obj;
    // Bounded so reference cycles cannot hang.
    for _ in 0..32 {
        match current {
            Object::Reference(id) => match doc.get_object(*id) {
                Ok(next) => current = next,
                Err(_) => break,
            },
            _ => break,
        }
    }
    current
}

/// Named entry of a resource category, resolved.
fn lookup<'a>(
    doc: &'a Document,
    resources: Option<&'a Dictionary>,
    category: &[u8],
    name: &[u8],
) -> Option<&'a Object> {
    let entries = resolve(doc, resources?.get(category).ok()?).as_dict().ok()?;
    entries.get(name).ok().map(|obj| resolve(doc, obj))
}

fn name_of<'a>(dict: &'a Dictionary, key: &[u8]) -> Option<&'a [u8]> {
    match dict.get(key) {
        Ok(Object::Name(name)) => Some(name.as_slice()),
        _ => None,
    }
}

fn filter_names(dict: &Dictionary) -> Vec<&[u8]> {
    match dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![name.as_slice()],
        Ok(Object::Array(items)) => items
            .iter()
            .filter_map(|obj| match obj {
                Object::Name(name) => Some(name.as_slice()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Decoded bytes of a stream, or `None` for filters lopdf cannot undo.
pub(crate) fn stream_data(stream: &Stream) -> Option<Vec<u8>> {
    if filter_names(&stream.dict).is_empty() {
        return Some(stream.content.clone());
    }
    // lopdf declines to decompress streams typed as images.
    let mut plain = Stream::new(stream.dict.clone(), stream.content.clone());
    plain.dict.remove(b"Subtype");
    plain.decompressed_content().ok()
}

fn dict_u32(dict: &Dictionary, key: &[u8]) -> Option<u32> {
    let value = dict.get(key).ok().and_then(crate::decoder::obj_to_f64)?;
    (value >= 1.0 && value <= f64::from(u32::MAX)).then_some(value as u32)
}

/// Number of color components of an image color space.
fn color_components(doc: &Document, space: &Object) -> Option<usize> {
    match resolve(doc, space) {
        Object::Name(name) => match name.as_slice() {
            b"DeviceGray" | b"CalGray" | b"G" => Some(1),
            b"DeviceRGB" | b"CalRGB" | b"RGB" => Some(3),
            b"DeviceCMYK" | b"CMYK" => Some(4),
            _ => None,
        },
        Object::Array(items) => match items.first() {
            Some(Object::Name(family)) => match family.as_slice() {
                b"ICCBased" => {
                    let profile = resolve(doc, items.get(1)?).as_stream().ok()?;
                    let n = dict_u32(&profile.dict, b"N")? as usize;
                    matches!(n, 1 | 3 | 4).then_some(n)
                }
                b"CalGray" => Some(1),
                b"CalRGB" => Some(3),
                _ => None,
            },
            _ => None,
        },
        _ => None,
    }
}

/// Decode an image XObject to straight-alpha RGBA.
///
/// Handles 8-bit gray, RGB and CMYK samples (raw or Flate) and baseline
/// JPEG. An `SMask` of the same size becomes the alpha channel.
fn decode_image(doc: &Document, stream: &Stream) -> Option<RgbaImage> {
    let dict = &stream.dict;
    let width = dict_u32(dict, b"Width")?;
    let height = dict_u32(dict, b"Height")?;
    if !surface_fits(width, height) {
        return None;
    }

    let mut image = if filter_names(dict).contains(&b"DCTDecode".as_slice()) {
        image::load_from_memory_with_format(&stream.content, ImageFormat::Jpeg)
            .ok()?
            .to_rgba8()
    } else {
        let bits = dict.get(b"BitsPerComponent").ok().and_then(crate::decoder::obj_to_f64);
        if bits != Some(8.0) {
            return None;
        }
        let components = color_components(doc, dict.get(b"ColorSpace").ok()?)?;
        samples_to_rgba(&stream_data(stream)?, width, height, components)?
    };

    if let Some(alpha) = soft_mask(doc, dict, image.dimensions()) {
        for (pixel, a) in image.pixels_mut().zip(alpha) {
            pixel.0[3] = a;
        }
    }
    Some(image)
}

fn samples_to_rgba(data: &[u8], width: u32, height: u32, components: usize) -> Option<RgbaImage> {
    let pixel_count = usize::try_from(u64::from(width) * u64::from(height)).ok()?;
    if data.len() < pixel_count.checked_mul(components)? {
        return None;
    }
    let mut rgba = Vec::with_capacity(pixel_count * 4);
    for sample in data.chunks_exact(components).take(pixel_count) {
        let [r, g, b] = match *sample {
            [gray] => [gray; 3],
            [r, g, b] => [r, g, b],
            [c, m, y, k] => {
                let unit = |v: u8| f32::from(v) / 255.0;
                cmyk_to_rgb(unit(c), unit(m), unit(y), unit(k)).map(|v| (v * 255.0).round() as u8)
            }
            _ => return None,
        };
        rgba.extend_from_slice(&[r, g, b, u8::MAX]);
    }
    RgbaImage::from_raw(width, height, rgba)
}

fn soft_mask(doc: &Document, dict: &Dictionary, size: (u32, u32)) -> Option<Vec<u8>> {
    let mask = resolve(doc, dict.get(b"SMask").ok()?).as_stream().ok()?;
    let mask_size = (dict_u32(&mask.dict, b"Width")?, dict_u32(&mask.dict, b"Height")?);
    if mask_size != size {
        log::debug!("Ignored soft mask of size {:?} for image {:?}", mask_size, size);
        return None;
    }
    let count = usize::try_from(u64::from(size.0) * u64::from(size.1)).ok()?;
    let mut data = stream_data(mask)?;
    if data.len() < count {
        return None;
    }
    data.truncate(count);
    Some(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::tests::pdf_with_content;
    use lopdf::dictionary;
    use crate::encoder::{LopdfEncoder, PdfEncoder};
    use crate::raster::{encode_png, new_surface};
    use tiny_skia::Point;

    fn page_of(bytes: &[u8]) -> (Document, ObjectId) {
        let doc = Document::load_mem(bytes).unwrap();
        let page_id = *doc.get_pages().get(&1).unwrap();
        (doc, page_id)
    }

    /// Paint page 1 of `bytes` at scale 1 over white paper.
    fn paint(bytes: &[u8], frame: PageFrame) -> Pixmap {
        let (doc, page_id) = page_of(bytes);
        let size = frame.size();
        let mut surface = new_surface(size.width as u32, size.height as u32).unwrap();
        surface.fill(Color::WHITE);
        paint_page(&doc, page_id, frame.transform(1.0), &mut surface).unwrap();
        surface
    }

    fn frame(width: f64, height: f64) -> PageFrame {
        PageFrame::new([0.0, 0.0, width, height], 0)
    }

    fn rgb_at(pixmap: &Pixmap, x: u32, y: u32) -> [u8; 3] {
        let c = pixmap.pixel(x, y).unwrap().demultiply();
        [c.red(), c.green(), c.blue()]
    }

    #[test]
    fn test_frame_normalizes_box_and_rotation() {
        let frame = PageFrame::new([100.0, 50.0, 0.0, 0.0], -90);
        assert_eq!(frame.media_box, [0.0, 0.0, 100.0, 50.0]);
        assert_eq!(frame.rotate, 270);
        assert_eq!(frame.size(), Size::new(50.0, 100.0));
    }

    #[test]
    fn test_frame_transform_flips_y() {
        let t = PageFrame::new([10.0, 20.0, 110.0, 220.0], 0).transform(2.0);
        let mut p = [Point::from_xy(10.0, 220.0), Point::from_xy(110.0, 20.0)];
        t.map_points(&mut p);
        assert_eq!((p[0].x, p[0].y), (0.0, 0.0));
        assert_eq!((p[1].x, p[1].y), (200.0, 400.0));
    }

    #[test]
    fn test_frame_transform_quarter_turns() {
        // Bottom-left and top-left corners of a 40x30 page.
        let corners = || [Point::from_xy(0.0, 0.0), Point::from_xy(0.0, 30.0)];

        let mut p = corners();
        PageFrame::new([0.0, 0.0, 40.0, 30.0], 90).transform(1.0).map_points(&mut p);
        assert_eq!((p[0].x, p[0].y), (0.0, 0.0));
        assert_eq!((p[1].x, p[1].y), (30.0, 0.0));

        let mut p = corners();
        PageFrame::new([0.0, 0.0, 40.0, 30.0], 180).transform(1.0).map_points(&mut p);
        assert_eq!((p[0].x, p[0].y), (40.0, 0.0));
        assert_eq!((p[1].x, p[1].y), (40.0, 30.0));

        let mut p = corners();
        PageFrame::new([0.0, 0.0, 40.0, 30.0], 270).transform(1.0).map_points(&mut p);
        assert_eq!((p[0].x, p[0].y), (30.0, 40.0));
        assert_eq!((p[1].x, p[1].y), (0.0, 40.0));
    }

    #[test]
    fn test_filled_rectangle_lands_upright() {
        // Red box in the lower-left quarter of the page.
        let bytes = pdf_with_content(40, 30, b"1 0 0 rg 0 0 20 15 re f");
        let surface = paint(&bytes, frame(40.0, 30.0));
        assert_eq!(rgb_at(&surface, 5, 25), [255, 0, 0]);
        assert_eq!(rgb_at(&surface, 5, 5), [255, 255, 255]);
        assert_eq!(rgb_at(&surface, 30, 25), [255, 255, 255]);
    }

    #[test]
    fn test_gray_and_cmyk_fills() {
        let bytes = pdf_with_content(
            40,
            10,
            b"0.5 g 0 0 20 10 re f 0 0 0 1 k 20 0 20 10 re f",
        );
        let surface = paint(&bytes, frame(40.0, 10.0));
        let gray = rgb_at(&surface, 10, 5);
        assert!(gray.iter().all(|&c| (126..=129).contains(&c)));
        assert_eq!(rgb_at(&surface, 30, 5), [0, 0, 0]);
    }

    #[test]
    fn test_save_restore_and_cm() {
        let bytes = pdf_with_content(
            40,
            40,
            b"q 1 0 0 1 20 20 cm 0 0 1 rg 0 0 10 10 re f Q 0 1 0 rg 0 0 10 10 re f",
        );
        let surface = paint(&bytes, frame(40.0, 40.0));
        // Translated blue box: user (20..30, 20..30) is device (20..30, 10..20).
        assert_eq!(rgb_at(&surface, 25, 15), [0, 0, 255]);
        // After Q the green box is back at the origin.
        assert_eq!(rgb_at(&surface, 5, 35), [0, 255, 0]);
    }

    #[test]
    fn test_stroke_uses_line_width() {
        let bytes = pdf_with_content(40, 40, b"0 0 0 RG 6 w 0 20 m 40 20 l S");
        let surface = paint(&bytes, frame(40.0, 40.0));
        assert_eq!(rgb_at(&surface, 20, 20), [0, 0, 0]);
        assert_eq!(rgb_at(&surface, 20, 18), [0, 0, 0]);
        assert_eq!(rgb_at(&surface, 20, 10), [255, 255, 255]);
    }

    #[test]
    fn test_clip_limits_fill() {
        let bytes = pdf_with_content(40, 40, b"0 0 20 40 re W n 0 g 0 0 40 40 re f");
        let surface = paint(&bytes, frame(40.0, 40.0));
        assert_eq!(rgb_at(&surface, 10, 20), [0, 0, 0]);
        assert_eq!(rgb_at(&surface, 30, 20), [255, 255, 255]);
    }

    #[test]
    fn test_unsupported_operators_are_skipped() {
        let bytes = pdf_with_content(
            20,
            20,
            b"BT /F1 12 Tf 2 2 Td (hello) Tj ET 0 g 0 0 20 20 re f",
        );
        let surface = paint(&bytes, frame(20.0, 20.0));
        assert_eq!(rgb_at(&surface, 10, 10), [0, 0, 0]);
    }

    #[test]
    fn test_image_xobject_from_exported_page() {
        // Left half red, right half transparent, written as an image page.
        let mut pixels = Vec::new();
        for _y in 0..10 {
            for x in 0..20 {
                if x < 10 {
                    pixels.extend_from_slice(&[255, 0, 0, 255]);
                } else {
                    pixels.extend_from_slice(&[0, 0, 0, 0]);
                }
            }
        }
        let png = encode_png(&pixels, 20, 10).unwrap();
        let mut encoder = LopdfEncoder::new(Size::new(20.0, 10.0)).unwrap();
        encoder.place_image(&png).unwrap();
        let bytes = encoder.finish().unwrap();

        let surface = paint(&bytes, frame(20.0, 10.0));
        assert_eq!(rgb_at(&surface, 4, 5), [255, 0, 0]);
        assert_eq!(rgb_at(&surface, 16, 5), [255, 255, 255]);
    }

    #[test]
    fn test_samples_to_rgba_checks_length() {
        assert!(samples_to_rgba(&[0, 0, 0], 2, 1, 3).is_none());
        let image = samples_to_rgba(&[0, 255], 2, 1, 1).unwrap();
        assert_eq!(image.get_pixel(1, 0).0, [255, 255, 255, 255]);
        let cmyk = samples_to_rgba(&[255, 0, 0, 0], 1, 1, 4).unwrap();
        assert_eq!(cmyk.get_pixel(0, 0).0, [0, 255, 255, 255]);
    }

    #[test]
    fn test_form_xobject_is_drawn_and_contained() {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        // The stray Q must not leak the form's blue fill back to the page.
        let form_id = doc.add_object(Stream::new(
            lopdf::dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "BBox" => vec![0.into(), 0.into(), 10.into(), 10.into()],
                "Matrix" => vec![1.into(), 0.into(), 0.into(), 1.into(), 10.into(), 0.into()],
            },
            b"Q 0 0 1 rg 0 0 10 10 re f".to_vec(),
        ));
        let content_id = doc.add_object(Stream::new(
            lopdf::dictionary! {},
            b"q /Fm0 Do 0 0 10 10 re f Q".to_vec(),
        ));
        let page_id = doc.add_object(lopdf::dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 20.into(), 10.into()],
            "Contents" => content_id,
            "Resources" => lopdf::dictionary! {
                "XObject" => lopdf::dictionary! { "Fm0" => form_id },
            },
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(lopdf::dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::from(page_id)],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(lopdf::dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();

        let surface = paint(&bytes, frame(20.0, 10.0));
        assert_eq!(rgb_at(&surface, 15, 5), [0, 0, 255]);
        assert_eq!(rgb_at(&surface, 5, 5), [0, 0, 0]);
    }
}
