//! PDF document construction.

use image::{ImageFormat, ImageReader, Limits};
use kurbo::Size;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use pdfink_core::geometry::{MAX_SURFACE_PIXELS, MAX_SURFACE_SIDE};
use std::io::Cursor;
use thiserror::Error;

/// Encoding errors.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("PDF write error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image decode error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid page size: {width}x{height}")]
    InvalidPageSize { width: f64, height: f64 },
}

/// Result type for encoding operations.
pub type EncodeResult<T> = Result<T, EncodeError>;

/// Builder of an output PDF made of full-page raster images.
///
/// Sizes are in PDF points. The document starts with one page of the
/// initial size; images are placed on the most recently added page.
pub trait PdfEncoder: Sized {
    /// Start a document whose first page has size `initial`.
    fn new(initial: Size) -> EncodeResult<Self>;

    /// Append a page of the given size and make it current.
    fn add_page(&mut self, size: Size) -> EncodeResult<()>;

    /// Place a PNG image stretched over the whole current page.
    fn place_image(&mut self, png: &[u8]) -> EncodeResult<()>;

    /// Serialize the document.
    fn finish(self) -> EncodeResult<Vec<u8>>;
}

struct PendingPage {
    size: Size,
    images: Vec<ObjectId>,
}

/// [`PdfEncoder`] writing with `lopdf`.
pub struct LopdfEncoder {
    doc: Document,
    pages: Vec<PendingPage>,
}

impl LopdfEncoder {
    fn check_size(size: Size) -> EncodeResult<Size> {
        if size.width.is_finite() && size.height.is_finite() && size.width > 0.0 && size.height > 0.0
        {
            Ok(size)
        } else {
            Err(EncodeError::InvalidPageSize {
                width: size.width,
                height: size.height,
            })
        }
    }

    /// Decode a PNG no larger than the raster surface limits.
    fn decode_png(png: &[u8]) -> EncodeResult<image::RgbaImage> {
        let mut limits = Limits::default();
        limits.max_image_width = Some(MAX_SURFACE_SIDE);
        limits.max_image_height = Some(MAX_SURFACE_SIDE);
        limits.max_alloc = Some(MAX_SURFACE_PIXELS * 4);

        let mut reader = ImageReader::with_format(Cursor::new(png), ImageFormat::Png);
        reader.limits(limits);
        Ok(reader.decode()?.to_rgba8())
    }

    /// Split a decoded image into an RGB image XObject plus an optional
    /// soft mask when it has any transparency.
    fn add_image_object(&mut self, png: &[u8]) -> EncodeResult<ObjectId> {
        let img = Self::decode_png(png)?;
        let (img_w, img_h) = img.dimensions();
        let pixel_count = img.as_raw().len() / 4;
        let mut rgb = Vec::with_capacity(pixel_count * 3);
        let mut alpha = Vec::with_capacity(pixel_count);
        for pixel in img.pixels() {
            rgb.extend_from_slice(&pixel.0[..3]);
            alpha.push(pixel.0[3]);
        }

        let mut image_dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => img_w as i64,
            "Height" => img_h as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8_i64,
        };

        if alpha.iter().any(|&a| a != u8::MAX) {
            let smask_stream = Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => img_w as i64,
                    "Height" => img_h as i64,
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8_i64,
                },
                alpha,
            );
            let smask_id = self.doc.add_object(smask_stream);
            image_dict.set("SMask", smask_id);
        }

        Ok(self.doc.add_object(Stream::new(image_dict, rgb)))
    }

    fn write_page(&mut self, pages_id: ObjectId, page: &PendingPage) -> EncodeResult<ObjectId> {
        let width = page.size.width as f32;
        let height = page.size.height as f32;

        let mut xobjects = Dictionary::new();
        let mut operations = Vec::new();
        for (index, image_id) in page.images.iter().enumerate() {
            let name = format!("Im{}", index);
            xobjects.set(name.clone(), *image_id);
            operations.push(Operation::new("q", vec![]));
            operations.push(Operation::new(
                "cm",
                vec![
                    width.into(),
                    0.into(),
                    0.into(),
                    height.into(),
                    0.into(),
                    0.into(),
                ],
            ));
            operations.push(Operation::new("Do", vec![Object::Name(name.into_bytes())]));
            operations.push(Operation::new("Q", vec![]));
        }

        let content = Content { operations };
        let content_id = self.doc.add_object(Stream::new(dictionary! {}, content.encode()?));

        Ok(self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => xobjects,
            },
        }))
    }
}

impl PdfEncoder for LopdfEncoder {
    fn new(initial: Size) -> EncodeResult<Self> {
        let size = Self::check_size(initial)?;
        Ok(Self {
            doc: Document::with_version("1.5"),
            pages: vec![PendingPage {
                size,
                images: Vec::new(),
            }],
        })
    }

    fn add_page(&mut self, size: Size) -> EncodeResult<()> {
        let size = Self::check_size(size)?;
        self.pages.push(PendingPage {
            size,
            images: Vec::new(),
        });
        Ok(())
    }

    fn place_image(&mut self, png: &[u8]) -> EncodeResult<()> {
        let image_id = self.add_image_object(png)?;
        if let Some(page) = self.pages.last_mut() {
            page.images.push(image_id);
        }
        Ok(())
    }

    fn finish(mut self) -> EncodeResult<Vec<u8>> {
        let pages_id = self.doc.new_object_id();
        let pending = std::mem::take(&mut self.pages);
        let mut kids = Vec::with_capacity(pending.len());
        for page in &pending {
            let page_id = self.write_page(pages_id, page)?;
            kids.push(Object::from(page_id));
        }

        let count = kids.len() as i64;
        self.doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.compress();

        let mut bytes = Vec::new();
        self.doc.save_to(&mut bytes)?;
        Ok(bytes)
    }
}
