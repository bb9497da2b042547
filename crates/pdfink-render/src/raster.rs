//! Raster surfaces and PNG encoding.

use image::RgbaImage;
use pdfink_core::geometry::surface_fits;
use thiserror::Error;
use tiny_skia::{ColorU8, Pixmap};

/// Raster errors.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("Invalid surface size: {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("PNG encoding failed: {0}")]
    Png(#[from] png::EncodingError),
}

/// Allocate a transparent surface. Empty and oversized surfaces are refused.
pub fn new_surface(width: u32, height: u32) -> Result<Pixmap, RasterError> {
    if !surface_fits(width, height) {
        return Err(RasterError::InvalidSize { width, height });
    }
    Pixmap::new(width, height).ok_or(RasterError::InvalidSize { width, height })
}

/// Copy a straight-alpha bitmap into a (premultiplied) surface.
pub fn pixmap_from_image(image: &RgbaImage) -> Result<Pixmap, RasterError> {
    let mut pixmap = new_surface(image.width(), image.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

/// Straight-alpha RGBA bytes of a surface, row-major.
pub fn pixmap_to_rgba(pixmap: &Pixmap) -> Vec<u8> {
    let mut data = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let color = pixel.demultiply();
        data.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
    }
    data
}

/// Encode RGBA pixel data to PNG bytes.
pub fn encode_png(rgba_data: &[u8], width: u32, height: u32) -> Result<Vec<u8>, RasterError> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(rgba_data)?;
        writer.finish()?;
    }

    Ok(png_data)
}

/// Encode a surface as PNG.
pub fn surface_to_png(pixmap: &Pixmap) -> Result<Vec<u8>, RasterError> {
    encode_png(&pixmap_to_rgba(pixmap), pixmap.width(), pixmap.height())
}
