// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rasterisation adapters — turn PDF bytes into one RGB image per page.
//
// Two implementations:
// - `EmbeddedImageRasterizer` (always available) pulls the largest image
//   XObject off each page with lopdf. Scanned documents are exactly one
//   image per page, so this covers them without a native renderer.
// - `PdfiumRasterizer` (feature "pdfium") renders full pages through the
//   system pdfium library at the requested DPI.

use image::RgbImage;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use pruefwerk_core::error::{ForensicsError, Result};
use pruefwerk_core::{CancellationToken, RasterFormat, RenderOptions};
use tracing::{debug, info, instrument, warn};

use crate::image::processor::{decode_rgb, jpeg_round_trip};

/// One page of the document, rasterised or not.
#[derive(Debug)]
pub struct RenderedPage {
    /// 0-indexed position in the document.
    pub index: usize,
    /// The page image, or why this page alone could not be produced.
    pub image: Result<RgbImage>,
}

impl RenderedPage {
    pub fn rendered(index: usize, image: RgbImage) -> Self {
        Self {
            index,
            image: Ok(image),
        }
    }

    pub fn failed(index: usize, error: ForensicsError) -> Self {
        Self {
            index,
            image: Err(error),
        }
    }
}

/// PDF → page images. Implementations must preserve page order and return
/// one entry per page of the document.
pub trait PageRasterizer {
    /// Render every page. A page that cannot be produced is reported in its
    /// entry; an `Err` means the document as a whole could not be
    /// rasterised and is fatal to the request.
    fn render_pages(
        &self,
        pdf_bytes: &[u8],
        options: &RenderOptions,
        cancel: &CancellationToken,
    ) -> Result<Vec<RenderedPage>>;
}

/// Apply the configured pixel encoding to a freshly rendered page.
pub fn apply_raster_format(image: RgbImage, format: RasterFormat) -> Result<RgbImage> {
    match format {
        RasterFormat::Png => Ok(image),
        RasterFormat::Jpeg { quality } => jpeg_round_trip(&image, quality),
    }
}

// ---------------------------------------------------------------------------
// lopdf: embedded page images
// ---------------------------------------------------------------------------

/// Extracts the largest embedded image of each page.
///
/// Pages keep their native scan resolution, so `RenderOptions::dpi` is not
/// used. A page without a decodable image is reported as failed; a document
/// in which no page yields an image is a rasterisation failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedImageRasterizer;

impl PageRasterizer for EmbeddedImageRasterizer {
    #[instrument(skip_all, fields(bytes_len = pdf_bytes.len()))]
    fn render_pages(
        &self,
        pdf_bytes: &[u8],
        options: &RenderOptions,
        cancel: &CancellationToken,
    ) -> Result<Vec<RenderedPage>> {
        let doc = Document::load_mem(pdf_bytes).map_err(|err| {
            ForensicsError::Rasterization(format!("failed to parse PDF: {}", err))
        })?;

        let pages = doc.get_pages();
        let mut rendered = Vec::with_capacity(pages.len());
        for (index, (_, page_id)) in pages.iter().enumerate() {
            cancel.check()?;
            let image = largest_page_image(&doc, *page_id)
                .and_then(|image| apply_raster_format(image, options.format));
            match image {
                Ok(image) => {
                    debug!(
                        page = index,
                        width = image.width(),
                        height = image.height(),
                        "Embedded page image extracted"
                    );
                    rendered.push(RenderedPage::rendered(index, image));
                }
                Err(err) => {
                    warn!(page = index, %err, "Page has no usable image");
                    rendered.push(RenderedPage::failed(index, err));
                }
            }
        }

        let usable = rendered.iter().filter(|page| page.image.is_ok()).count();
        if usable == 0 {
            return Err(ForensicsError::Rasterization(format!(
                "none of the {} pages carries a decodable image",
                pages.len()
            )));
        }
        info!(pages = rendered.len(), usable, "Embedded page images extracted");
        Ok(rendered)
    }
}

/// Walk page → /Resources → /XObject and decode the biggest /Image.
fn largest_page_image(doc: &Document, page_id: ObjectId) -> Result<RgbImage> {
    let page = doc
        .get_dictionary(page_id)
        .map_err(|err| ForensicsError::PdfError(format!("page object error: {}", err)))?;
    let resources = resolve_dict(doc, page, b"Resources")?;
    let xobjects = resolve_dict(doc, resources, b"XObject")?;

    let mut largest: Option<RgbImage> = None;
    for (_, entry) in xobjects.iter() {
        let Ok(Object::Stream(stream)) = resolve(doc, entry) else {
            continue;
        };
        if !is_image(&stream.dict) {
            continue;
        }
        let image = match decode_image_stream(stream) {
            Ok(image) => image,
            Err(err) => {
                debug!(%err, "Image XObject not decodable");
                continue;
            }
        };
        let pixels = u64::from(image.width()) * u64::from(image.height());
        let best = largest
            .as_ref()
            .map_or(0, |prev| u64::from(prev.width()) * u64::from(prev.height()));
        if pixels > best {
            largest = Some(image);
        }
    }

    largest.ok_or_else(|| ForensicsError::PdfError("no decodable image XObject".into()))
}

fn decode_image_stream(stream: &Stream) -> Result<RgbImage> {
    if has_filter(&stream.dict, b"DCTDecode") {
        // The stream body is a complete JPEG file.
        return decode_rgb(&stream.content);
    }

    let content = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());
    if let Ok(image) = decode_rgb(&content) {
        return Ok(image);
    }
    raw_pixels_to_rgb(&stream.dict, content)
}

/// Rebuild an 8-bit DeviceGray/DeviceRGB image from raw samples.
fn raw_pixels_to_rgb(dict: &Dictionary, samples: Vec<u8>) -> Result<RgbImage> {
    let width = dict_u32(dict, b"Width")?;
    let height = dict_u32(dict, b"Height")?;
    let bits = dict_u32(dict, b"BitsPerComponent").unwrap_or(8);
    if bits != 8 {
        return Err(ForensicsError::ImageError(format!(
            "unsupported BitsPerComponent {}",
            bits
        )));
    }

    let colour_space = dict.get(b"ColorSpace").ok().and_then(|obj| obj.as_name().ok());
    match colour_space {
        Some(b"DeviceGray") => image::GrayImage::from_raw(width, height, samples)
            .map(|gray| image::DynamicImage::ImageLuma8(gray).to_rgb8())
            .ok_or_else(|| ForensicsError::ImageError("grayscale sample buffer too small".into())),
        Some(b"DeviceRGB") | None => RgbImage::from_raw(width, height, samples)
            .ok_or_else(|| ForensicsError::ImageError("RGB sample buffer too small".into())),
        Some(other) => Err(ForensicsError::ImageError(format!(
            "unsupported colour space {}",
            String::from_utf8_lossy(other)
        ))),
    }
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Result<&'a Object> {
    match obj {
        Object::Reference(id) => doc
            .get_object(*id)
            .map_err(|err| ForensicsError::PdfError(format!("dangling reference {:?}: {}", id, err))),
        other => Ok(other),
    }
}

fn resolve_dict<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Result<&'a Dictionary> {
    let entry = dict.get(key).map_err(|_| {
        ForensicsError::PdfError(format!("missing /{}", String::from_utf8_lossy(key)))
    })?;
    resolve(doc, entry)?.as_dict().map_err(|_| {
        ForensicsError::PdfError(format!("/{} is not a dictionary", String::from_utf8_lossy(key)))
    })
}

fn is_image(dict: &Dictionary) -> bool {
    matches!(dict.get(b"Subtype"), Ok(Object::Name(name)) if name == b"Image")
}

fn has_filter(dict: &Dictionary, filter: &[u8]) -> bool {
    match dict.get(b"Filter") {
        Ok(Object::Name(name)) => name == filter,
        Ok(Object::Array(filters)) => filters
            .iter()
            .any(|f| matches!(f, Object::Name(name) if name == filter)),
        _ => false,
    }
}

fn dict_u32(dict: &Dictionary, key: &[u8]) -> Result<u32> {
    dict.get(key)
        .and_then(Object::as_i64)
        .ok()
        .and_then(|value| u32::try_from(value).ok())
        .ok_or_else(|| {
            ForensicsError::PdfError(format!("missing or invalid /{}", String::from_utf8_lossy(key)))
        })
}

// ---------------------------------------------------------------------------
// pdfium: full page rendering
// ---------------------------------------------------------------------------

#[cfg(feature = "pdfium")]
pub use pdfium::PdfiumRasterizer;

#[cfg(feature = "pdfium")]
mod pdfium {
    use std::path::Path;

    use pdfium_render::prelude::*;
    use pruefwerk_core::error::{ForensicsError, Result};
    use pruefwerk_core::{CancellationToken, RenderOptions};
    use tracing::{debug, info, instrument, warn};

    use super::{PageRasterizer, RenderedPage, apply_raster_format};

    /// PDF points per inch.
    const POINTS_PER_INCH: f32 = 72.0;

    /// Renders pages through pdfium at the requested DPI.
    pub struct PdfiumRasterizer {
        pdfium: Pdfium,
    }

    impl PdfiumRasterizer {
        /// Bind pdfium, trying `library_dir` first and the system library
        /// second.
        pub fn bind(library_dir: Option<&Path>) -> Result<Self> {
            if let Some(dir) = library_dir {
                let lib_path = Pdfium::pdfium_platform_library_name_at_path(dir);
                debug!(path = %lib_path.display(), "Trying pdfium library");
                if let Ok(bindings) = Pdfium::bind_to_library(&lib_path) {
                    info!(path = %lib_path.display(), "pdfium bound");
                    return Ok(Self {
                        pdfium: Pdfium::new(bindings),
                    });
                }
            }
            let bindings = Pdfium::bind_to_system_library().map_err(|err| {
                ForensicsError::AdapterUnavailable(format!("pdfium library not found: {}", err))
            })?;
            info!("System pdfium bound");
            Ok(Self {
                pdfium: Pdfium::new(bindings),
            })
        }
    }

    impl PageRasterizer for PdfiumRasterizer {
        #[instrument(skip_all, fields(bytes_len = pdf_bytes.len(), dpi = options.dpi))]
        fn render_pages(
            &self,
            pdf_bytes: &[u8],
            options: &RenderOptions,
            cancel: &CancellationToken,
        ) -> Result<Vec<RenderedPage>> {
            let document = self
                .pdfium
                .load_pdf_from_byte_slice(pdf_bytes, None)
                .map_err(|err| ForensicsError::Rasterization(format!("failed to load PDF: {}", err)))?;

            let config = PdfRenderConfig::new()
                .scale_page_by_factor(options.dpi as f32 / POINTS_PER_INCH);

            let mut rendered = Vec::new();
            for (index, page) in document.pages().iter().enumerate() {
                cancel.check()?;
                let image = page
                    .render_with_config(&config)
                    .map_err(|err| {
                        ForensicsError::ImageError(format!("failed to render page {}: {}", index, err))
                    })
                    .and_then(|bitmap| {
                        apply_raster_format(bitmap.as_image().to_rgb8(), options.format)
                    });
                match image {
                    Ok(image) => {
                        debug!(
                            page = index,
                            width = image.width(),
                            height = image.height(),
                            "Page rendered"
                        );
                        rendered.push(RenderedPage::rendered(index, image));
                    }
                    Err(err) => {
                        warn!(page = index, %err, "Page could not be rendered");
                        rendered.push(RenderedPage::failed(index, err));
                    }
                }
            }

            info!(pages = rendered.len(), "PDF rasterised");
            Ok(rendered)
        }
    }
}
