//! Minimal image-only PDF writer
//!
//! Every page is one JPEG image XObject (DCTDecode) drawn over the whole
//! MediaBox. The file is assembled in memory, written to `<name>.part` and
//! renamed into place, so an interrupted run never leaves a truncated PDF
//! that would later count as "already rendered".

use super::PdfRenderer;
use anyhow::{bail, Context, Result};
use image::codecs::jpeg::JpegEncoder;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Resolution assumed for preview images when sizing pages
const SOURCE_DPI: f32 = 96.0;

/// Points per inch in PDF user space
const POINTS_PER_INCH: f32 = 72.0;

const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Renders PNG preview pages into a PDF with one page per image
#[derive(Debug, Clone)]
pub struct ImagePdfRenderer {
    jpeg_quality: u8,
}

impl ImagePdfRenderer {
    pub fn new() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    /// Set JPEG quality used for embedded pages (1-100)
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }
}

impl Default for ImagePdfRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfRenderer for ImagePdfRenderer {
    fn render(&self, pages: &[PathBuf], output: &Path) -> Result<()> {
        if pages.is_empty() {
            bail!("No pages to render into {:?}", output);
        }

        let mut document = PdfDocument::new(pages.len());
        for path in pages {
            let page = encode_page(path, self.jpeg_quality)?;
            document.add_page(&page);
        }
        let bytes = document.finish();

        let mut part = output.as_os_str().to_owned();
        part.push(".part");
        let part = PathBuf::from(part);

        fs::write(&part, &bytes)
            .with_context(|| format!("Failed to write PDF: {:?}", part))?;
        fs::rename(&part, output)
            .with_context(|| format!("Failed to move PDF into place: {:?}", output))?;

        log::debug!("Wrote {} page(s), {} bytes to {:?}", pages.len(), bytes.len(), output);
        Ok(())
    }
}

/// One page ready to embed
struct EncodedPage {
    width: u32,
    height: u32,
    jpeg: Vec<u8>,
}

/// Decode an image and re-encode it as baseline RGB JPEG
fn encode_page(path: &Path, quality: u8) -> Result<EncodedPage> {
    let image = image::open(path)
        .with_context(|| format!("Failed to open page image: {:?}", path))?
        .to_rgb8();

    let mut buffer = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .encode_image(&image)
        .with_context(|| format!("Failed to encode JPEG for {:?}", path))?;

    Ok(EncodedPage {
        width: image.width(),
        height: image.height(),
        jpeg: buffer.into_inner(),
    })
}

fn to_points(pixels: u32) -> f32 {
    pixels as f32 * POINTS_PER_INCH / SOURCE_DPI
}

/// Object layout: 1 catalog, 2 page tree, then three objects per page
/// (page, content stream, image).
struct PdfDocument {
    buffer: Vec<u8>,
    offsets: Vec<usize>,
    page_count: usize,
    pages_added: usize,
}

impl PdfDocument {
    fn new(page_count: usize) -> Self {
        let mut document = Self {
            buffer: Vec::new(),
            offsets: Vec::new(),
            page_count,
            pages_added: 0,
        };

        document.buffer.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

        document.begin_object(1);
        document.write_str("<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");

        let kids: Vec<String> = (0..page_count)
            .map(|i| format!("{} 0 R", Self::page_object(i)))
            .collect();
        document.begin_object(2);
        document.write_str(&format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>\nendobj\n",
            kids.join(" "),
            page_count
        ));

        document
    }

    fn page_object(index: usize) -> usize {
        3 + index * 3
    }

    fn begin_object(&mut self, id: usize) {
        debug_assert_eq!(id, self.offsets.len() + 1);
        self.offsets.push(self.buffer.len());
        self.write_str(&format!("{} 0 obj\n", id));
    }

    fn write_str(&mut self, text: &str) {
        self.buffer.extend_from_slice(text.as_bytes());
    }

    fn add_page(&mut self, page: &EncodedPage) {
        let page_id = Self::page_object(self.pages_added);
        let content_id = page_id + 1;
        let image_id = page_id + 2;
        let width = to_points(page.width);
        let height = to_points(page.height);

        self.begin_object(page_id);
        self.write_str(&format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {w:.2} {h:.2}] \
             /Resources << /XObject << /Im0 {img} 0 R >> >> /Contents {c} 0 R >>\nendobj\n",
            w = width,
            h = height,
            img = image_id,
            c = content_id
        ));

        let content = format!("q {:.2} 0 0 {:.2} 0 0 cm /Im0 Do Q", width, height);
        self.begin_object(content_id);
        self.write_str(&format!(
            "<< /Length {} >>\nstream\n{}\nendstream\nendobj\n",
            content.len(),
            content
        ));

        self.begin_object(image_id);
        self.write_str(&format!(
            "<< /Type /XObject /Subtype /Image /Width {} /Height {} \
             /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /DCTDecode /Length {} >>\nstream\n",
            page.width,
            page.height,
            page.jpeg.len()
        ));
        self.buffer.extend_from_slice(&page.jpeg);
        self.write_str("\nendstream\nendobj\n");

        self.pages_added += 1;
    }

    fn finish(mut self) -> Vec<u8> {
        debug_assert_eq!(self.pages_added, self.page_count);

        let xref_offset = self.buffer.len();
        let object_count = self.offsets.len() + 1;

        self.write_str(&format!("xref\n0 {}\n", object_count));
        self.write_str("0000000000 65535 f \n");
        for offset in self.offsets.clone() {
            self.write_str(&format!("{:010} 00000 n \n", offset));
        }
        self.write_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            object_count, xref_offset
        ));

        self.buffer
    }
}
