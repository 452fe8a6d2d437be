//! PDF attachment handling: page-by-page text extraction, and optional
//! page rasterization for multimodal model input.

use std::io::Cursor;

use anyhow::Context;
use lopdf::Document;

/// Extracts the text of every page in document order, joined with newlines.
/// A page with no extractable text contributes an empty string. A corrupt
/// or unparseable document fails the whole extraction; partial pages give
/// no length guarantee worth trusting.
pub fn extract_text(blob: &[u8]) -> anyhow::Result<String> {
    let doc = Document::load_mem(blob).context("could not parse PDF document")?;

    let mut pages = Vec::new();
    for (page_number, _) in doc.get_pages() {
        let text = doc
            .extract_text(&[page_number])
            .with_context(|| format!("could not extract text from page {page_number}"))?;
        pages.push(text);
    }

    Ok(pages.join("\n"))
}

/// Renders each page to a PNG at the given target width. Independent of
/// text extraction; callers that do not need images never call this.
pub fn extract_page_images(blob: &[u8], target_width: i32) -> anyhow::Result<Vec<Vec<u8>>> {
    use pdfium_render::prelude::*;

    let bindings = Pdfium::bind_to_system_library()
        .context("could not bind the pdfium library for page rendering")?;
    let pdfium = Pdfium::new(bindings);

    let document = pdfium
        .load_pdf_from_byte_slice(blob, None)
        .context("could not open PDF document for rendering")?;

    let render_config = PdfRenderConfig::new().set_target_width(target_width);

    let mut images = Vec::new();
    for page in document.pages().iter() {
        let bitmap = page
            .render_with_config(&render_config)
            .context("could not render PDF page")?;

        let mut png = Vec::new();
        bitmap
            .as_image()
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .context("could not encode page image")?;
        images.push(png);
    }

    Ok(images)
}
