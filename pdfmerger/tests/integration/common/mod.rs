//! Shared fixtures for the integration tests.
//!
//! Everything is generated in memory: PDFs whose pages carry a text marker
//! naming their origin, and small PNG/JPEG images.

#![allow(dead_code)]

use std::io::Cursor;

use image::{ImageBuffer, ImageFormat, Rgb, Rgba};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, StringFormat, dictionary};
use pdfmerger::model::{InputFile, PDF_MEDIA_TYPE};

/// A PDF with `pages` pages; page `n` draws `"{label} {n}"`.
///
/// Every page carries its own MediaBox and Resources.
pub fn marked_pdf(label: &str, pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });

    let kids: Vec<Object> = (1..=pages)
        .map(|n| {
            let text = format!("{label} {n}");
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 18.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new(
                        "Tj",
                        vec![Object::String(text.into_bytes(), StringFormat::Literal)],
                    ),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
                "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
                "Contents" => content_id,
            })
            .into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// A solid PNG; `opaque = false` gives it half transparency.
pub fn png(width: u32, height: u32, opaque: bool) -> Vec<u8> {
    let alpha = if opaque { 255 } else { 100 };
    let img = ImageBuffer::from_pixel(width, height, Rgba([20u8, 160, 60, alpha]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// A solid JPEG.
pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = ImageBuffer::from_pixel(width, height, Rgb([240u8, 200, 0]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Jpeg).unwrap();
    out.into_inner()
}

pub fn pdf_input(name: &str, pages: usize) -> InputFile {
    let label = name.trim_end_matches(".pdf");
    InputFile::new(name, PDF_MEDIA_TYPE, marked_pdf(label, pages))
}

pub fn png_input(name: &str) -> InputFile {
    InputFile::new(name, "image/png", png(40, 30, true))
}

/// Markers of every page, in page order. Pages without text yield `""`.
pub fn markers(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .values()
        .map(|&id| {
            let content = doc.get_page_content(id).unwrap_or_default();
            let text = String::from_utf8_lossy(&content).into_owned();
            text.split('(')
                .nth(1)
                .and_then(|rest| rest.split(')').next())
                .unwrap_or_default()
                .to_string()
        })
        .collect()
}

/// Whether the page at `index` draws an image XObject.
pub fn draws_image(bytes: &[u8], index: usize) -> bool {
    let doc = Document::load_mem(bytes).unwrap();
    let id = doc.get_pages().values().nth(index).copied().unwrap();
    let content = doc.get_page_content(id).unwrap_or_default();
    String::from_utf8_lossy(&content).contains(" Do")
}
