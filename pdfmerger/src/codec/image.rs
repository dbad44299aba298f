//! Image embedding and placement.
//!
//! JPEG data is embedded as-is behind a `DCTDecode` filter, with the colour
//! space taken from the component count of its frame header. PNG data, and
//! JPEGs whose header cannot be read, are decoded and stored as raw RGB
//! samples, with a soft mask for the alpha channel when any pixel is not
//! fully opaque.

use super::CodecContext;
use super::pages;
use crate::error::Result;
use ::image::{DynamicImage, GenericImageView, ImageFormat as Decoder};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};

/// Width of a page generated for an image, in points.
pub const IMAGE_PAGE_WIDTH: f32 = 600.0;

/// Height of a page generated for an image, in points.
pub const IMAGE_PAGE_HEIGHT: f32 = 800.0;

/// Resource name the image is drawn under.
const IMAGE_RESOURCE: &str = "Im0";

/// Encodings the embedder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// Baseline or progressive JPEG.
    Jpeg,
    /// PNG, with or without alpha.
    Png,
}

/// An image XObject added to a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddedImage {
    /// Object id of the image stream.
    pub id: ObjectId,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Rectangle an image is drawn into, in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Left edge.
    pub x: f32,
    /// Bottom edge.
    pub y: f32,
    /// Drawn width.
    pub width: f32,
    /// Drawn height.
    pub height: f32,
}

impl Placement {
    /// Scale an image to fit entirely within the page, preserving its aspect
    /// ratio, and center it on both axes.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdfmerger::codec::Placement;
    ///
    /// let p = Placement::fit_centered(300.0, 300.0, 600.0, 800.0);
    /// assert_eq!((p.x, p.y, p.width, p.height), (0.0, 100.0, 600.0, 600.0));
    /// ```
    pub fn fit_centered(
        image_width: f32,
        image_height: f32,
        page_width: f32,
        page_height: f32,
    ) -> Self {
        let scale = f32::min(page_width / image_width, page_height / image_height);
        let width = image_width * scale;
        let height = image_height * scale;
        Self {
            x: (page_width - width) / 2.0,
            y: (page_height - height) / 2.0,
            width,
            height,
        }
    }
}

/// Embed image bytes into `doc` as an image XObject.
pub fn embed(
    doc: &mut Document,
    bytes: &[u8],
    format: ImageFormat,
) -> std::result::Result<EmbeddedImage, String> {
    let decoder = match format {
        ImageFormat::Jpeg => Decoder::Jpeg,
        ImageFormat::Png => Decoder::Png,
    };
    let decoded = ::image::load_from_memory_with_format(bytes, decoder).map_err(|e| e.to_string())?;
    let (width, height) = decoded.dimensions();
    if width == 0 || height == 0 {
        return Err("image has no pixels".to_string());
    }

    let header = match format {
        ImageFormat::Jpeg => jpeg_header(bytes),
        ImageFormat::Png => None,
    };
    let stream = match header.and_then(|h| Some((h, jpeg_color_space(h.components)?))) {
        Some((header, color_space)) => {
            let mut dict = dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width as i64,
                "Height" => height as i64,
                "ColorSpace" => color_space,
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            };
            // Adobe CMYK JPEGs store inverted samples.
            if header.components == 4 && header.adobe {
                let decode = [1, 0, 1, 0, 1, 0, 1, 0].map(Object::Integer).to_vec();
                dict.set("Decode", decode);
            }
            Stream::new(dict, bytes.to_vec()).with_compression(false)
        }
        None => raw_rgb_stream(doc, &decoded),
    };

    let id = doc.add_object(stream);
    Ok(EmbeddedImage { id, width, height })
}

/// Store decoded pixels as 8-bit RGB, adding a soft mask when needed.
fn raw_rgb_stream(doc: &mut Document, decoded: &DynamicImage) -> Stream {
    let (width, height) = decoded.dimensions();
    let rgba = decoded.to_rgba8();
    let pixels = (width as usize) * (height as usize);
    let mut rgb = Vec::with_capacity(pixels * 3);
    let mut alpha = Vec::with_capacity(pixels);
    let mut has_alpha = false;
    for pixel in rgba.pixels() {
        let [r, g, b, a] = pixel.0;
        has_alpha |= a != u8::MAX;
        rgb.extend_from_slice(&[r, g, b]);
        alpha.push(a);
    }

    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width as i64,
        "Height" => height as i64,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
    };
    if has_alpha {
        let mask_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width as i64,
                "Height" => height as i64,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            alpha,
        ));
        dict.set("SMask", mask_id);
    }
    Stream::new(dict, rgb)
}

/// What the marker segments of a JPEG say about its samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct JpegHeader {
    /// Number of colour components in the frame.
    components: u8,
    /// An Adobe APP14 segment precedes the frame header.
    adobe: bool,
}

/// Walk the marker segments up to the first frame header (SOFn).
///
/// Returns `None` if the data ends or the scan starts before a frame
/// header is found.
fn jpeg_header(bytes: &[u8]) -> Option<JpegHeader> {
    if !bytes.starts_with(&[0xFF, 0xD8]) {
        return None;
    }

    let mut adobe = false;
    let mut pos = 2;
    loop {
        if *bytes.get(pos)? != 0xFF {
            return None;
        }
        pos += 1;
        let mut marker = *bytes.get(pos)?;
        while marker == 0xFF {
            pos += 1;
            marker = *bytes.get(pos)?;
        }
        pos += 1;

        match marker {
            // Standalone markers carry no length.
            0x01 | 0xD0..=0xD7 => continue,
            0xD9 | 0xDA => return None,
            _ => {}
        }

        let len = usize::from(u16::from_be_bytes([*bytes.get(pos)?, *bytes.get(pos + 1)?]));
        if len < 2 {
            return None;
        }
        let segment = bytes.get(pos + 2..pos + len)?;

        match marker {
            // SOF0..SOF15, minus DHT, JPG and DAC.
            0xC0..=0xCF if !matches!(marker, 0xC4 | 0xC8 | 0xCC) => {
                return Some(JpegHeader {
                    components: *segment.get(5)?,
                    adobe,
                });
            }
            0xEE if segment.starts_with(b"Adobe") => adobe = true,
            _ => {}
        }
        pos += len;
    }
}

fn jpeg_color_space(components: u8) -> Option<&'static str> {
    match components {
        1 => Some("DeviceGray"),
        3 => Some("DeviceRGB"),
        4 => Some("DeviceCMYK"),
        _ => None,
    }
}

/// Append an empty page of the given size to the end of the document.
pub fn add_page(doc: &mut Document, width: f32, height: f32, subject: &str) -> Result<ObjectId> {
    let pages_id = pages::root_pages_id(doc, subject)?;
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), Object::Real(width), Object::Real(height)],
        "Resources" => dictionary! {},
    });
    pages::append_kids(doc, pages_id, &[page_id], subject)?;
    Ok(page_id)
}

/// Draw an embedded image onto a page at the given placement.
pub fn draw(
    doc: &mut Document,
    page_id: ObjectId,
    image: &EmbeddedImage,
    placement: Placement,
    subject: &str,
) -> Result<()> {
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Real(placement.width),
                    0.into(),
                    0.into(),
                    Object::Real(placement.height),
                    Object::Real(placement.x),
                    Object::Real(placement.y),
                ],
            ),
            Operation::new("Do", vec![Object::Name(IMAGE_RESOURCE.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        content.encode().codec_context(subject)?,
    ));

    let page = doc.get_dictionary_mut(page_id).codec_context(subject)?;
    page.set("Contents", content_id);
    page.set(
        "Resources",
        dictionary! {
            "XObject" => dictionary! { IMAGE_RESOURCE => image.id },
        },
    );
    Ok(())
}
