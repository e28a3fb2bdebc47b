//! Image re-encoding for copied picture parts
//!
//! Every copied image is decoded and encoded again so the output never
//! carries a picture the codec cannot read. JPEG stays JPEG, GIF is kept
//! byte-for-byte once it decodes (re-encoding would drop animation
//! frames), and every other raster format becomes PNG.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};

use crate::error::Result;

/// JPEG quality used when re-encoding photos
pub const JPEG_QUALITY: u8 = 90;

/// A freshly encoded picture ready to be stored as a part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// Encoded bytes
    pub blob: Vec<u8>,
    /// Content type of `blob`
    pub content_type: &'static str,
    /// File extension for the part name
    pub extension: &'static str,
}

/// Decode `blob` and encode it again
///
/// Fails when the format is not recognised or the data does not decode;
/// callers fall back to a verbatim copy in that case (EMF, WMF and SVG
/// land here).
pub fn reencode(blob: &[u8]) -> Result<EncodedImage> {
    let format = image::guess_format(blob)?;
    let decoded = image::load_from_memory_with_format(blob, format)?;

    match format {
        ImageFormat::Jpeg => encode_jpeg(&decoded),
        ImageFormat::Gif => Ok(EncodedImage {
            blob: blob.to_vec(),
            content_type: "image/gif",
            extension: "gif",
        }),
        _ => encode_png(&decoded),
    }
}

fn encode_png(image: &DynamicImage) -> Result<EncodedImage> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(EncodedImage {
        blob: bytes,
        content_type: "image/png",
        extension: "png",
    })
}

fn encode_jpeg(image: &DynamicImage) -> Result<EncodedImage> {
    let mut bytes = Vec::new();
    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY))?;
    Ok(EncodedImage {
        blob: bytes,
        content_type: "image/jpeg",
        extension: "jpeg",
    })
}

/// Extension conventionally used for an image content type
pub fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpeg"),
        "image/gif" => Some("gif"),
        "image/bmp" => Some("bmp"),
        "image/tiff" => Some("tiff"),
        "image/x-emf" | "image/emf" => Some("emf"),
        "image/x-wmf" | "image/wmf" => Some("wmf"),
        "image/svg+xml" => Some("svg"),
        _ => None,
    }
}
