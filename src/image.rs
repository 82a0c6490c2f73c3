//! Embedded images: format sniffing and placement

use crate::error::{Result, SpreadsheetError};
use crate::types::CellReference;

/// Supported image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageType {
    Png,
    Jpeg,
}

impl ImageType {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageType::Png => "png",
            ImageType::Jpeg => "jpeg",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ImageType::Png => "image/png",
            ImageType::Jpeg => "image/jpeg",
        }
    }
}

/// An image stored in the archive, ready to be placed on worksheets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddedImage {
    pub(crate) id: u32,
    /// Token of the spreadsheet that stored the image
    pub(crate) session: u64,
    pub image_type: ImageType,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl EmbeddedImage {
    pub(crate) fn path(&self) -> String {
        format!("xl/media/image{}.{}", self.id, self.image_type.extension())
    }
}

/// Where and how large an image is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageCanvas {
    /// Top-left cell of the image
    pub anchor: CellReference,
    /// Size in pixels; `None` uses the image's own dimensions
    pub size: Option<(u32, u32)>,
}

impl ImageCanvas {
    pub fn original_size(anchor: CellReference) -> Self {
        ImageCanvas { anchor, size: None }
    }

    pub fn dimensions(anchor: CellReference, width: u32, height: u32) -> Self {
        ImageCanvas {
            anchor,
            size: Some((width, height)),
        }
    }

    /// Scale by a factor, keeping the aspect ratio
    pub fn scaled(anchor: CellReference, image: &EmbeddedImage, scale: f64) -> Self {
        let width = (image.width as f64 * scale).round().max(1.0) as u32;
        let height = (image.height as f64 * scale).round().max(1.0) as u32;
        Self::dimensions(anchor, width, height)
    }
}

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Detect the format and read pixel dimensions from the image header
pub(crate) fn read_image_header(bytes: &[u8]) -> Result<(ImageType, u32, u32)> {
    if bytes.starts_with(PNG_SIGNATURE) {
        return read_png_size(bytes).map(|(w, h)| (ImageType::Png, w, h));
    }
    if bytes.starts_with(&[0xFF, 0xD8]) {
        return read_jpeg_size(bytes).map(|(w, h)| (ImageType::Jpeg, w, h));
    }
    Err(SpreadsheetError::UnsupportedImage(
        "only PNG and JPEG images are supported".to_string(),
    ))
}

fn read_u16(bytes: &[u8], at: usize) -> Option<u32> {
    let b = bytes.get(at..at + 2)?;
    Some(u32::from(u16::from_be_bytes([b[0], b[1]])))
}

fn read_u32(bytes: &[u8], at: usize) -> Option<u32> {
    let b = bytes.get(at..at + 4)?;
    Some(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

fn read_png_size(bytes: &[u8]) -> Result<(u32, u32)> {
    // The IHDR chunk follows the signature: length, type, width, height.
    let invalid = || SpreadsheetError::UnsupportedImage("PNG header is truncated".to_string());
    if bytes.get(12..16) != Some(b"IHDR".as_slice()) {
        return Err(invalid());
    }
    let width = read_u32(bytes, 16).ok_or_else(invalid)?;
    let height = read_u32(bytes, 20).ok_or_else(invalid)?;
    if width == 0 || height == 0 {
        return Err(SpreadsheetError::UnsupportedImage(
            "PNG has zero width or height".to_string(),
        ));
    }
    Ok((width, height))
}

fn read_jpeg_size(bytes: &[u8]) -> Result<(u32, u32)> {
    let invalid = || SpreadsheetError::UnsupportedImage("no JPEG frame header found".to_string());
    let mut at = 2;
    while at + 4 <= bytes.len() {
        if bytes[at] != 0xFF {
            return Err(invalid());
        }
        let marker = bytes[at + 1];
        // Fill bytes and standalone markers carry no length
        if marker == 0xFF {
            at += 1;
            continue;
        }
        if matches!(marker, 0x01 | 0xD0..=0xD7) {
            at += 2;
            continue;
        }
        let length = read_u16(bytes, at + 2).ok_or_else(invalid)? as usize;
        let is_frame = matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_frame {
            let height = read_u16(bytes, at + 5).ok_or_else(invalid)?;
            let width = read_u16(bytes, at + 7).ok_or_else(invalid)?;
            if width == 0 || height == 0 {
                return Err(invalid());
            }
            return Ok((width, height));
        }
        if length < 2 {
            return Err(invalid());
        }
        at += 2 + length;
    }
    Err(invalid())
}

/// One image placed on a worksheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PlacedImage {
    pub image: EmbeddedImage,
    pub canvas: ImageCanvas,
}

impl PlacedImage {
    pub(crate) fn size(&self) -> (u32, u32) {
        self.canvas
            .size
            .unwrap_or((self.image.width, self.image.height))
    }
}
