//! Uploaded photo decoding with EXIF orientation handling.
//!
//! Accepts any container the `image` crate is built with (PNG, JPEG, WebP)
//! and always yields straight RGBA so transparent uploads keep their alpha.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageError, ImageReader};

use super::{DecodeError, DecodedImage, Orientation};

/// Decode an uploaded image from bytes, applying EXIF orientation correction.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the format is not recognized,
/// `DecodeError::CorruptedFile` if the data is truncated or damaged, and
/// `DecodeError::EmptyImage` if the image has a zero dimension.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    let orientation = get_orientation(bytes);
    let img = read_dynamic(bytes)?;
    let oriented = apply_orientation(img, orientation);

    let decoded = DecodedImage::from_rgba_image(oriented.into_rgba8());
    if decoded.is_empty() {
        return Err(DecodeError::EmptyImage {
            width: decoded.width,
            height: decoded.height,
        });
    }

    log::debug!(
        "decoded {}x{} image ({:?})",
        decoded.width,
        decoded.height,
        orientation
    );
    Ok(decoded)
}

/// Decode without applying EXIF orientation.
///
/// Background-removal providers return pixels that are already upright, so
/// their output must not be rotated a second time.
pub fn decode_image_no_orientation(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    let img = read_dynamic(bytes)?;
    let decoded = DecodedImage::from_rgba_image(img.into_rgba8());
    if decoded.is_empty() {
        return Err(DecodeError::EmptyImage {
            width: decoded.width,
            height: decoded.height,
        });
    }
    Ok(decoded)
}

fn read_dynamic(bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }

    reader.decode().map_err(|e| match e {
        ImageError::Unsupported(_) => DecodeError::InvalidFormat,
        other => DecodeError::CorruptedFile(other.to_string()),
    })
}

/// Extract the EXIF orientation from image bytes.
///
/// Returns `Orientation::Normal` if no EXIF data is found or orientation
/// cannot be determined.
pub fn get_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);
    let Ok(exif) = Reader::new().read_from_container(&mut cursor) else {
        return Orientation::Normal;
    };

    exif.get_field(Tag::Orientation, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .map(Orientation::from)
        .unwrap_or_default()
}

/// Apply EXIF orientation transformation to an image.
fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}
