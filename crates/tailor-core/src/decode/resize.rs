//! Image resizing for the editing canvas.
//!
//! Uploads larger than the editor's maximum edge are downscaled on load, and
//! background-removal output is stretched back to the session's dimensions.
//! All functions return new `DecodedImage` instances without modifying the input.

use super::{DecodeError, DecodedImage, FilterType};

/// Resize an image to exact dimensions.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if a target dimension is zero, or
/// `DecodeError::CorruptedFile` if the source buffer does not match its size.
pub fn resize(
    image: &DecodedImage,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<DecodedImage, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidFormat);
    }

    // Fast path: if dimensions match, just clone
    if image.width == width && image.height == height {
        return Ok(image.clone());
    }

    let rgba_image = image
        .to_rgba_image()
        .ok_or_else(|| DecodeError::CorruptedFile("Failed to create RgbaImage".to_string()))?;

    let resized = image::imageops::resize(&rgba_image, width, height, filter.to_image_filter());

    Ok(DecodedImage::from_rgba_image(resized))
}

/// Resize an image to fit within a maximum edge length while preserving aspect ratio.
///
/// The image is scaled so that its longest edge equals `max_edge`. If the
/// image already fits it is returned unchanged (never upscaled).
pub fn resize_to_fit(
    image: &DecodedImage,
    max_edge: u32,
    filter: FilterType,
) -> Result<DecodedImage, DecodeError> {
    if max_edge == 0 {
        return Err(DecodeError::InvalidFormat);
    }

    let (src_width, src_height) = (image.width, image.height);

    if src_width <= max_edge && src_height <= max_edge {
        return Ok(image.clone());
    }

    let (new_width, new_height) = calculate_fit_dimensions(src_width, src_height, max_edge);
    log::debug!(
        "downscaling {}x{} to {}x{}",
        src_width,
        src_height,
        new_width,
        new_height
    );

    resize(image, new_width, new_height, filter)
}

/// Calculate dimensions to fit within max_edge while preserving aspect ratio.
pub fn calculate_fit_dimensions(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }

    let ratio = width as f64 / height as f64;

    if width >= height {
        // Landscape or square: constrain by width
        let new_width = max_edge;
        let new_height = (max_edge as f64 / ratio).round() as u32;
        (new_width, new_height.max(1))
    } else {
        // Portrait: constrain by height
        let new_height = max_edge;
        let new_width = (max_edge as f64 * ratio).round() as u32;
        (new_width.max(1), new_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_image(width: u32, height: u32) -> DecodedImage {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(((x * 255) / width.max(1)) as u8);
                pixels.push(((y * 255) / height.max(1)) as u8);
                pixels.push(128);
                pixels.push(255);
            }
        }
        DecodedImage::new(width, height, pixels)
    }

    #[test]
    fn test_resize_basic() {
        let img = create_test_image(100, 50);
        let resized = resize(&img, 50, 25, FilterType::Bilinear).unwrap();

        assert_eq!(resized.dimensions(), (50, 25));
        assert_eq!(resized.pixels.len(), 50 * 25 * 4);
    }

    #[test]
    fn test_resize_keeps_opaque_alpha() {
        let img = create_test_image(40, 40);
        let resized = resize(&img, 13, 17, FilterType::Lanczos3).unwrap();
        assert!(resized.alpha_channel().iter().all(|&a| a == 255));
    }

    #[test]
    fn test_resize_zero_dimensions_error() {
        let img = create_test_image(100, 50);

        assert!(resize(&img, 0, 50, FilterType::Bilinear).is_err());
        assert!(resize(&img, 50, 0, FilterType::Bilinear).is_err());
    }

    #[test]
    fn test_resize_to_fit_landscape() {
        let img = create_test_image(3200, 2000);
        let resized = resize_to_fit(&img, 1600, FilterType::Bilinear).unwrap();

        assert_eq!(resized.dimensions(), (1600, 1000));
    }

    #[test]
    fn test_resize_to_fit_portrait() {
        let img = create_test_image(1000, 2400);
        let resized = resize_to_fit(&img, 1600, FilterType::Nearest).unwrap();

        assert_eq!(resized.height, 1600);
        assert_eq!(resized.width, 667); // 1000 * (1600/2400) ≈ 666.67
    }

    #[test]
    fn test_resize_to_fit_already_smaller() {
        let img = create_test_image(100, 50);
        let resized = resize_to_fit(&img, 1600, FilterType::Bilinear).unwrap();

        assert_eq!(resized.dimensions(), (100, 50));
    }

    #[test]
    fn test_resize_to_fit_zero_max_edge_error() {
        let img = create_test_image(100, 50);
        assert!(resize_to_fit(&img, 0, FilterType::Bilinear).is_err());
    }

    #[test]
    fn test_calculate_fit_dimensions() {
        assert_eq!(calculate_fit_dimensions(6000, 4000, 1600), (1600, 1067));
        assert_eq!(calculate_fit_dimensions(4000, 6000, 1600), (1067, 1600));
        assert_eq!(calculate_fit_dimensions(4000, 4000, 256), (256, 256));
        assert_eq!(calculate_fit_dimensions(0, 0, 256), (0, 0));
        // Extreme panorama never collapses to zero height
        assert_eq!(calculate_fit_dimensions(100_000, 10, 1600), (1600, 1));
    }
}
