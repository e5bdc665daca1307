//! Image inspection utilities for testing.

use image::{GenericImageView, ImageFormat, RgbaImage};

/// Decode an encoded image into RGBA pixels
pub fn load_image_from_bytes(bytes: &[u8]) -> RgbaImage {
    image::load_from_memory(bytes)
        .expect("image should decode")
        .to_rgba8()
}

/// Detect image format from bytes
pub fn detect_image_format(bytes: &[u8]) -> Option<ImageFormat> {
    image::guess_format(bytes).ok()
}

/// Check if an image has the expected dimensions
pub fn assert_image_dimensions(image: &RgbaImage, expected_width: u32, expected_height: u32) {
    let (actual_width, actual_height) = image.dimensions();
    assert_eq!(
        (actual_width, actual_height),
        (expected_width, expected_height),
        "Image dimensions differ"
    );
}

/// Check if encoded bytes have the expected format
pub fn assert_image_format(bytes: &[u8], expected_format: ImageFormat) {
    let actual_format = detect_image_format(bytes).expect("Could not detect image format");
    assert_eq!(actual_format, expected_format, "Image format differs");
}

/// Number of pixels that are not exactly `background`
pub fn count_non_background(image: &RgbaImage, background: [u8; 4]) -> usize {
    image.pixels().filter(|p| p.0 != background).count()
}

/// Whether two images differ anywhere
pub fn images_differ(a: &RgbaImage, b: &RgbaImage) -> bool {
    a.dimensions() != b.dimensions() || a.pixels().zip(b.pixels()).any(|(p, q)| p != q)
}
