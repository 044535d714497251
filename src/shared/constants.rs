/// Placeholder stored when a category is created or updated without an image
pub const NO_IMAGE_URL: &str = "no_url";

/// Named image slots a product carries, in display order
pub const PRODUCT_IMAGE_SLOTS: &[&str] = &["image1", "image2", "image3", "image4", "image5"];

/// Maximum accepted image size in bytes (5MB, matching the upload limit
/// advertised in error messages)
pub const MAX_IMAGE_SIZE: usize = 5 * 1024 * 1024;

/// MIME types accepted for image uploads
pub const ALLOWED_IMAGE_MIME_TYPES: &[&str] =
    &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Check if a MIME type is allowed for image uploads
pub fn is_image_mime_type_allowed(mime_type: &str) -> bool {
    ALLOWED_IMAGE_MIME_TYPES.contains(&mime_type)
}
