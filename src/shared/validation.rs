use lazy_static::lazy_static;
use regex::Regex;

use crate::core::error::AppError;
use crate::modules::storage::ImagePayload;
use crate::shared::constants::{
    is_image_mime_type_allowed, ALLOWED_IMAGE_MIME_TYPES, MAX_IMAGE_SIZE,
};

lazy_static! {
    /// Regex for validating product image slot names
    /// - Valid: "image1" through "image5"
    /// - Invalid: "image0", "image6", "image", "img1", "image12"
    pub static ref SLOT_REGEX: Regex = Regex::new(r"^image[1-5]$").unwrap();
}

/// Reject oversized or non-image multipart files before any upload happens
pub fn validate_image_payload(payload: &ImagePayload) -> Result<(), AppError> {
    if payload.data.len() > MAX_IMAGE_SIZE {
        return Err(AppError::BadRequest(
            "File size is too large. Maximum filesize is 5MB.".to_string(),
        ));
    }

    if !is_image_mime_type_allowed(&payload.content_type) {
        return Err(AppError::BadRequest(format!(
            "File type '{}' is not allowed. Allowed types: {}",
            payload.content_type,
            ALLOWED_IMAGE_MIME_TYPES.join(", ")
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(size: usize, content_type: &str) -> ImagePayload {
        ImagePayload {
            data: vec![0u8; size],
            filename: "photo.png".to_string(),
            content_type: content_type.to_string(),
        }
    }

    #[test]
    fn test_validate_image_payload_accepts_small_png() {
        assert!(validate_image_payload(&payload(1024, "image/png")).is_ok());
    }

    #[test]
    fn test_validate_image_payload_rejects_oversized() {
        let err = validate_image_payload(&payload(MAX_IMAGE_SIZE + 1, "image/png")).unwrap_err();
        assert!(err
            .to_string()
            .contains("File size is too large. Maximum filesize is 5MB."));
    }

    #[test]
    fn test_validate_image_payload_rejects_wrong_mime() {
        assert!(validate_image_payload(&payload(1024, "application/pdf")).is_err());
    }

    #[test]
    fn test_slot_regex_valid() {
        assert!(SLOT_REGEX.is_match("image1"));
        assert!(SLOT_REGEX.is_match("image2"));
        assert!(SLOT_REGEX.is_match("image3"));
        assert!(SLOT_REGEX.is_match("image4"));
        assert!(SLOT_REGEX.is_match("image5"));
    }

    #[test]
    fn test_slot_regex_invalid() {
        assert!(!SLOT_REGEX.is_match("image0")); // below range
        assert!(!SLOT_REGEX.is_match("image6")); // above range
        assert!(!SLOT_REGEX.is_match("image")); // no index
        assert!(!SLOT_REGEX.is_match("img1")); // wrong prefix
        assert!(!SLOT_REGEX.is_match("image12")); // trailing digit
        assert!(!SLOT_REGEX.is_match("")); // empty
        assert!(!SLOT_REGEX.is_match("Image1")); // uppercase
    }
}
