use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::categories::models::Category;
use crate::modules::storage::ImagePayload;

/// Response DTO for category operations
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponseDto {
    pub id: Uuid,
    pub name: String,
    /// Image URL, or "no_url" when no image was uploaded
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponseDto {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            image: category.image,
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}

/// Category multipart form for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handlers use axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct CategoryFormDto {
    /// Category name (required)
    #[schema(example = "Shoes")]
    pub name: String,
    /// Image file to upload
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub img: Option<String>,
    /// Existing image URL to retain (update only, ignored when a file is sent)
    pub image: Option<String>,
}

/// Fields collected from the category multipart form
#[derive(Debug, Validate)]
pub struct UpsertCategoryDto {
    #[validate(length(min = 1, message = "Name is required."))]
    pub name: String,
    /// Client-supplied image URL, used on update when no new file arrives
    pub image: Option<String>,
    /// New image file, if one was part of the request
    pub file: Option<ImagePayload>,
}
