use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::{CategoryFormDto, CategoryResponseDto, UpsertCategoryDto};
use crate::features::categories::services::CategoryService;
use crate::modules::storage::ImagePayload;
use crate::shared::types::ApiResponse;
use crate::shared::validation::validate_image_payload;

/// List all categories
#[utoipa::path(
    get,
    path = "/categories",
    responses(
        (status = 200, description = "List of categories", body = ApiResponse<Vec<CategoryResponseDto>>),
    ),
    tag = "categories"
)]
pub async fn list_categories(
    State(service): State<Arc<CategoryService>>,
) -> Result<Json<ApiResponse<Vec<CategoryResponseDto>>>> {
    let categories = service.list().await?;
    Ok(Json(ApiResponse::success(
        Some(categories),
        Some("Categories retrieved successfully.".to_string()),
    )))
}

/// Get a category by id
#[utoipa::path(
    get,
    path = "/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category id")
    ),
    responses(
        (status = 200, description = "Category found", body = ApiResponse<CategoryResponseDto>),
        (status = 404, description = "Category not found")
    ),
    tag = "categories"
)]
pub async fn get_category(
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CategoryResponseDto>>> {
    let category = service.get(id).await?;
    Ok(Json(ApiResponse::success(
        Some(category),
        Some("Category retrieved successfully.".to_string()),
    )))
}

/// Create a category
///
/// Accepts multipart/form-data with:
/// - `name`: category name (required)
/// - `img`: image file (optional; the image field defaults to "no_url")
#[utoipa::path(
    post,
    path = "/categories",
    request_body(
        content = CategoryFormDto,
        content_type = "multipart/form-data",
        description = "Category form with an optional image file",
    ),
    responses(
        (status = 200, description = "Category created", body = ApiResponse<CategoryResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 500, description = "Upload or storage failure")
    ),
    tag = "categories"
)]
pub async fn create_category(
    State(service): State<Arc<CategoryService>>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<()>>> {
    let dto = collect_category_form(multipart).await?;
    dto.validate()
        .map_err(|_| AppError::Validation("Name is required.".to_string()))?;

    service.create(dto).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Category created successfully.".to_string()),
    )))
}

/// Update a category
///
/// The image is replaced only when a new `img` file is sent; otherwise the
/// `image` text field (or the stored value) is kept.
#[utoipa::path(
    put,
    path = "/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category id")
    ),
    request_body(
        content = CategoryFormDto,
        content_type = "multipart/form-data",
        description = "Category form with an optional replacement image",
    ),
    responses(
        (status = 200, description = "Category updated", body = ApiResponse<CategoryResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Category not found")
    ),
    tag = "categories"
)]
pub async fn update_category(
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<()>>> {
    let dto = collect_category_form(multipart).await?;
    dto.validate()
        .map_err(|_| AppError::Validation("Name is required.".to_string()))?;

    service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Category updated successfully.".to_string()),
    )))
}

/// Delete a category
///
/// Refused while subcategories or products still reference it.
#[utoipa::path(
    delete,
    path = "/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category id")
    ),
    responses(
        (status = 200, description = "Category deleted"),
        (status = 400, description = "Dependent records are referencing the category"),
        (status = 404, description = "Category not found")
    ),
    tag = "categories"
)]
pub async fn delete_category(
    State(service): State<Arc<CategoryService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Category deleted successfully.".to_string()),
    )))
}

/// Read the category multipart form into a DTO
async fn collect_category_form(mut multipart: Multipart) -> Result<UpsertCategoryDto> {
    let mut name = String::new();
    let mut image: Option<String> = None;
    let mut file: Option<ImagePayload> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "name" => {
                name = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read name field: {}", e))
                })?;
            }
            "image" => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read image field: {}", e))
                })?;
                if !text.is_empty() {
                    image = Some(text);
                }
            }
            "img" => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let filename = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unnamed".to_string());
                let data = field.bytes().await.map_err(|e| {
                    debug!("Failed to read file bytes: {}", e);
                    AppError::BadRequest(format!("Failed to read file data: {}", e))
                })?;

                let payload = ImagePayload {
                    data: data.to_vec(),
                    filename,
                    content_type,
                };
                validate_image_payload(&payload)?;
                file = Some(payload);
            }
            _ => {
                // Ignore unknown fields
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    Ok(UpsertCategoryDto { name, image, file })
}
