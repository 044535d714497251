use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::products::dtos::{
    CreateProductDto, ProductFormDto, ProductPatchDto, ProductResponseDto,
};
use crate::features::products::services::ProductService;
use crate::modules::storage::ImagePayload;
use crate::shared::types::ApiResponse;
use crate::shared::validation::{validate_image_payload, SLOT_REGEX};

/// List all products with referenced records resolved
#[utoipa::path(
    get,
    path = "/products",
    responses(
        (status = 200, description = "List of products", body = ApiResponse<Vec<ProductResponseDto>>),
    ),
    tag = "products"
)]
pub async fn list_products(
    State(service): State<Arc<ProductService>>,
) -> Result<Json<ApiResponse<Vec<ProductResponseDto>>>> {
    let products = service.list().await?;
    Ok(Json(ApiResponse::success(
        Some(products),
        Some("Products retrieved successfully.".to_string()),
    )))
}

/// Get a product by id
#[utoipa::path(
    get,
    path = "/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product id")
    ),
    responses(
        (status = 200, description = "Product found", body = ApiResponse<ProductResponseDto>),
        (status = 404, description = "Product not found")
    ),
    tag = "products"
)]
pub async fn get_product(
    State(service): State<Arc<ProductService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ProductResponseDto>>> {
    let product = service.get(id).await?;
    Ok(Json(ApiResponse::success(
        Some(product),
        Some("Product retrieved successfully.".to_string()),
    )))
}

/// Create a product
///
/// Accepts multipart/form-data with the product fields plus optional image
/// files in slots `image1` through `image5`. Required fields: name,
/// quantity, price, proCategoryId, proSubCategoryId.
#[utoipa::path(
    post,
    path = "/products",
    request_body(
        content = ProductFormDto,
        content_type = "multipart/form-data",
        description = "Product form with up to five image slots",
    ),
    responses(
        (status = 200, description = "Product created", body = ApiResponse<ProductResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 500, description = "Upload or storage failure")
    ),
    tag = "products"
)]
pub async fn create_product(
    State(service): State<Arc<ProductService>>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<()>>> {
    let form = collect_product_form(multipart).await?;
    let dto = build_create_dto(form)?;
    dto.validate()
        .map_err(|_| AppError::Validation("Required fields are missing.".to_string()))?;

    service.create(dto).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Product created successfully.".to_string()),
    )))
}

/// Update a product
///
/// Supplied fields replace stored values; omitted fields are retained.
/// A file sent for an occupied slot replaces that slot's URL.
#[utoipa::path(
    put,
    path = "/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product id")
    ),
    request_body(
        content = ProductFormDto,
        content_type = "multipart/form-data",
        description = "Partial product form; only supplied fields are applied",
    ),
    responses(
        (status = 200, description = "Product updated"),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Product not found")
    ),
    tag = "products"
)]
pub async fn update_product(
    State(service): State<Arc<ProductService>>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<()>>> {
    let form = collect_product_form(multipart).await?;
    let dto = build_patch_dto(form)?;

    service.update(id, dto).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Product updated successfully.".to_string()),
    )))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product id")
    ),
    responses(
        (status = 200, description = "Product deleted"),
        (status = 404, description = "Product not found")
    ),
    tag = "products"
)]
pub async fn delete_product(
    State(service): State<Arc<ProductService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Product deleted successfully.".to_string()),
    )))
}

/// Text fields plus image-slot files collected from a product form
struct ProductForm {
    fields: HashMap<String, String>,
    images: Vec<(String, ImagePayload)>,
}

/// Read the product multipart form. Fields named like an image slot are
/// treated as files; everything else is text.
async fn collect_product_form(mut multipart: Multipart) -> Result<ProductForm> {
    let mut fields: HashMap<String, String> = HashMap::new();
    let mut images: Vec<(String, ImagePayload)> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        if SLOT_REGEX.is_match(&field_name) {
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let filename = field
                .file_name()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unnamed".to_string());
            let data = field.bytes().await.map_err(|e| {
                debug!("Failed to read file bytes for {}: {}", field_name, e);
                AppError::BadRequest(format!("Failed to read file data: {}", e))
            })?;

            let payload = ImagePayload {
                data: data.to_vec(),
                filename,
                content_type,
            };
            validate_image_payload(&payload)?;
            // Last file wins if the same slot is sent twice in one request
            images.retain(|(slot, _)| slot != &field_name);
            images.push((field_name, payload));
        } else if field_name.is_empty() {
            debug!("Ignoring unnamed multipart field");
        } else {
            let text = field.text().await.map_err(|e| {
                AppError::BadRequest(format!("Failed to read field '{}': {}", field_name, e))
            })?;
            fields.insert(field_name, text);
        }
    }

    Ok(ProductForm { fields, images })
}

fn text_field(fields: &HashMap<String, String>, key: &str) -> Option<String> {
    fields.get(key).cloned().filter(|s| !s.is_empty())
}

/// Parse an optional form field; present-but-unparseable is a validation
/// error, absent (or empty) is `None`
fn parse_field<T: FromStr>(fields: &HashMap<String, String>, key: &str) -> Result<Option<T>> {
    match fields.get(key).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => raw.parse::<T>().map(Some).map_err(|_| {
            AppError::Validation(format!("Invalid value for field '{}'.", key))
        }),
    }
}

fn build_create_dto(form: ProductForm) -> Result<CreateProductDto> {
    let ProductForm { fields, images } = form;

    let name = text_field(&fields, "name");
    let quantity = parse_field::<i32>(&fields, "quantity")?;
    let price = parse_field::<Decimal>(&fields, "price")?;
    let category_id = parse_field::<Uuid>(&fields, "proCategoryId")?;
    let sub_category_id = parse_field::<Uuid>(&fields, "proSubCategoryId")?;

    let (Some(name), Some(quantity), Some(price), Some(category_id), Some(sub_category_id)) =
        (name, quantity, price, category_id, sub_category_id)
    else {
        return Err(AppError::Validation(
            "Required fields are missing.".to_string(),
        ));
    };

    Ok(CreateProductDto {
        name,
        description: text_field(&fields, "description"),
        quantity,
        min_quantity: parse_field(&fields, "minQuantity")?,
        price,
        offer_price: parse_field(&fields, "offerPrice")?,
        wholesale_price: parse_field(&fields, "wholesalePrice")?,
        wholesale_offer_price: parse_field(&fields, "wholesaleOfferPrice")?,
        category_id,
        sub_category_id,
        brand_id: parse_field(&fields, "proBrandId")?,
        variant_type_id: parse_field(&fields, "proVariantTypeId")?,
        variant_id: parse_field(&fields, "proVariantId")?,
        images,
    })
}

fn build_patch_dto(form: ProductForm) -> Result<ProductPatchDto> {
    let ProductForm { fields, images } = form;

    Ok(ProductPatchDto {
        name: text_field(&fields, "name"),
        description: text_field(&fields, "description"),
        quantity: parse_field(&fields, "quantity")?,
        min_quantity: parse_field(&fields, "minQuantity")?,
        price: parse_field(&fields, "price")?,
        offer_price: parse_field(&fields, "offerPrice")?,
        wholesale_price: parse_field(&fields, "wholesalePrice")?,
        wholesale_offer_price: parse_field(&fields, "wholesaleOfferPrice")?,
        category_id: parse_field(&fields, "proCategoryId")?,
        sub_category_id: parse_field(&fields, "proSubCategoryId")?,
        brand_id: parse_field(&fields, "proBrandId")?,
        variant_type_id: parse_field(&fields, "proVariantTypeId")?,
        variant_id: parse_field(&fields, "proVariantId")?,
        images,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_field_absent_is_none() {
        let f = fields(&[]);
        assert_eq!(parse_field::<i32>(&f, "quantity").unwrap(), None);
    }

    #[test]
    fn test_parse_field_zero_is_some_zero() {
        let f = fields(&[("quantity", "0")]);
        assert_eq!(parse_field::<i32>(&f, "quantity").unwrap(), Some(0));
    }

    #[test]
    fn test_parse_field_garbage_is_validation_error() {
        let f = fields(&[("quantity", "lots")]);
        assert!(parse_field::<i32>(&f, "quantity").is_err());
    }

    #[test]
    fn test_build_create_dto_rejects_missing_required() {
        let form = ProductForm {
            fields: fields(&[("name", "Runner"), ("quantity", "3")]),
            images: Vec::new(),
        };
        let err = build_create_dto(form).unwrap_err();
        assert!(err.to_string().contains("Required fields are missing."));
    }

    #[test]
    fn test_build_create_dto_accepts_complete_form() {
        let form = ProductForm {
            fields: fields(&[
                ("name", "Runner"),
                ("quantity", "3"),
                ("price", "49.99"),
                ("proCategoryId", "5f0f2a9e-7f0e-4a86-9258-2bd2a533dbb1"),
                ("proSubCategoryId", "b5a4fb48-1c94-43e3-91a1-b2f2a533dbb2"),
            ]),
            images: Vec::new(),
        };
        let dto = build_create_dto(form).unwrap();
        assert_eq!(dto.name, "Runner");
        assert_eq!(dto.quantity, 3);
        assert_eq!(dto.price, Decimal::new(4999, 2));
        assert_eq!(dto.description, None);
    }

    #[test]
    fn test_build_patch_dto_keeps_omitted_fields_unset() {
        let form = ProductForm {
            fields: fields(&[("quantity", "0")]),
            images: Vec::new(),
        };
        let dto = build_patch_dto(form).unwrap();
        assert_eq!(dto.quantity, Some(0));
        assert_eq!(dto.name, None);
        assert_eq!(dto.price, None);
    }
}
