use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::products::models::{Product, ProductImage, ProductWithRefs};
use crate::modules::storage::ImagePayload;

/// A referenced record resolved to its id and name
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductRefDto {
    pub id: Uuid,
    pub name: String,
}

impl ProductRefDto {
    fn resolve(id: Option<Uuid>, name: Option<String>) -> Option<Self> {
        match (id, name) {
            (Some(id), Some(name)) => Some(Self { id, name }),
            _ => None,
        }
    }
}

/// One image slot entry in a product response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductImageDto {
    /// Slot name, "image1" through "image5"
    pub image: String,
    pub url: String,
}

impl From<ProductImage> for ProductImageDto {
    fn from(image: ProductImage) -> Self {
        Self {
            image: image.image,
            url: image.url,
        }
    }
}

/// Response DTO for product operations, with referenced records resolved
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponseDto {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub quantity: i32,
    pub min_quantity: Option<i32>,
    pub price: Decimal,
    pub offer_price: Option<Decimal>,
    pub wholesale_price: Option<Decimal>,
    pub wholesale_offer_price: Option<Decimal>,
    pub pro_category_id: Option<ProductRefDto>,
    pub pro_sub_category_id: Option<ProductRefDto>,
    pub pro_brand_id: Option<ProductRefDto>,
    pub pro_variant_type_id: Option<ProductRefDto>,
    pub pro_variant_id: Option<ProductRefDto>,
    pub images: Vec<ProductImageDto>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductWithRefs> for ProductResponseDto {
    fn from(row: ProductWithRefs) -> Self {
        let ProductWithRefs {
            product,
            category_name,
            sub_category_name,
            brand_name,
            variant_type_name,
            variant_name,
        } = row;

        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            quantity: product.quantity,
            min_quantity: product.min_quantity,
            price: product.price,
            offer_price: product.offer_price,
            wholesale_price: product.wholesale_price,
            wholesale_offer_price: product.wholesale_offer_price,
            pro_category_id: ProductRefDto::resolve(Some(product.category_id), category_name),
            pro_sub_category_id: ProductRefDto::resolve(
                Some(product.sub_category_id),
                sub_category_name,
            ),
            pro_brand_id: ProductRefDto::resolve(product.brand_id, brand_name),
            pro_variant_type_id: ProductRefDto::resolve(product.variant_type_id, variant_type_name),
            pro_variant_id: ProductRefDto::resolve(product.variant_id, variant_name),
            images: product.images.0.into_iter().map(|i| i.into()).collect(),
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

/// Product multipart form for OpenAPI documentation
/// Note: This struct is for Swagger UI documentation only.
/// The actual handlers use axum's Multipart extractor directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct ProductFormDto {
    pub name: String,
    pub description: Option<String>,
    #[schema(example = 10)]
    pub quantity: i32,
    pub min_quantity: Option<i32>,
    #[schema(example = "19.99")]
    pub price: String,
    pub offer_price: Option<String>,
    pub wholesale_price: Option<String>,
    pub wholesale_offer_price: Option<String>,
    pub pro_category_id: String,
    pub pro_sub_category_id: String,
    pub pro_brand_id: Option<String>,
    pub pro_variant_type_id: Option<String>,
    pub pro_variant_id: Option<String>,
    /// Image files for slots image1..image5
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub image1: Option<String>,
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub image2: Option<String>,
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub image3: Option<String>,
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub image4: Option<String>,
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub image5: Option<String>,
}

/// Fields collected from the product create form. Required fields are
/// typed as such; their absence is rejected before this DTO exists.
#[derive(Debug, Validate)]
pub struct CreateProductDto {
    #[validate(length(min = 1, message = "Required fields are missing."))]
    pub name: String,
    pub description: Option<String>,
    pub quantity: i32,
    pub min_quantity: Option<i32>,
    pub price: Decimal,
    pub offer_price: Option<Decimal>,
    pub wholesale_price: Option<Decimal>,
    pub wholesale_offer_price: Option<Decimal>,
    pub category_id: Uuid,
    pub sub_category_id: Uuid,
    pub brand_id: Option<Uuid>,
    pub variant_type_id: Option<Uuid>,
    pub variant_id: Option<Uuid>,
    /// Image files keyed by slot name
    pub images: Vec<(String, ImagePayload)>,
}

/// Presence-based patch for product updates.
///
/// A field that was part of the multipart form is `Some` and gets applied,
/// even when the supplied value is zero; an absent field stays `None` and
/// the stored value is retained.
#[derive(Debug, Default)]
pub struct ProductPatchDto {
    pub name: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<i32>,
    pub min_quantity: Option<i32>,
    pub price: Option<Decimal>,
    pub offer_price: Option<Decimal>,
    pub wholesale_price: Option<Decimal>,
    pub wholesale_offer_price: Option<Decimal>,
    pub category_id: Option<Uuid>,
    pub sub_category_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    pub variant_type_id: Option<Uuid>,
    pub variant_id: Option<Uuid>,
    /// Image files keyed by slot name
    pub images: Vec<(String, ImagePayload)>,
}

impl ProductPatchDto {
    /// Apply the supplied fields onto an existing product, leaving omitted
    /// fields untouched. Image slots are merged separately after upload.
    pub fn apply(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(description) = &self.description {
            product.description = Some(description.clone());
        }
        if let Some(quantity) = self.quantity {
            product.quantity = quantity;
        }
        if let Some(min_quantity) = self.min_quantity {
            product.min_quantity = Some(min_quantity);
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(offer_price) = self.offer_price {
            product.offer_price = Some(offer_price);
        }
        if let Some(wholesale_price) = self.wholesale_price {
            product.wholesale_price = Some(wholesale_price);
        }
        if let Some(wholesale_offer_price) = self.wholesale_offer_price {
            product.wholesale_offer_price = Some(wholesale_offer_price);
        }
        if let Some(category_id) = self.category_id {
            product.category_id = category_id;
        }
        if let Some(sub_category_id) = self.sub_category_id {
            product.sub_category_id = sub_category_id;
        }
        if let Some(brand_id) = self.brand_id {
            product.brand_id = Some(brand_id);
        }
        if let Some(variant_type_id) = self.variant_type_id {
            product.variant_type_id = Some(variant_type_id);
        }
        if let Some(variant_id) = self.variant_id {
            product.variant_id = Some(variant_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sqlx::types::Json;

    fn sample_product() -> Product {
        Product {
            id: Uuid::new_v4(),
            name: "Runner".to_string(),
            description: Some("Trail shoe".to_string()),
            quantity: 7,
            min_quantity: Some(2),
            price: Decimal::new(4999, 2),
            offer_price: None,
            wholesale_price: None,
            wholesale_offer_price: None,
            category_id: Uuid::new_v4(),
            sub_category_id: Uuid::new_v4(),
            brand_id: None,
            variant_type_id: None,
            variant_id: None,
            images: Json(Vec::new()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_patch_applies_only_supplied_fields() {
        let mut product = sample_product();
        let original_price = product.price;
        let patch = ProductPatchDto {
            name: Some("Road Runner".to_string()),
            ..Default::default()
        };

        patch.apply(&mut product);

        assert_eq!(product.name, "Road Runner");
        assert_eq!(product.quantity, 7);
        assert_eq!(product.price, original_price);
        assert_eq!(product.description.as_deref(), Some("Trail shoe"));
    }

    #[test]
    fn test_patch_zero_is_a_value_not_an_omission() {
        let mut product = sample_product();
        let patch = ProductPatchDto {
            quantity: Some(0),
            price: Some(Decimal::ZERO),
            ..Default::default()
        };

        patch.apply(&mut product);

        assert_eq!(product.quantity, 0);
        assert_eq!(product.price, Decimal::ZERO);
    }

    #[test]
    fn test_empty_patch_changes_nothing() {
        let mut product = sample_product();
        let before = product.clone();
        ProductPatchDto::default().apply(&mut product);

        assert_eq!(product.name, before.name);
        assert_eq!(product.quantity, before.quantity);
        assert_eq!(product.price, before.price);
        assert_eq!(product.category_id, before.category_id);
    }

    #[test]
    fn test_response_dto_wire_shape_is_camel_case() {
        let row = ProductWithRefs {
            product: sample_product(),
            category_name: Some("Shoes".to_string()),
            sub_category_name: Some("Running".to_string()),
            brand_name: None,
            variant_type_name: None,
            variant_name: None,
        };
        let dto: ProductResponseDto = row.into();
        let value = serde_json::to_value(&dto).unwrap();

        assert_eq!(value["proCategoryId"]["name"], "Shoes");
        assert_eq!(value["proSubCategoryId"]["name"], "Running");
        assert!(value["proBrandId"].is_null());
        assert!(value.get("minQuantity").is_some());
        assert!(value.get("wholesaleOfferPrice").is_some());
    }

    #[test]
    fn test_image_wire_shape() {
        let dto: ProductImageDto = ProductImage {
            image: "image3".to_string(),
            url: "https://res.example/c.png".to_string(),
        }
        .into();
        let value = serde_json::to_value(&dto).unwrap();
        assert_eq!(value["image"], "image3");
        assert_eq!(value["url"], "https://res.example/c.png");
    }
}
