use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// One named image slot on a product.
///
/// The persisted `images` set holds at most one entry per slot name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    /// Slot name, "image1" through "image5"
    pub image: String,
    pub url: String,
}

/// Database model for product
#[derive(Debug, Clone, FromRow)]
pub struct Product {
    pub id: Uuid,
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
    pub images: Json<Vec<ProductImage>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product row joined with the names of its referenced records
#[derive(Debug, Clone, FromRow)]
pub struct ProductWithRefs {
    #[sqlx(flatten)]
    pub product: Product,
    pub category_name: Option<String>,
    pub sub_category_name: Option<String>,
    pub brand_name: Option<String>,
    pub variant_type_name: Option<String>,
    pub variant_name: Option<String>,
}

/// Set a slot's URL, overwriting the existing entry for that slot in place
/// or appending when absent. Never produces a duplicate slot.
pub fn upsert_slot(images: &mut Vec<ProductImage>, slot: &str, url: String) {
    if let Some(entry) = images.iter_mut().find(|i| i.image == slot) {
        entry.url = url;
    } else {
        images.push(ProductImage {
            image: slot.to_string(),
            url,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_slot_appends_when_absent() {
        let mut images = vec![ProductImage {
            image: "image1".to_string(),
            url: "https://res.example/a.png".to_string(),
        }];
        upsert_slot(&mut images, "image3", "https://res.example/c.png".to_string());
        assert_eq!(images.len(), 2);
        assert_eq!(images[1].image, "image3");
        assert_eq!(images[1].url, "https://res.example/c.png");
    }

    #[test]
    fn test_upsert_slot_replaces_in_place() {
        let mut images = vec![
            ProductImage {
                image: "image1".to_string(),
                url: "https://res.example/a.png".to_string(),
            },
            ProductImage {
                image: "image3".to_string(),
                url: "https://res.example/old.png".to_string(),
            },
        ];
        upsert_slot(&mut images, "image3", "https://res.example/new.png".to_string());
        assert_eq!(images.len(), 2);
        assert_eq!(images[1].url, "https://res.example/new.png");
        // position is preserved, not re-appended
        assert_eq!(images[1].image, "image3");
    }

    #[test]
    fn test_upsert_slot_twice_keeps_latest() {
        let mut images = Vec::new();
        upsert_slot(&mut images, "image3", "https://res.example/v1.png".to_string());
        upsert_slot(&mut images, "image3", "https://res.example/v2.png".to_string());
        let entries: Vec<_> = images.iter().filter(|i| i.image == "image3").collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].url, "https://res.example/v2.png");
    }
}
