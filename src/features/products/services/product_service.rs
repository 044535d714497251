use std::sync::Arc;

use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::products::dtos::{CreateProductDto, ProductPatchDto, ProductResponseDto};
use crate::features::products::models::{upsert_slot, Product, ProductImage, ProductWithRefs};
use crate::modules::storage::{CloudinaryClient, ImagePayload, UploadedImage};

const PRODUCT_WITH_REFS_QUERY: &str = r#"
    SELECT p.id, p.name, p.description, p.quantity, p.min_quantity, p.price,
           p.offer_price, p.wholesale_price, p.wholesale_offer_price,
           p.category_id, p.sub_category_id, p.brand_id, p.variant_type_id,
           p.variant_id, p.images, p.created_at, p.updated_at,
           c.name AS category_name,
           s.name AS sub_category_name,
           b.name AS brand_name,
           vt.name AS variant_type_name,
           v.name AS variant_name
    FROM products p
    LEFT JOIN categories c ON c.id = p.category_id
    LEFT JOIN sub_categories s ON s.id = p.sub_category_id
    LEFT JOIN brands b ON b.id = p.brand_id
    LEFT JOIN variant_types vt ON vt.id = p.variant_type_id
    LEFT JOIN variants v ON v.id = p.variant_id
"#;

/// Service for product operations
pub struct ProductService {
    pool: PgPool,
    storage: Arc<CloudinaryClient>,
}

impl ProductService {
    pub fn new(pool: PgPool, storage: Arc<CloudinaryClient>) -> Self {
        Self { pool, storage }
    }

    /// List all products with referenced records resolved to `{id, name}`
    pub async fn list(&self) -> Result<Vec<ProductResponseDto>> {
        let query = format!("{} ORDER BY p.created_at", PRODUCT_WITH_REFS_QUERY);
        let products = sqlx::query_as::<_, ProductWithRefs>(&query)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list products: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(products.into_iter().map(|p| p.into()).collect())
    }

    /// Get a product by id with referenced records resolved
    pub async fn get(&self, id: Uuid) -> Result<ProductResponseDto> {
        let query = format!("{} WHERE p.id = $1", PRODUCT_WITH_REFS_QUERY);
        let product = sqlx::query_as::<_, ProductWithRefs>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get product {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        product
            .map(|p| p.into())
            .ok_or_else(|| AppError::NotFound("Product not found.".to_string()))
    }

    /// Create a product, uploading all supplied image slots first.
    ///
    /// Slot uploads fan out concurrently; any slot failure aborts the whole
    /// operation before persistence. An insert failure after successful
    /// uploads triggers best-effort orphan cleanup.
    pub async fn create(&self, dto: CreateProductDto) -> Result<()> {
        let uploaded = self.upload_slots(&dto.images).await?;

        let images: Vec<ProductImage> = uploaded
            .iter()
            .map(|(slot, image)| ProductImage {
                image: slot.clone(),
                url: image.url.clone(),
            })
            .collect();

        let result = sqlx::query(
            r#"
            INSERT INTO products (name, description, quantity, min_quantity, price,
                                  offer_price, wholesale_price, wholesale_offer_price,
                                  category_id, sub_category_id, brand_id,
                                  variant_type_id, variant_id, images)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(&dto.name)
        .bind(&dto.description)
        .bind(dto.quantity)
        .bind(dto.min_quantity)
        .bind(dto.price)
        .bind(dto.offer_price)
        .bind(dto.wholesale_price)
        .bind(dto.wholesale_offer_price)
        .bind(dto.category_id)
        .bind(dto.sub_category_id)
        .bind(dto.brand_id)
        .bind(dto.variant_type_id)
        .bind(dto.variant_id)
        .bind(Json(&images))
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            tracing::error!("Failed to create product: {:?}", e);
            self.cleanup_orphans(uploaded);
            return Err(AppError::Database(e));
        }

        tracing::info!("Product created: name={}, images={}", dto.name, images.len());
        Ok(())
    }

    /// Update a product.
    ///
    /// The not-found check runs before uploads and merge. Supplied fields
    /// replace stored values; omitted fields are retained. A re-uploaded
    /// slot overwrites its existing entry, never duplicating the slot.
    pub async fn update(&self, id: Uuid, dto: ProductPatchDto) -> Result<()> {
        let mut product = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found.".to_string()))?;

        let uploaded = self.upload_slots(&dto.images).await?;

        dto.apply(&mut product);
        for (slot, image) in &uploaded {
            upsert_slot(&mut product.images.0, slot, image.url.clone());
        }

        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = $1, description = $2, quantity = $3, min_quantity = $4,
                price = $5, offer_price = $6, wholesale_price = $7,
                wholesale_offer_price = $8, category_id = $9, sub_category_id = $10,
                brand_id = $11, variant_type_id = $12, variant_id = $13,
                images = $14, updated_at = NOW()
            WHERE id = $15
            "#,
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.quantity)
        .bind(product.min_quantity)
        .bind(product.price)
        .bind(product.offer_price)
        .bind(product.wholesale_price)
        .bind(product.wholesale_offer_price)
        .bind(product.category_id)
        .bind(product.sub_category_id)
        .bind(product.brand_id)
        .bind(product.variant_type_id)
        .bind(product.variant_id)
        .bind(Json(&product.images.0))
        .bind(id)
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            tracing::error!("Failed to update product {}: {:?}", id, e);
            self.cleanup_orphans(uploaded);
            return Err(AppError::Database(e));
        }

        tracing::info!("Product updated: id={}", id);
        Ok(())
    }

    /// Delete a product by id
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let deleted = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound("Product not found.".to_string()));
        }

        tracing::info!("Product deleted: id={}", id);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>> {
        sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, quantity, min_quantity, price,
                   offer_price, wholesale_price, wholesale_offer_price,
                   category_id, sub_category_id, brand_id, variant_type_id,
                   variant_id, images, created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get product {}: {:?}", id, e);
            AppError::Database(e)
        })
    }

    /// Fan out all slot uploads and await them jointly; the first failure
    /// aborts the operation
    async fn upload_slots(
        &self,
        files: &[(String, ImagePayload)],
    ) -> Result<Vec<(String, UploadedImage)>> {
        let uploads = files.iter().map(|(slot, payload)| {
            let storage = Arc::clone(&self.storage);
            async move {
                let uploaded = storage.upload(payload).await.map_err(|e| {
                    tracing::error!("Error uploading {}: {}", slot, e);
                    AppError::Upload(format!("Error uploading {}", slot))
                })?;
                Ok::<_, AppError>((slot.clone(), uploaded))
            }
        });

        futures::future::try_join_all(uploads).await
    }

    /// Best-effort destroy of images whose owning write failed
    fn cleanup_orphans(&self, uploaded: Vec<(String, UploadedImage)>) {
        for (_, image) in uploaded {
            let storage = Arc::clone(&self.storage);
            tokio::spawn(async move {
                storage.destroy(&image.public_id).await;
            });
        }
    }
}
