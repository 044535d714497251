use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::categories::dtos::{CategoryResponseDto, UpsertCategoryDto};
use crate::features::categories::models::Category;
use crate::modules::storage::{CloudinaryClient, ImagePayload, UploadedImage};
use crate::shared::constants::NO_IMAGE_URL;

/// Service for category operations
pub struct CategoryService {
    pool: PgPool,
    storage: Arc<CloudinaryClient>,
}

impl CategoryService {
    pub fn new(pool: PgPool, storage: Arc<CloudinaryClient>) -> Self {
        Self { pool, storage }
    }

    /// List all categories
    pub async fn list(&self) -> Result<Vec<CategoryResponseDto>> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, image, created_at, updated_at
            FROM categories
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list categories: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(categories.into_iter().map(|c| c.into()).collect())
    }

    /// Get a category by id
    pub async fn get(&self, id: Uuid) -> Result<CategoryResponseDto> {
        let category = self.find_by_id(id).await?;

        category
            .map(|c| c.into())
            .ok_or_else(|| AppError::NotFound("Category not found.".to_string()))
    }

    /// Create a category, uploading its image first when one was supplied.
    ///
    /// An upload failure aborts before any write; an insert failure after a
    /// successful upload triggers best-effort orphan cleanup.
    pub async fn create(&self, dto: UpsertCategoryDto) -> Result<()> {
        let uploaded = match &dto.file {
            Some(payload) => Some(self.upload_image(payload).await?),
            None => None,
        };

        let image = uploaded
            .as_ref()
            .map(|u| u.url.clone())
            .unwrap_or_else(|| NO_IMAGE_URL.to_string());

        let result = sqlx::query(
            r#"
            INSERT INTO categories (name, image)
            VALUES ($1, $2)
            "#,
        )
        .bind(&dto.name)
        .bind(&image)
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            tracing::error!("Failed to create category: {:?}", e);
            self.cleanup_orphan(uploaded);
            return Err(AppError::Database(e));
        }

        tracing::info!("Category created: name={}, image={}", dto.name, image);
        Ok(())
    }

    /// Update a category.
    ///
    /// The not-found check runs before any upload or merge. The image is
    /// overwritten only when a new file was supplied; otherwise the
    /// client-supplied URL wins, and failing that the stored value stays.
    pub async fn update(&self, id: Uuid, dto: UpsertCategoryDto) -> Result<()> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Category not found.".to_string()))?;

        let uploaded = match &dto.file {
            Some(payload) => Some(self.upload_image(payload).await?),
            None => None,
        };

        let image = resolve_image_url(
            uploaded.as_ref().map(|u| u.url.as_str()),
            dto.image.as_deref(),
            &existing.image,
        );

        let result = sqlx::query(
            r#"
            UPDATE categories
            SET name = $1, image = $2, updated_at = NOW()
            WHERE id = $3
            "#,
        )
        .bind(&dto.name)
        .bind(&image)
        .bind(id)
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            tracing::error!("Failed to update category {}: {:?}", id, e);
            self.cleanup_orphan(uploaded);
            return Err(AppError::Database(e));
        }

        tracing::info!("Category updated: id={}, image={}", id, image);
        Ok(())
    }

    /// Delete a category unless dependent records still reference it.
    ///
    /// Subcategories are checked before products; either blocks the delete.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let subcategory_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sub_categories WHERE category_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        if subcategory_count > 0 {
            return Err(AppError::Conflict(
                "Cannot delete category. Subcategories are referencing it.".to_string(),
            ));
        }

        let product_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE category_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        if product_count > 0 {
            return Err(AppError::Conflict(
                "Cannot delete category. Products are referencing it.".to_string(),
            ));
        }

        let deleted = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(AppError::NotFound("Category not found.".to_string()));
        }

        tracing::info!("Category deleted: id={}", id);
        Ok(())
    }

    /// Upload a category image; the detailed cause is logged and the client
    /// sees a generic upload failure
    async fn upload_image(&self, payload: &ImagePayload) -> Result<UploadedImage> {
        self.storage.upload(payload).await.map_err(|e| {
            tracing::error!("Error uploading category image: {}", e);
            AppError::Upload("File upload failed.".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, image, created_at, updated_at
            FROM categories
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get category {}: {:?}", id, e);
            AppError::Database(e)
        })
    }

    /// Best-effort destroy of an image whose owning write failed
    fn cleanup_orphan(&self, uploaded: Option<UploadedImage>) {
        if let Some(image) = uploaded {
            let storage = Arc::clone(&self.storage);
            tokio::spawn(async move {
                storage.destroy(&image.public_id).await;
            });
        }
    }
}

/// Pick the image URL to persist: a freshly uploaded URL wins, then the
/// client-supplied value, then whatever is already stored.
fn resolve_image_url(
    uploaded: Option<&str>,
    supplied: Option<&str>,
    existing: &str,
) -> String {
    uploaded
        .or(supplied)
        .filter(|s| !s.is_empty())
        .unwrap_or(existing)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_image_url_prefers_upload() {
        let url = resolve_image_url(
            Some("https://res.example/new.png"),
            Some("https://res.example/supplied.png"),
            "https://res.example/old.png",
        );
        assert_eq!(url, "https://res.example/new.png");
    }

    #[test]
    fn test_resolve_image_url_falls_back_to_supplied() {
        let url = resolve_image_url(
            None,
            Some("https://res.example/supplied.png"),
            "https://res.example/old.png",
        );
        assert_eq!(url, "https://res.example/supplied.png");
    }

    #[test]
    fn test_resolve_image_url_retains_existing() {
        let url = resolve_image_url(None, None, "https://res.example/old.png");
        assert_eq!(url, "https://res.example/old.png");
    }

    #[test]
    fn test_resolve_image_url_ignores_empty_supplied() {
        let url = resolve_image_url(None, Some(""), NO_IMAGE_URL);
        assert_eq!(url, NO_IMAGE_URL);
    }
}
