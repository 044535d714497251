use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::get,
    Router,
};

use crate::features::categories::handlers;
use crate::features::categories::services::CategoryService;
use crate::shared::constants::MAX_IMAGE_SIZE;

/// Create routes for the categories feature
pub fn routes(service: Arc<CategoryService>) -> Router {
    Router::new()
        .route(
            "/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/categories/{id}",
            get(handlers::get_category)
                .put(handlers::update_category)
                .delete(handlers::delete_category),
        )
        // Allow body size up to MAX_IMAGE_SIZE + buffer for multipart overhead
        .layer(DefaultBodyLimit::max(MAX_IMAGE_SIZE + 1024 * 1024))
        .with_state(service)
}
