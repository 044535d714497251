use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::get,
    Router,
};

use crate::features::products::handlers;
use crate::features::products::services::ProductService;
use crate::shared::constants::{MAX_IMAGE_SIZE, PRODUCT_IMAGE_SLOTS};

/// Create routes for the products feature
pub fn routes(service: Arc<ProductService>) -> Router {
    // A product form can carry a full set of image slots in one request
    let max_body = MAX_IMAGE_SIZE * PRODUCT_IMAGE_SLOTS.len() + 1024 * 1024;

    Router::new()
        .route(
            "/products",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/products/{id}",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .layer(DefaultBodyLimit::max(max_body))
        .with_state(service)
}
