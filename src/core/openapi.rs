use utoipa::{Modify, OpenApi};

use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::products::{dtos as products_dtos, handlers as products_handlers};
use crate::shared::types::ApiResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Categories
        categories_handlers::category_handler::list_categories,
        categories_handlers::category_handler::get_category,
        categories_handlers::category_handler::create_category,
        categories_handlers::category_handler::update_category,
        categories_handlers::category_handler::delete_category,
        // Products
        products_handlers::product_handler::list_products,
        products_handlers::product_handler::get_product,
        products_handlers::product_handler::create_product,
        products_handlers::product_handler::update_product,
        products_handlers::product_handler::delete_product,
    ),
    components(
        schemas(
            // Categories
            categories_dtos::CategoryResponseDto,
            categories_dtos::CategoryFormDto,
            ApiResponse<Vec<categories_dtos::CategoryResponseDto>>,
            ApiResponse<categories_dtos::CategoryResponseDto>,
            // Products
            products_dtos::ProductResponseDto,
            products_dtos::ProductRefDto,
            products_dtos::ProductImageDto,
            products_dtos::ProductFormDto,
            ApiResponse<Vec<products_dtos::ProductResponseDto>>,
            ApiResponse<products_dtos::ProductResponseDto>,
        )
    ),
    tags(
        (name = "categories", description = "Category catalog management"),
        (name = "products", description = "Product catalog management"),
    ),
    info(
        title = "Catalog API",
        version = "0.1.0",
        description = "API documentation for the catalog backend",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
