pub mod product_handler;

pub use product_handler::{
    create_product, delete_product, get_product, list_products, update_product,
};
