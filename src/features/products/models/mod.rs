mod product;

pub use product::{upsert_slot, Product, ProductImage, ProductWithRefs};
