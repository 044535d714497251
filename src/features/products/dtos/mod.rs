mod product_dto;

pub use product_dto::{
    CreateProductDto, ProductFormDto, ProductImageDto, ProductPatchDto, ProductRefDto,
    ProductResponseDto,
};
