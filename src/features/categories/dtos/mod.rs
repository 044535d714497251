mod category_dto;

pub use category_dto::{CategoryFormDto, CategoryResponseDto, UpsertCategoryDto};
