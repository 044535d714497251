pub mod cloudinary_client;

pub use cloudinary_client::{CloudinaryClient, ImagePayload, UploadedImage};
