mod service;

pub use service::{store_image, validate_image, ImageUpload, MAX_IMAGE_BYTES};
