//! # image-handlers
//!
//! [`ImageGenerationHandler`] answers the image keyword with a generated image.

pub mod download;
pub mod image_generation_handler;

pub use download::{attachment_file_name, HttpImageDownloader, ImageDownloader};
pub use image_generation_handler::{ImageGenerationHandler, ImageHandlerConfig};
