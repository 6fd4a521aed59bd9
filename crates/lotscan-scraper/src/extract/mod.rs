//! Regex-driven extraction of listing text and the primary photo from
//! rendered HTML.

mod image;
mod text;

pub use image::extract_image_url;
pub use text::extract_text;
