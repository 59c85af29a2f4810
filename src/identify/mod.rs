//! Book identification from cover images via a multimodal model.

pub mod image_prep;
pub mod parser;
pub mod prompts;
pub mod types;
pub mod vision;

pub use image_prep::{data_uri_from_bytes, split_data_uri};
pub use parser::{is_refusal, parse_book_response};
pub use types::IdentifiedInfo;
pub use vision::{BookIdentifier, GeminiClient};
