pub mod item_parser;
pub mod item_serializer;

pub use item_parser::{parse_document, parse_line};
pub use item_serializer::{serialize_document, serialize_item};
