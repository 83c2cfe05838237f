//! Text extraction from PDF documents.
//!
//! Turns a document's pages into a flat list of positioned text tokens.

pub mod text;

pub use text::{
    extract_tokens, JsonTextSource, LopdfTextSource, RawTextItem, TextExtractionConfig,
    TextItemSource,
};
