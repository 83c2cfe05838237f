//! Layout reconstruction.
//!
//! Positioned tokens are grouped into visual lines by vertical proximity and
//! ordered top to bottom, page by page.

pub mod clustering;
pub mod token;

pub use clustering::{cluster_tokens_into_lines, Line};
pub use token::{flatten_tokens, LineToken, PositionedToken};
