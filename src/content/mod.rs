//! Content stream state for positioned text extraction.

pub mod graphics_state;

pub use graphics_state::{GraphicsState, GraphicsStateStack, Matrix};
