//! Positioned text tokens.

use serde::{Deserialize, Serialize};

use crate::geometry::HorizontalSpan;

/// One text fragment with its position, as emitted by text extraction.
///
/// Coordinates are PDF user space (y grows upward). Pages are 1-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedToken {
    /// The text content
    pub text: String,
    /// Left edge
    pub x: f32,
    /// Baseline position
    pub y: f32,
    /// Advance width
    pub width: f32,
    /// Glyph height
    pub height: f32,
    /// Page number (1-indexed)
    pub page: u32,
}

impl PositionedToken {
    /// Create a token.
    pub fn new(text: impl Into<String>, x: f32, y: f32, width: f32, height: f32, page: u32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            width,
            height,
            page,
        }
    }
}

/// A single-word fragment of a line, position only along x.
#[derive(Debug, Clone, PartialEq)]
pub struct LineToken {
    /// Text without surrounding whitespace
    pub text: String,
    /// Left edge
    pub x: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl LineToken {
    /// Horizontal extent of the token.
    pub fn span(&self) -> HorizontalSpan {
        HorizontalSpan::from_x_width(self.x, self.width)
    }

    /// Horizontal center of the token.
    pub fn center(&self) -> f32 {
        self.span().center()
    }
}

/// Flatten tokens into single-word fragments.
///
/// Extraction sometimes merges several table cells into one fragment
/// (`"12 . 3"`). Such tokens are split on whitespace and each part gets an x
/// position and width interpolated from its character offset and length.
/// Blank tokens disappear.
///
/// # Examples
///
/// ```
/// use volley_report::layout::{flatten_tokens, PositionedToken};
///
/// let merged = PositionedToken::new("12 34", 100.0, 500.0, 50.0, 8.0, 1);
/// let parts = flatten_tokens(&[merged]);
/// assert_eq!(parts.len(), 2);
/// assert_eq!(parts[0].text, "12");
/// assert_eq!(parts[1].x, 130.0);
/// assert_eq!(parts[1].width, 20.0);
/// ```
pub fn flatten_tokens(tokens: &[PositionedToken]) -> Vec<LineToken> {
    let mut out = Vec::with_capacity(tokens.len());

    for token in tokens {
        if !token.text.chars().any(char::is_whitespace) {
            if !token.text.is_empty() {
                out.push(LineToken {
                    text: token.text.clone(),
                    x: token.x,
                    width: token.width,
                    height: token.height,
                });
            }
            continue;
        }

        let total = token.text.chars().count() as f32;
        let mut word = String::new();
        let mut word_start = 0usize;

        for (idx, ch) in token.text.chars().chain(std::iter::once(' ')).enumerate() {
            if ch.is_whitespace() {
                if !word.is_empty() {
                    let len = word.chars().count() as f32;
                    out.push(LineToken {
                        text: std::mem::take(&mut word),
                        x: token.x + token.width * word_start as f32 / total,
                        width: token.width * len / total,
                        height: token.height,
                    });
                }
            } else {
                if word.is_empty() {
                    word_start = idx;
                }
                word.push(ch);
            }
        }
    }

    out
}
