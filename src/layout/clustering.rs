//! Line reconstruction by vertical proximity.
//!
//! Tokens are grouped into y-buckets with a greedy first-fit pass: each token
//! joins the first existing bucket on its page whose mean y lies within the
//! tolerance, otherwise it opens a new bucket. This is a heuristic, not an
//! optimal bucketing, and relies on extraction emitting tokens roughly in
//! page order.

use crate::layout::token::PositionedToken;
use crate::utils::safe_float_cmp;

/// One reconstructed visual row of tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// Mean baseline of the member tokens
    pub y: f32,
    /// Page number (1-indexed)
    pub page: u32,
    /// Member tokens, left to right
    pub tokens: Vec<PositionedToken>,
}

impl Line {
    /// Token texts joined with single spaces.
    ///
    /// # Examples
    ///
    /// ```
    /// use volley_report::layout::{Line, PositionedToken};
    ///
    /// let line = Line {
    ///     y: 700.0,
    ///     page: 1,
    ///     tokens: vec![
    ///         PositionedToken::new("Players", 10.0, 700.0, 30.0, 8.0, 1),
    ///         PositionedToken::new("Total", 45.0, 700.0, 20.0, 8.0, 1),
    ///     ],
    /// };
    /// assert_eq!(line.text(), "Players Total");
    /// ```
    pub fn text(&self) -> String {
        self.tokens
            .iter()
            .map(|t| t.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Bucket under construction: running y sum keeps the mean cheap to update.
struct Bucket {
    page: u32,
    y_sum: f32,
    tokens: Vec<PositionedToken>,
}

impl Bucket {
    fn mean_y(&self) -> f32 {
        self.y_sum / self.tokens.len() as f32
    }
}

/// Cluster tokens into lines.
///
/// Within a line, tokens are sorted by ascending x. Lines are ordered by page
/// ascending, then y descending (PDF y grows upward, so this is top to
/// bottom). Both sorts are stable; ties keep extraction order.
///
/// # Arguments
///
/// * `tokens` - Tokens in extraction order
/// * `tolerance` - Maximum distance between a token's y and a line's mean y
///
/// # Examples
///
/// ```
/// use volley_report::layout::{cluster_tokens_into_lines, PositionedToken};
///
/// let tokens = vec![
///     PositionedToken::new("b", 50.0, 101.0, 5.0, 8.0, 1),
///     PositionedToken::new("a", 10.0, 100.0, 5.0, 8.0, 1),
///     PositionedToken::new("c", 10.0, 200.0, 5.0, 8.0, 1),
/// ];
/// let lines = cluster_tokens_into_lines(&tokens, 2.5);
/// assert_eq!(lines.len(), 2);
/// assert_eq!(lines[0].text(), "c");
/// assert_eq!(lines[1].text(), "a b");
/// ```
pub fn cluster_tokens_into_lines(tokens: &[PositionedToken], tolerance: f32) -> Vec<Line> {
    let mut buckets: Vec<Bucket> = Vec::new();

    for token in tokens {
        let existing = buckets
            .iter_mut()
            .find(|b| b.page == token.page && (b.mean_y() - token.y).abs() <= tolerance);

        match existing {
            Some(bucket) => {
                bucket.y_sum += token.y;
                bucket.tokens.push(token.clone());
            },
            None => buckets.push(Bucket {
                page: token.page,
                y_sum: token.y,
                tokens: vec![token.clone()],
            }),
        }
    }

    let mut lines: Vec<Line> = buckets
        .into_iter()
        .map(|bucket| {
            let y = bucket.mean_y();
            let mut tokens = bucket.tokens;
            tokens.sort_by(|a, b| safe_float_cmp(a.x, b.x));
            Line {
                y,
                page: bucket.page,
                tokens,
            }
        })
        .collect();

    lines.sort_by(|a, b| {
        a.page
            .cmp(&b.page)
            .then_with(|| safe_float_cmp(b.y, a.y))
    });

    log::debug!("Clustered {} tokens into {} lines", tokens.len(), lines.len());
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(text: &str, x: f32, y: f32, page: u32) -> PositionedToken {
        PositionedToken::new(text, x, y, 10.0, 8.0, page)
    }

    #[test]
    fn test_empty_input() {
        assert!(cluster_tokens_into_lines(&[], 2.5).is_empty());
    }

    #[test]
    fn test_tokens_within_tolerance_share_a_line() {
        let tokens = vec![token("a", 10.0, 100.0, 1), token("b", 50.0, 102.0, 1)];
        let lines = cluster_tokens_into_lines(&tokens, 2.5);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].y, 101.0);
    }

    #[test]
    fn test_tokens_beyond_tolerance_split() {
        let tokens = vec![token("a", 10.0, 100.0, 1), token("b", 50.0, 103.0, 1)];
        let lines = cluster_tokens_into_lines(&tokens, 2.5);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text(), "b");
    }

    #[test]
    fn test_pages_never_merge() {
        let tokens = vec![token("p2", 10.0, 700.0, 2), token("p1", 10.0, 100.0, 1)];
        let lines = cluster_tokens_into_lines(&tokens, 2.5);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].page, 1);
        assert_eq!(lines[1].page, 2);
    }

    #[test]
    fn test_first_fit_not_nearest_fit() {
        // The third token is within tolerance of both buckets; it joins the first one
        let tokens = vec![
            token("a", 10.0, 100.0, 1),
            token("b", 10.0, 104.0, 1),
            token("c", 20.0, 102.0, 1),
        ];
        let lines = cluster_tokens_into_lines(&tokens, 2.5);
        assert_eq!(lines.len(), 2);
        let low = lines.iter().find(|l| l.text().starts_with('a')).unwrap();
        assert_eq!(low.text(), "a c");
    }

    #[test]
    fn test_equal_x_keeps_extraction_order() {
        let tokens = vec![token("first", 10.0, 100.0, 1), token("second", 10.0, 100.0, 1)];
        let lines = cluster_tokens_into_lines(&tokens, 2.5);
        assert_eq!(lines[0].text(), "first second");
    }
}
