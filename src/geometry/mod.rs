//! Geometric primitives for layout analysis.
//!
//! Report pages are handled in PDF user space: x grows to the right and y grows
//! upward, so "higher" lines have larger y values.

/// A horizontal extent `[start, end]` on a text line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizontalSpan {
    /// Left edge
    pub start: f32,
    /// Right edge
    pub end: f32,
}

impl HorizontalSpan {
    /// Create a span from its left edge and width.
    ///
    /// # Examples
    ///
    /// ```
    /// use volley_report::geometry::HorizontalSpan;
    ///
    /// let span = HorizontalSpan::from_x_width(10.0, 20.0);
    /// assert_eq!(span.end, 30.0);
    /// assert_eq!(span.center(), 20.0);
    /// ```
    pub fn from_x_width(x: f32, width: f32) -> Self {
        Self {
            start: x,
            end: x + width,
        }
    }

    /// Midpoint of the span.
    pub fn center(&self) -> f32 {
        (self.start + self.end) / 2.0
    }

    /// Whether the spans overlap or are at most `tolerance` apart.
    ///
    /// # Examples
    ///
    /// ```
    /// use volley_report::geometry::HorizontalSpan;
    ///
    /// let a = HorizontalSpan::from_x_width(0.0, 10.0);
    /// let b = HorizontalSpan::from_x_width(20.0, 10.0);
    /// assert!(!a.overlaps_within(&b, 5.0));
    /// assert!(a.overlaps_within(&b, 10.0));
    /// ```
    pub fn overlaps_within(&self, other: &HorizontalSpan, tolerance: f32) -> bool {
        self.start <= other.end + tolerance && self.end + tolerance >= other.start
    }
}

/// Round a coordinate to two decimal digits.
pub fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_overlap_is_symmetric() {
        let a = HorizontalSpan::from_x_width(100.0, 8.0);
        let b = HorizontalSpan::from_x_width(120.0, 8.0);
        assert_eq!(a.overlaps_within(&b, 14.0), b.overlaps_within(&a, 14.0));
        assert!(a.overlaps_within(&b, 14.0));
        assert!(!a.overlaps_within(&b, 11.0));
    }

    #[test]
    fn test_span_center() {
        let span = HorizontalSpan::from_x_width(4.0, 6.0);
        assert_eq!(span.end, 10.0);
        assert_eq!(span.center(), 7.0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(12.345_6), 12.35);
        assert_eq!(round2(-3.001), -3.0);
    }
}
