//! Positioning state threaded through a page content stream.
//!
//! Only the parameters that move text around are tracked: the CTM, the text
//! and text-line matrices and the text state operators (`Tc`, `Tw`, `Tz`,
//! `TL`, `Tf`, `Ts`).

/// Affine transform in the `[a b c d e f]` operand layout of `cm` and `Tm`.
///
/// Points are row vectors, so `(x, y)` maps to
/// `(a*x + c*y + e, b*x + d*y + f)`. Only `e` and `f` matter for where a
/// report cell lands; the linear part carries font size and scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    /// x scale
    pub a: f32,
    /// x shear into y
    pub b: f32,
    /// y shear into x
    pub c: f32,
    /// y scale
    pub d: f32,
    /// x offset
    pub e: f32,
    /// y offset
    pub f: f32,
}

impl Matrix {
    /// The transform that leaves every point in place.
    pub fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }

    /// Pure offset by `(tx, ty)`.
    pub fn translation(tx: f32, ty: f32) -> Self {
        Self {
            e: tx,
            f: ty,
            ..Self::identity()
        }
    }

    /// Build from `cm` or `Tm` operands.
    pub fn from_array(values: [f32; 6]) -> Self {
        let [a, b, c, d, e, f] = values;
        Self { a, b, c, d, e, f }
    }

    /// The six components in operand order.
    pub fn to_array(&self) -> [f32; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }

    /// Concatenate: the product maps a point through `self` and then `other`.
    ///
    /// # Examples
    ///
    /// ```
    /// use volley_report::content::Matrix;
    ///
    /// let m = Matrix::translation(10.0, 0.0).multiply(&Matrix::translation(0.0, 5.0));
    /// assert_eq!(m.e, 10.0);
    /// assert_eq!(m.f, 5.0);
    /// ```
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

/// Everything the extractor needs to place glyphs, saved and restored as a
/// unit by `q`/`Q`.
#[derive(Debug, Clone)]
pub struct GraphicsState {
    /// Page placement set by `cm`
    pub ctm: Matrix,
    /// Pen position, moved by every shown glyph
    pub text_matrix: Matrix,
    /// Start of the current text line; `Td` and `T*` offset from here
    pub text_line_matrix: Matrix,
    /// `Tc`, added after every glyph
    pub char_space: f32,
    /// `Tw`, added after single-byte code 32
    pub word_space: f32,
    /// `Tz`, in percent
    pub horizontal_scaling: f32,
    /// `TL`
    pub leading: f32,
    /// Resource key from `Tf`, looked up in the page font map
    pub font_name: Option<Vec<u8>>,
    /// Size operand of `Tf`
    pub font_size: f32,
    /// `Ts`
    pub text_rise: f32,
}

impl GraphicsState {
    /// State at the start of a page content stream.
    pub fn new() -> Self {
        Self {
            ctm: Matrix::identity(),
            text_matrix: Matrix::identity(),
            text_line_matrix: Matrix::identity(),
            char_space: 0.0,
            word_space: 0.0,
            horizontal_scaling: 100.0,
            leading: 0.0,
            font_name: None,
            font_size: 12.0,
            text_rise: 0.0,
        }
    }

    /// `BT`: the pen returns to the text-space origin.
    pub fn begin_text(&mut self) {
        self.text_matrix = Matrix::identity();
        self.text_line_matrix = Matrix::identity();
    }

    /// `Td`: start a line at `(tx, ty)` from the previous line start.
    pub fn move_text_position(&mut self, tx: f32, ty: f32) {
        self.text_line_matrix = Matrix::translation(tx, ty).multiply(&self.text_line_matrix);
        self.text_matrix = self.text_line_matrix;
    }

    /// `T*`: drop one leading below the previous line start.
    pub fn next_line(&mut self) {
        let leading = self.leading;
        self.move_text_position(0.0, -leading);
    }

    /// `Tm`
    pub fn set_text_matrix(&mut self, matrix: Matrix) {
        self.text_matrix = matrix;
        self.text_line_matrix = matrix;
    }

    /// Move the pen right by `tx` text-space units, leaving the line start.
    pub fn advance(&mut self, tx: f32) {
        self.text_matrix = Matrix::translation(tx, 0.0).multiply(&self.text_matrix);
    }

    /// Where the next glyph is drawn: its size and rise, through the pen
    /// position, through the page placement.
    pub fn rendering_matrix(&self) -> Matrix {
        let scale = Matrix {
            a: self.font_size * self.horizontal_scaling / 100.0,
            b: 0.0,
            c: 0.0,
            d: self.font_size,
            e: 0.0,
            f: self.text_rise,
        };
        scale.multiply(&self.text_matrix).multiply(&self.ctm)
    }
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self::new()
    }
}

/// The live state plus the levels pushed by `q`.
#[derive(Debug, Clone)]
pub struct GraphicsStateStack {
    current: GraphicsState,
    saved: Vec<GraphicsState>,
}

impl GraphicsStateStack {
    /// Stack holding only the page's initial state.
    pub fn new() -> Self {
        Self {
            current: GraphicsState::new(),
            saved: Vec::new(),
        }
    }

    /// State the next operator reads.
    pub fn current(&self) -> &GraphicsState {
        &self.current
    }

    /// State the next operator updates.
    pub fn current_mut(&mut self) -> &mut GraphicsState {
        &mut self.current
    }

    /// `q`
    pub fn save(&mut self) {
        self.saved.push(self.current.clone());
    }

    /// `Q`. An unbalanced `Q` is ignored, so the state it would pop past
    /// stays live.
    ///
    /// # Examples
    ///
    /// ```
    /// use volley_report::content::{GraphicsStateStack, Matrix};
    ///
    /// let mut stack = GraphicsStateStack::new();
    /// stack.current_mut().ctm = Matrix::translation(0.0, 40.0);
    /// stack.restore();
    /// assert_eq!(stack.current().ctm.f, 40.0);
    /// ```
    pub fn restore(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.current = state;
        }
    }
}

impl Default for GraphicsStateStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_text_position_accumulates() {
        let mut state = GraphicsState::new();
        state.begin_text();
        state.move_text_position(100.0, 700.0);
        state.move_text_position(0.0, -14.0);
        assert_eq!(state.text_matrix.e, 100.0);
        assert_eq!(state.text_matrix.f, 686.0);
    }

    #[test]
    fn test_next_line_uses_leading() {
        let mut state = GraphicsState::new();
        state.set_text_matrix(Matrix::translation(50.0, 500.0));
        state.leading = 12.0;
        state.next_line();
        assert_eq!(state.text_matrix.f, 488.0);
        assert_eq!(state.text_matrix.e, 50.0);
    }

    #[test]
    fn test_advance_only_moves_text_matrix() {
        let mut state = GraphicsState::new();
        state.set_text_matrix(Matrix::translation(10.0, 20.0));
        state.advance(30.0);
        assert_eq!(state.text_matrix.e, 40.0);
        assert_eq!(state.text_line_matrix.e, 10.0);
    }

    #[test]
    fn test_rendering_matrix_applies_ctm() {
        let mut state = GraphicsState::new();
        state.ctm = Matrix::translation(0.0, 100.0);
        state.font_size = 10.0;
        state.set_text_matrix(Matrix::translation(20.0, 30.0));
        let trm = state.rendering_matrix();
        assert_eq!(trm.a, 10.0);
        assert_eq!(trm.d, 10.0);
        assert_eq!(trm.e, 20.0);
        assert_eq!(trm.f, 130.0);
    }

    #[test]
    fn test_restore_brings_back_ctm() {
        let mut stack = GraphicsStateStack::new();
        stack.save();
        stack.current_mut().ctm = Matrix::translation(5.0, 5.0);
        stack.save();
        stack.current_mut().font_size = 9.0;
        stack.restore();
        assert_eq!(stack.current().ctm.e, 5.0);
        assert_eq!(stack.current().font_size, 12.0);
        stack.restore();
        assert_eq!(stack.current().ctm, Matrix::identity());
    }
}
