//! Positioned text extraction from PDF content streams.
//!
//! Every shown string (`Tj`, `TJ`, `'`, `"`) becomes one [`RawTextItem`] carrying the
//! text rendering matrix at its origin and its advance width, the same shape a
//! browser PDF renderer hands out. [`extract_tokens`] is the only place that shape is
//! looked at: it normalises each item into a [`PositionedToken`].

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId};
use serde::Deserialize;

use crate::content::graphics_state::{GraphicsStateStack, Matrix};
use crate::error::{Error, Result};
use crate::geometry::round2;
use crate::layout::PositionedToken;

/// Glyph advance used when a font carries no `/Widths` (in 1/1000 em).
const DEFAULT_GLYPH_WIDTH: f32 = 500.0;

/// One text item as produced by a PDF renderer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawTextItem {
    /// Decoded text
    #[serde(rename = "str")]
    pub text: String,
    /// Text rendering matrix `[a, b, c, d, e, f]` at the item origin
    pub transform: [f32; 6],
    /// Advance width in user space, when known
    #[serde(default)]
    pub width: Option<f32>,
    /// Glyph height in user space, when known
    #[serde(default)]
    pub height: Option<f32>,
}

impl RawTextItem {
    /// Normalise into a token on `page` (1-based).
    ///
    /// x/y come from the matrix offsets, width/height from the matrix scale
    /// factors when not given directly; all values are rounded to 2 decimals.
    ///
    /// # Examples
    ///
    /// ```
    /// use volley_report::extractors::RawTextItem;
    ///
    /// let item = RawTextItem {
    ///     text: "12".to_string(),
    ///     transform: [8.0, 0.0, 0.0, 8.0, 101.234, 700.0],
    ///     width: None,
    ///     height: None,
    /// };
    /// let token = item.into_token(1);
    /// assert_eq!(token.x, 101.23);
    /// assert_eq!(token.width, 8.0);
    /// assert_eq!(token.height, 8.0);
    /// ```
    pub fn into_token(self, page: u32) -> PositionedToken {
        let [a, _, _, d, e, f] = self.transform;
        PositionedToken {
            text: self.text,
            x: round2(e),
            y: round2(f),
            width: round2(self.width.unwrap_or(a).abs()),
            height: round2(self.height.unwrap_or(d).abs()),
            page,
        }
    }
}

/// A document that can hand out positioned text items page by page.
pub trait TextItemSource {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Text items of one page (1-based), in content-stream order.
    fn page_items(&self, page: usize) -> Result<Vec<RawTextItem>>;
}

/// Pull every page of `source` in order and normalise its items.
///
/// Items whose text is blank are dropped.
pub fn extract_tokens(source: &dyn TextItemSource) -> Result<Vec<PositionedToken>> {
    let page_count = source.page_count();
    let mut tokens = Vec::new();

    for page in 1..=page_count {
        let items = source.page_items(page)?;
        log::debug!("Page {}/{}: {} text items", page, page_count, items.len());
        tokens.extend(
            items
                .into_iter()
                .filter(|item| !item.text.trim().is_empty())
                .map(|item| item.into_token(page as u32)),
        );
    }

    log::debug!("Extracted {} tokens from {} pages", tokens.len(), page_count);
    Ok(tokens)
}

/// Text items already extracted elsewhere, stored as one array per page.
///
/// Accepts the JSON shape `[[{"str": .., "transform": [..6], "width": .., "height": ..}, ..], ..]`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct JsonTextSource {
    pages: Vec<Vec<RawTextItem>>,
}

impl JsonTextSource {
    /// Wrap already-built pages.
    pub fn new(pages: Vec<Vec<RawTextItem>>) -> Self {
        Self { pages }
    }

    /// Parse a JSON dump of text items.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON dump of text items from disk.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

impl TextItemSource for JsonTextSource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_items(&self, page: usize) -> Result<Vec<RawTextItem>> {
        page.checked_sub(1)
            .and_then(|idx| self.pages.get(idx))
            .cloned()
            .ok_or_else(|| Error::Extraction {
                page,
                reason: format!("page out of range (document has {})", self.pages.len()),
            })
    }
}

/// Configuration for content stream interpretation.
#[derive(Debug, Clone)]
pub struct TextExtractionConfig {
    /// Threshold for inserting space characters in TJ arrays.
    ///
    /// A TJ offset more negative than this (in 1/1000 text space units) is read
    /// as a word gap. Typical word spaces are 250-330 units, kerning stays
    /// below 100.
    pub space_insertion_threshold: f32,
}

impl Default for TextExtractionConfig {
    fn default() -> Self {
        Self {
            space_insertion_threshold: -120.0,
        }
    }
}

/// PDF document decoded with `lopdf`.
pub struct LopdfTextSource {
    doc: Document,
    pages: Vec<ObjectId>,
    config: TextExtractionConfig,
}

impl LopdfTextSource {
    /// Decode a PDF held in memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self::from_document(Document::load_mem(bytes)?))
    }

    /// Decode a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from_document(Document::load(path)?))
    }

    /// Wrap an already loaded document.
    pub fn from_document(doc: Document) -> Self {
        let pages = doc.get_pages().into_values().collect();
        Self {
            doc,
            pages,
            config: TextExtractionConfig::default(),
        }
    }

    /// Override the content stream interpretation settings.
    pub fn with_config(mut self, config: TextExtractionConfig) -> Self {
        self.config = config;
        self
    }
}

impl TextItemSource for LopdfTextSource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_items(&self, page: usize) -> Result<Vec<RawTextItem>> {
        let page_id = page
            .checked_sub(1)
            .and_then(|idx| self.pages.get(idx))
            .copied()
            .ok_or_else(|| Error::Extraction {
                page,
                reason: format!("page out of range (document has {})", self.pages.len()),
            })?;

        let fonts = self.doc.get_page_fonts(page_id)?;
        let data = self.doc.get_page_content(page_id)?;
        let content = Content::decode(&data).map_err(|e| Error::Extraction {
            page,
            reason: e.to_string(),
        })?;

        let fonts = PageFonts::new(&self.doc, fonts);
        let mut extractor = TextExtractor::new(&self.config, &fonts);
        for op in &content.operations {
            extractor.execute(op);
        }
        Ok(extractor.finish())
    }
}

/// Width and decoding data for one font resource.
struct FontMetrics<'a> {
    dict: &'a Dictionary,
    first_char: i64,
    widths: Vec<f32>,
    two_byte: bool,
}

impl<'a> FontMetrics<'a> {
    fn new(doc: &'a Document, dict: &'a Dictionary) -> Self {
        let first_char = dict
            .get(b"FirstChar")
            .ok()
            .and_then(|o| get_number(resolve(doc, o)))
            .map(|n| n as i64)
            .unwrap_or(0);
        let widths = dict
            .get(b"Widths")
            .ok()
            .map(|o| resolve(doc, o))
            .and_then(|o| o.as_array().ok())
            .map(|arr| {
                arr.iter()
                    .map(|w| get_number(resolve(doc, w)).unwrap_or(DEFAULT_GLYPH_WIDTH))
                    .collect()
            })
            .unwrap_or_default();
        let two_byte = matches!(dict.get(b"Subtype"), Ok(Object::Name(name)) if name == b"Type0");

        Self {
            dict,
            first_char,
            widths,
            two_byte,
        }
    }

    fn glyph_width(&self, code: u8) -> f32 {
        let idx = i64::from(code) - self.first_char;
        if idx < 0 {
            return DEFAULT_GLYPH_WIDTH;
        }
        self.widths
            .get(idx as usize)
            .copied()
            .unwrap_or(DEFAULT_GLYPH_WIDTH)
    }
}

/// Font resources of one page.
struct PageFonts<'a> {
    doc: &'a Document,
    fonts: BTreeMap<Vec<u8>, FontMetrics<'a>>,
}

impl<'a> PageFonts<'a> {
    fn new(doc: &'a Document, raw: BTreeMap<Vec<u8>, &'a Dictionary>) -> Self {
        let fonts = raw
            .into_iter()
            .map(|(name, dict)| (name, FontMetrics::new(doc, dict)))
            .collect();
        Self { doc, fonts }
    }

    fn get(&self, name: Option<&[u8]>) -> Option<&FontMetrics<'a>> {
        name.and_then(|n| self.fonts.get(n))
    }

    fn decode(&self, font: Option<&FontMetrics<'a>>, bytes: &[u8]) -> String {
        if let Some(font) = font {
            if let Ok(encoding) = font.dict.get_font_encoding(self.doc) {
                if let Ok(text) = Document::decode_text(&encoding, bytes) {
                    return text;
                }
            }
        }
        decode_text_simple(bytes)
    }
}

/// Executes text operators against a graphics state stack and collects items.
struct TextExtractor<'c, 'f, 'a> {
    config: &'c TextExtractionConfig,
    fonts: &'f PageFonts<'a>,
    state: GraphicsStateStack,
    items: Vec<RawTextItem>,
}

impl<'c, 'f, 'a> TextExtractor<'c, 'f, 'a> {
    fn new(config: &'c TextExtractionConfig, fonts: &'f PageFonts<'a>) -> Self {
        Self {
            config,
            fonts,
            state: GraphicsStateStack::new(),
            items: Vec::new(),
        }
    }

    fn finish(self) -> Vec<RawTextItem> {
        self.items
    }

    fn execute(&mut self, op: &Operation) {
        let operands = &op.operands;
        match op.operator.as_str() {
            "q" => self.state.save(),
            "Q" => self.state.restore(),
            "cm" => {
                if let Some(m) = matrix_operand(operands) {
                    let state = self.state.current_mut();
                    state.ctm = m.multiply(&state.ctm);
                }
            },
            "BT" => self.state.current_mut().begin_text(),
            "ET" => {},
            "Tf" => {
                let state = self.state.current_mut();
                if let Some(Object::Name(name)) = operands.first() {
                    state.font_name = Some(name.clone());
                }
                if let Some(size) = operands.get(1).and_then(get_number) {
                    state.font_size = size;
                }
            },
            "TL" => {
                if let Some(v) = operands.first().and_then(get_number) {
                    self.state.current_mut().leading = v;
                }
            },
            "Tc" => {
                if let Some(v) = operands.first().and_then(get_number) {
                    self.state.current_mut().char_space = v;
                }
            },
            "Tw" => {
                if let Some(v) = operands.first().and_then(get_number) {
                    self.state.current_mut().word_space = v;
                }
            },
            "Tz" => {
                if let Some(v) = operands.first().and_then(get_number) {
                    self.state.current_mut().horizontal_scaling = v;
                }
            },
            "Ts" => {
                if let Some(v) = operands.first().and_then(get_number) {
                    self.state.current_mut().text_rise = v;
                }
            },
            "Td" | "TD" => {
                if let (Some(tx), Some(ty)) = (
                    operands.first().and_then(get_number),
                    operands.get(1).and_then(get_number),
                ) {
                    let state = self.state.current_mut();
                    if op.operator == "TD" {
                        state.leading = -ty;
                    }
                    state.move_text_position(tx, ty);
                }
            },
            "Tm" => {
                if let Some(m) = matrix_operand(operands) {
                    self.state.current_mut().set_text_matrix(m);
                }
            },
            "T*" => self.state.current_mut().next_line(),
            "Tj" => {
                if let Some(Object::String(bytes, _)) = operands.first() {
                    self.show_text(&[TextPart::Bytes(bytes)]);
                }
            },
            "TJ" => {
                if let Some(Object::Array(arr)) = operands.first() {
                    let parts: Vec<TextPart<'_>> = arr
                        .iter()
                        .filter_map(|obj| match obj {
                            Object::String(bytes, _) => Some(TextPart::Bytes(bytes)),
                            other => get_number(other).map(TextPart::Offset),
                        })
                        .collect();
                    self.show_text(&parts);
                }
            },
            "'" => {
                self.state.current_mut().next_line();
                if let Some(Object::String(bytes, _)) = operands.first() {
                    self.show_text(&[TextPart::Bytes(bytes)]);
                }
            },
            "\"" => {
                let state = self.state.current_mut();
                if let Some(v) = operands.first().and_then(get_number) {
                    state.word_space = v;
                }
                if let Some(v) = operands.get(1).and_then(get_number) {
                    state.char_space = v;
                }
                state.next_line();
                if let Some(Object::String(bytes, _)) = operands.get(2) {
                    self.show_text(&[TextPart::Bytes(bytes)]);
                }
            },
            _ => {},
        }
    }

    /// Show a run of strings and TJ offsets as one item, advancing the text matrix.
    fn show_text(&mut self, parts: &[TextPart<'_>]) {
        let fonts = self.fonts;
        let font = fonts.get(self.state.current().font_name.as_deref());
        let start = self.state.current().rendering_matrix();
        let mut text = String::new();

        for part in parts {
            match part {
                TextPart::Bytes(bytes) => {
                    let decoded = fonts.decode(font, bytes);
                    let advance = self.advance_for(font, bytes, &decoded);
                    text.push_str(&decoded);
                    self.state.current_mut().advance(advance);
                },
                TextPart::Offset(offset) => {
                    if *offset < self.config.space_insertion_threshold
                        && !text.is_empty()
                        && !text.ends_with(char::is_whitespace)
                    {
                        text.push(' ');
                    }
                    let state = self.state.current();
                    let advance =
                        -offset / 1000.0 * state.font_size * state.horizontal_scaling / 100.0;
                    self.state.current_mut().advance(advance);
                },
            }
        }

        if text.trim().is_empty() {
            return;
        }

        let end = self.state.current().rendering_matrix();
        let width = ((end.e - start.e).powi(2) + (end.f - start.f).powi(2)).sqrt();
        self.items.push(RawTextItem {
            text,
            transform: start.to_array(),
            width: Some(width),
            height: None,
        });
    }

    /// Horizontal displacement (unscaled text space) of a shown string.
    fn advance_for(&self, font: Option<&FontMetrics<'a>>, bytes: &[u8], decoded: &str) -> f32 {
        let state = self.state.current();
        let scale = state.horizontal_scaling / 100.0;

        let glyphs: f32 = match font {
            Some(font) if !font.two_byte => bytes
                .iter()
                .map(|&code| {
                    let mut w = font.glyph_width(code) / 1000.0 * state.font_size + state.char_space;
                    if code == b' ' {
                        w += state.word_space;
                    }
                    w
                })
                .sum(),
            _ => decoded
                .chars()
                .map(|c| {
                    let mut w = DEFAULT_GLYPH_WIDTH / 1000.0 * state.font_size + state.char_space;
                    if c == ' ' {
                        w += state.word_space;
                    }
                    w
                })
                .sum(),
        };

        glyphs * scale
    }
}

enum TextPart<'o> {
    Bytes(&'o [u8]),
    Offset(f32),
}

fn matrix_operand(operands: &[Object]) -> Option<Matrix> {
    if operands.len() < 6 {
        return None;
    }
    let mut values = [0.0f32; 6];
    for (slot, operand) in values.iter_mut().zip(operands) {
        *slot = get_number(operand)?;
    }
    Some(Matrix::from_array(values))
}

/// Helper to get f32 from Object
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Decode without font information: UTF-16BE when a BOM is present, Latin-1 otherwise.
fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }
    bytes.iter().map(|&b| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_token_prefers_explicit_size() {
        let item = RawTextItem {
            text: "Vote".to_string(),
            transform: [9.0, 0.0, 0.0, 9.0, 300.0, 512.456],
            width: Some(18.333),
            height: Some(7.0),
        };
        let token = item.into_token(2);
        assert_eq!(token.page, 2);
        assert_eq!(token.width, 18.33);
        assert_eq!(token.height, 7.0);
        assert_eq!(token.y, 512.46);
    }

    #[test]
    fn test_json_source_drops_blank_items() {
        let source = JsonTextSource::from_json_str(
            r#"[[{"str": "TEAM ALPHA", "transform": [10, 0, 0, 10, 40, 700]},
                 {"str": "  ", "transform": [10, 0, 0, 10, 140, 700]}],
                [{"str": "9", "transform": [8, 0, 0, 8, 40, 650], "width": 5}]]"#,
        )
        .unwrap();
        let tokens = extract_tokens(&source).unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].page, 1);
        assert_eq!(tokens[1].page, 2);
        assert_eq!(tokens[1].width, 5.0);
    }

    #[test]
    fn test_json_source_page_out_of_range() {
        let source = JsonTextSource::new(vec![]);
        assert!(source.page_items(1).is_err());
        assert!(source.page_items(0).is_err());
    }

    #[test]
    fn test_decode_text_simple() {
        assert_eq!(decode_text_simple(b"Ana"), "Ana");
        assert_eq!(decode_text_simple(&[0xFE, 0xFF, 0x00, 0x41]), "A");
        assert_eq!(decode_text_simple(&[0xE9]), "\u{e9}");
    }

    #[test]
    fn test_matrix_operand_requires_six_numbers() {
        let ops = vec![Object::Integer(1); 5];
        assert!(matrix_operand(&ops).is_none());
        let ops: Vec<Object> = vec![1, 0, 0, 1, 20, 30].into_iter().map(Object::Integer).collect();
        let m = matrix_operand(&ops).unwrap();
        assert_eq!(m.e, 20.0);
        assert_eq!(m.f, 30.0);
    }
}
