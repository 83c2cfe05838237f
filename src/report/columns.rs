//! Column anchor inference.
//!
//! Every output column gets a horizontal window ("anchor") that stat tokens
//! are matched against. Anchors come from the column header row when one is
//! present, otherwise from the player row with the most stat tokens.

use crate::config::{ReportConfig, MAX_SET_COUNT, MIN_SET_COUNT};
use crate::geometry::HorizontalSpan;
use crate::layout::{flatten_tokens, Line, LineToken};
use crate::report::classify::is_header_row;
use crate::report::keywords::KeywordTable;
use crate::report::player::RawPlayerRecord;

/// Horizontal window of one output column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnAnchor {
    /// Left edge
    pub start: f32,
    /// Right edge
    pub end: f32,
    /// Horizontal center
    pub center: f32,
    /// Height of the token the anchor was taken from
    pub height: f32,
}

impl ColumnAnchor {
    /// Anchor covering a token.
    pub fn from_token(token: &LineToken) -> Self {
        let span = token.span();
        Self {
            start: span.start,
            end: span.end,
            center: span.center(),
            height: token.height,
        }
    }

    /// Horizontal extent of the anchor.
    pub fn span(&self) -> HorizontalSpan {
        HorizontalSpan {
            start: self.start,
            end: self.end,
        }
    }
}

/// Where the anchors came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorStrategy {
    /// Column header row
    HeaderRow,
    /// Stat tokens of the player with the most stat tokens
    WidestPlayer,
    /// No anchors; mapping falls back to token order
    Positional,
}

/// Result of anchor inference.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorInference {
    /// One anchor per output column, or `None` when not enough tokens were found
    pub anchors: Option<Vec<ColumnAnchor>>,
    /// Number of set columns
    pub detected_set_count: usize,
    /// Strategy that produced the anchors
    pub strategy: AnchorStrategy,
}

/// Output column labels: `Set 1` .. `Set N`, then the fixed columns.
///
/// # Examples
///
/// ```
/// use volley_report::report::columns::column_labels;
///
/// let labels = column_labels(2, &["Vote".to_string()]);
/// assert_eq!(labels, vec!["Set 1", "Set 2", "Vote"]);
/// ```
pub fn column_labels(set_count: usize, fixed_columns: &[String]) -> Vec<String> {
    (1..=set_count)
        .map(|n| format!("Set {}", n))
        .chain(fixed_columns.iter().cloned())
        .collect()
}

/// Infer column anchors for the report.
///
/// The header row is searched among `lines` up to and including
/// `last_player_line_index` (all lines when it is `None`). The set-column run
/// starts at the first header token equal to `"1"`; its length is the offset
/// of the next vote token, clamped to the supported range, or the configured
/// set count when no vote token follows. A header with fewer tokens than
/// columns is treated as absent.
///
/// The fallback uses the configured set count and the first player with the
/// most stat tokens.
pub fn infer_anchors(
    players: &[RawPlayerRecord],
    lines: &[Line],
    last_player_line_index: Option<usize>,
    config: &ReportConfig,
    keywords: &KeywordTable,
) -> AnchorInference {
    let fixed = config.fixed_columns.len();
    let search_end = last_player_line_index
        .map(|idx| (idx + 1).min(lines.len()))
        .unwrap_or(lines.len());

    if let Some(header) = lines[..search_end]
        .iter()
        .find(|line| is_header_row(&line.text(), keywords))
    {
        if let Some(inference) = anchors_from_header(header, config, keywords, fixed) {
            return inference;
        }
        log::debug!("Header row has too few tokens, falling back to player tokens");
    }

    let set_count = config.effective_set_count();
    let needed = set_count + fixed;

    let widest = players.iter().fold(None::<&RawPlayerRecord>, |best, player| match best {
        Some(b) if b.stat_tokens.len() >= player.stat_tokens.len() => Some(b),
        _ => Some(player),
    });

    match widest {
        Some(player) if player.stat_tokens.len() >= needed => {
            log::debug!(
                "Anchors from player #{} ({} stat tokens)",
                player.number,
                player.stat_tokens.len()
            );
            AnchorInference {
                anchors: Some(player.stat_tokens[..needed].iter().map(ColumnAnchor::from_token).collect()),
                detected_set_count: set_count,
                strategy: AnchorStrategy::WidestPlayer,
            }
        },
        _ => {
            log::debug!("No anchors found, mapping stats by position");
            AnchorInference {
                anchors: None,
                detected_set_count: set_count,
                strategy: AnchorStrategy::Positional,
            }
        },
    }
}

fn anchors_from_header(
    header: &Line,
    config: &ReportConfig,
    keywords: &KeywordTable,
    fixed: usize,
) -> Option<AnchorInference> {
    let tokens = flatten_tokens(&header.tokens);
    let start = tokens.iter().position(|t| t.text == "1")?;
    let run = &tokens[start..];

    let set_count = run
        .iter()
        .position(|t| keywords.is_vote(&t.text))
        .map(|offset| offset.clamp(MIN_SET_COUNT, MAX_SET_COUNT))
        .unwrap_or_else(|| config.effective_set_count());

    let needed = set_count + fixed;
    if run.len() < needed {
        return None;
    }

    log::debug!("Anchors from header row: {} set columns", set_count);
    Some(AnchorInference {
        anchors: Some(run[..needed].iter().map(ColumnAnchor::from_token).collect()),
        detected_set_count: set_count,
        strategy: AnchorStrategy::HeaderRow,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PositionedToken;
    use crate::report::keywords::Locale;

    fn row(words: &[&str], y: f32) -> Line {
        Line {
            y,
            page: 1,
            tokens: words
                .iter()
                .enumerate()
                .map(|(i, w)| PositionedToken::new(*w, 100.0 + i as f32 * 20.0, y, 10.0, 7.0, 1))
                .collect(),
        }
    }

    fn small_config() -> ReportConfig {
        ReportConfig::new().with_fixed_columns(["Vote", "Pos%", "Blo"])
    }

    fn player_with(stats: usize, number: u32) -> RawPlayerRecord {
        let stat_tokens: Vec<LineToken> = (0..stats)
            .map(|i| LineToken {
                text: "1".into(),
                x: 200.0 + i as f32 * 20.0,
                width: 8.0,
                height: 7.0,
            })
            .collect();
        RawPlayerRecord {
            number,
            name: "X".into(),
            team: "T".into(),
            libero: false,
            raw_stats: stat_tokens.iter().map(|t| t.text.clone()).collect(),
            stat_tokens,
            line_text: String::new(),
        }
    }

    #[test]
    fn test_header_detects_set_count() {
        let lines = vec![row(&["1", "2", "3", "Vote", "Pos%", "Blo"], 700.0)];
        let inference = infer_anchors(&[], &lines, None, &small_config(), &Locale::English.keywords());
        assert_eq!(inference.strategy, AnchorStrategy::HeaderRow);
        assert_eq!(inference.detected_set_count, 3);
        let anchors = inference.anchors.unwrap();
        assert_eq!(anchors.len(), 6);
        assert_eq!(anchors[0].start, 100.0);
        assert_eq!(anchors[5].center, 205.0);
    }

    #[test]
    fn test_header_without_vote_uses_configured_sets() {
        let config = small_config().with_set_count(2);
        let mut kw = Locale::English.keywords();
        kw.header_rows = vec![vec!["pos%".into(), "blo".into()]];
        let lines = vec![row(&["1", "2", "V", "Pos%", "Blo"], 700.0)];
        let inference = infer_anchors(&[], &lines, None, &config, &kw);
        assert_eq!(inference.detected_set_count, 2);
        assert_eq!(inference.anchors.unwrap().len(), 5);
    }

    #[test]
    fn test_short_header_falls_back_to_widest_player() {
        let lines = vec![row(&["1", "Vote", "Pos%", "Blo"], 700.0)];
        let config = small_config().with_set_count(1).with_fixed_columns(["Vote", "Pos%", "Blo", "BK"]);
        let players = vec![player_with(3, 1), player_with(5, 2), player_with(5, 3)];
        let inference = infer_anchors(&players, &lines, None, &config, &Locale::English.keywords());
        assert_eq!(inference.strategy, AnchorStrategy::WidestPlayer);
        assert_eq!(inference.detected_set_count, 1);
        assert_eq!(inference.anchors.unwrap().len(), 5);
    }

    #[test]
    fn test_header_after_last_player_is_ignored() {
        let lines = vec![
            row(&["7", "Ana", "1"], 700.0),
            row(&["1", "2", "Vote", "Pos%", "Blo"], 600.0),
        ];
        let inference = infer_anchors(&[], &lines, Some(0), &small_config(), &Locale::English.keywords());
        assert_eq!(inference.strategy, AnchorStrategy::Positional);
        assert!(inference.anchors.is_none());
    }

    #[test]
    fn test_not_enough_tokens_anywhere() {
        let players = vec![player_with(2, 1)];
        let inference = infer_anchors(&players, &[], None, &small_config(), &Locale::English.keywords());
        assert!(inference.anchors.is_none());
        assert_eq!(inference.detected_set_count, 4);
    }

    #[test]
    fn test_set_count_clamped_to_five() {
        let words = ["1", "2", "3", "4", "5", "6", "7", "Vote", "Pos%", "Blo"];
        let lines = vec![row(&words, 700.0)];
        let inference = infer_anchors(&[], &lines, None, &small_config(), &Locale::English.keywords());
        assert_eq!(inference.detected_set_count, 5);
    }

    #[test]
    fn test_column_labels_order() {
        let labels = column_labels(1, &small_config().fixed_columns);
        assert_eq!(labels, vec!["Set 1", "Vote", "Pos%", "Blo"]);
    }
}
