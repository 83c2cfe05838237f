//! Stat token to column mapping.

use crate::config::ReportConfig;
use crate::layout::LineToken;
use crate::report::classify::strip_parentheses;
use crate::report::columns::ColumnAnchor;

/// Map a player's stat tokens onto `column_count` cells.
///
/// With anchors of the right length, tokens are assigned greedily left to
/// right: each token takes the unoccupied anchor with the lowest score
/// (center distance, plus the height difference when it exceeds the height
/// tolerance, plus a penalty when the spans do not overlap within the overlap
/// tolerance). Ties go to the leftmost anchor. Without usable anchors the
/// i-th token fills the i-th cell.
///
/// The result always has `column_count` cells; cells without a token hold
/// the configured placeholder.
///
/// # Examples
///
/// ```
/// use volley_report::config::ReportConfig;
/// use volley_report::layout::LineToken;
/// use volley_report::report::mapping::map_stat_tokens;
///
/// let tokens = vec![LineToken { text: "(3)".into(), x: 10.0, width: 5.0, height: 7.0 }];
/// let cells = map_stat_tokens(&tokens, None, 3, &ReportConfig::default());
/// assert_eq!(cells, vec!["3", ".", "."]);
/// ```
pub fn map_stat_tokens(
    tokens: &[LineToken],
    anchors: Option<&[ColumnAnchor]>,
    column_count: usize,
    config: &ReportConfig,
) -> Vec<String> {
    match anchors {
        Some(anchors) if anchors.len() == column_count => map_by_anchor(tokens, anchors, config),
        _ => map_by_position(tokens, column_count, config),
    }
}

fn map_by_position(tokens: &[LineToken], column_count: usize, config: &ReportConfig) -> Vec<String> {
    (0..column_count)
        .map(|i| {
            tokens
                .get(i)
                .map(|t| strip_parentheses(&t.text))
                .filter(|text| !text.is_empty())
                .unwrap_or(config.placeholder.as_str())
                .to_string()
        })
        .collect()
}

fn map_by_anchor(tokens: &[LineToken], anchors: &[ColumnAnchor], config: &ReportConfig) -> Vec<String> {
    let mut cells = vec![config.placeholder.clone(); anchors.len()];
    let mut occupied = vec![false; anchors.len()];

    for token in tokens {
        let text = strip_parentheses(&token.text);
        if text.is_empty() {
            continue;
        }

        let mut best: Option<(usize, f32)> = None;
        for (idx, anchor) in anchors.iter().enumerate() {
            if occupied[idx] {
                continue;
            }
            let score = anchor_score(token, anchor, config);
            if best.map_or(true, |(_, best_score)| score < best_score) {
                best = Some((idx, score));
            }
        }

        match best {
            Some((idx, _)) => {
                cells[idx] = text.to_string();
                occupied[idx] = true;
            },
            None => {
                log::debug!("No free column left for token {:?}", token.text);
                break;
            },
        }
    }

    cells
}

fn anchor_score(token: &LineToken, anchor: &ColumnAnchor, config: &ReportConfig) -> f32 {
    let distance = (anchor.center - token.center()).abs();

    let height_diff = (anchor.height - token.height).abs();
    let height_penalty = if height_diff > config.height_tolerance {
        height_diff
    } else {
        0.0
    };

    let overlap_penalty = if token
        .span()
        .overlaps_within(&anchor.span(), config.overlap_tolerance)
    {
        0.0
    } else {
        config.overlap_penalty
    };

    distance + height_penalty + overlap_penalty
}
