//! Team and section segmentation.
//!
//! A single pass over the ordered lines with the current team as the only
//! state. Player rows are only recognised inside a team section.

use crate::layout::Line;
use crate::report::classify::{
    is_header_row, is_players_total, is_section_terminator, team_header_name,
};
use crate::report::keywords::KeywordTable;
use crate::report::player::{parse_player_line, RawPlayerRecord};

/// Players found by segmentation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Segmentation {
    /// Player rows in scan order
    pub players: Vec<RawPlayerRecord>,
    /// Index of the line holding the last emitted player
    pub last_player_line_index: Option<usize>,
}

impl Segmentation {
    /// Whether no player was found.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

/// Walk `lines` and collect player rows grouped by team.
///
/// Per line, checked in order:
/// 1. a "players total" row ends the team section; the second one ends the scan
/// 2. a section terminator ("Points won", "Head Coach", "Set 2") ends the team section
/// 3. the column header row is skipped; outside a team section, a team name
///    printed in front of the column keywords starts a new section
/// 4. inside a team section, a parseable player row is emitted
/// 5. a team header starts a new team section
///
/// # Examples
///
/// ```
/// use volley_report::layout::{Line, PositionedToken};
/// use volley_report::report::keywords::Locale;
/// use volley_report::report::segment::segment_lines;
///
/// let lines: Vec<Line> = ["Team Alpha", "7 Ana 3 1", "Players Total"]
///     .iter()
///     .enumerate()
///     .map(|(i, text)| Line {
///         y: 700.0 - i as f32 * 12.0,
///         page: 1,
///         tokens: vec![PositionedToken::new(*text, 20.0, 700.0 - i as f32 * 12.0, 80.0, 8.0, 1)],
///     })
///     .collect();
///
/// let segmentation = segment_lines(&lines, &Locale::English.keywords(), 3);
/// assert_eq!(segmentation.players.len(), 1);
/// assert_eq!(segmentation.players[0].team, "Team Alpha");
/// assert_eq!(segmentation.last_player_line_index, Some(1));
/// ```
pub fn segment_lines(lines: &[Line], keywords: &KeywordTable, number_window: usize) -> Segmentation {
    let mut result = Segmentation::default();
    let mut current_team: Option<String> = None;
    let mut totals_seen = 0usize;

    for (idx, line) in lines.iter().enumerate() {
        let text = line.text();
        if text.is_empty() {
            continue;
        }

        if is_players_total(&text, keywords) {
            totals_seen += 1;
            if totals_seen >= 2 {
                log::debug!("Second players-total row at line {}, stopping", idx);
                break;
            }
            current_team = None;
            continue;
        }

        if is_section_terminator(&text, keywords) {
            if current_team.take().is_some() {
                log::debug!("Section terminator at line {}: {:?}", idx, text);
            }
            continue;
        }

        if is_header_row(&text, keywords) {
            if current_team.is_none() {
                if let Some(name) = team_header_name(&text, keywords) {
                    log::debug!("Team header on column header row {}: {}", idx, name);
                    current_team = Some(name);
                }
            }
            continue;
        }

        if let Some(team) = current_team.as_deref() {
            if let Some(player) = parse_player_line(line, team, number_window) {
                result.players.push(player);
                result.last_player_line_index = Some(idx);
                continue;
            }
        }

        if let Some(name) = team_header_name(&text, keywords) {
            log::debug!("Team header at line {}: {}", idx, name);
            current_team = Some(name);
        }
    }

    log::debug!(
        "Segmentation found {} players (last player line {:?})",
        result.players.len(),
        result.last_player_line_index
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PositionedToken;
    use crate::report::keywords::Locale;

    fn lines(texts: &[&str]) -> Vec<Line> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let y = 800.0 - i as f32 * 14.0;
                Line {
                    y,
                    page: 1,
                    tokens: vec![PositionedToken::new(*text, 30.0, y, 200.0, 8.0, 1)],
                }
            })
            .collect()
    }

    fn segment(texts: &[&str]) -> Segmentation {
        segment_lines(&lines(texts), &Locale::English.keywords(), 3)
    }

    #[test]
    fn test_players_outside_team_are_ignored() {
        let result = segment(&["7 Ana 1 2", "Team Alpha", "8 Bia 1 2"]);
        assert_eq!(result.players.len(), 1);
        assert_eq!(result.players[0].name, "Bia");
    }

    #[test]
    fn test_terminator_leaves_team() {
        let result = segment(&["Team Alpha", "7 Ana 1", "Head Coach", "8 Bia 1"]);
        assert_eq!(result.players.len(), 1);
        assert_eq!(result.last_player_line_index, Some(1));
    }

    #[test]
    fn test_second_players_total_stops_scan() {
        let result = segment(&[
            "Team Alpha",
            "7 Ana 1",
            "Players Total",
            "Team Beta",
            "9 Ines 2",
            "10 Rita 3",
            "Players Total",
            "Team Gamma",
            "11 Zoe 4",
        ]);
        assert_eq!(result.players.len(), 3);
        assert_eq!(result.last_player_line_index, Some(5));
        assert_eq!(result.players[1].team, "Team Beta");
    }

    #[test]
    fn test_header_row_is_not_a_team() {
        let result = segment(&["Team Alpha", "Vote Pos% Blo", "7 Ana 1"]);
        assert_eq!(result.players.len(), 1);
        assert_eq!(result.players[0].team, "Team Alpha");
    }

    #[test]
    fn test_team_named_on_header_row() {
        let result = segment(&["TEAM ALPHA 1 2 Vote Tot Pos% Blo", "7 Ana Silva 3 1 2", "Players Total"]);
        assert_eq!(result.players.len(), 1);
        assert_eq!(result.players[0].team, "TEAM ALPHA");
        assert_eq!(result.last_player_line_index, Some(1));
    }

    #[test]
    fn test_header_row_inside_team_keeps_team() {
        let result = segment(&["Team Alpha", "No Name 1 2 Vote Pos% Blo", "7 Ana 1"]);
        assert_eq!(result.players.len(), 1);
        assert_eq!(result.players[0].team, "Team Alpha");
    }

    #[test]
    fn test_no_players() {
        let result = segment(&["Match Report", "Date: 15/03/24"]);
        assert!(result.is_empty());
        assert_eq!(result.last_player_line_index, None);
    }
}
