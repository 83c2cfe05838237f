//! Player row parsing.

use crate::layout::{flatten_tokens, Line, LineToken};
use crate::report::classify::{clean_name, is_libero_marker, is_stat_token, parse_jersey_number};

/// A player row before column mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPlayerRecord {
    /// Jersey number
    pub number: u32,
    /// Player name
    pub name: String,
    /// Team the row belongs to
    pub team: String,
    /// Whether a libero marker accompanied the number
    pub libero: bool,
    /// Stat-suffix tokens, left to right
    pub stat_tokens: Vec<LineToken>,
    /// Texts of `stat_tokens`
    pub raw_stats: Vec<String>,
    /// Full text of the source line
    pub line_text: String,
}

/// Parse one line as a player row.
///
/// The jersey number must appear within the first `number_window` tokens
/// (after splitting merged fragments). Libero markers directly after the
/// number are dropped. The remaining tokens split once into a name prefix and
/// a stat suffix starting at the first stat-shaped token; tokens after that
/// point are stats whatever they look like.
///
/// Returns `None` when the line is not a player row.
///
/// # Examples
///
/// ```
/// use volley_report::layout::{Line, PositionedToken};
/// use volley_report::report::player::parse_player_line;
///
/// let line = Line {
///     y: 500.0,
///     page: 1,
///     tokens: vec![PositionedToken::new("12 L Ana Silva 3 . 75%", 40.0, 500.0, 110.0, 8.0, 1)],
/// };
/// let player = parse_player_line(&line, "Team Alpha", 3).unwrap();
/// assert_eq!(player.number, 12);
/// assert!(player.libero);
/// assert_eq!(player.name, "Ana Silva");
/// assert_eq!(player.raw_stats, vec!["3", ".", "75%"]);
/// ```
pub fn parse_player_line(line: &Line, team: &str, number_window: usize) -> Option<RawPlayerRecord> {
    let tokens = flatten_tokens(&line.tokens);

    let (number_index, number, mut libero) = tokens
        .iter()
        .take(number_window)
        .enumerate()
        .find_map(|(idx, t)| parse_jersey_number(&t.text).map(|(n, l)| (idx, n, l)))?;

    let mut rest = &tokens[number_index + 1..];
    while let Some((first, tail)) = rest.split_first() {
        if !is_libero_marker(&first.text) {
            break;
        }
        libero = true;
        rest = tail;
    }

    let split = rest
        .iter()
        .position(|t| is_stat_token(&t.text))
        .unwrap_or(rest.len());
    let (name_tokens, stat_tokens) = rest.split_at(split);

    let raw_name = name_tokens
        .iter()
        .map(|t| t.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let name = clean_name(&raw_name);
    if name.is_empty() {
        return None;
    }

    Some(RawPlayerRecord {
        number,
        name,
        team: team.to_string(),
        libero,
        raw_stats: stat_tokens.iter().map(|t| t.text.clone()).collect(),
        stat_tokens: stat_tokens.to_vec(),
        line_text: line.text(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PositionedToken;

    fn line_of(words: &[&str]) -> Line {
        let tokens = words
            .iter()
            .enumerate()
            .map(|(i, w)| PositionedToken::new(*w, 20.0 + i as f32 * 30.0, 400.0, 20.0, 8.0, 1))
            .collect();
        Line {
            y: 400.0,
            page: 1,
            tokens,
        }
    }

    #[test]
    fn test_libero_token_excluded_from_name() {
        let player = parse_player_line(&line_of(&["12", "L", "Ana", "Silva", "4", "."]), "A", 3).unwrap();
        assert_eq!(player.number, 12);
        assert!(player.libero);
        assert_eq!(player.name, "Ana Silva");
        assert_eq!(player.raw_stats, vec!["4", "."]);
    }

    #[test]
    fn test_four_digit_number_is_not_a_player() {
        assert!(parse_player_line(&line_of(&["1234", "Ana", "4"]), "A", 3).is_none());
    }

    #[test]
    fn test_partition_is_one_way() {
        let player = parse_player_line(&line_of(&["7", "Ana", "12", "Silva"]), "A", 3).unwrap();
        assert_eq!(player.name, "Ana");
        assert_eq!(player.raw_stats, vec!["12", "Silva"]);
        assert_eq!(player.stat_tokens.len(), 2);
    }

    #[test]
    fn test_number_within_window() {
        let player = parse_player_line(&line_of(&["*", "#", "9", "Ines", "1"]), "A", 3).unwrap();
        assert_eq!(player.number, 9);
        assert!(parse_player_line(&line_of(&["*", "#", "x", "9", "Ines"]), "A", 3).is_none());
    }

    #[test]
    fn test_attached_libero_marker() {
        let player = parse_player_line(&line_of(&["5L", "Bia", "2"]), "A", 3).unwrap();
        assert_eq!(player.number, 5);
        assert!(player.libero);
    }

    #[test]
    fn test_empty_name_fails() {
        assert!(parse_player_line(&line_of(&["7", "12", "3"]), "A", 3).is_none());
        assert!(parse_player_line(&line_of(&["7", "L"]), "A", 3).is_none());
    }

    #[test]
    fn test_record_keeps_team_and_line_text() {
        let player = parse_player_line(&line_of(&["3", "Rita", "1"]), "Team Beta", 3).unwrap();
        assert_eq!(player.team, "Team Beta");
        assert_eq!(player.line_text, "3 Rita 1");
    }
}
