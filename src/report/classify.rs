//! Line and token classification predicates.
//!
//! All predicates are pure functions over normalised strings. Locale-specific
//! phrases come from a [`KeywordTable`]; only the shape patterns (numbers,
//! percentages, capitalised names) are fixed regexes.

use lazy_static::lazy_static;
use regex::Regex;

use crate::report::keywords::KeywordTable;

lazy_static! {
    /// Optionally signed, optionally parenthesised decimal or percentage
    static ref RE_STAT_NUMBER: Regex =
        Regex::new(r"^\(?[+-]?\d+(?:[.,]\d+)?%?\)?$").unwrap();

    /// Jersey number with an optional trailing libero marker ("12", "5L")
    static ref RE_JERSEY: Regex = Regex::new(r"^(\d{1,3})(L*)$").unwrap();

    /// Standalone libero marker
    static ref RE_LIBERO: Regex = Regex::new(r"^L+$").unwrap();

    /// Trailing scores: "3", "3-1", "(25)", "25:22 3 - 1"
    static ref RE_SCORE_SUFFIX: Regex =
        Regex::new(r"(?:\s+\(?\d{1,3}\)?(?:\s*[-:x]\s*\(?\d{1,3}\)?)?)+\s*$").unwrap();

    /// Separator between two team names on one header line
    static ref RE_TEAM_SEPARATOR: Regex = Regex::new(r"\s*[-–]\s*").unwrap();

    /// Capitalised word or phrase; lowercase connectors allowed between words
    static ref RE_TEAM_NAME: Regex = Regex::new(
        r"^\p{Lu}[\p{L}\p{M}\d'’.&]*(?:\s+(?:[\p{Lu}\d][\p{L}\p{M}\d'’.&]*|de|da|do|dos|das|e|of|the|and))*$"
    )
    .unwrap();

    /// Characters that cannot be part of a player name
    static ref RE_NON_NAME: Regex = Regex::new(r"[^\p{L}\p{M}\s'’.\-]").unwrap();

    /// Runs of whitespace
    static ref RE_WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Longest accepted team header, in characters.
const MAX_TEAM_HEADER_LEN: usize = 60;

/// Whether a token looks like a statistic cell: `.`, `-`, or a numeric value.
///
/// # Examples
///
/// ```
/// use volley_report::report::classify::is_stat_token;
///
/// assert!(is_stat_token("."));
/// assert!(is_stat_token("88%"));
/// assert!(is_stat_token("(+3)"));
/// assert!(is_stat_token("1,5"));
/// assert!(!is_stat_token("Silva"));
/// ```
pub fn is_stat_token(text: &str) -> bool {
    text == "." || text == "-" || RE_STAT_NUMBER.is_match(text)
}

/// Parse a jersey number token, returning the number and whether a libero
/// marker was attached.
///
/// At most three digits are accepted.
///
/// # Examples
///
/// ```
/// use volley_report::report::classify::parse_jersey_number;
///
/// assert_eq!(parse_jersey_number("12"), Some((12, false)));
/// assert_eq!(parse_jersey_number("5L"), Some((5, true)));
/// assert_eq!(parse_jersey_number("1234"), None);
/// ```
pub fn parse_jersey_number(text: &str) -> Option<(u32, bool)> {
    let caps = RE_JERSEY.captures(text)?;
    let number = caps.get(1)?.as_str().parse().ok()?;
    let libero = caps.get(2).is_some_and(|m| !m.as_str().is_empty());
    Some((number, libero))
}

/// Whether a token is a standalone libero marker (`L`, `LL`).
pub fn is_libero_marker(text: &str) -> bool {
    RE_LIBERO.is_match(text)
}

/// Token text with surrounding parentheses removed.
pub fn strip_parentheses(text: &str) -> &str {
    text.trim().trim_start_matches('(').trim_end_matches(')').trim()
}

/// Collapse whitespace runs to single spaces and trim.
pub fn normalize_whitespace(text: &str) -> String {
    RE_WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Player name with non-name characters removed; empty when nothing remains.
pub fn clean_name(text: &str) -> String {
    normalize_whitespace(&RE_NON_NAME.replace_all(text, ""))
}

/// Whether the line is a "players total" summary row.
pub fn is_players_total(text: &str, keywords: &KeywordTable) -> bool {
    let lower = normalize_whitespace(text).to_lowercase();
    keywords.players_total.iter().any(|k| lower.contains(k.as_str()))
}

/// Whether the line ends the current team section.
///
/// Terminators are lines starting with one of the configured phrases
/// ("Points won", "Head Coach", "Assistant") or a set heading ("Set 2").
///
/// # Examples
///
/// ```
/// use volley_report::report::classify::is_section_terminator;
/// use volley_report::report::keywords::Locale;
///
/// let keywords = Locale::English.keywords();
/// assert!(is_section_terminator("Head Coach: J. Smith", &keywords));
/// assert!(is_section_terminator("Set 3", &keywords));
/// assert!(!is_section_terminator("Setters", &keywords));
/// ```
pub fn is_section_terminator(text: &str, keywords: &KeywordTable) -> bool {
    let lower = normalize_whitespace(text).to_lowercase();

    if keywords
        .section_terminators
        .iter()
        .any(|t| lower.starts_with(t.as_str()))
    {
        return true;
    }

    keywords.set_prefixes.iter().any(|prefix| {
        lower
            .strip_prefix(prefix.as_str())
            .map(|rest| rest.trim_start().starts_with(|c: char| c.is_ascii_digit()))
            .unwrap_or(false)
    })
}

/// Whether the line is the statistic column header row.
pub fn is_header_row(text: &str, keywords: &KeywordTable) -> bool {
    let lower = text.to_lowercase();
    keywords
        .header_rows
        .iter()
        .any(|group| !group.is_empty() && group.iter().all(|k| lower.contains(k.as_str())))
}

/// Extract the team name from a team header line.
///
/// Column keywords trailing the name ("TEAM ALPHA Vote Points ...") and
/// score suffixes ("Team Alpha 3") are removed first. The rest must be a
/// capitalised word or phrase, or two such phrases joined by a hyphen for
/// headers naming both teams; in that case the whole joined text is the name.
///
/// # Examples
///
/// ```
/// use volley_report::report::classify::team_header_name;
/// use volley_report::report::keywords::Locale;
///
/// let keywords = Locale::English.keywords();
/// assert_eq!(team_header_name("TEAM ALPHA", &keywords).as_deref(), Some("TEAM ALPHA"));
/// assert_eq!(team_header_name("Team Alpha 3", &keywords).as_deref(), Some("Team Alpha"));
/// assert_eq!(team_header_name("7 Ana Silva 12", &keywords), None);
/// ```
pub fn team_header_name(text: &str, keywords: &KeywordTable) -> Option<String> {
    let normalized = normalize_whitespace(text);
    if normalized.is_empty() {
        return None;
    }

    let kept: Vec<&str> = normalized
        .split(' ')
        .take_while(|word| !keywords.is_stat_keyword(word))
        .collect();
    let without_keywords = kept.join(" ");
    let candidate = RE_SCORE_SUFFIX.replace(&without_keywords, "");
    let candidate = candidate.trim().trim_end_matches(['-', '–']).trim();

    if candidate.is_empty() || candidate.chars().count() > MAX_TEAM_HEADER_LEN {
        return None;
    }

    let parts: Vec<&str> = RE_TEAM_SEPARATOR.split(candidate).collect();
    if parts.len() > 2 || parts.iter().any(|p| !RE_TEAM_NAME.is_match(p)) {
        return None;
    }

    Some(candidate.to_string())
}

/// Whether the line is a team header.
pub fn is_team_header(text: &str, keywords: &KeywordTable) -> bool {
    team_header_name(text, keywords).is_some()
}
