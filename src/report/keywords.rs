//! Recognised report keywords, one table per locale.
//!
//! Scouting reports come out of the same vendor template in English or
//! Portuguese. Every phrase the segmenter and column inference look for is
//! listed here instead of being embedded in regexes.

use serde::{Deserialize, Serialize};

/// Report language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// English template
    English,
    /// Portuguese template
    Portuguese,
}

impl Locale {
    /// Parse a locale name or code (`"en"`, `"english"`, `"pt"`, `"portuguese"`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "en" | "english" => Some(Locale::English),
            "pt" | "pt-br" | "pt-pt" | "portuguese" => Some(Locale::Portuguese),
            _ => None,
        }
    }

    /// Keyword table for this locale alone.
    pub fn keywords(self) -> KeywordTable {
        match self {
            Locale::English => KeywordTable {
                players_total: vec!["players total".into()],
                section_terminators: vec![
                    "points won".into(),
                    "head coach".into(),
                    "assistant".into(),
                ],
                set_prefixes: vec!["set".into()],
                header_rows: vec![vec!["pos%".into(), "vote".into(), "blo".into()]],
                vote: vec!["vote".into()],
                stat_keywords: words(&[
                    "vote", "points", "point", "pts", "tot", "total", "serve", "serves", "reception",
                    "receptions", "attack", "attacks", "blo", "block", "blocks", "bk", "err",
                    "pos%", "exc%", "won", "lost", "w-l", "set", "sets", "score",
                ]),
            },
            Locale::Portuguese => KeywordTable {
                players_total: vec!["total jogadores".into(), "jogadores total".into()],
                section_terminators: vec![
                    "pontos ganhos".into(),
                    "treinador".into(),
                    "assistente".into(),
                    "adjunto".into(),
                ],
                set_prefixes: vec!["set".into(), "parcial".into()],
                header_rows: vec![vec!["pos%".into(), "voto".into(), "blo".into()]],
                vote: vec!["voto".into()],
                stat_keywords: words(&[
                    "voto", "pontos", "pts", "tot", "total", "serviço", "servico", "saque",
                    "recepção", "recepcao", "ataque", "ataques", "blo", "bloco", "bk", "err",
                    "erro", "pos%", "exc%", "ganhos", "perdidos", "set", "sets", "resultado",
                ]),
            },
        }
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

/// Lowercase keyword sets consulted during segmentation and column inference.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KeywordTable {
    /// Phrases marking the end of a team's player table ("players total")
    pub players_total: Vec<String>,
    /// Line prefixes that end the current team section
    pub section_terminators: Vec<String>,
    /// Words that, followed by a number, start a per-set section ("Set 1")
    pub set_prefixes: Vec<String>,
    /// Keyword groups; a line containing every keyword of a group is the column header row
    pub header_rows: Vec<Vec<String>>,
    /// Header token that follows the last set column
    pub vote: Vec<String>,
    /// Column-header words stripped from the end of team header lines
    pub stat_keywords: Vec<String>,
}

impl KeywordTable {
    /// Union of the tables of every given locale, in the given order.
    ///
    /// # Examples
    ///
    /// ```
    /// use volley_report::report::keywords::{KeywordTable, Locale};
    ///
    /// let table = KeywordTable::for_locales(&[Locale::English, Locale::Portuguese]);
    /// assert!(table.vote.contains(&"vote".to_string()));
    /// assert!(table.vote.contains(&"voto".to_string()));
    /// ```
    pub fn for_locales(locales: &[Locale]) -> Self {
        let mut table = KeywordTable::default();
        for locale in locales {
            table.merge(locale.keywords());
        }
        table
    }

    fn merge(&mut self, other: KeywordTable) {
        extend_unique(&mut self.players_total, other.players_total);
        extend_unique(&mut self.section_terminators, other.section_terminators);
        extend_unique(&mut self.set_prefixes, other.set_prefixes);
        extend_unique(&mut self.header_rows, other.header_rows);
        extend_unique(&mut self.vote, other.vote);
        extend_unique(&mut self.stat_keywords, other.stat_keywords);
    }

    /// Whether `word` (any case) is the vote column header.
    pub fn is_vote(&self, word: &str) -> bool {
        let lower = word.to_lowercase();
        self.vote.iter().any(|v| *v == lower)
    }

    /// Whether `word` (any case) is a stat column keyword.
    pub fn is_stat_keyword(&self, word: &str) -> bool {
        let lower = word.to_lowercase();
        self.stat_keywords.iter().any(|k| *k == lower)
    }
}

fn extend_unique<T: PartialEq>(target: &mut Vec<T>, items: Vec<T>) {
    for item in items {
        if !target.contains(&item) {
            target.push(item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_from_name() {
        assert_eq!(Locale::from_name("EN"), Some(Locale::English));
        assert_eq!(Locale::from_name("portuguese"), Some(Locale::Portuguese));
        assert_eq!(Locale::from_name("fr"), None);
    }

    #[test]
    fn test_union_has_no_duplicates() {
        let table = KeywordTable::for_locales(&[Locale::English, Locale::Portuguese]);
        let sets = table.set_prefixes.iter().filter(|p| *p == "set").count();
        assert_eq!(sets, 1);
        assert_eq!(table.header_rows.len(), 2);
    }

    #[test]
    fn test_vote_matching_ignores_case() {
        let table = Locale::English.keywords();
        assert!(table.is_vote("Vote"));
        assert!(!table.is_vote("Voto"));
    }

    #[test]
    fn test_empty_locale_list_gives_empty_table() {
        assert_eq!(KeywordTable::for_locales(&[]), KeywordTable::default());
    }
}
