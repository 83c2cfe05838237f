//! Match report reconstruction.
//!
//! Rebuilds the per-player statistics table of a volleyball scouting report
//! from positioned text:
//!
//! 1. tokens are clustered into lines ([`crate::layout`])
//! 2. lines are segmented into teams and player rows ([`segment`])
//! 3. column anchors are inferred from the header row or the widest player row ([`columns`])
//! 4. every player's stat tokens are mapped onto the columns ([`mapping`])
//!
//! Each parse builds fresh state; a [`MatchReportParser`] can be reused and
//! shared freely.

pub mod classify;
pub mod columns;
pub mod keywords;
pub mod mapping;
pub mod metadata;
pub mod payload;
pub mod player;
pub mod segment;

use std::path::Path;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::config::ReportConfig;
use crate::error::{Error, Result};
use crate::extractors::{extract_tokens, LopdfTextSource, TextItemSource};
use crate::layout::{cluster_tokens_into_lines, Line, PositionedToken};

pub use columns::{column_labels, infer_anchors, AnchorInference, AnchorStrategy, ColumnAnchor};
pub use keywords::{KeywordTable, Locale};
pub use mapping::map_stat_tokens;
pub use metadata::{detect_metadata, MatchMetadata};
pub use payload::{MatchReportPayload, MatchReportPlayer, TeamReport};
pub use player::{parse_player_line, RawPlayerRecord};
pub use segment::{segment_lines, Segmentation};

use payload::format_generated_at;

/// Turns a report document into a [`MatchReportPayload`].
///
/// # Examples
///
/// ```
/// use volley_report::layout::PositionedToken;
/// use volley_report::report::MatchReportParser;
///
/// let rows = ["Team Alpha", "7 Ana Silva 12 . 3", "Players Total"];
/// let tokens: Vec<PositionedToken> = rows
///     .iter()
///     .enumerate()
///     .map(|(i, text)| PositionedToken::new(*text, 30.0, 700.0 - i as f32 * 15.0, 150.0, 8.0, 1))
///     .collect();
///
/// let payload = MatchReportParser::default().parse_tokens(&tokens).unwrap();
/// assert_eq!(payload.teams[0].team, "Team Alpha");
/// assert_eq!(payload.teams[0].players[0].stats["Set 1"], "12");
/// ```
#[derive(Debug, Clone)]
pub struct MatchReportParser {
    config: ReportConfig,
    keywords: KeywordTable,
}

impl MatchReportParser {
    /// Create a parser, rejecting unusable configuration values.
    pub fn new(config: ReportConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: ReportConfig) -> Self {
        let keywords = config.keywords();
        Self { config, keywords }
    }

    /// The active configuration.
    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// The active keyword table.
    pub fn keywords(&self) -> &KeywordTable {
        &self.keywords
    }

    /// Reconstruct lines without parsing them further.
    pub fn lines(&self, tokens: &[PositionedToken]) -> Vec<Line> {
        cluster_tokens_into_lines(tokens, self.config.line_tolerance)
    }

    /// Parse positioned tokens, stamping the payload with the current time.
    pub fn parse_tokens(&self, tokens: &[PositionedToken]) -> Result<MatchReportPayload> {
        self.parse_tokens_at(tokens, Utc::now())
    }

    /// Parse positioned tokens with an explicit generation time.
    pub fn parse_tokens_at(
        &self,
        tokens: &[PositionedToken],
        generated_at: DateTime<Utc>,
    ) -> Result<MatchReportPayload> {
        let lines = self.lines(tokens);
        self.parse_lines_at(&lines, generated_at)
    }

    /// Parse already reconstructed lines.
    pub fn parse_lines(&self, lines: &[Line]) -> Result<MatchReportPayload> {
        self.parse_lines_at(lines, Utc::now())
    }

    /// Parse already reconstructed lines with an explicit generation time.
    ///
    /// # Errors
    ///
    /// [`Error::NoPlayersFound`] when no player row is recognised; the error
    /// carries the date and time found on the document.
    pub fn parse_lines_at(
        &self,
        lines: &[Line],
        generated_at: DateTime<Utc>,
    ) -> Result<MatchReportPayload> {
        let metadata = detect_metadata(lines);

        let segmentation = segment_lines(lines, &self.keywords, self.config.number_search_window);
        if segmentation.is_empty() {
            log::info!("No player rows in {} lines", lines.len());
            return Err(Error::NoPlayersFound { metadata });
        }

        let inference = infer_anchors(
            &segmentation.players,
            lines,
            segmentation.last_player_line_index,
            &self.config,
            &self.keywords,
        );
        let labels = column_labels(inference.detected_set_count, &self.config.fixed_columns);

        let mut teams: IndexMap<String, Vec<MatchReportPlayer>> = IndexMap::new();
        for player in &segmentation.players {
            let cells = map_stat_tokens(
                &player.stat_tokens,
                inference.anchors.as_deref(),
                labels.len(),
                &self.config,
            );
            teams
                .entry(player.team.clone())
                .or_default()
                .push(MatchReportPlayer {
                    number: player.number,
                    name: player.name.clone(),
                    stats: labels.iter().cloned().zip(cells).collect(),
                });
        }

        let teams: Vec<TeamReport> = teams
            .into_iter()
            .map(|(team, mut players)| {
                players.sort_by_key(|p| p.number);
                TeamReport { team, players }
            })
            .collect();

        log::info!(
            "Parsed {} players in {} teams ({} set columns, anchors: {:?})",
            segmentation.players.len(),
            teams.len(),
            inference.detected_set_count,
            inference.strategy
        );

        Ok(MatchReportPayload {
            generated_at: format_generated_at(generated_at),
            set_columns: inference.detected_set_count,
            column_labels: labels,
            match_date: metadata.date_string(),
            match_time: metadata.time_string(),
            teams,
        })
    }

    /// Extract and parse every page of a text item source.
    pub fn parse_source(&self, source: &dyn TextItemSource) -> Result<MatchReportPayload> {
        let tokens = extract_tokens(source)?;
        self.parse_tokens(&tokens)
    }

    /// Decode and parse a PDF held in memory.
    pub fn parse_pdf_bytes(&self, bytes: &[u8]) -> Result<MatchReportPayload> {
        let source = LopdfTextSource::from_bytes(bytes)?;
        self.parse_source(&source)
    }

    /// Decode and parse a PDF file.
    pub fn parse_pdf_file<P: AsRef<Path>>(&self, path: P) -> Result<MatchReportPayload> {
        let path = path.as_ref();
        log::info!("Parsing report {}", path.display());
        let source = LopdfTextSource::open(path)?;
        self.parse_source(&source)
    }
}

impl Default for MatchReportParser {
    fn default() -> Self {
        Self::from_valid(ReportConfig::default())
    }
}
