//! Serializable match report.
//!
//! Field names follow the JSON contract of the report store (camelCase).

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One player row with its mapped statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchReportPlayer {
    /// Jersey number
    pub number: u32,
    /// Player name
    pub name: String,
    /// Cell value per column label, in column order
    pub stats: IndexMap<String, String>,
}

/// Players of one team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamReport {
    /// Team name as printed in the team header
    pub team: String,
    /// Players ordered by jersey number
    pub players: Vec<MatchReportPlayer>,
}

/// The parsed report, ready for submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchReportPayload {
    /// ISO-8601 UTC timestamp of the parse
    pub generated_at: String,
    /// Number of set columns
    pub set_columns: usize,
    /// Column labels, set columns first
    pub column_labels: Vec<String>,
    /// `YYYY-MM-DD`
    pub match_date: Option<String>,
    /// `HH:MM`, 24h
    pub match_time: Option<String>,
    /// Teams in order of first appearance
    pub teams: Vec<TeamReport>,
}

impl MatchReportPayload {
    /// Total number of players over all teams.
    pub fn player_count(&self) -> usize {
        self.teams.iter().map(|t| t.players.len()).sum()
    }

    /// Look up a team by name.
    pub fn team(&self, name: &str) -> Option<&TeamReport> {
        self.teams.iter().find(|t| t.team == name)
    }

    /// Pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Timestamp in the `generatedAt` format (`2024-03-15T18:00:00.000Z`).
pub fn format_generated_at(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> MatchReportPayload {
        let mut stats = IndexMap::new();
        stats.insert("Set 1".to_string(), "12".to_string());
        stats.insert("Vote".to_string(), ".".to_string());
        MatchReportPayload {
            generated_at: "2024-03-15T18:00:00.000Z".into(),
            set_columns: 1,
            column_labels: vec!["Set 1".into(), "Vote".into()],
            match_date: Some("2024-03-15".into()),
            match_time: None,
            teams: vec![TeamReport {
                team: "TEAM ALPHA".into(),
                players: vec![MatchReportPlayer {
                    number: 7,
                    name: "Ana Silva".into(),
                    stats,
                }],
            }],
        }
    }

    #[test]
    fn test_json_uses_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["setColumns"], 1);
        assert_eq!(json["matchDate"], "2024-03-15");
        assert!(json["matchTime"].is_null());
        assert_eq!(json["generatedAt"], "2024-03-15T18:00:00.000Z");
        assert_eq!(json["teams"][0]["players"][0]["number"], 7);
    }

    #[test]
    fn test_stats_keep_column_order() {
        let json = sample().to_json_pretty().unwrap();
        let set = json.find("\"Set 1\": \"12\"").unwrap();
        let vote = json.find("\"Vote\": \".\"").unwrap();
        assert!(set < vote);
    }

    #[test]
    fn test_generated_at_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 15, 18, 0, 5).unwrap();
        assert_eq!(format_generated_at(at), "2024-03-15T18:00:05.000Z");
    }

    #[test]
    fn test_lookup_helpers() {
        let payload = sample();
        assert_eq!(payload.player_count(), 1);
        assert!(payload.team("TEAM ALPHA").is_some());
        assert!(payload.team("TEAM BETA").is_none());
    }
}
