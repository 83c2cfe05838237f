// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::too_many_arguments)]
#![allow(clippy::should_implement_trait)]
#![allow(clippy::manual_find)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]

//! # Volley Report
//!
//! Rebuilds the player statistics tables of volleyball scouting reports from
//! their PDF exports.
//!
//! ## Pipeline
//!
//! 1. **Extraction** ([`extractors`]): every page's text is read with its position
//!    (through `lopdf`, or from pre-extracted JSON text items) and normalised to
//!    [`layout::PositionedToken`]s.
//! 2. **Line reconstruction** ([`layout`]): tokens are clustered into visual lines,
//!    top to bottom, page by page.
//! 3. **Segmentation** ([`report::segment`]): team headers, section terminators and
//!    player rows are recognised with locale keyword tables.
//! 4. **Column inference and mapping** ([`report::columns`], [`report::mapping`]):
//!    every stat column gets a horizontal anchor, and each player's stat tokens are
//!    assigned to the nearest free anchor.
//!
//! The result is a [`report::MatchReportPayload`] that serializes to the JSON
//! shape the report store expects, and can be handed to a [`submit::ReportSink`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use volley_report::config::ReportConfig;
//! use volley_report::report::MatchReportParser;
//!
//! # fn main() -> volley_report::Result<()> {
//! let parser = MatchReportParser::new(ReportConfig::new().with_set_count(5))?;
//! let payload = parser.parse_pdf_file("match.pdf")?;
//!
//! for team in &payload.teams {
//!     println!("{}: {} players", team.team, team.players.len());
//! }
//! println!("{}", payload.to_json_pretty()?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - `http`: [`submit::HttpReportSink`], posting reports to a remote store with `reqwest`.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Error handling
pub mod error;

// Configuration
pub mod config;

// Geometry and content stream state
pub mod content;
pub mod geometry;

// Extraction and layout
pub mod extractors;
pub mod layout;

// Report reconstruction
pub mod report;

// Persistence
pub mod submit;

// Re-exports
pub use config::ReportConfig;
pub use error::{Error, Result};
pub use report::{MatchReportParser, MatchReportPayload};

// Internal utilities
pub(crate) mod utils {
    //! Internal utility functions for the library.

    use std::cmp::Ordering;

    /// Total order over floats for sorting; NaN sorts after every number.
    #[inline]
    pub fn safe_float_cmp(a: f32, b: f32) -> Ordering {
        match (a.is_nan(), b.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        }
    }

}

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "volley_report");
    }
}
