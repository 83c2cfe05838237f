//! Parse volleyball match reports
//!
//! Rebuilds the player statistics table of one or more report PDFs and prints
//! the JSON payload, writes it to a directory, or submits it to a report store.
//!
//! Usage:
//!   cargo run --release --bin parse_match_report -- report.pdf
//!   cargo run --release --bin parse_match_report -- --sets 5 --locale pt report.pdf
//!   cargo run --release --bin parse_match_report -- --store reports/ a.pdf b.pdf
//!   cargo run --release --bin parse_match_report -- --items page_items.json --dump-lines

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use volley_report::config::ReportConfig;
use volley_report::extractors::{extract_tokens, JsonTextSource, LopdfTextSource, TextItemSource};
use volley_report::report::{Locale, MatchReportParser, MatchReportPayload};
use volley_report::submit::{JsonFileSink, ReportSink};
use volley_report::{Error, Result};

/// Rebuild the statistics table of volleyball match report PDFs.
#[derive(Parser, Debug)]
#[command(name = "parse_match_report")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Report PDF files
    #[arg(required_unless_present = "items")]
    files: Vec<PathBuf>,

    /// JSON file of pre-extracted text items, one array per page
    #[arg(long, value_name = "FILE")]
    items: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of set columns when the header row does not show it
    #[arg(short, long)]
    sets: Option<usize>,

    /// Keyword locale (repeatable): en, pt
    #[arg(short, long = "locale", value_name = "LOCALE")]
    locales: Vec<String>,

    /// Vertical tolerance for grouping tokens into lines
    #[arg(long)]
    line_tolerance: Option<f32>,

    /// Print the reconstructed lines instead of the payload
    #[arg(long, action = ArgAction::SetTrue)]
    dump_lines: bool,

    /// Store payloads as JSON files in this directory
    #[arg(long, value_name = "DIR")]
    store: Option<PathBuf>,

    /// POST payloads to this report store URL
    #[cfg(feature = "http")]
    #[arg(long, value_name = "URL")]
    submit_url: Option<String>,

    /// Bearer token for --submit-url
    #[cfg(feature = "http")]
    #[arg(long)]
    token: Option<String>,

    /// Verbose logging
    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut builder = env_logger::Builder::from_default_env();
    if args.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();

    let parser = match build_parser(&args) {
        Ok(parser) => parser,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        },
    };

    let sinks = match build_sinks(&args) {
        Ok(sinks) => sinks,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        },
    };

    let mut failures = 0;

    if let Some(items) = &args.items {
        if let Err(e) = run_items(&parser, items, &args, &sinks) {
            report_failure(items, &e);
            failures += 1;
        }
    }

    for file in &args.files {
        if let Err(e) = run_pdf(&parser, file, &args, &sinks) {
            report_failure(file, &e);
            failures += 1;
        }
    }

    if failures > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn build_parser(args: &Args) -> Result<MatchReportParser> {
    let mut config = match &args.config {
        Some(path) => ReportConfig::from_json_file(path)?,
        None => ReportConfig::new(),
    };

    if let Some(sets) = args.sets {
        config = config.with_set_count(sets);
    }
    if let Some(tolerance) = args.line_tolerance {
        config = config.with_line_tolerance(tolerance);
    }
    if !args.locales.is_empty() {
        let locales = args
            .locales
            .iter()
            .map(|name| {
                Locale::from_name(name)
                    .ok_or_else(|| Error::InvalidConfig(format!("unknown locale '{}'", name)))
            })
            .collect::<Result<Vec<_>>>()?;
        config = config.with_locales(locales);
    }

    MatchReportParser::new(config)
}

fn build_sinks(args: &Args) -> Result<Vec<Box<dyn ReportSink>>> {
    let mut sinks: Vec<Box<dyn ReportSink>> = Vec::new();

    if let Some(dir) = &args.store {
        sinks.push(Box::new(JsonFileSink::new(dir)));
    }

    add_http_sink(args, &mut sinks)?;
    Ok(sinks)
}

#[cfg(feature = "http")]
fn add_http_sink(args: &Args, sinks: &mut Vec<Box<dyn ReportSink>>) -> Result<()> {
    if let Some(url) = &args.submit_url {
        let mut sink = volley_report::submit::HttpReportSink::new(url.clone())?;
        if let Some(token) = &args.token {
            sink = sink.with_token(token.clone());
        }
        sinks.push(Box::new(sink));
    }
    Ok(())
}

#[cfg(not(feature = "http"))]
fn add_http_sink(_args: &Args, _sinks: &mut Vec<Box<dyn ReportSink>>) -> Result<()> {
    Ok(())
}

fn run_pdf(parser: &MatchReportParser, file: &Path, args: &Args, sinks: &[Box<dyn ReportSink>]) -> Result<()> {
    let source = LopdfTextSource::open(file)?;
    run_source(parser, &source, args, sinks)
}

fn run_items(parser: &MatchReportParser, items: &Path, args: &Args, sinks: &[Box<dyn ReportSink>]) -> Result<()> {
    let source = JsonTextSource::from_json_file(items)?;
    run_source(parser, &source, args, sinks)
}

fn run_source(
    parser: &MatchReportParser,
    source: &dyn TextItemSource,
    args: &Args,
    sinks: &[Box<dyn ReportSink>],
) -> Result<()> {
    if args.dump_lines {
        let tokens = extract_tokens(source)?;
        for (idx, line) in parser.lines(&tokens).iter().enumerate() {
            println!("{:4} p{} y={:8.2}  {}", idx, line.page, line.y, line.text());
        }
        return Ok(());
    }

    let payload = parser.parse_source(source)?;
    emit(&payload, sinks)
}

fn emit(payload: &MatchReportPayload, sinks: &[Box<dyn ReportSink>]) -> Result<()> {
    if sinks.is_empty() {
        println!("{}", payload.to_json_pretty()?);
        return Ok(());
    }

    for sink in sinks {
        let receipt = sink.submit(payload)?;
        println!("Stored match {} (owner {})", receipt.match_id, receipt.owner_id);
    }
    Ok(())
}

fn report_failure(input: &Path, error: &Error) {
    log::debug!("{}: {:?}", input.display(), error);
    eprintln!("{}: {}", input.display(), error.user_message());
    if let Error::NoPlayersFound { metadata } = error {
        if let Some(date) = metadata.date_string() {
            eprintln!("  (match date {} was detected)", date);
        }
    }
}
