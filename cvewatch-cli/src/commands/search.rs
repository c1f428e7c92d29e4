//! `cvewatch search` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use cvewatch_watcher::{AdvisoryFeed, NvdFeed, WatcherConfig};

use crate::cli::SearchArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `search` command.
///
/// Queries the advisory feed directly and renders the raw records.
/// Seen history is not consulted or updated, so repeated searches
/// always show the same results.
pub async fn execute(
    args: SearchArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = super::load_config(config_path).await?;
    let watcher_config = WatcherConfig::from_core(&config);

    let feed = NvdFeed::new(&watcher_config)?;

    info!(query = %args.query, limit = args.limit, "querying advisory feed");
    let advisories = feed.fetch(&args.query, args.limit).await?;

    let records = advisories
        .into_iter()
        .map(|advisory| SearchEntry {
            id: advisory.id,
            published: advisory.published,
            summary: advisory.summary,
        })
        .collect();

    let report = SearchReport {
        query: args.query,
        records,
    };
    writer.render(&report)?;

    Ok(())
}

/// Result of a `search` invocation.
#[derive(Serialize)]
pub struct SearchReport {
    /// The search keyword.
    pub query: String,
    /// Advisory records as returned by the feed.
    pub records: Vec<SearchEntry>,
}

/// A single advisory record.
#[derive(Serialize)]
pub struct SearchEntry {
    /// CVE identifier; absent for malformed feed records.
    pub id: Option<String>,
    /// Publication timestamp as reported by the feed.
    pub published: String,
    /// First description text of the advisory.
    pub summary: String,
}

impl Render for SearchReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "Search: {} ({} record(s))",
            self.query.bold(),
            self.records.len()
        )?;

        if self.records.is_empty() {
            writeln!(w, "{}", "No advisories found.".dimmed())?;
            return Ok(());
        }

        writeln!(w)?;
        for record in &self.records {
            let id = record.id.as_deref().unwrap_or("<no-id>");
            writeln!(w, "{} ({})", id.red().bold(), record.published)?;
            writeln!(w, "  {}", record.summary)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_report_render_records() {
        let report = SearchReport {
            query: "openssl".to_owned(),
            records: vec![SearchEntry {
                id: Some("CVE-2024-1234".to_owned()),
                published: "2024-05-01T10:00:00".to_owned(),
                summary: "Buffer overflow in TLS handshake".to_owned(),
            }],
        };

        let mut buffer = Vec::new();
        report
            .render_text(&mut buffer)
            .expect("text rendering should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("CVE-2024-1234"), "should show CVE id");
        assert!(
            output.contains("Buffer overflow"),
            "should show the summary"
        );
        assert!(output.contains("1 record(s)"), "should show record count");
    }

    #[test]
    fn test_search_report_render_missing_id() {
        let report = SearchReport {
            query: "nginx".to_owned(),
            records: vec![SearchEntry {
                id: None,
                published: "2024-05-01T10:00:00".to_owned(),
                summary: "record without identifier".to_owned(),
            }],
        };

        let mut buffer = Vec::new();
        report
            .render_text(&mut buffer)
            .expect("text rendering should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(
            output.contains("<no-id>"),
            "missing id should render a placeholder"
        );
    }

    #[test]
    fn test_search_report_render_empty() {
        let report = SearchReport {
            query: "no-such-product".to_owned(),
            records: Vec::new(),
        };

        let mut buffer = Vec::new();
        report
            .render_text(&mut buffer)
            .expect("text rendering should succeed");

        let output = String::from_utf8(buffer).expect("valid UTF-8");
        assert!(output.contains("No advisories found"));
    }

    #[test]
    fn test_search_report_json() {
        let report = SearchReport {
            query: "zlib".to_owned(),
            records: vec![SearchEntry {
                id: Some("CVE-2022-37434".to_owned()),
                published: "2022-08-05T07:15:00".to_owned(),
                summary: "heap-based buffer over-read in inflate".to_owned(),
            }],
        };

        let json = serde_json::to_string(&report).expect("JSON serialization should succeed");
        let parsed: serde_json::Value = serde_json::from_str(&json).expect("should parse JSON");

        assert_eq!(parsed["query"].as_str(), Some("zlib"));
        let records = parsed["records"].as_array().expect("should be array");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["id"].as_str(), Some("CVE-2022-37434"));
    }
}
