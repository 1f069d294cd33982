use serde::Serialize;
use tracing::info;

use crate::config::OutputConfig;
use crate::models::{BatchStats, ExtractionRecord, Result};

#[derive(Debug, Serialize)]
pub struct CrawlReport<'a> {
    pub query: Option<&'a str>,
    pub generated_at: String,
    pub total_sites: usize,
    pub stats: &'a BatchStats,
    pub records: &'a [ExtractionRecord],
}

/// Writes the batch result as a timestamped JSON report plus a flat CSV of
/// the same rows. Returns the JSON path.
pub async fn write_report(
    config: &OutputConfig,
    query: Option<&str>,
    records: &[ExtractionRecord],
    stats: &BatchStats,
) -> Result<String> {
    tokio::fs::create_dir_all(&config.directory).await?;
    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");

    let report = CrawlReport {
        query,
        generated_at: chrono::Utc::now().to_rfc3339(),
        total_sites: records.len(),
        stats,
        records,
    };

    let json_path = format!("{}/contacts_{}.json", config.directory, timestamp);
    let json = if config.pretty_json {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    tokio::fs::write(&json_path, json).await?;

    let csv_path = format!("{}/contacts_{}.csv", config.directory, timestamp);
    tokio::fs::write(&csv_path, render_csv(records)).await?;

    info!("📤 report written: {} / {}", json_path, csv_path);
    Ok(json_path)
}

fn render_csv(records: &[ExtractionRecord]) -> String {
    let mut out = String::from("company,website,phones,emails,telegram,address\n");
    for record in records {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            csv_field(&record.company),
            csv_field(&record.url),
            csv_field(&record.phones.join("; ")),
            csv_field(&record.emails.join("; ")),
            csv_field(&record.telegram.join("; ")),
            csv_field(record.address.as_deref().unwrap_or("")),
        ));
    }
    out
}

fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}
