use serde::{Deserialize, Serialize};

use crate::{config::Config, crawler::BatchCrawler, search::SearchPipeline};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// One filtered search result. `url` is absolute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
}

/// Per-site extraction result. Always produced, even when the site could
/// not be fetched at all (empty fields, `success = false`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionRecord {
    pub url: String,
    pub company: String,
    pub address: Option<String>,
    pub phones: Vec<String>,
    pub emails: Vec<String>,
    pub telegram: Vec<String>,
    pub success: bool,
}

impl ExtractionRecord {
    pub fn failed(url: &str, company: &str) -> Self {
        Self {
            url: url.to_string(),
            company: company.to_string(),
            address: None,
            phones: Vec::new(),
            emails: Vec::new(),
            telegram: Vec::new(),
            success: false,
        }
    }

    pub fn has_contacts(&self) -> bool {
        !self.phones.is_empty() || !self.emails.is_empty() || !self.telegram.is_empty()
    }
}

/// Running aggregate over one batch. Counters only ever grow; reset per batch.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BatchStats {
    pub processed: usize,
    pub emails_found: usize,
    pub phones_found: usize,
    pub telegram_found: usize,
    pub error_count: usize,
    pub timeout_count: usize,
}

impl BatchStats {
    pub fn failed(&self) -> usize {
        self.error_count + self.timeout_count
    }
}

pub struct CliApp {
    pub config: Config,
    pub search: Option<SearchPipeline>,
    pub crawler: BatchCrawler,
}
