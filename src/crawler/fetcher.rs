use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::config::CrawlConfig;
use crate::error::FetchError;

/// Bounded-time page fetcher with a browser-like identity. Three clients
/// because reqwest fixes timeout and redirect policy at build time: the
/// primary page gets the generous budget, the contacts page a shorter one,
/// and existence probes the shortest.
pub struct PageFetcher {
    primary: Client,
    contacts: Client,
    probe: Client,
}

impl PageFetcher {
    pub fn new(config: &CrawlConfig) -> crate::models::Result<Self> {
        let build = |timeout_secs: u64, redirects: usize| {
            Client::builder()
                .user_agent(&config.user_agent)
                .timeout(Duration::from_secs(timeout_secs))
                .redirect(reqwest::redirect::Policy::limited(redirects))
                .build()
        };

        Ok(Self {
            primary: build(config.page_timeout_seconds, config.max_redirects)?,
            contacts: build(config.contacts_timeout_seconds, config.contacts_max_redirects)?,
            probe: build(config.probe_timeout_seconds, config.contacts_max_redirects)?,
        })
    }

    pub async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        Self::get_body(&self.primary, url).await
    }

    pub async fn fetch_contacts_page(&self, url: &str) -> Result<String, FetchError> {
        Self::get_body(&self.contacts, url).await
    }

    /// Lightweight existence check. Any failure means "not there."
    pub async fn probe(&self, url: &str) -> bool {
        match self.probe.head(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("probe {} failed: {}", url, e);
                false
            }
        }
    }

    async fn get_body(client: &Client, url: &str) -> Result<String, FetchError> {
        debug!("fetching {}", url);
        let response = client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.text().await?;
        debug!("fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }
}
