use tracing::{debug, info, warn};

use crate::config::Config;
use crate::crawler::contacts_page::ContactsPageLocator;
use crate::crawler::fetcher::PageFetcher;
use crate::extractors::{extract_company_name, FieldExtractors};
use crate::models::ExtractionRecord;

/// Single-site extraction: fetch the entry page, pull every field, then try
/// the contacts page and union its results in. Never fails outward; a record
/// comes back for every URL.
pub struct SiteEngine {
    fetcher: PageFetcher,
    locator: ContactsPageLocator,
    extractors: FieldExtractors,
    max_phones: usize,
    max_emails: usize,
    max_telegram: usize,
}

impl SiteEngine {
    pub fn new(config: &Config) -> crate::models::Result<Self> {
        Ok(Self {
            fetcher: PageFetcher::new(&config.crawl)?,
            locator: ContactsPageLocator::new(&config.crawl),
            extractors: FieldExtractors::new(&config.limits, &config.filters),
            max_phones: config.limits.max_phones,
            max_emails: config.limits.max_emails,
            max_telegram: config.limits.max_telegram,
        })
    }

    pub async fn extract(&self, url: &str) -> ExtractionRecord {
        let html = match self.fetcher.fetch_page(url).await {
            Ok(html) => html,
            Err(e) => {
                warn!("failed to fetch {}: {}", url, e);
                return ExtractionRecord::failed(url, "Error loading");
            }
        };

        let mut record = ExtractionRecord {
            url: url.to_string(),
            company: extract_company_name(&html, url),
            address: self.extractors.address.extract(&html),
            phones: self.extractors.phones.extract(&html),
            emails: self.extractors.emails.extract(&html),
            telegram: self.extractors.telegram.extract(&html),
            success: true,
        };

        if let Some(contacts_url) = self.locator.locate(&self.fetcher, &html, url).await {
            if contacts_url != url {
                self.merge_contacts_page(&mut record, &contacts_url).await;
            }
        }

        info!(
            "extracted {}: {} phones, {} emails, {} telegram",
            url,
            record.phones.len(),
            record.emails.len(),
            record.telegram.len()
        );

        record
    }

    /// A contacts page that fails to load is not a failure of the site;
    /// the main-page result stands.
    async fn merge_contacts_page(&self, record: &mut ExtractionRecord, contacts_url: &str) {
        let html = match self.fetcher.fetch_contacts_page(contacts_url).await {
            Ok(html) => html,
            Err(e) => {
                debug!("contacts page {} skipped: {}", contacts_url, e);
                return;
            }
        };

        merge_unique(&mut record.phones, self.extractors.phones.extract(&html), self.max_phones);
        merge_unique(&mut record.emails, self.extractors.emails.extract(&html), self.max_emails);
        merge_unique(
            &mut record.telegram,
            self.extractors.telegram.extract(&html),
            self.max_telegram,
        );
    }
}

fn merge_unique(into: &mut Vec<String>, extra: Vec<String>, cap: usize) {
    for value in extra {
        if !into.contains(&value) {
            into.push(value);
        }
    }
    into.truncate(cap);
}
