use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use crate::config::CrawlConfig;
use crate::crawler::fetcher::PageFetcher;

/// Finds the most likely URL of a dedicated contacts page: first by probing
/// conventional paths, then by scanning link text for contact keywords, with
/// "about" pages as a last resort.
pub struct ContactsPageLocator {
    paths: Vec<String>,
    priority_keywords: Vec<String>,
    fallback_keywords: Vec<String>,
}

impl ContactsPageLocator {
    pub fn new(config: &CrawlConfig) -> Self {
        Self {
            paths: config.contact_paths.clone(),
            priority_keywords: config.priority_link_keywords.clone(),
            fallback_keywords: config.fallback_link_keywords.clone(),
        }
    }

    pub async fn locate(
        &self,
        fetcher: &PageFetcher,
        main_page: &str,
        base_url: &str,
    ) -> Option<String> {
        let base = Url::parse(base_url).ok()?;

        for path in &self.paths {
            if let Ok(candidate) = base.join(path) {
                if fetcher.probe(candidate.as_str()).await {
                    debug!("contacts page found by probe: {}", candidate);
                    return Some(candidate.to_string());
                }
            }
        }

        let hrefs = collect_hrefs(main_page);

        for keywords in [&self.priority_keywords, &self.fallback_keywords] {
            if let Some(url) = self.scan_links(&hrefs, keywords, &base) {
                debug!("contacts page found by link scan: {}", url);
                return Some(url);
            }
        }

        None
    }

    fn scan_links(&self, hrefs: &[String], keywords: &[String], base: &Url) -> Option<String> {
        for href in hrefs {
            let lower = href.to_lowercase();
            if keywords.iter().any(|k| lower.contains(k.as_str())) {
                if let Ok(resolved) = base.join(href) {
                    return Some(resolved.to_string());
                }
            }
        }
        None
    }
}

fn collect_hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    document
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .map(|h| h.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CrawlConfig;

    fn parts() -> (ContactsPageLocator, PageFetcher) {
        let config = CrawlConfig::default();
        (
            ContactsPageLocator::new(&config),
            PageFetcher::new(&config).unwrap(),
        )
    }

    #[tokio::test]
    async fn direct_path_probe_wins() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("HEAD", "/contacts.html")
            .with_status(200)
            .create_async()
            .await;

        let (locator, fetcher) = parts();
        let found = locator
            .locate(&fetcher, "<html></html>", &server.url())
            .await
            .unwrap();
        assert!(found.ends_with("/contacts.html"));
    }

    #[tokio::test]
    async fn falls_back_to_priority_link_scan() {
        let mut server = mockito::Server::new_async().await;
        // No mocks for the probe paths: every HEAD comes back 501.
        let html = r#"<a href="/o-nas">О нас</a><a href="/kontakty-firmy">Контакты</a>"#;

        let (locator, fetcher) = parts();
        let found = locator.locate(&fetcher, html, &server.url()).await.unwrap();
        assert!(found.ends_with("/kontakty-firmy"));
    }

    #[tokio::test]
    async fn about_link_used_only_without_contact_links() {
        let mut server = mockito::Server::new_async().await;
        let html = r#"<a href="/news">Новости</a><a href="/o-nas">О нас</a>"#;

        let (locator, fetcher) = parts();
        let found = locator.locate(&fetcher, html, &server.url()).await.unwrap();
        assert!(found.ends_with("/o-nas"));
    }

    #[tokio::test]
    async fn absent_when_nothing_matches() {
        let mut server = mockito::Server::new_async().await;
        let html = r#"<a href="/catalog">Каталог</a>"#;

        let (locator, fetcher) = parts();
        assert!(locator.locate(&fetcher, html, &server.url()).await.is_none());
    }
}
