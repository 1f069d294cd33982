use dialoguer::{theme::ColorfulTheme, Confirm, Input};

use crate::crawler::LogProgressSink;
use crate::models::{CliApp, Result};

impl CliApp {
    pub async fn run_url_list(&self) -> Result<()> {
        println!("\n📋 Crawl a URL List");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        let path: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Path to a file with one site per line")
            .interact_text()?;

        let content = tokio::fs::read_to_string(&path).await?;
        let urls = normalize_urls(&content);

        if urls.is_empty() {
            println!("❌ No usable URLs in {}", path);
            return Ok(());
        }

        println!("📊 {} sites to crawl", urls.len());
        if !Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Start crawling?")
            .default(true)
            .interact()?
        {
            return Ok(());
        }

        let (records, stats) = self.crawler.run(&urls, None, &LogProgressSink).await;
        self.finish_batch(None, &records, &stats).await
    }
}

/// Bare hosts are accepted; anything without a dot is not a site.
fn normalize_urls(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty() && l.contains('.'))
        .map(|l| {
            if l.starts_with("http") {
                l.to_string()
            } else {
                format!("https://{}", l)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_hosts_get_scheme() {
        let urls = normalize_urls("site1.ru\nhttps://site2.ru\n\nnot a url\n");
        assert_eq!(urls, vec!["https://site1.ru", "https://site2.ru"]);
    }
}
