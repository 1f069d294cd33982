use dialoguer::{theme::ColorfulTheme, Confirm, Input};

use crate::crawler::LogProgressSink;
use crate::models::{BatchStats, CliApp, ExtractionRecord, Result};
use crate::report;

impl CliApp {
    pub async fn run_search_crawl(&self) -> Result<()> {
        println!("\n🔍 Search and Crawl");
        println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        let Some(search) = &self.search else {
            println!("❌ Search is disabled: set YANDEX_API_KEY and YANDEX_FOLDER_ID");
            return Ok(());
        };

        let query: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("Search query (e.g. 'мебельные компании москва')")
            .interact_text()?;

        let max_sites: usize = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("How many sites to collect")
            .default(50)
            .interact_text()?;

        println!("⏳ Searching...");
        let hits = search.search(&query, max_sites).await;

        if hits.is_empty() {
            println!("❌ Nothing found. Try another query.");
            return Ok(());
        }

        println!("✅ Found {} company sites", hits.len());
        for (i, hit) in hits.iter().take(5).enumerate() {
            println!("  {}. {} — {}", i + 1, hit.title, hit.url);
        }
        if hits.len() > 5 {
            println!("  ... and {} more", hits.len() - 5);
        }

        if !Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Collect contacts from these sites?")
            .default(true)
            .interact()?
        {
            return Ok(());
        }

        let urls: Vec<String> = hits.into_iter().map(|h| h.url).collect();
        let (records, stats) = self
            .crawler
            .run(&urls, Some(query.as_str()), &LogProgressSink)
            .await;

        self.finish_batch(Some(query.as_str()), &records, &stats).await
    }

    pub(crate) async fn finish_batch(
        &self,
        query: Option<&str>,
        records: &[ExtractionRecord],
        stats: &BatchStats,
    ) -> Result<()> {
        let with_contacts = records.iter().filter(|r| r.has_contacts()).count();

        println!("\n✅ Done!");
        println!("📊 Sites processed: {}", stats.processed);
        println!("📞 With contacts: {}", with_contacts);
        println!(
            "📧 {} emails, 📞 {} phones, ✈️ {} telegram",
            stats.emails_found, stats.phones_found, stats.telegram_found
        );
        if stats.failed() > 0 {
            println!("⚠️  Problems:");
            if stats.timeout_count > 0 {
                println!("  • timed out: {} sites", stats.timeout_count);
            }
            if stats.error_count > 0 {
                println!("  • failed to load: {} sites", stats.error_count);
            }
        }

        let path = report::write_report(&self.config.output, query, records, stats).await?;
        println!("📎 Report: {}", path);
        Ok(())
    }
}
