use dialoguer::{theme::ColorfulTheme, Select};
use tracing::error;

use crate::cli::cli::MenuAction;
use crate::models::{CliApp, Result};

impl CliApp {
    pub async fn run(&self) -> Result<()> {
        println!("\n🚀 Welcome to Contact Harvester!");
        println!("═══════════════════════════════════════");

        loop {
            let actions = vec![
                MenuAction::SearchAndCrawl,
                MenuAction::CrawlUrlList,
                MenuAction::Exit,
            ];

            let selection = Select::with_theme(&ColorfulTheme::default())
                .with_prompt("\nSelect an action")
                .default(0)
                .items(&actions)
                .interact()?;

            match &actions[selection] {
                MenuAction::SearchAndCrawl => {
                    if let Err(e) = self.run_search_crawl().await {
                        error!("Search crawl failed: {}", e);
                    }
                }
                MenuAction::CrawlUrlList => {
                    if let Err(e) = self.run_url_list().await {
                        error!("URL list crawl failed: {}", e);
                    }
                }
                MenuAction::Exit => {
                    println!("\n👋 Thanks for using Contact Harvester!");
                    break;
                }
            }
        }

        Ok(())
    }
}
