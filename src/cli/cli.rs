use tracing::{info, warn};

use crate::config::Config;
use crate::crawler::BatchCrawler;
use crate::models::{CliApp, Result};
use crate::search::SearchPipeline;

#[derive(Debug, Clone)]
pub enum MenuAction {
    SearchAndCrawl,
    CrawlUrlList,
    Exit,
}

impl std::fmt::Display for MenuAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MenuAction::SearchAndCrawl => {
                write!(f, "🔍 Search: find companies and collect their contacts")
            }
            MenuAction::CrawlUrlList => write!(f, "📋 URL list: crawl sites from a file"),
            MenuAction::Exit => write!(f, "🚪 Exit"),
        }
    }
}

impl CliApp {
    pub fn new(config: Config) -> Result<Self> {
        let crawler = BatchCrawler::new(&config)?;

        let search = match SearchPipeline::from_env(config.search.clone()) {
            Some(pipeline) => {
                info!("search pipeline ready");
                Some(pipeline?)
            }
            None => {
                warn!("YANDEX_API_KEY not set; search mode disabled");
                None
            }
        };

        Ok(Self {
            config,
            search,
            crawler,
        })
    }
}
