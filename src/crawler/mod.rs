pub mod batch;
pub mod contacts_page;
pub mod engine;
pub mod fetcher;

pub use batch::{BatchCrawler, FailureAlert, LogProgressSink, ProgressSink};
pub use contacts_page::ContactsPageLocator;
pub use engine::SiteEngine;
pub use fetcher::PageFetcher;
