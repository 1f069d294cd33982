use async_trait::async_trait;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::crawler::engine::SiteEngine;
use crate::models::{BatchStats, ExtractionRecord, Result};

/// Raised through the sink when a batch accumulates failures in bulk.
#[derive(Debug, Clone)]
pub struct FailureAlert {
    pub batch_id: Uuid,
    pub query: Option<String>,
    pub failed: usize,
    pub processed: usize,
}

/// Receiver for progress updates and failure alerts. Delivery errors are
/// logged and swallowed; a broken sink must never abort a batch.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn progress(&self, processed: usize, total: usize, stats: &BatchStats) -> Result<()>;
    async fn failure_alert(&self, alert: &FailureAlert) -> Result<()>;
}

/// Default sink: structured log lines only.
pub struct LogProgressSink;

#[async_trait]
impl ProgressSink for LogProgressSink {
    async fn progress(&self, processed: usize, total: usize, stats: &BatchStats) -> Result<()> {
        info!(
            "📊 processed {}/{} sites ({} emails, {} phones, {} telegram)",
            processed, total, stats.emails_found, stats.phones_found, stats.telegram_found
        );
        Ok(())
    }

    async fn failure_alert(&self, alert: &FailureAlert) -> Result<()> {
        warn!(
            "⚠️ batch {} accumulating failures: {}/{} (query: {})",
            alert.batch_id,
            alert.failed,
            alert.processed,
            alert.query.as_deref().unwrap_or("-")
        );
        Ok(())
    }
}

/// Drives the site engine over an ordered URL list, one site at a time, with
/// a hard wall-clock budget per site. Output order matches input order.
pub struct BatchCrawler {
    engine: SiteEngine,
    per_site_timeout: Duration,
    small_batch_threshold: usize,
    progress_interval: usize,
}

impl BatchCrawler {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            engine: SiteEngine::new(config)?,
            per_site_timeout: Duration::from_secs(config.crawl.per_site_timeout_seconds),
            small_batch_threshold: config.crawl.small_batch_threshold,
            progress_interval: config.crawl.progress_interval,
        })
    }

    pub async fn run(
        &self,
        urls: &[String],
        query: Option<&str>,
        sink: &dyn ProgressSink,
    ) -> (Vec<ExtractionRecord>, BatchStats) {
        let batch_id = Uuid::new_v4();
        let total = urls.len();
        let mut records = Vec::with_capacity(total);
        let mut stats = BatchStats::default();

        info!("🚀 batch {} starting: {} sites", batch_id, total);

        // Small batches report every site; large ones are throttled so a
        // rate-limited progress channel is not flooded.
        let interval = if total <= self.small_batch_threshold {
            1
        } else {
            self.progress_interval.max(1)
        };

        for (i, url) in urls.iter().enumerate() {
            let processed = i + 1;
            let mut newly_failed = false;

            // Expiry drops the in-flight future, so an abandoned fetch can
            // never deliver a late result into the next site's slot.
            match tokio::time::timeout(self.per_site_timeout, self.engine.extract(url)).await {
                Ok(record) => {
                    if record.success {
                        stats.phones_found += record.phones.len();
                        stats.emails_found += record.emails.len();
                        stats.telegram_found += record.telegram.len();
                    } else {
                        stats.error_count += 1;
                        newly_failed = true;
                    }
                    records.push(record);
                }
                Err(_) => {
                    warn!("⏱️ site {} exceeded {:?}, abandoned", url, self.per_site_timeout);
                    stats.timeout_count += 1;
                    newly_failed = true;
                    records.push(ExtractionRecord::failed(url, ""));
                }
            }

            stats.processed = processed;

            if processed % interval == 0 || processed == total {
                if let Err(e) = sink.progress(processed, total, &stats).await {
                    warn!("progress update failed: {}", e);
                }
            }

            if newly_failed && stats.failed() >= 5 && stats.failed() % 5 == 0 {
                let alert = FailureAlert {
                    batch_id,
                    query: query.map(|q| q.to_string()),
                    failed: stats.failed(),
                    processed,
                };
                if let Err(e) = sink.failure_alert(&alert).await {
                    warn!("failure alert not delivered: {}", e);
                }
            }
        }

        info!(
            "🏁 batch {} done: {}/{} sites, {} timeouts, {} errors",
            batch_id,
            total - stats.failed(),
            total,
            stats.timeout_count,
            stats.error_count
        );

        (records, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        progress: Mutex<Vec<usize>>,
        alerts: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl ProgressSink for RecordingSink {
        async fn progress(&self, processed: usize, _total: usize, _stats: &BatchStats) -> Result<()> {
            self.progress.lock().unwrap().push(processed);
            Ok(())
        }

        async fn failure_alert(&self, alert: &FailureAlert) -> Result<()> {
            self.alerts.lock().unwrap().push(alert.failed);
            Ok(())
        }
    }

    struct FailingSink;

    #[async_trait]
    impl ProgressSink for FailingSink {
        async fn progress(&self, _: usize, _: usize, _: &BatchStats) -> Result<()> {
            Err("sink is down".into())
        }

        async fn failure_alert(&self, _: &FailureAlert) -> Result<()> {
            Err("sink is down".into())
        }
    }

    fn crawler_with_timeout(ms: u64) -> BatchCrawler {
        let mut config = Config::default();
        config.crawl.probe_timeout_seconds = 1;
        let mut crawler = BatchCrawler::new(&config).unwrap();
        crawler.per_site_timeout = Duration::from_millis(ms);
        crawler
    }

    /// Accepts connections and then goes silent, so a fetch hangs until the
    /// per-site budget expires.
    async fn hanging_server() -> (tokio::net::TcpListener, String) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        (listener, url)
    }

    #[tokio::test]
    async fn order_preserved_and_timeout_classified() {
        let mut server = mockito::Server::new_async().await;
        let _ok = server
            .mock("GET", "/")
            .with_body("<title>Ok Site</title><p>sales@oksite.ru</p>")
            .expect_at_least(1)
            .create_async()
            .await;

        let (_listener, hang_url) = hanging_server().await;
        let urls = vec![
            server.url(),
            hang_url.clone(),
            format!("{}/", server.url()),
        ];

        let crawler = crawler_with_timeout(500);
        let sink = RecordingSink::default();
        let (records, stats) = crawler.run(&urls, None, &sink).await;

        assert_eq!(records.len(), 3);
        for (record, url) in records.iter().zip(&urls) {
            assert_eq!(&record.url, url);
        }
        assert!(records[0].success);
        assert!(!records[1].success);
        assert!(records[2].success);
        assert_eq!(stats.timeout_count, 1);
        assert_eq!(stats.error_count, 0);
        assert_eq!(stats.processed, 3);
    }

    #[tokio::test]
    async fn progress_is_monotonic_and_ends_at_total() {
        let mut server = mockito::Server::new_async().await;
        let _ok = server
            .mock("GET", "/")
            .with_body("<p>ok</p>")
            .expect_at_least(1)
            .create_async()
            .await;

        let urls: Vec<String> = (0..4).map(|_| server.url()).collect();
        let crawler = crawler_with_timeout(5000);
        let sink = RecordingSink::default();
        let (_, _) = crawler.run(&urls, None, &sink).await;

        let progress = sink.progress.lock().unwrap().clone();
        assert_eq!(*progress.last().unwrap(), 4);
        assert!(progress.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn fetch_errors_counted_separately_from_timeouts() {
        // Nothing listens on port 1: every site is an immediate fetch error.
        let urls: Vec<String> = (0..2).map(|_| "http://127.0.0.1:1/".to_string()).collect();
        let crawler = crawler_with_timeout(5000);
        let sink = RecordingSink::default();
        let (records, stats) = crawler.run(&urls, None, &sink).await;

        assert_eq!(stats.error_count, 2);
        assert_eq!(stats.timeout_count, 0);
        assert!(records.iter().all(|r| !r.success));
    }

    #[tokio::test]
    async fn alert_fires_at_five_failures_with_query() {
        let urls: Vec<String> = (0..6).map(|_| "http://127.0.0.1:1/".to_string()).collect();
        let crawler = crawler_with_timeout(5000);
        let sink = RecordingSink::default();
        let (_, stats) = crawler.run(&urls, Some("мебель москва"), &sink).await;

        assert_eq!(stats.error_count, 6);
        assert_eq!(*sink.alerts.lock().unwrap(), vec![5]);
    }

    #[tokio::test]
    async fn zero_progress_interval_reports_every_site() {
        let urls: Vec<String> = (0..3).map(|_| "http://127.0.0.1:1/".to_string()).collect();
        let mut crawler = crawler_with_timeout(5000);
        crawler.small_batch_threshold = 0;
        crawler.progress_interval = 0;
        let sink = RecordingSink::default();
        let (records, _) = crawler.run(&urls, None, &sink).await;

        assert_eq!(records.len(), 3);
        assert_eq!(*sink.progress.lock().unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn broken_sink_does_not_abort_batch() {
        let urls: Vec<String> = (0..5).map(|_| "http://127.0.0.1:1/".to_string()).collect();
        let crawler = crawler_with_timeout(5000);
        let (records, stats) = crawler.run(&urls, None, &FailingSink).await;

        assert_eq!(records.len(), 5);
        assert_eq!(stats.processed, 5);
    }
}
