use base64::Engine as _;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::models::SearchHit;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitRequest<'a> {
    folder_id: &'a str,
    query: QuerySpec<'a>,
    sort_spec: SortSpec,
    group_spec: GroupSpec,
    max_passages: &'static str,
    response_format: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QuerySpec<'a> {
    search_type: &'static str,
    query_text: &'a str,
    family_mode: &'static str,
    page: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SortSpec {
    sort_mode: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GroupSpec {
    group_mode: &'static str,
    groups_on_page: String,
    docs_in_group: &'static str,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct OperationStatus {
    #[serde(default)]
    done: bool,
    response: Option<OperationResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationResponse {
    raw_data: Option<String>,
}

/// Drives the asynchronous search job API: submit, poll to completion,
/// decode the payload, paginate, and drop aggregator/social domains. Page
/// failures degrade to zero hits; `search` itself never fails.
pub struct SearchPipeline {
    client: Client,
    config: SearchConfig,
    api_key: String,
    folder_id: String,
    url_tag: Regex,
    title_tag: Regex,
    hlword: Regex,
    cdata: Regex,
}

impl SearchPipeline {
    pub fn new(
        config: SearchConfig,
        api_key: String,
        folder_id: String,
    ) -> crate::models::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.submit_timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            config,
            api_key,
            folder_id,
            url_tag: Regex::new(r"<url>(.*?)</url>").expect("url pattern is valid"),
            title_tag: Regex::new(r"<title>(.*?)</title>").expect("title pattern is valid"),
            hlword: Regex::new(r"</?hlword>").expect("hlword pattern is valid"),
            cdata: Regex::new(r"<!\[CDATA\[(.*?)\]\]>").expect("cdata pattern is valid"),
        })
    }

    pub fn from_env(config: SearchConfig) -> Option<crate::models::Result<Self>> {
        let api_key = std::env::var("YANDEX_API_KEY").ok()?;
        let folder_id = std::env::var("YANDEX_FOLDER_ID").unwrap_or_default();
        Some(Self::new(config, api_key, folder_id))
    }

    /// Best-effort search: at most `max_results` filtered hits, in engine
    /// relevance order.
    pub async fn search(&self, query: &str, max_results: usize) -> Vec<SearchHit> {
        let page_size = self.config.page_size.max(1);
        let pages = max_results.div_ceil(page_size);
        let mut hits: Vec<SearchHit> = Vec::new();

        info!("🔍 search: {} (want {} hits, {} pages)", query, max_results, pages);

        for page in 0..pages {
            let page_hits = match self.search_page(query, page).await {
                Ok(page_hits) => page_hits,
                Err(e) => {
                    warn!("search page {} failed: {}", page + 1, e);
                    break;
                }
            };

            if page_hits.is_empty() {
                debug!("page {} empty, search exhausted", page + 1);
                break;
            }

            let raw_count = page_hits.len();
            hits.extend(page_hits.into_iter().filter(|h| !self.is_blocked(&h.url)));
            debug!(
                "page {}: {} raw hits, {} accumulated after filtering",
                page + 1,
                raw_count,
                hits.len()
            );

            if hits.len() >= max_results {
                break;
            }

            if page + 1 < pages {
                tokio::time::sleep(Duration::from_millis(self.config.page_delay_ms)).await;
            }
        }

        hits.truncate(max_results);
        info!("✅ search done: {} hits", hits.len());
        hits
    }

    async fn search_page(&self, query: &str, page: usize) -> Result<Vec<SearchHit>, SearchError> {
        let body = SubmitRequest {
            folder_id: &self.folder_id,
            query: QuerySpec {
                search_type: "SEARCH_TYPE_RU",
                query_text: query,
                family_mode: "FAMILY_MODE_MODERATE",
                page: page.to_string(),
            },
            sort_spec: SortSpec {
                sort_mode: "SORT_MODE_BY_RELEVANCE",
            },
            group_spec: GroupSpec {
                group_mode: "GROUP_MODE_DEEP",
                groups_on_page: self.config.page_size.to_string(),
                docs_in_group: "1",
            },
            max_passages: "2",
            response_format: "FORMAT_XML",
        };

        let response = self
            .client
            .post(&self.config.api_endpoint)
            .header("Authorization", format!("Api-Key {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SearchError::Status(response.status()));
        }

        let submitted: SubmitResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Decode(e.to_string()))?;

        self.poll_operation(&submitted.id).await
    }

    async fn poll_operation(&self, operation_id: &str) -> Result<Vec<SearchHit>, SearchError> {
        let status_url = format!("{}/{}", self.config.operations_endpoint, operation_id);

        for _ in 0..self.config.poll_attempts {
            tokio::time::sleep(Duration::from_millis(self.config.poll_interval_ms)).await;

            let status: OperationStatus = match self
                .client
                .get(&status_url)
                .header("Authorization", format!("Api-Key {}", self.api_key))
                .send()
                .await
                .and_then(|r| r.error_for_status())
            {
                Ok(response) => response
                    .json()
                    .await
                    .map_err(|e| SearchError::Decode(e.to_string()))?,
                Err(e) => {
                    // A flaky status check is not fatal; the next tick retries.
                    warn!("status check for {} failed: {}", operation_id, e);
                    continue;
                }
            };

            if status.done {
                let raw = status.response.and_then(|r| r.raw_data);
                return match raw {
                    Some(raw) => self.decode_results(&raw),
                    None => Ok(Vec::new()),
                };
            }
        }

        // Soft timeout: the server-side job may still be running.
        Err(SearchError::PollTimeout)
    }

    /// The completed payload is base64-encoded XML; url/title elements are
    /// paired positionally.
    fn decode_results(&self, raw_data: &str) -> Result<Vec<SearchHit>, SearchError> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(raw_data)
            .map_err(|e| SearchError::Decode(e.to_string()))?;
        let xml = String::from_utf8_lossy(&bytes);

        let urls: Vec<&str> = self
            .url_tag
            .captures_iter(&xml)
            .map(|c| c.get(1).map_or("", |m| m.as_str()))
            .collect();
        let titles: Vec<&str> = self
            .title_tag
            .captures_iter(&xml)
            .map(|c| c.get(1).map_or("", |m| m.as_str()))
            .collect();

        let hits = urls
            .iter()
            .enumerate()
            .map(|(i, url)| {
                let title = titles.get(i).copied().unwrap_or("");
                let title = self.hlword.replace_all(title, "");
                let title = self.cdata.replace_all(&title, "$1");
                SearchHit {
                    title: title.trim().to_string(),
                    url: url.trim().to_string(),
                }
            })
            .collect();

        Ok(hits)
    }

    fn is_blocked(&self, url: &str) -> bool {
        let url = url.to_lowercase();
        if self.config.blocked_domains.iter().any(|d| url.contains(d.as_str())) {
            return true;
        }
        // The engine's own properties host mirrors of everything.
        url.contains(".yandex.ru") || url.contains("yandex.ru/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchConfig;
    use base64::Engine as _;

    fn fast_config(server_url: &str) -> SearchConfig {
        let mut config = SearchConfig::default();
        config.api_endpoint = format!("{}/searchAsync", server_url);
        config.operations_endpoint = format!("{}/operations", server_url);
        config.poll_interval_ms = 10;
        config.poll_attempts = 3;
        config.page_delay_ms = 10;
        config
    }

    fn pipeline(server_url: &str) -> SearchPipeline {
        SearchPipeline::new(fast_config(server_url), "key".into(), "folder".into()).unwrap()
    }

    fn encoded_payload(hits: &[(&str, &str)]) -> String {
        let xml: String = hits
            .iter()
            .map(|(title, url)| format!("<doc><url>{}</url><title>{}</title></doc>", url, title))
            .collect();
        base64::engine::general_purpose::STANDARD.encode(xml)
    }

    #[tokio::test]
    async fn submits_polls_and_decodes() {
        let mut server = mockito::Server::new_async().await;
        let _submit = server
            .mock("POST", "/searchAsync")
            .with_body(r#"{"id": "op-1"}"#)
            .create_async()
            .await;
        let payload = encoded_payload(&[
            ("<hlword>Мебель</hlword> на заказ", "https://mebel-msk.ru/"),
            ("Спам каталог", "https://zoon.ru/company/1"),
        ]);
        let _status = server
            .mock("GET", "/operations/op-1")
            .with_body(format!(
                r#"{{"done": true, "response": {{"rawData": "{}"}}}}"#,
                payload
            ))
            .create_async()
            .await;

        let hits = pipeline(&server.url()).search("мебель", 10).await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].url, "https://mebel-msk.ru/");
        assert_eq!(hits[0].title, "Мебель на заказ");
    }

    #[tokio::test]
    async fn pending_then_done() {
        let mut server = mockito::Server::new_async().await;
        let _submit = server
            .mock("POST", "/searchAsync")
            .with_body(r#"{"id": "op-2"}"#)
            .create_async()
            .await;
        let payload = encoded_payload(&[("Сайт", "https://firma.ru/")]);
        let polls = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let polls_seen = polls.clone();
        let _status = server
            .mock("GET", "/operations/op-2")
            .with_body_from_request(move |_| {
                if polls.fetch_add(1, std::sync::atomic::Ordering::SeqCst) == 0 {
                    br#"{"done": false}"#.to_vec()
                } else {
                    format!(
                        r#"{{"done": true, "response": {{"rawData": "{}"}}}}"#,
                        payload
                    )
                    .into_bytes()
                }
            })
            .expect_at_least(2)
            .create_async()
            .await;

        let hits = pipeline(&server.url()).search("запрос", 5).await;
        assert_eq!(hits.len(), 1);
        assert!(polls_seen.load(std::sync::atomic::Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn poll_ceiling_degrades_to_zero_hits() {
        let mut server = mockito::Server::new_async().await;
        let _submit = server
            .mock("POST", "/searchAsync")
            .with_body(r#"{"id": "op-3"}"#)
            .create_async()
            .await;
        let _pending = server
            .mock("GET", "/operations/op-3")
            .with_body(r#"{"done": false}"#)
            .expect_at_least(3)
            .create_async()
            .await;

        let hits = pipeline(&server.url()).search("запрос", 5).await;
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn submission_failure_degrades_to_zero_hits() {
        let mut server = mockito::Server::new_async().await;
        let _submit = server
            .mock("POST", "/searchAsync")
            .with_status(500)
            .create_async()
            .await;

        let hits = pipeline(&server.url()).search("запрос", 5).await;
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn truncates_to_max_results() {
        let mut server = mockito::Server::new_async().await;
        let _submit = server
            .mock("POST", "/searchAsync")
            .with_body(r#"{"id": "op-4"}"#)
            .create_async()
            .await;
        let many: Vec<(String, String)> = (0..10)
            .map(|i| (format!("Сайт {}", i), format!("https://site{}.ru/", i)))
            .collect();
        let refs: Vec<(&str, &str)> = many
            .iter()
            .map(|(t, u)| (t.as_str(), u.as_str()))
            .collect();
        let payload = encoded_payload(&refs);
        let _status = server
            .mock("GET", "/operations/op-4")
            .with_body(format!(
                r#"{{"done": true, "response": {{"rawData": "{}"}}}}"#,
                payload
            ))
            .create_async()
            .await;

        let hits = pipeline(&server.url()).search("запрос", 3).await;
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn blocklist_catches_aggregators_and_yandex_hosts() {
        let config = SearchConfig::default();
        let p = SearchPipeline::new(config, "k".into(), "f".into()).unwrap();
        assert!(p.is_blocked("https://www.avito.ru/items/1"));
        assert!(p.is_blocked("https://market.yandex.ru/shop"));
        assert!(p.is_blocked("https://VK.com/company"));
        assert!(!p.is_blocked("https://mebel-msk.ru/"));
    }

    #[test]
    fn decode_rejects_bad_base64() {
        let p = SearchPipeline::new(SearchConfig::default(), "k".into(), "f".into()).unwrap();
        assert!(matches!(
            p.decode_results("not base64!!!"),
            Err(SearchError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn paginates_past_the_first_page_and_stops_at_the_cap() {
        let mut server = mockito::Server::new_async().await;
        // 120 requested hits at 100 per page: two submissions, pages 0 and 1.
        let submit_first = server
            .mock("POST", "/searchAsync")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "query": {"page": "0"}
            })))
            .with_body(r#"{"id": "op-a"}"#)
            .create_async()
            .await;
        let submit_second = server
            .mock("POST", "/searchAsync")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "query": {"page": "1"}
            })))
            .with_body(r#"{"id": "op-b"}"#)
            .create_async()
            .await;

        let page = |offset: usize, count: usize| -> String {
            let hits: Vec<(String, String)> = (offset..offset + count)
                .map(|i| (format!("Сайт {}", i), format!("https://site{}.ru/", i)))
                .collect();
            let refs: Vec<(&str, &str)> = hits
                .iter()
                .map(|(t, u)| (t.as_str(), u.as_str()))
                .collect();
            encoded_payload(&refs)
        };
        let _first = server
            .mock("GET", "/operations/op-a")
            .with_body(format!(
                r#"{{"done": true, "response": {{"rawData": "{}"}}}}"#,
                page(0, 100)
            ))
            .create_async()
            .await;
        let _second = server
            .mock("GET", "/operations/op-b")
            .with_body(format!(
                r#"{{"done": true, "response": {{"rawData": "{}"}}}}"#,
                page(100, 50)
            ))
            .create_async()
            .await;

        let hits = pipeline(&server.url()).search("запрос", 120).await;
        assert_eq!(hits.len(), 120);
        assert_eq!(hits[0].url, "https://site0.ru/");
        assert_eq!(hits[119].url, "https://site119.ru/");
        submit_first.assert_async().await;
        submit_second.assert_async().await;
    }
}
