use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub limits: ExtractionLimits,
    #[serde(default)]
    pub filters: FilterConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    #[serde(default = "default_api_endpoint")]
    pub api_endpoint: String,
    #[serde(default = "default_operations_endpoint")]
    pub operations_endpoint: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_poll_attempts")]
    pub poll_attempts: u32,
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,
    #[serde(default = "default_submit_timeout_seconds")]
    pub submit_timeout_seconds: u64,
    /// Directory/social/review sites whose URLs are never a company's own.
    #[serde(default = "default_blocked_domains")]
    pub blocked_domains: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CrawlConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_page_timeout_seconds")]
    pub page_timeout_seconds: u64,
    #[serde(default = "default_contacts_timeout_seconds")]
    pub contacts_timeout_seconds: u64,
    #[serde(default = "default_probe_timeout_seconds")]
    pub probe_timeout_seconds: u64,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    #[serde(default = "default_contacts_max_redirects")]
    pub contacts_max_redirects: usize,
    #[serde(default = "default_per_site_timeout_seconds")]
    pub per_site_timeout_seconds: u64,
    /// Conventional contact-page paths, probed before link scanning.
    #[serde(default = "default_contact_paths")]
    pub contact_paths: Vec<String>,
    #[serde(default = "default_priority_keywords")]
    pub priority_link_keywords: Vec<String>,
    #[serde(default = "default_fallback_keywords")]
    pub fallback_link_keywords: Vec<String>,
    /// Batches up to this size report progress after every site.
    #[serde(default = "default_small_batch_threshold")]
    pub small_batch_threshold: usize,
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractionLimits {
    #[serde(default = "default_max_phones")]
    pub max_phones: usize,
    #[serde(default = "default_max_emails")]
    pub max_emails: usize,
    #[serde(default = "default_max_telegram")]
    pub max_telegram: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilterConfig {
    /// Placeholder/technical email fragments that never belong to a company.
    #[serde(default = "default_fake_email_domains")]
    pub fake_email_domains: Vec<String>,
    /// JavaScript API fragments that masquerade as emails in minified code.
    #[serde(default = "default_js_artifacts")]
    pub js_artifacts: Vec<String>,
    /// Exact-match blacklist for telegram handle candidates.
    #[serde(default = "default_handle_blacklist")]
    pub handle_blacklist: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_directory")]
    pub directory: String,
    #[serde(default = "default_pretty_json")]
    pub pretty_json: bool,
}

fn default_api_endpoint() -> String {
    "https://searchapi.api.cloud.yandex.net/v2/web/searchAsync".to_string()
}

fn default_operations_endpoint() -> String {
    "https://operation.api.cloud.yandex.net/operations".to_string()
}

fn default_page_size() -> usize {
    100
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_poll_attempts() -> u32 {
    30
}

fn default_page_delay_ms() -> u64 {
    1000
}

fn default_submit_timeout_seconds() -> u64 {
    30
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string()
}

fn default_page_timeout_seconds() -> u64 {
    15
}

fn default_contacts_timeout_seconds() -> u64 {
    10
}

fn default_probe_timeout_seconds() -> u64 {
    3
}

fn default_max_redirects() -> usize {
    3
}

fn default_contacts_max_redirects() -> usize {
    2
}

fn default_per_site_timeout_seconds() -> u64 {
    30
}

fn default_small_batch_threshold() -> usize {
    20
}

fn default_progress_interval() -> usize {
    5
}

fn default_max_phones() -> usize {
    5
}

fn default_max_emails() -> usize {
    3
}

fn default_max_telegram() -> usize {
    2
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_output_directory() -> String {
    "out".to_string()
}

fn default_pretty_json() -> bool {
    true
}

fn default_blocked_domains() -> Vec<String> {
    [
        "avito.ru",
        "2gis.ru",
        "yandex.ru",
        "kp.ru",
        "zoon.ru",
        "vk.com",
        "ok.ru",
        "instagram.com",
        "facebook.com",
        "profi.ru",
        "youdo.com",
        "qlaster.ru",
        "cataloxy.ru",
        "orgpage.ru",
        "spravker.ru",
        "yellowpages.ru",
        "rusprofile.ru",
        "vc.ru",
        "medium.com",
        "habr.com",
        "dzen.ru",
        "teletype.in",
        "spark.ru",
        "google.com",
        "wikipedia.org",
        "youtube.com",
        "otzovik.com",
        "irecommend.ru",
        "flamp.ru",
        "rerate.ru",
        "otzyvru.com",
        "otziv.ru",
        "otzyv.ru",
        "rumexpert.ru",
        "yell.ru",
        "biznet.ru",
        "list-org.com",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_contact_paths() -> Vec<String> {
    [
        "/contacts.html",
        "/contacts",
        "/contact.html",
        "/contact",
        "/kontakty.html",
        "/kontakty",
        "/kontakt.html",
        "/kontakt",
        "/svyaz.html",
        "/svyaz",
        "/contacts.php",
        "/contact.php",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_priority_keywords() -> Vec<String> {
    ["contact", "contacts", "kontakt", "kontakty", "связь", "контакт", "svyaz"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_fallback_keywords() -> Vec<String> {
    ["about", "o-nas", "about-us"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_fake_email_domains() -> Vec<String> {
    [
        "@example.com",
        "@example.ru",
        "@test.com",
        "@test.ru",
        "@domain.com",
        "@localhost",
        "@yoursite.",
        "@yourdomain.",
        "@yourcompany.",
        "@yourbusiness.",
        "@yourwebsite.",
        "@demo.com",
        "@demo.ru",
        "noreply@",
        "no-reply@",
        "donotreply@",
        "@tribute",
        "changeloc@",
        "remove@",
        ".has@",
        ".add@",
        "@placeholder",
        "@tempmail.",
        "@temp-mail.",
        "@fake.",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_js_artifacts() -> Vec<String> {
    [
        "math.",
        "document.",
        "window.",
        "navigator.",
        "location.",
        "console.",
        "string.",
        "array.",
        "object.",
        "function.",
        ".round",
        ".floor",
        ".ceil",
        ".js",
        ".protocol",
        ".href",
        ".indexof",
        ".foreach",
        ".map",
        ".filter",
        ".slice",
        "useragent",
        "loc@ion",
        "navig@or",
        "w@ch",
        "doc@ment",
        "m@h.",
        "d@alayer",
        "w@dow.",
        "arr@y.",
        "obj@ct.",
        ".random",
        ".push",
        ".pop",
        ".shift",
        ".unshift",
        ".split",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_handle_blacklist() -> Vec<String> {
    [
        // CSS at-rules and properties
        "media",
        "keyframes",
        "supports",
        "import",
        "font",
        "charset",
        "namespace",
        "width",
        "height",
        "color",
        "size",
        "style",
        "webkit",
        // JSON-LD keys
        "context",
        "graph",
        "type",
        "value",
        "name",
        // Telegram service paths
        "share",
        "joinchat",
        "intent",
        "addstickers",
        "setlanguage",
        // programming keywords
        "include",
        "extend",
        "mixin",
        "function",
        "return",
        "class",
        "public",
        "private",
        // directory-site handles
        "spravker",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

macro_rules! default_section {
    ($ty:ty) => {
        impl Default for $ty {
            fn default() -> Self {
                serde_yaml::from_str("{}").expect("section defaults are total")
            }
        }
    };
}

default_section!(SearchConfig);
default_section!(CrawlConfig);
default_section!(ExtractionLimits);
default_section!(FilterConfig);
default_section!(LoggingConfig);
default_section!(OutputConfig);

pub async fn load_config(path: &str) -> crate::models::Result<Config> {
    let content = tokio::fs::read_to_string(path).await?;
    let config: Config = serde_yaml::from_str(&content)?;
    Ok(config)
}
