// Field extractors: pure functions over fetched markup. Absence of a match
// is the only negative outcome; none of them can fail.
pub mod address;
pub mod company;
pub mod emails;
pub mod phones;
pub mod telegram;

pub use address::AddressExtractor;
pub use company::extract_company_name;
pub use emails::EmailExtractor;
pub use phones::PhoneExtractor;
pub use telegram::TelegramExtractor;

use regex::Regex;
use std::sync::OnceLock;

use crate::config::{ExtractionLimits, FilterConfig};

/// All field extractors with their compiled patterns, built once per run.
pub struct FieldExtractors {
    pub address: AddressExtractor,
    pub phones: PhoneExtractor,
    pub emails: EmailExtractor,
    pub telegram: TelegramExtractor,
}

impl FieldExtractors {
    pub fn new(limits: &ExtractionLimits, filters: &FilterConfig) -> Self {
        Self {
            address: AddressExtractor::new(),
            phones: PhoneExtractor::new(limits.max_phones),
            emails: EmailExtractor::new(limits.max_emails, filters),
            telegram: TelegramExtractor::new(limits.max_telegram, &filters.handle_blacklist),
        }
    }
}

/// Replaces every tag with a space, leaving text content only.
pub(crate) fn strip_tags(html: &str) -> String {
    static TAG: OnceLock<Regex> = OnceLock::new();
    let tag = TAG.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));
    tag.replace_all(html, " ").into_owned()
}

/// Removes whole `<script>` and `<style>` blocks, bodies included.
pub(crate) fn strip_scripts(html: &str) -> String {
    static BLOCKS: OnceLock<Regex> = OnceLock::new();
    let blocks = BLOCKS.get_or_init(|| {
        Regex::new(r"(?is)<(script|style)[^>]*>.*?</(script|style)>")
            .expect("block pattern is valid")
    });
    blocks.replace_all(html, " ").into_owned()
}

pub(crate) fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_tags_keeps_text() {
        assert_eq!(normalize_whitespace(&strip_tags("<p>a</p><b>b</b>")), "a b");
    }

    #[test]
    fn strip_scripts_drops_bodies() {
        let html = "before<script>var x = 1;</script><style>.a{}</style>after";
        let stripped = strip_scripts(html);
        assert!(!stripped.contains("var x"));
        assert!(!stripped.contains(".a{}"));
        assert!(stripped.contains("before") && stripped.contains("after"));
    }
}
