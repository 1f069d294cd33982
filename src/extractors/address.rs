use regex::Regex;
use scraper::Html;

use crate::extractors::normalize_whitespace;

/// Street address extractor for Russian-format addresses. Two layered
/// patterns: the generic "г. <city>, ул. <street>, д. <number>" form and an
/// explicit Moscow / St. Petersburg form without the markers.
pub struct AddressExtractor {
    patterns: Vec<Regex>,
}

impl AddressExtractor {
    pub fn new() -> Self {
        let patterns = [
            r"(?:г\.?\s*)[А-ЯЁа-яё][А-ЯЁа-яё\s-]+,\s*(?:ул\.?\s*)[А-ЯЁа-яё][А-ЯЁа-яё\s-]+,\s*(?:д\.?\s*)\d+",
            r"(?:Москва|Санкт-Петербург|СПб),\s*[А-ЯЁа-яё][А-ЯЁа-яё\s-]+,\s*\d+",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("address pattern is valid"))
        .collect();

        Self { patterns }
    }

    pub fn extract(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        let text: String = document.root_element().text().collect::<Vec<_>>().join(" ");

        for pattern in &self.patterns {
            if let Some(m) = pattern.find(&text) {
                let addr = normalize_whitespace(m.as_str());
                if addr.chars().count() >= 10 && addr.chars().count() <= 200 {
                    return Some(addr);
                }
            }
        }

        None
    }
}

impl Default for AddressExtractor {
    fn default() -> Self {
        Self::new()
    }
}
