use regex::Regex;
use std::collections::HashSet;

use crate::extractors::strip_tags;

/// Russian phone number extractor. Scans tag-stripped markup, not the DOM,
/// because numbers routinely live in headers, footers and inline widgets.
pub struct PhoneExtractor {
    patterns: Vec<Regex>,
    max_phones: usize,
}

impl PhoneExtractor {
    pub fn new(max_phones: usize) -> Self {
        let patterns = [
            r"\+7\s*\(?\d{3}\)?\s*\d{3}[-\s]?\d{2}[-\s]?\d{2}",
            r"8\s*\(?\d{3}\)?\s*\d{3}[-\s]?\d{2}[-\s]?\d{2}",
            r"8\d{10}",
            r"\+7\d{10}",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("phone pattern is valid"))
        .collect();

        Self { patterns, max_phones }
    }

    pub fn extract(&self, html: &str) -> Vec<String> {
        let text = strip_tags(html);

        let mut phones = Vec::new();
        let mut seen = HashSet::new();

        for pattern in &self.patterns {
            for m in pattern.find_iter(&text) {
                if let Some(phone) = normalize_phone(m.as_str()) {
                    if seen.insert(phone.clone()) {
                        phones.push(phone);
                    }
                }
            }
        }

        phones.truncate(self.max_phones);
        phones
    }
}

/// Canonicalizes a raw match to `+7XXXXXXXXXX`, or rejects it as junk.
fn normalize_phone(raw: &str) -> Option<String> {
    let mut cleaned: String = raw.chars().filter(|c| c.is_ascii_digit() || *c == '+').collect();
    if cleaned.starts_with('8') {
        cleaned = format!("+7{}", &cleaned[1..]);
    }

    if cleaned.len() < 11 || cleaned.len() > 12 {
        return None;
    }

    let digits: String = cleaned.chars().filter(|c| c.is_ascii_digit()).collect();

    // Repeated-digit junk like 88888888888 survives the patterns.
    let unique: HashSet<char> = digits.chars().collect();
    if unique.len() < 4 {
        return None;
    }

    if digits.contains("1234567890") || has_digit_run(&digits, 7) {
        return None;
    }

    Some(cleaned)
}

fn has_digit_run(digits: &str, len: usize) -> bool {
    let mut run = 0;
    let mut prev = None;
    for c in digits.chars() {
        if Some(c) == prev {
            run += 1;
        } else {
            run = 1;
            prev = Some(c);
        }
        if run >= len {
            return true;
        }
    }
    false
}
