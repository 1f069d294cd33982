use regex::Regex;
use std::collections::HashSet;

use crate::extractors::{strip_scripts, strip_tags};

/// Telegram handle extractor. Script and style blocks are removed up front:
/// they are full of `@media`, `@keyframes` and JSON-LD keys that look exactly
/// like handles.
pub struct TelegramExtractor {
    tme_link: Regex,
    mention: Regex,
    blacklist: HashSet<String>,
    max_handles: usize,
}

impl TelegramExtractor {
    pub fn new(max_handles: usize, blacklist: &[String]) -> Self {
        Self {
            tme_link: Regex::new(r"(?i)t\.me/([a-zA-Z][a-zA-Z0-9_]{4,31})")
                .expect("t.me pattern is valid"),
            mention: Regex::new(r"@([a-zA-Z][a-zA-Z0-9_]{4,31})\b")
                .expect("mention pattern is valid"),
            blacklist: blacklist.iter().map(|s| s.to_lowercase()).collect(),
            max_handles,
        }
    }

    pub fn extract(&self, html: &str) -> Vec<String> {
        let markup = strip_scripts(html);
        let text = strip_tags(&markup);

        let mut handles = Vec::new();
        let mut seen = HashSet::new();

        for caps in self.tme_link.captures_iter(&markup) {
            self.push_handle(&caps[1], &mut handles, &mut seen);
        }

        for caps in self.mention.captures_iter(&text) {
            self.push_handle(&caps[1], &mut handles, &mut seen);
        }

        handles.truncate(self.max_handles);
        handles
    }

    fn push_handle(&self, username: &str, handles: &mut Vec<String>, seen: &mut HashSet<String>) {
        if self.blacklist.contains(&username.to_lowercase()) {
            return;
        }
        let handle = format!("@{}", username);
        if seen.insert(handle.to_lowercase()) {
            handles.push(handle);
        }
    }
}
