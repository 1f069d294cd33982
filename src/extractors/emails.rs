use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;

use crate::config::FilterConfig;
use crate::extractors::{strip_scripts, strip_tags};

/// Multi-source email extractor. Target sites obfuscate addresses, bury them
/// in JSON-LD or assign them to JS variables, so every source closes one
/// observed class of miss; every filter closes one class of false positive.
pub struct EmailExtractor {
    basic: Regex,
    standard: Regex,
    mailto: Regex,
    bracket_at_dot: Regex,
    paren_at: Regex,
    spaced: Regex,
    js_assigned: Regex,
    file_suffix: Regex,
    numeric_method_suffix: Regex,
    fake_domains: Vec<String>,
    js_artifacts: Vec<String>,
    max_emails: usize,
}

impl EmailExtractor {
    pub fn new(max_emails: usize, filters: &FilterConfig) -> Self {
        Self {
            basic: Regex::new(
                r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9а-яА-Я.-]+\.[a-zA-Zа-яА-Я]{2,}",
            )
            .expect("email pattern is valid"),
            standard: Regex::new(
                r"[a-zA-Z0-9][a-zA-Z0-9._%+-]*@[a-zA-Z0-9а-яА-Я][a-zA-Z0-9а-яА-Я.-]*\.[a-zA-Zа-яА-Я]{2,}",
            )
            .expect("email pattern is valid"),
            mailto: Regex::new(
                r"(?i)mailto:([a-zA-Z0-9._%+-]+@[a-zA-Z0-9а-яА-Я.-]+\.[a-zA-Zа-яА-Я]{2,})",
            )
            .expect("mailto pattern is valid"),
            bracket_at_dot: Regex::new(
                r"(?i)([a-zA-Z0-9._%+-]+)\s*\[at\]\s*([a-zA-Z0-9а-яА-Я.-]+)\s*\[dot\]\s*([a-zA-Zа-яА-Я]{2,})",
            )
            .expect("obfuscation pattern is valid"),
            paren_at: Regex::new(
                r"(?i)([a-zA-Z0-9._%+-]+)\s*[(\[]\s*at\s*[)\]]\s*([a-zA-Z0-9а-яА-Я.-]+\.[a-zA-Zа-яА-Я]{2,})",
            )
            .expect("obfuscation pattern is valid"),
            spaced: Regex::new(
                r"([a-zA-Z0-9._%+-]+)\s+@\s+([a-zA-Z0-9а-яА-Я.-]+)\s+\.\s+([a-zA-Zа-яА-Я]{2,})",
            )
            .expect("obfuscation pattern is valid"),
            js_assigned: Regex::new(
                r#"(?i)(?:email|contact|mail|e-?mail)\s*[:=]\s*["']([a-zA-Z0-9._%+-]+@[a-zA-Z0-9а-яА-Я.-]+\.[a-zA-Zа-яА-Я]{2,})["']"#,
            )
            .expect("js assignment pattern is valid"),
            file_suffix: Regex::new(r"(?i)\.(jpg|png|gif|pdf|doc|zip|rar|exe|js|css|json)$")
                .expect("suffix pattern is valid"),
            numeric_method_suffix: Regex::new(r"(?i)\.(round|floor|ceil|abs|max|min|log|pow)$")
                .expect("suffix pattern is valid"),
            fake_domains: filters.fake_email_domains.clone(),
            js_artifacts: filters.js_artifacts.clone(),
            max_emails,
        }
    }

    pub fn extract(&self, html: &str) -> Vec<String> {
        let mut emails = Vec::new();
        let mut seen = HashSet::new();
        let add = |candidate: String, emails: &mut Vec<String>, seen: &mut HashSet<String>| {
            let candidate = candidate.to_lowercase().trim().to_string();
            if self.is_plausible(&candidate) && seen.insert(candidate.clone()) {
                emails.push(candidate);
            }
        };

        let document = Html::parse_document(html);

        // Footer and header first: when the cap truncates, addresses a site
        // chose to display beat addresses scraped out of script soup.
        for region in ["footer", "header"] {
            if let Ok(selector) = Selector::parse(region) {
                for element in document.select(&selector) {
                    let text: String = element.text().collect::<Vec<_>>().join(" ");
                    for m in self.basic.find_iter(&text) {
                        add(m.as_str().to_string(), &mut emails, &mut seen);
                    }
                }
            }
        }

        if let Ok(selector) = Selector::parse("meta[content]") {
            for element in document.select(&selector) {
                if let Some(content) = element.value().attr("content") {
                    for m in self.basic.find_iter(content) {
                        add(m.as_str().to_string(), &mut emails, &mut seen);
                    }
                }
            }
        }

        if let Ok(selector) = Selector::parse(r#"script[type="application/ld+json"]"#) {
            for element in document.select(&selector) {
                let body: String = element.text().collect();
                for m in self.basic.find_iter(&body) {
                    add(m.as_str().to_string(), &mut emails, &mut seen);
                }
            }
        }

        // Script and style bodies are excluded from the general sweep;
        // addresses inside inline JS go through the assignment pattern below.
        let text = decode_entities(&strip_tags(&strip_scripts(html)));

        for m in self.standard.find_iter(&text) {
            add(m.as_str().to_string(), &mut emails, &mut seen);
        }

        for caps in self.mailto.captures_iter(html) {
            add(caps[1].to_string(), &mut emails, &mut seen);
        }

        for caps in self.bracket_at_dot.captures_iter(&text) {
            add(format!("{}@{}.{}", &caps[1], &caps[2], &caps[3]), &mut emails, &mut seen);
        }

        for caps in self.paren_at.captures_iter(&text) {
            add(format!("{}@{}", &caps[1], &caps[2]), &mut emails, &mut seen);
        }

        for caps in self.spaced.captures_iter(&text) {
            add(format!("{}@{}.{}", &caps[1], &caps[2], &caps[3]), &mut emails, &mut seen);
        }

        // Inline scripts only; external ones are not fetched. Only literals
        // assigned to email-looking identifiers, to skip incidental strings.
        if let Ok(selector) = Selector::parse("script") {
            for element in document.select(&selector) {
                if element.value().attr("src").is_some() {
                    continue;
                }
                let code: String = element.text().collect();
                for caps in self.js_assigned.captures_iter(&code) {
                    add(caps[1].to_string(), &mut emails, &mut seen);
                }
            }
        }

        emails.truncate(self.max_emails);
        emails
    }

    fn is_plausible(&self, email: &str) -> bool {
        if email.chars().filter(|c| *c == '@').count() != 1 || !email.contains('.') {
            return false;
        }
        let chars = email.chars().count();
        if !(5..=100).contains(&chars) {
            return false;
        }
        if self.js_artifacts.iter().any(|p| email.contains(p.as_str())) {
            return false;
        }
        if self.file_suffix.is_match(email) {
            return false;
        }
        if self.fake_domains.iter().any(|d| email.contains(d.as_str())) {
            return false;
        }
        if email.contains("..") || email.starts_with('.') || email.ends_with('.') {
            return false;
        }
        if let Some(domain) = email.split('@').nth(1) {
            if self.numeric_method_suffix.is_match(domain) {
                return false;
            }
        }
        true
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&commat;", "@")
        .replace("&period;", ".")
        .replace("&#64;", "@")
        .replace("&#46;", ".")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
