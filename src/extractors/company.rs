use scraper::{Html, Selector};
use url::Url;

use crate::extractors::normalize_whitespace;

/// Best-effort company name: site-name metadata, then the page title up to
/// the first separator, then a short heading, then the domain label.
pub fn extract_company_name(html: &str, url: &str) -> String {
    let document = Html::parse_document(html);

    if let Ok(selector) = Selector::parse(r#"meta[property="og:site_name"]"#) {
        if let Some(name) = document
            .select(&selector)
            .next()
            .and_then(|m| m.value().attr("content"))
        {
            if name.chars().count() > 2 {
                return clean_name(name);
            }
        }
    }

    if let Ok(selector) = Selector::parse("title") {
        if let Some(title) = document.select(&selector).next() {
            let text: String = title.text().collect();
            let name = text.split(['-', '|']).next().unwrap_or("").trim().to_string();
            if name.chars().count() > 2 {
                return clean_name(&name);
            }
        }
    }

    if let Ok(selector) = Selector::parse("h1") {
        if let Some(h1) = document.select(&selector).next() {
            let text: String = h1.text().collect();
            let name = text.trim();
            if name.chars().count() >= 2 && name.chars().count() <= 100 {
                return clean_name(name);
            }
        }
    }

    domain_label(url).unwrap_or_else(|| "Unknown".to_string())
}

fn domain_label(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    host.split('.').next().map(|s| s.to_string())
}

fn clean_name(name: &str) -> String {
    normalize_whitespace(name).chars().take(200).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_name_meta_wins() {
        let html = r#"<head>
            <meta property="og:site_name" content="ООО Ромашка">
            <title>Главная - Ромашка</title>
        </head>"#;
        assert_eq!(extract_company_name(html, "https://romashka.ru"), "ООО Ромашка");
    }

    #[test]
    fn title_truncated_at_separator() {
        let html = "<title>Мебель на заказ | Купить в Москве</title>";
        assert_eq!(
            extract_company_name(html, "https://mebel.ru"),
            "Мебель на заказ"
        );
    }

    #[test]
    fn pipe_and_dash_both_split() {
        let html = "<title>Стройка - лучшие цены</title>";
        assert_eq!(extract_company_name(html, "https://x.ru"), "Стройка");
    }

    #[test]
    fn heading_used_when_title_missing() {
        let html = "<body><h1>Завод Прогресс</h1></body>";
        assert_eq!(extract_company_name(html, "https://zavod.ru"), "Завод Прогресс");
    }

    #[test]
    fn overlong_heading_skipped_in_favor_of_domain() {
        let long = "x".repeat(150);
        let html = format!("<body><h1>{}</h1></body>", long);
        assert_eq!(
            extract_company_name(&html, "https://www.stroy-dom.ru/page"),
            "stroy-dom"
        );
    }

    #[test]
    fn two_character_cyrillic_title_is_too_short() {
        // 2 characters, 4 bytes: measured in characters it is skipped
        let html = "<title>Ян</title>";
        assert_eq!(extract_company_name(html, "https://yan-moskva.ru"), "yan-moskva");
    }

    #[test]
    fn unparsable_url_falls_back_to_unknown() {
        assert_eq!(extract_company_name("", "not a url"), "Unknown");
    }

    #[test]
    fn name_whitespace_normalized_and_capped() {
        let html = format!("<title>A  {}  B</title>", "long ".repeat(80));
        let name = extract_company_name(&html, "https://a.ru");
        assert!(name.chars().count() <= 200);
        assert!(!name.contains("  "));
    }
}
