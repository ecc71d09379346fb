use crate::config::ParserConfig;
use crate::model::{RawQueryFields, SpecialFlag};
use regex::Regex;
use std::collections::HashSet;
use url::Url;

/// Field-rule cascade over one cleaned section. Every rule tolerates its
/// field being absent and leaves the member unset; only the
/// headline/requirements interaction is order-sensitive. URL extraction runs
/// over the original section text so links inside removed payloads survive.
pub fn extract_fields(
    config: &ParserConfig,
    cleaned: &str,
    original: &str,
    category: &str,
) -> RawQueryFields {
    let mut fields = RawQueryFields {
        category: category.to_string(),
        ..RawQueryFields::default()
    };

    let name_re = Regex::new(r"(?is)Name:\s*(.+?)\s+Category:").expect("name regex");
    if let Some(caps) = name_re.captures(cleaned) {
        fields.reporter_name = Some(caps[1].trim().to_string());
    }

    let number_re = Regex::new(r"(?im)^(\d+)\s*\)\s*Summary:|Query\s*#?(\d+)")
        .expect("query number regex");
    if let Some(caps) = number_re.captures(cleaned) {
        fields.query_number = caps
            .get(1)
            .or_else(|| caps.get(2))
            .and_then(|m| m.as_str().parse().ok());
    }

    // Headline cascade; first successful pattern wins and populates both
    // headline and full text.
    let headline_patterns = [
        r"(?is)\d+\s*\)\s*Summary:\s*(.+?)\s+Name:",
        r"(?is)Summary:\s*(.+?)\s+Name:",
        r"(?is)Query:\s*(.+?)\s+Name:",
    ];
    for pattern in headline_patterns {
        let re = Regex::new(pattern).expect("headline regex");
        if let Some(caps) = re.captures(cleaned) {
            let text = clean_text_field(caps[1].trim());
            fields.headline = Some(text.clone());
            fields.full_text = Some(text);
            break;
        }
    }

    let requirements_re = Regex::new(r"(?is)Requirements?:\s*(.+)\z").expect("requirements regex");
    if let Some(caps) = requirements_re.captures(cleaned) {
        let requirements = clean_text_field(caps[1].trim());
        if requirements.len() > fields.full_text.as_deref().map_or(0, str::len) {
            let headline = fields.headline.clone().unwrap_or_default();
            fields.full_text = Some(format!("{headline} - {requirements}"));
        }
        fields.requirements = Some(requirements);
    }

    let deadline_re =
        Regex::new(r"(?is)Deadline:\s*(.+?)(?:\s+Requirements?:|\z)").expect("deadline regex");
    if let Some(caps) = deadline_re.captures(cleaned) {
        fields.deadline_raw = Some(caps[1].trim().to_string());
    }

    let email_re = Regex::new(r"(?is)Email:\s*(.+?)\s+Media Outlet:").expect("email regex");
    if let Some(caps) = email_re.captures(cleaned) {
        let email = caps[1].trim().to_string();
        if email.contains('@') {
            fields.is_direct_email = !email.contains(config.relay_domain.as_str());
            fields.journalist_email = Some(email);
        }
    }

    let outlet_re =
        Regex::new(r"(?is)Media Outlet:\s*(.+?)\s+Deadline:").expect("outlet regex");
    if let Some(caps) = outlet_re.captures(cleaned) {
        let outlet = caps[1].trim();
        let split_re = Regex::new(r"(?s)^([^(]+)\s*\(([^)]+)\)$").expect("outlet split regex");
        if let Some(parts) = split_re.captures(outlet) {
            fields.publication = Some(parts[1].trim().to_string());
            let url = parts[2].trim();
            if url.starts_with("http") {
                fields.outlet_url = Some(url.to_string());
            }
        } else {
            fields.publication = Some(outlet.to_string());
        }
    }

    let lowered = cleaned.to_lowercase();
    for (needle, flag) in [
        ("no ai pitches", SpecialFlag::NoAi),
        ("urgent", SpecialFlag::Urgent),
        ("paid", SpecialFlag::Paid),
        ("exclusive", SpecialFlag::Exclusive),
    ] {
        if lowered.contains(needle) {
            fields.special_flags.push(flag);
        }
    }

    let (extracted_urls, article_url) = extract_urls(config, original);
    fields.extracted_urls = extracted_urls;
    fields.article_url = article_url;

    fields
}

/// Collect http(s) URLs, strip trailing punctuation, deduplicate preserving
/// order, and classify the first article-looking one.
fn extract_urls(config: &ParserConfig, text: &str) -> (Vec<String>, Option<String>) {
    let url_re = Regex::new(r#"https?://[^\s<>"{}|\\^`\[\]]+"#).expect("url regex");

    let mut seen = HashSet::new();
    let mut urls = Vec::new();
    for m in url_re.find_iter(text) {
        let trimmed = m
            .as_str()
            .trim_end_matches(['.', ',', ';', ':', '!', '?', ')', ']', '}'])
            .to_string();
        if Url::parse(&trimmed).is_err() {
            continue;
        }
        if seen.insert(trimmed.clone()) {
            urls.push(trimmed);
        }
    }

    let article_url = urls
        .iter()
        .find(|url| {
            let lowered = url.to_lowercase();
            lowered.contains(config.relay_domain.as_str())
                || ["haro", "journalist", "article", "story", "news"]
                    .iter()
                    .any(|hint| lowered.contains(hint))
        })
        .cloned();

    (urls, article_url)
}

/// Scrub encoding artifacts and stray non-text characters from one field.
pub fn clean_text_field(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mojibake = Regex::new(r"[âÂ]+").expect("mojibake regex");
    let garbage =
        Regex::new(r#"[^\w\s.,;:!?()\-'"/\[\]{}@#$%&*+=<>|~`]"#).expect("garbage char regex");
    let latin_run = Regex::new(r"[\u{A0}-\u{FF}]{3,}").expect("latin run regex");
    let ws = Regex::new(r"\s+").expect("whitespace regex");

    let mut cleaned = mojibake.replace_all(text, " ").to_string();
    cleaned = garbage.replace_all(&cleaned, " ").to_string();
    cleaned = latin_run.replace_all(&cleaned, " ").to_string();
    ws.replace_all(&cleaned, " ").trim().to_string()
}
