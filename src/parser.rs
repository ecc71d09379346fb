use crate::config::ParserConfig;
use crate::detect::detect_hidden_instructions;
use crate::extract::extract_fields;
use crate::model::{InboundEmail, ParsedEmailResult, ValidatedQuery};
use crate::normalize::normalize_body;
use crate::segment::split_sections;
use crate::validate::validate_query;
use anyhow::Result;
use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::{debug, info};

/// Decompose one raw bulk-email body into validated query records plus
/// per-segment diagnostics. Pure in its inputs; `now` anchors the default
/// deadline fallback and must be injected by the caller. Failures never
/// escape: a whole-pipeline error becomes a single `parse_errors` entry.
pub fn parse_email(
    config: &ParserConfig,
    email: &InboundEmail,
    now: DateTime<Utc>,
) -> ParsedEmailResult {
    match parse_email_inner(config, email, now) {
        Ok(result) => {
            info!(
                email = %email.email_id,
                queries = result.queries.len(),
                errors = result.parse_errors.len(),
                "email parsed"
            );
            result
        }
        Err(err) => ParsedEmailResult {
            email_id: email.email_id.clone(),
            category: "Unknown".to_string(),
            received_at: email.received_at,
            queries: Vec::new(),
            parse_errors: vec![format!("email parsing failed: {err:#}")],
        },
    }
}

fn parse_email_inner(
    config: &ParserConfig,
    email: &InboundEmail,
    now: DateTime<Utc>,
) -> Result<ParsedEmailResult> {
    let category = extract_category(&email.subject);
    let normalized = normalize_body(&email.body);
    let sections = split_sections(config, &normalized);

    let mut queries = Vec::new();
    let mut parse_errors = Vec::new();

    for (index, section) in sections.iter().enumerate() {
        match parse_section(config, section, &category, &email.email_id, now) {
            Some(query) => queries.push(query),
            None => {
                debug!(section = index + 1, "section rejected; headline missing");
                parse_errors.push(format!(
                    "query {}: failed validation - missing required fields",
                    index + 1
                ));
            }
        }
    }

    Ok(ParsedEmailResult {
        email_id: email.email_id.clone(),
        category,
        received_at: email.received_at,
        queries,
        parse_errors,
    })
}

fn parse_section(
    config: &ParserConfig,
    section: &str,
    category: &str,
    email_id: &str,
    now: DateTime<Utc>,
) -> Option<ValidatedQuery> {
    let detection = detect_hidden_instructions(section);

    let mut raw = extract_fields(config, &detection.cleaned_text, section, category);
    raw.has_ai_detection = detection.has_detection;
    raw.trigger_words = detection.trigger_words;
    raw.decoded_instructions = detection.decoded_instructions;

    validate_query(config, raw, email_id, now)
}

/// Category from a `HARO: <category> Queries` subject line.
pub fn extract_category(subject: &str) -> String {
    let re = Regex::new(r"(?i)HARO:\s*(.+?)\s+Queries").expect("category regex");
    re.captures(subject)
        .map(|caps| caps[1].trim().to_string())
        .unwrap_or_else(|| "General".to_string())
}
