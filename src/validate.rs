use crate::config::ParserConfig;
use crate::model::{RawQueryFields, ValidatedQuery};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use tracing::debug;

/// Promote a raw field bag to a finalized record, or reject it when the
/// headline is missing. All other optional fields are defaulted.
pub fn validate_query(
    config: &ParserConfig,
    raw: RawQueryFields,
    email_id: &str,
    now: DateTime<Utc>,
) -> Option<ValidatedQuery> {
    let headline = raw.headline.filter(|h| !h.is_empty())?;
    let full_text = raw
        .full_text
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| headline.clone());

    let (deadline, deadline_was_defaulted) =
        parse_deadline(config, raw.deadline_raw.as_deref().unwrap_or(""), now);

    let category = if raw.category.is_empty() {
        "General".to_string()
    } else {
        raw.category
    };

    Some(ValidatedQuery {
        email_id: email_id.to_string(),
        headline,
        full_text,
        requirements: raw.requirements.unwrap_or_default(),
        deadline,
        deadline_was_defaulted,
        journalist_email: raw.journalist_email,
        publication: raw
            .publication
            .unwrap_or_else(|| "Unknown Publication".to_string()),
        outlet_url: raw.outlet_url,
        category,
        reporter_name: raw.reporter_name,
        query_number: raw.query_number,
        special_flags: raw.special_flags,
        is_direct_email: raw.is_direct_email,
        has_ai_detection: raw.has_ai_detection,
        trigger_words: raw.trigger_words,
        decoded_instructions: raw.decoded_instructions,
        extracted_urls: raw.extracted_urls,
        article_url: raw.article_url,
    })
}

/// Parse a free-text deadline into an instant. Unparseable input falls back
/// silently to now plus the configured default window; the boolean reports
/// whether the fallback was applied.
pub fn parse_deadline(
    config: &ParserConfig,
    deadline_raw: &str,
    now: DateTime<Utc>,
) -> (DateTime<Utc>, bool) {
    if let Some(parsed) = try_parse_deadline(config, deadline_raw, now) {
        return (parsed, false);
    }

    debug!(deadline = %deadline_raw, "deadline unparseable; applying default window");
    (now + Duration::days(config.default_deadline_days), true)
}

fn try_parse_deadline(
    config: &ParserConfig,
    deadline_raw: &str,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let tz_abbrev = Regex::new(r"(?i)\s+(EST|EDT|PST|PDT|CST|CDT|MST|MDT)\b")
        .expect("timezone abbreviation regex");
    let cleaned = tz_abbrev.replace_all(deadline_raw, "").trim().to_string();
    if cleaned.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(&cleaned) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in &config.deadline_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&cleaned, format) {
            return Some(Utc.from_utc_datetime(&dt));
        }
        if let Ok(date) = NaiveDate::parse_from_str(&cleaned, format) {
            return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
        }
    }

    parse_loose_deadline(&cleaned, now)
}

/// Manual fallback for "<Month> <Day>[, <Year>] [at] <Hour>[:<Minute>]
/// [am|pm]" shapes that the format list misses.
fn parse_loose_deadline(cleaned: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let loose = Regex::new(
        r"(?i)([A-Za-z]+)\s+(\d{1,2})(?:,?\s+(\d{4}))?\s+(?:at\s+)?(\d{1,2}):?(\d*)\s*(am|pm)?",
    )
    .expect("loose deadline regex");
    let caps = loose.captures(cleaned)?;

    let month = month_number(caps.get(1)?.as_str())?;
    let day: u32 = caps.get(2)?.as_str().parse().ok()?;
    let year: i32 = match caps.get(3) {
        Some(m) => m.as_str().parse().ok()?,
        None => now.year(),
    };
    let mut hour: u32 = caps.get(4)?.as_str().parse().ok()?;
    let minute: u32 = caps
        .get(5)
        .map(|m| m.as_str())
        .filter(|s| !s.is_empty())
        .map_or(Some(0), |s| s.parse().ok())?;

    match caps.get(6).map(|m| m.as_str().to_lowercase()) {
        Some(ref ampm) if ampm == "pm" && hour < 12 => hour += 12,
        Some(ref ampm) if ampm == "am" && hour == 12 => hour = 0,
        _ => {}
    }

    let naive = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, 0)?;
    Some(Utc.from_utc_datetime(&naive))
}

fn month_number(name: &str) -> Option<u32> {
    let probe = format!("{name} 1 2000");
    NaiveDate::parse_from_str(&probe, "%B %d %Y")
        .ok()
        .or_else(|| NaiveDate::parse_from_str(&probe, "%b %d %Y").ok())
        .map(|date| date.month())
}
