use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum SpecialFlag {
    NoAi,
    Urgent,
    Paid,
    Exclusive,
}

impl SpecialFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpecialFlag::NoAi => "no_ai",
            SpecialFlag::Urgent => "urgent",
            SpecialFlag::Paid => "paid",
            SpecialFlag::Exclusive => "exclusive",
        }
    }
}

/// One raw email body handed over by the ingestion collaborator.
#[derive(Debug, Clone)]
pub struct InboundEmail {
    pub email_id: String,
    pub subject: String,
    pub body: String,
    pub received_at: DateTime<Utc>,
}

/// Mutable accumulator filled by the field-rule cascade. Every member is
/// optional; absent fields are defaulted or rejected during validation.
#[derive(Debug, Clone, Default)]
pub struct RawQueryFields {
    pub headline: Option<String>,
    pub full_text: Option<String>,
    pub requirements: Option<String>,
    pub deadline_raw: Option<String>,
    pub journalist_email: Option<String>,
    pub publication: Option<String>,
    pub outlet_url: Option<String>,
    pub category: String,
    pub reporter_name: Option<String>,
    pub query_number: Option<u32>,
    pub special_flags: Vec<SpecialFlag>,
    pub is_direct_email: bool,
    pub has_ai_detection: bool,
    pub trigger_words: Vec<String>,
    pub decoded_instructions: Option<String>,
    pub extracted_urls: Vec<String>,
    pub article_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidatedQuery {
    pub email_id: String,
    pub headline: String,
    pub full_text: String,
    pub requirements: String,
    pub deadline: DateTime<Utc>,
    pub deadline_was_defaulted: bool,
    pub journalist_email: Option<String>,
    pub publication: String,
    pub outlet_url: Option<String>,
    pub category: String,
    pub reporter_name: Option<String>,
    pub query_number: Option<u32>,
    pub special_flags: Vec<SpecialFlag>,
    pub is_direct_email: bool,
    pub has_ai_detection: bool,
    pub trigger_words: Vec<String>,
    pub decoded_instructions: Option<String>,
    pub extracted_urls: Vec<String>,
    pub article_url: Option<String>,
}

impl ValidatedQuery {
    /// A deadline counts as urgent inside the (0, 24h) window before it.
    pub fn is_urgent(&self, now: DateTime<Utc>) -> bool {
        let remaining = self.deadline.signed_duration_since(now);
        remaining > chrono::Duration::zero() && remaining < chrono::Duration::hours(24)
    }

    pub fn stable_uid(&self) -> String {
        let identity = if let Some(number) = self.query_number {
            format!("{}::{}", self.email_id, number)
        } else {
            format!("{}::{}", self.email_id, self.headline.to_lowercase())
        };

        let digest = Sha256::digest(identity.as_bytes());
        let short = &hex::encode(digest)[..24];
        format!("{short}@qsift.local")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParsedEmailResult {
    pub email_id: String,
    pub category: String,
    pub received_at: DateTime<Utc>,
    pub queries: Vec<ValidatedQuery>,
    pub parse_errors: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EmailRunReport {
    pub email_id: String,
    pub queries_extracted: usize,
    pub parse_errors: usize,
    pub ai_detections: usize,
    pub direct_emails: usize,
    pub defaulted_deadlines: usize,
}

impl EmailRunReport {
    pub fn from_result(result: &ParsedEmailResult) -> Self {
        Self {
            email_id: result.email_id.clone(),
            queries_extracted: result.queries.len(),
            parse_errors: result.parse_errors.len(),
            ai_detections: result.queries.iter().filter(|q| q.has_ai_detection).count(),
            direct_emails: result.queries.iter().filter(|q| q.is_direct_email).count(),
            defaulted_deadlines: result
                .queries
                .iter()
                .filter(|q| q.deadline_was_defaulted)
                .count(),
        }
    }
}
