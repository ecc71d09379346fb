use regex::Regex;

/// Boilerplate scrub rules, applied in order. The bulk-email format wraps the
/// query content in markup, promo banners, an asterisk-framed index block and
/// subscription footers; all of it has to go before segmentation.
const SCRUB_RULES: &[(&str, &str)] = &[
    // Markup tags
    (r"<[^>]*>", " "),
    // CSS rule blocks leaking into text after tag removal
    (r"(?i)@media[^}]+\}", " "),
    (r"(?i)\.[a-z-]+\s*\{[^}]*\}", " "),
    (r"(?i)#[a-z-]+\s*\{[^}]*\}", " "),
    (r"(?i)[a-z]+\s*\{[^}]*\}", " "),
    // Footer and subscription-management blocks run to end of body
    (r"(?is)unsubscribe.*\z", " "),
    (r"(?is)manage subscription.*\z", " "),
    (r"(?is)follow us on.*\z", " "),
    (r"(?is)help a reporter out \d+.*\z", " "),
    (r"(?is)your haro subscription address.*\z", " "),
    (r"(?is)for delivery help.*\z", " "),
    // Tracking tokens
    (r"(?i)\?token=[\w.-]+", " "),
    (r"eyJ[\w.-]+", " "),
    // Sponsor block preceding the real content
    (r"(?is)earn high commissions.*?become an affiliate[^.]*\.", " "),
    (r"(?is)sponsored.*?queries from", "Queries from"),
    // Asterisk-framed table-of-contents block
    (r"(?is)\*+\s*INDEX\s*\*+.*?\*+", " "),
    // Social and navigation fragments
    (r"(?is)follow us on \w+.*?https?://\S+", " "),
    (r"(?i)@\w+\s+https?://\S+", " "),
    (r"(?i)back to top", " "),
    (r"(?is)forwarded this email\?.*?helpareporter\.com", " "),
    (r"(?i)haro connects journalists with expert sources", " "),
];

const ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#39;", "'"),
];

/// Strip markup, boilerplate and entities from a raw bulk-email body and
/// collapse whitespace. Pure; unmatched rules leave the text untouched.
pub fn normalize_body(raw_body: &str) -> String {
    let mut cleaned = raw_body.to_string();

    for (pattern, replacement) in SCRUB_RULES {
        let re = Regex::new(pattern).expect("scrub rule regex must compile");
        cleaned = re.replace_all(&cleaned, *replacement).to_string();
    }

    for (entity, replacement) in ENTITIES {
        cleaned = cleaned.replace(entity, replacement);
    }

    let ws = Regex::new(r"\s+").expect("whitespace regex must compile");
    cleaned = ws.replace_all(&cleaned, " ").trim().to_string();

    // Residual year-stamped footer left after whitespace collapsing.
    let footer = Regex::new(r"(?i)help a reporter out \d{4}.*\z")
        .expect("footer regex must compile");
    footer.replace_all(&cleaned, "").trim().to_string()
}
