use crate::config::ParserConfig;
use regex::Regex;
use tracing::debug;

/// Split a normalized body into candidate query sections. Returns an empty
/// vector when no recognizable query markers exist; that is not an error.
pub fn split_sections(config: &ParserConfig, body: &str) -> Vec<String> {
    let content = &body[query_start_offset(config, body)..];

    let numbered = Regex::new(r"(?i)\d+\s*\)\s*Summary:").expect("numbered marker regex");
    let mut sections = split_at_markers(content, &numbered);

    if sections.len() < 2 {
        let any_marker = Regex::new(r"(?i)(?:Summary:|Query:)").expect("marker regex");
        sections = split_at_markers(content, &any_marker);
    }

    let marker = Regex::new(r"(?i)Summary:|Query:").expect("marker regex");
    let field = Regex::new(r"(?i)Name:|Email:|Media Outlet:|Deadline:").expect("field regex");
    let index_only = index_label_regex(config);

    let kept: Vec<String> = sections
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| {
            s.len() >= config.min_section_len
                && marker.is_match(s)
                && field.is_match(s)
                && !index_only.is_match(s)
        })
        .take(config.max_sections)
        .collect();

    debug!(
        candidates = sections.len(),
        kept = kept.len(),
        "segmented email body"
    );

    kept
}

/// Offset past the leading promotional/index content: the earliest start
/// indicator found beyond the minimum-offset guard wins.
fn query_start_offset(config: &ParserConfig, body: &str) -> usize {
    let summary = Regex::new(r"(?i)\d+\s*\)\s*Summary:|Summary:").expect("summary regex");
    if let Some(m) = summary.find(body)
        && m.start() > config.start_marker_min_offset
    {
        return m.start();
    }

    for header in &config.category_headers {
        if let Some(pos) = body.find(header.as_str())
            && pos > config.start_marker_min_offset
        {
            return pos;
        }
    }

    0
}

/// Lookahead-style split: one piece per marker occurrence, keeping any
/// content before the first marker as its own piece.
fn split_at_markers(text: &str, re: &Regex) -> Vec<String> {
    let starts: Vec<usize> = re.find_iter(text).map(|m| m.start()).collect();
    if starts.is_empty() {
        return vec![text.to_string()];
    }

    let mut pieces = Vec::new();
    if starts[0] > 0 {
        pieces.push(text[..starts[0]].to_string());
    }
    for (idx, start) in starts.iter().enumerate() {
        let end = if idx + 1 < starts.len() {
            starts[idx + 1]
        } else {
            text.len()
        };
        pieces.push(text[*start..end].to_string());
    }

    pieces
}

/// Matches sections that are a bare category or index label, optionally
/// followed by numbering.
fn index_label_regex(config: &ParserConfig) -> Regex {
    let mut names: Vec<String> = config
        .category_headers
        .iter()
        .map(|h| regex::escape(h))
        .collect();
    names.push("INDEX".to_string());
    let pattern = format!(r"(?i)^(?:{})[\s\d)]*$", names.join("|"));
    Regex::new(&pattern).expect("index label regex must compile")
}
