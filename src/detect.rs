use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use regex::Regex;
use tracing::debug;

/// Outcome of scanning one section for hidden encoded instructions.
#[derive(Debug, Clone, Default)]
pub struct AiDetection {
    pub has_detection: bool,
    pub trigger_words: Vec<String>,
    pub decoded_instructions: Option<String>,
    pub cleaned_text: String,
}

/// Journalists embed long base64/hex runs that decode to "include trigger
/// word X" instructions meant to expose AI-written pitches. Confirmed
/// payloads are decoded, recorded and stripped from the display text; decode
/// failures and incidental high-entropy runs are left alone.
pub fn detect_hidden_instructions(section: &str) -> AiDetection {
    let mut result = AiDetection {
        cleaned_text: section.to_string(),
        ..AiDetection::default()
    };

    let base64_run = Regex::new(r"[A-Za-z0-9+/]{50,}=*").expect("base64 run regex");
    let hex_run = Regex::new(r"[0-9a-fA-F]{50,}").expect("hex run regex");

    let candidates: Vec<String> = base64_run
        .find_iter(section)
        .map(|m| m.as_str().to_string())
        .collect();
    for candidate in candidates {
        if let Ok(bytes) = BASE64.decode(candidate.as_bytes())
            && let Ok(decoded) = String::from_utf8(bytes)
        {
            confirm_payload(&mut result, &candidate, &decoded);
        }
    }

    let candidates: Vec<String> = hex_run
        .find_iter(section)
        .map(|m| m.as_str().to_string())
        .collect();
    for candidate in candidates {
        if let Ok(bytes) = hex::decode(&candidate)
            && let Ok(decoded) = String::from_utf8(bytes)
        {
            confirm_payload(&mut result, &candidate, &decoded);
        }
    }

    result.cleaned_text = scrub_artifacts(&result.cleaned_text);
    result
}

/// Dual-substring heuristic: only decoded text mentioning both "ai" and
/// "word" counts as a genuine instruction payload.
fn confirm_payload(result: &mut AiDetection, encoded: &str, decoded: &str) {
    let lowered = decoded.to_lowercase();
    if !(lowered.contains("ai") && lowered.contains("word")) {
        return;
    }

    debug!(encoded_len = encoded.len(), "confirmed hidden instruction payload");

    result.has_detection = true;
    result.decoded_instructions = Some(decoded.to_string());
    result.trigger_words.extend(extract_trigger_words(decoded));
    result.cleaned_text = result.cleaned_text.replace(encoded, "");
}

/// Trigger words appear quoted or after a literal "word" inside the decoded
/// instructions.
fn extract_trigger_words(decoded: &str) -> Vec<String> {
    let re = Regex::new(r#"(?i)"([^"]+)"|'([^']+)'|word\s+(\w+)"#).expect("trigger word regex");
    re.captures_iter(decoded)
        .filter_map(|caps| {
            caps.get(1)
                .or_else(|| caps.get(2))
                .or_else(|| caps.get(3))
                .map(|m| m.as_str().to_string())
        })
        .collect()
}

fn scrub_artifacts(text: &str) -> String {
    let mojibake = Regex::new(r"[âÂ]+").expect("mojibake regex");
    let garbage =
        Regex::new(r#"[^\w\s.,;:!?()\-'"/\[\]{}@#$%&*+=<>|~`]"#).expect("garbage char regex");

    let mut cleaned = mojibake.replace_all(text, " ").to_string();
    cleaned = garbage.replace_all(&cleaned, " ").to_string();

    // Drop lines that are mostly non-alphanumeric noise.
    let cleaned = cleaned
        .lines()
        .filter(|line| {
            if line.is_empty() {
                return false;
            }
            let normal = line
                .chars()
                .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
                .count();
            normal * 10 >= line.chars().count() * 3
        })
        .collect::<Vec<_>>()
        .join("\n");

    let ws = Regex::new(r"\s+").expect("whitespace regex");
    ws.replace_all(&cleaned, " ").trim().to_string()
}
