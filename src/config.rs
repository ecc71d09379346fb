use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct ParserConfig {
    #[serde(default = "default_relay_domain")]
    pub relay_domain: String,
    #[serde(default = "default_category_headers")]
    pub category_headers: Vec<String>,
    #[serde(default = "default_min_section_len")]
    pub min_section_len: usize,
    #[serde(default = "default_max_sections")]
    pub max_sections: usize,
    #[serde(default = "default_start_marker_min_offset")]
    pub start_marker_min_offset: usize,
    #[serde(default = "default_default_deadline_days")]
    pub default_deadline_days: i64,
    #[serde(default = "default_deadline_formats")]
    pub deadline_formats: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            relay_domain: default_relay_domain(),
            category_headers: default_category_headers(),
            min_section_len: default_min_section_len(),
            max_sections: default_max_sections(),
            start_marker_min_offset: default_start_marker_min_offset(),
            default_deadline_days: default_default_deadline_days(),
            deadline_formats: default_deadline_formats(),
        }
    }
}

impl ParserConfig {
    pub fn validate(&self) -> Result<()> {
        if self.relay_domain.trim().is_empty() {
            bail!("relay_domain must not be empty");
        }
        if self.max_sections == 0 {
            bail!("max_sections must be at least 1");
        }
        if self.default_deadline_days <= 0 {
            bail!("default_deadline_days must be positive");
        }
        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<ParserConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read parser config: {}", path.display()))?;
    let config: ParserConfig = toml::from_str(&text)
        .with_context(|| format!("failed to parse toml in {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid parser config {}", path.display()))?;
    Ok(config)
}

fn default_relay_domain() -> String {
    "helpareporter.com".to_string()
}

fn default_category_headers() -> Vec<String> {
    [
        "Business and Finance",
        "Health and Pharma",
        "General",
        "Technology",
        "Lifestyle",
        "Podcasts",
    ]
    .into_iter()
    .map(ToString::to_string)
    .collect()
}

fn default_min_section_len() -> usize {
    50
}

fn default_max_sections() -> usize {
    50
}

fn default_start_marker_min_offset() -> usize {
    100
}

fn default_default_deadline_days() -> i64 {
    7
}

fn default_deadline_formats() -> Vec<String> {
    [
        "%B %d, %Y at %I:%M %p",
        "%B %d, %Y %I:%M %p",
        "%B %d, %Y",
        "%b %d, %Y at %I:%M %p",
        "%b %d, %Y %I:%M %p",
        "%b %d, %Y",
        "%m/%d/%Y %H:%M",
        "%m/%d/%Y",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%d",
    ]
    .into_iter()
    .map(ToString::to_string)
    .collect()
}
