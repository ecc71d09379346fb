use crate::pipeline::{load_parser_config, parse_email_file};
use anyhow::{Result, bail};
use chrono::Utc;
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct HarnessOptions {
    pub input_dir: PathBuf,
    pub config_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HarnessReport {
    pub files: usize,
    pub queries: usize,
    pub parse_errors: usize,
    pub ai_detections: usize,
    pub mismatches: usize,
}

/// Parse every fixture twice with identical inputs and count non-identical
/// serialized results. The pipeline is a pure function of its inputs, so any
/// mismatch is a determinism defect.
pub fn run_harness(options: &HarnessOptions) -> Result<HarnessReport> {
    let config = load_parser_config(options.config_path.as_deref())?;
    let received_at = Utc::now();

    let mut report = HarnessReport {
        files: 0,
        queries: 0,
        parse_errors: 0,
        ai_detections: 0,
        mismatches: 0,
    };

    for entry in WalkDir::new(&options.input_dir) {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_email_file(entry.path()) {
            continue;
        }

        let first = parse_email_file(&config, entry.path(), received_at)?;
        let second = parse_email_file(&config, entry.path(), received_at)?;

        report.files += 1;
        report.queries += first.queries.len();
        report.parse_errors += first.parse_errors.len();
        report.ai_detections += first.queries.iter().filter(|q| q.has_ai_detection).count();

        if serde_json::to_string(&first)? != serde_json::to_string(&second)? {
            report.mismatches += 1;
        }
    }

    if report.files == 0 {
        bail!(
            "no email body files found in {}",
            options.input_dir.display()
        );
    }

    Ok(report)
}

fn is_email_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("txt") | Some("eml")
    )
}
