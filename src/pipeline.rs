use crate::config::{ParserConfig, load_config};
use crate::model::{EmailRunReport, InboundEmail, ParsedEmailResult};
use crate::parser::parse_email;
use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub input_dir: PathBuf,
    pub out_dir: PathBuf,
    pub config_path: Option<PathBuf>,
    pub received_at: Option<DateTime<Utc>>,
    pub dry_run: bool,
}

/// Parse every saved email body under the input directory, write one JSON
/// result per email, and report per-email counts.
pub fn run_batch(options: &BatchOptions) -> Result<Vec<EmailRunReport>> {
    let config = load_parser_config(options.config_path.as_deref())?;
    let received_at = options.received_at.unwrap_or_else(Utc::now);

    let files = collect_email_files(&options.input_dir)?;
    if files.is_empty() {
        bail!(
            "no email body files found in {}",
            options.input_dir.display()
        );
    }

    let mut reports = Vec::new();
    for path in files {
        let result = parse_email_file(&config, &path, received_at)?;

        if !options.dry_run {
            write_result(&options.out_dir, &result)?;
        }

        let report = EmailRunReport::from_result(&result);
        info!(
            email = %report.email_id,
            queries = report.queries_extracted,
            errors = report.parse_errors,
            ai_detections = report.ai_detections,
            "email processed"
        );
        reports.push(report);
    }

    if options.dry_run {
        info!("dry run enabled; results not written");
    }

    Ok(reports)
}

/// Parse one saved email body file. The file stem becomes the email id; a
/// leading `Subject:` line, when present, supplies the subject.
pub fn parse_email_file(
    config: &ParserConfig,
    path: &Path,
    received_at: DateTime<Utc>,
) -> Result<ParsedEmailResult> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read email body {}", path.display()))?;
    let email_id = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string();
    let (subject, body) = split_subject_line(&text);

    let email = InboundEmail {
        email_id,
        subject,
        body,
        received_at,
    };

    Ok(parse_email(config, &email, received_at))
}

pub fn load_parser_config(path: Option<&Path>) -> Result<ParserConfig> {
    match path {
        Some(path) => load_config(path),
        None => Ok(ParserConfig::default()),
    }
}

fn collect_email_files(input_dir: &Path) -> Result<Vec<PathBuf>> {
    if !input_dir.exists() {
        bail!("input dir does not exist: {}", input_dir.display());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(input_dir) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("txt") | Some("eml")
        ) {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

fn split_subject_line(text: &str) -> (String, String) {
    if let Some(first_line) = text.lines().next()
        && let Some(subject) = first_line.strip_prefix("Subject:")
    {
        let body = text[first_line.len()..].trim_start_matches(['\r', '\n']);
        return (subject.trim().to_string(), body.to_string());
    }

    (String::new(), text.to_string())
}

fn write_result(out_dir: &Path, result: &ParsedEmailResult) -> Result<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output dir {}", out_dir.display()))?;

    let path = out_dir.join(format!("{}.json", result.email_id));
    let serialized = serde_json::to_string_pretty(result)?;
    std::fs::write(&path, serialized)
        .with_context(|| format!("failed to write result file {}", path.display()))?;
    info!(file = %path.display(), "result written");
    Ok(())
}
