use anyhow::Result;
use chrono::{Duration, TimeZone, Utc};
use qsift::harness::{HarnessOptions, run_harness};
use qsift::model::ParsedEmailResult;
use qsift::pipeline::{BatchOptions, run_batch};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn fixture_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/emails")
}

#[test]
fn batch_writes_one_result_per_email() -> Result<()> {
    let out = tempdir()?;
    let received_at = Utc.with_ymd_and_hms(2026, 3, 3, 8, 0, 0).unwrap();

    let reports = run_batch(&BatchOptions {
        input_dir: fixture_dir(),
        out_dir: out.path().to_path_buf(),
        config_path: None,
        received_at: Some(received_at),
        dry_run: false,
    })?;

    assert_eq!(reports.len(), 2);

    let digest = reports
        .iter()
        .find(|r| r.email_id == "digest-tech")
        .expect("digest report");
    assert_eq!(digest.queries_extracted, 2);
    assert_eq!(digest.parse_errors, 0);
    assert_eq!(digest.ai_detections, 1);
    assert_eq!(digest.direct_emails, 1);
    assert_eq!(digest.defaulted_deadlines, 1);

    let promo = reports
        .iter()
        .find(|r| r.email_id == "promo-only")
        .expect("promo report");
    assert_eq!(promo.queries_extracted, 0);
    assert_eq!(promo.parse_errors, 0);

    assert!(out.path().join("digest-tech.json").exists());
    assert!(out.path().join("promo-only.json").exists());
    Ok(())
}

#[test]
fn written_result_round_trips_with_anchored_deadlines() -> Result<()> {
    let out = tempdir()?;
    let received_at = Utc.with_ymd_and_hms(2026, 3, 3, 8, 0, 0).unwrap();

    run_batch(&BatchOptions {
        input_dir: fixture_dir(),
        out_dir: out.path().to_path_buf(),
        config_path: None,
        received_at: Some(received_at),
        dry_run: false,
    })?;

    let text = fs::read_to_string(out.path().join("digest-tech.json"))?;
    let result: ParsedEmailResult = serde_json::from_str(&text)?;

    assert_eq!(result.email_id, "digest-tech");
    assert_eq!(result.category, "Technology");
    assert_eq!(result.received_at, received_at);

    let defaulted = &result.queries[0];
    assert!(defaulted.deadline_was_defaulted);
    assert_eq!(defaulted.deadline, received_at + Duration::days(7));

    let parsed = &result.queries[1];
    assert!(!parsed.deadline_was_defaulted);
    assert_eq!(
        parsed.deadline,
        Utc.with_ymd_and_hms(2026, 3, 6, 17, 0, 0).unwrap()
    );
    Ok(())
}

#[test]
fn dry_run_reports_without_writing() -> Result<()> {
    let out = tempdir()?;

    let reports = run_batch(&BatchOptions {
        input_dir: fixture_dir(),
        out_dir: out.path().join("never-created"),
        config_path: None,
        received_at: None,
        dry_run: true,
    })?;

    assert_eq!(reports.len(), 2);
    assert!(!out.path().join("never-created").exists());
    Ok(())
}

#[test]
fn batch_fails_on_empty_input_dir() -> Result<()> {
    let empty = tempdir()?;
    let out = tempdir()?;

    let err = run_batch(&BatchOptions {
        input_dir: empty.path().to_path_buf(),
        out_dir: out.path().to_path_buf(),
        config_path: None,
        received_at: None,
        dry_run: false,
    })
    .unwrap_err();

    assert!(err.to_string().contains("no email body files"));
    Ok(())
}

#[test]
fn harness_reports_zero_mismatches_on_fixtures() -> Result<()> {
    let report = run_harness(&HarnessOptions {
        input_dir: fixture_dir(),
        config_path: None,
    })?;

    assert_eq!(report.files, 2);
    assert_eq!(report.queries, 2);
    assert_eq!(report.parse_errors, 0);
    assert_eq!(report.ai_detections, 1);
    assert_eq!(report.mismatches, 0);
    Ok(())
}

#[test]
fn config_file_overrides_merge_with_defaults() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("parser.toml");
    fs::write(&path, "max_sections = 10\nrelay_domain = \"relay.example.com\"\n")?;

    let config = qsift::config::load_config(&path)?;
    assert_eq!(config.max_sections, 10);
    assert_eq!(config.relay_domain, "relay.example.com");
    assert_eq!(config.default_deadline_days, 7);
    assert!(!config.deadline_formats.is_empty());
    Ok(())
}

#[test]
fn config_with_empty_relay_domain_is_rejected() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("parser.toml");
    fs::write(&path, "relay_domain = \"\"\n")?;

    let err = qsift::config::load_config(&path).unwrap_err();
    assert!(format!("{err:#}").contains("relay_domain"));
    Ok(())
}
