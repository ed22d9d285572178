#![cfg(unix)]

use chrono::{Local, NaiveDate, NaiveDateTime};
use job_launcher::{DiagnosisService, ExecutionPolicy, LaunchError, SubmitError, ValidationError};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    script: PathBuf,
    log_dir: PathBuf,
    tool: PathBuf,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("diagnose.sh");
    fs::write(&script, "#!/bin/bash\necho diagnosing \"$1\"\n").unwrap();

    // Stand-in for nsenter: echo the dataset token, then exit.
    let tool = dir.path().join("nsenter");
    fs::write(&tool, "#!/bin/sh\nfor a; do last=$a; done\necho \"job: $last\"\n").unwrap();
    fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();

    let log_dir = dir.path().join("logs");
    Fixture {
        _dir: dir,
        script,
        log_dir,
        tool,
    }
}

fn service(fx: &Fixture, script: &Path) -> DiagnosisService {
    DiagnosisService::with_policy(
        script,
        &fx.log_dir,
        ExecutionPolicy {
            entry_program: fx.tool.clone(),
            ..ExecutionPolicy::default()
        },
    )
}

fn fixed_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 30)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

async fn wait_for(path: &Path, needle: &str) -> String {
    let mut contents = String::new();
    for _ in 0..60 {
        contents = fs::read_to_string(path).unwrap_or_default();
        if contents.contains(needle) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    contents
}

#[tokio::test]
async fn given_valid_dataset_when_submitted_then_job_launches_into_todays_log() {
    let fx = fixture();
    let svc = service(&fx, &fx.script);

    let submission = svc.submit("sales_2024").unwrap();

    let expected = fx.log_dir.join(format!(
        "diagnosis_{}.log",
        Local::now().format("%Y%m%d")
    ));
    assert!(submission.pid > 0);
    assert_eq!(submission.dataset, "sales_2024");
    assert_eq!(submission.log_path, expected);

    let contents = wait_for(&expected, "job: ").await;
    assert!(contents.contains("Starting diagnosis for dataset: sales_2024"));
    assert!(contents.contains(&format!("&& bash {} sales_2024", fx.script.display())));
}

#[tokio::test]
async fn given_empty_dataset_when_submitted_then_nothing_is_opened_or_spawned() {
    let fx = fixture();
    let svc = service(&fx, &fx.script);

    let err = svc.submit("").unwrap_err();

    assert!(matches!(err, SubmitError::Validation(ValidationError::Empty)));
    assert!(err.is_client_error());
    assert!(!fx.log_dir.exists());
}

#[tokio::test]
async fn given_injection_attempt_when_submitted_then_rejected_before_any_side_effect() {
    let fx = fixture();
    let svc = service(&fx, &fx.script);

    let err = svc.submit("a;rm -rf /").unwrap_err();

    assert!(matches!(
        err,
        SubmitError::Validation(ValidationError::InvalidCharacters)
    ));
    assert!(!fx.log_dir.exists());
}

#[tokio::test]
async fn given_missing_script_when_submitted_then_not_found_and_header_survives() {
    let fx = fixture();
    let missing = fx.script.with_file_name("gone.sh");
    let svc = service(&fx, &missing);

    let err = svc.submit_at("sales_2024", fixed_now()).unwrap_err();

    match err {
        SubmitError::Launch(LaunchError::NotFound { ref path }) => assert_eq!(path, &missing),
        ref other => panic!("expected NotFound, got {:?}", other),
    }
    assert!(!err.is_client_error());
    let log = fs::read_to_string(fx.log_dir.join("diagnosis_20240630.log")).unwrap();
    assert!(log.contains("[2024-06-30 12:00:00] Starting diagnosis for dataset: sales_2024"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn given_concurrent_submissions_when_same_day_then_distinct_pids_and_intact_headers() {
    let fx = fixture();
    let svc = service(&fx, &fx.script);

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let svc = svc.clone();
            tokio::task::spawn_blocking(move || svc.submit_at("sales_2024", fixed_now()))
        })
        .collect();

    let mut pids = Vec::new();
    for handle in handles {
        pids.push(handle.await.unwrap().unwrap().pid);
    }
    assert_ne!(pids[0], pids[1]);

    let log_path = fx.log_dir.join("diagnosis_20240630.log");
    let mut contents = String::new();
    for _ in 0..60 {
        contents = fs::read_to_string(&log_path).unwrap();
        if contents.matches("job: ").count() == 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    let rule = "=".repeat(80);
    let header = format!(
        "{rule}\n[2024-06-30 12:00:00] Starting diagnosis for dataset: sales_2024\n{rule}\n\n"
    );
    assert_eq!(contents.matches(&header).count(), 2);
}
