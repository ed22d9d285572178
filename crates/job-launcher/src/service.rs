use chrono::{Local, NaiveDateTime};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::context::{self, ExecutionPolicy};
use crate::error::SubmitError;
use crate::identifier;
use crate::launcher;
use crate::log_sink;

/// Acknowledgement for a launched job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub dataset: String,
    pub pid: u32,
    pub log_path: PathBuf,
}

/// Runs validate → resolve log → build context → spawn for one request.
#[derive(Debug, Clone)]
pub struct DiagnosisService {
    script_path: PathBuf,
    log_dir: PathBuf,
    policy: ExecutionPolicy,
}

impl DiagnosisService {
    pub fn new(script_path: impl Into<PathBuf>, log_dir: impl Into<PathBuf>) -> Self {
        Self::with_policy(script_path, log_dir, ExecutionPolicy::default())
    }

    pub fn with_policy(
        script_path: impl Into<PathBuf>,
        log_dir: impl Into<PathBuf>,
        policy: ExecutionPolicy,
    ) -> Self {
        Self {
            script_path: script_path.into(),
            log_dir: log_dir.into(),
            policy,
        }
    }

    pub fn script_path(&self) -> &Path {
        &self.script_path
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn submit(&self, raw_dataset: &str) -> Result<Submission, SubmitError> {
        self.submit_at(raw_dataset, Local::now().naive_local())
    }

    pub fn submit_at(
        &self,
        raw_dataset: &str,
        now: NaiveDateTime,
    ) -> Result<Submission, SubmitError> {
        let dataset = identifier::validate(raw_dataset).map_err(|err| {
            warn!(error = %err, "rejected dataset name");
            err
        })?;

        info!(dataset = %dataset, "received diagnosis application request");

        let sink = log_sink::resolve_sink(&self.log_dir, now, &dataset).map_err(|err| {
            error!(dataset = %dataset, error = %err, "dataset log unavailable");
            err
        })?;
        let log_path = sink.path().to_path_buf();

        let ctx = context::build(dataset.clone(), &self.script_path, &self.policy);
        let pid = launcher::launch(ctx, sink).map_err(|err| {
            error!(
                dataset = %dataset,
                script = %self.script_path.display(),
                error = %err,
                "failed to launch diagnosis script"
            );
            err
        })?;

        Ok(Submission {
            dataset: dataset.to_string(),
            pid,
            log_path,
        })
    }
}
