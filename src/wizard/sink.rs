//! Submission sinks - where validated values go on submit

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use ulid::Ulid;

use crate::core::values::FormValues;

/// Receives the values of a successfully submitted wizard
///
/// The controller calls [`submit`](SubmissionSink::submit) at most once per
/// submission and does not wait on or inspect the outcome. Closures taking
/// `&FormValues` are sinks.
pub trait SubmissionSink {
    fn submit(&mut self, values: &FormValues);
}

impl<F> SubmissionSink for F
where
    F: FnMut(&FormValues),
{
    fn submit(&mut self, values: &FormValues) {
        self(values)
    }
}

/// Where a [`RecordSink`] writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordTarget {
    /// Print the record to stdout
    Stdout,
    /// Write `<PREFIX>-<ULID>.yaml` into a directory
    Dir(PathBuf),
}

/// A submitted form as written to disk
#[derive(Debug, Serialize)]
pub struct SubmissionRecord<'a> {
    pub id: String,
    pub form: &'a str,
    pub submitted: DateTime<Utc>,
    pub values: &'a FormValues,
}

/// Writes each submission as a YAML record
///
/// Failures are kept rather than raised; the host checks
/// [`last_outcome`](RecordSink::last_outcome) after submitting and can
/// reopen the wizard when writing failed.
#[derive(Debug)]
pub struct RecordSink {
    form: String,
    prefix: String,
    target: RecordTarget,
    last: Option<Result<Option<PathBuf>, String>>,
}

impl RecordSink {
    pub fn new(form: impl Into<String>, prefix: impl Into<String>, target: RecordTarget) -> Self {
        Self {
            form: form.into(),
            prefix: prefix.into(),
            target,
            last: None,
        }
    }

    /// Result of the most recent write: the file written (None for stdout)
    /// or the error text
    pub fn last_outcome(&self) -> Option<&Result<Option<PathBuf>, String>> {
        self.last.as_ref()
    }

    fn write(&self, values: &FormValues) -> Result<Option<PathBuf>, String> {
        let id = format!("{}-{}", self.prefix, Ulid::new());
        let record = SubmissionRecord {
            id: id.clone(),
            form: &self.form,
            submitted: Utc::now(),
            values,
        };
        let yaml = serde_yml::to_string(&record).map_err(|e| e.to_string())?;

        match &self.target {
            RecordTarget::Stdout => {
                let mut out = std::io::stdout().lock();
                out.write_all(yaml.as_bytes()).map_err(|e| e.to_string())?;
                Ok(None)
            }
            RecordTarget::Dir(dir) => {
                let path = record_path(dir, &id);
                std::fs::create_dir_all(dir).map_err(|e| e.to_string())?;
                std::fs::write(&path, yaml).map_err(|e| e.to_string())?;
                Ok(Some(path))
            }
        }
    }
}

impl SubmissionSink for RecordSink {
    fn submit(&mut self, values: &FormValues) {
        let outcome = self.write(values);
        match &outcome {
            Ok(Some(path)) => tracing::info!(path = %path.display(), "submission recorded"),
            Ok(None) => tracing::info!("submission written to stdout"),
            Err(e) => tracing::warn!(error = %e, "failed to record submission"),
        }
        self.last = Some(outcome);
    }
}

fn record_path(dir: &Path, id: &str) -> PathBuf {
    dir.join(format!("{}.yaml", id))
}
