use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

#[derive(Serialize)]
pub struct JsonErr {
    pub ok: bool,
    pub error: ErrorBody,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(thiserror::Error, Debug)]
pub enum CheckError {
    #[error("precondition failed: {0}")]
    Precondition(String),
    #[error("{tool} failed: {detail}")]
    Tool { tool: String, detail: String },
    #[error("parse error: {0}")]
    Parse(String),
    #[error("measurement failed: {0}")]
    Measurement(String),
}

impl CheckError {
    pub fn code(&self) -> &'static str {
        match self {
            CheckError::Precondition(_) => "PRECONDITION",
            CheckError::Tool { .. } => "TOOL_FAILED",
            CheckError::Parse(_) => "PARSE",
            CheckError::Measurement(_) => "MEASUREMENT",
        }
    }
}

/// Immutable per-run configuration for the header pipeline. Every service
/// takes this instead of reading process-global state.
#[derive(Debug, Clone)]
pub struct HeadersConfig {
    pub src_root: PathBuf,
    /// Build output directory, relative to `src_root`.
    pub out_dir: String,
    pub ninja: PathBuf,
    pub gn: PathBuf,
    pub gclient: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct HeaderReport {
    pub missing: Vec<String>,
    pub nonexistent: Vec<String>,
}

impl HeaderReport {
    pub fn has_findings(&self) -> bool {
        !self.missing.is_empty() || !self.nonexistent.is_empty()
    }
}

/// One content-addressed unit of package storage. Two blobs in different
/// packages may share the same `hash`.
#[derive(Debug, Clone, Serialize)]
pub struct Blob {
    pub name: String,
    pub hash: String,
    pub compressed: u64,
    pub uncompressed: u64,
}

/// Apportioned totals for one package, after dividing shared-blob sizes by
/// their reference counts.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PackageSizes {
    pub compressed: f64,
    pub uncompressed: f64,
}

#[derive(Debug, Deserialize)]
pub struct SizesConfig {
    pub far_files: Vec<String>,
    #[serde(default)]
    pub size_limits: BTreeMap<String, u64>,
    #[serde(default)]
    pub far_total_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TestStatus {
    #[serde(rename = "PASS")]
    Pass,
    #[serde(rename = "FAIL")]
    Fail,
    #[serde(rename = "CRASH")]
    Crash,
}

impl TestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Pass => "PASS",
            TestStatus::Fail => "FAIL",
            TestStatus::Crash => "CRASH",
        }
    }
}

#[derive(Serialize)]
pub struct TestOutcome {
    pub expected: &'static str,
    pub actual: TestStatus,
}

/// JSON test-results document (format version 3) consumed by the result
/// pipeline.
#[derive(Serialize)]
pub struct TestResultsDoc {
    pub tests: BTreeMap<String, TestOutcome>,
    pub interrupted: bool,
    pub path_delimiter: String,
    pub version: u32,
    pub seconds_since_epoch: u64,
    pub num_failures_by_type: BTreeMap<String, usize>,
}

/// Fallback results document used when no per-metric status is available.
#[derive(Serialize)]
pub struct SimpleResultsDoc {
    pub valid: bool,
    pub failures: Vec<String>,
    pub version: String,
}

#[derive(Serialize)]
pub struct SizesReport {
    pub packages: BTreeMap<String, PackageSizes>,
    pub status: BTreeMap<String, TestStatus>,
    pub all_passed: bool,
}
