//! Data Model: WasmValue, ExecutionResult, Report
use crate::stage::{Stage, StagedError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// A value crossing the runtime boundary, as an argument or a return value.
///
/// Serializes untagged, so `I32(2)` becomes the bare JSON number `2`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WasmValue {
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    /// Reference values have no stable host representation; only the type
    /// name is kept.
    Ref(String),
}

/// Outcome of processing a single module file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub file_path: String,
    pub file_name: String,
    pub success: bool,
    pub failure_stage: Stage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_values: Option<Vec<WasmValue>>,
}

impl ExecutionResult {
    pub fn passed(path: &Path, values: Vec<WasmValue>) -> Self {
        let (file_path, file_name) = path_parts(path);
        Self {
            file_path,
            file_name,
            success: true,
            failure_stage: Stage::None,
            error_message: None,
            return_values: Some(values),
        }
    }

    pub fn failed(path: &Path, err: &StagedError) -> Self {
        let (file_path, file_name) = path_parts(path);
        Self {
            file_path,
            file_name,
            success: false,
            failure_stage: err.stage(),
            error_message: Some(err.detail()),
            return_values: None,
        }
    }
}

fn path_parts(path: &Path) -> (String, String) {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    (path.to_string_lossy().into_owned(), file_name)
}

/// Aggregate outcome of a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub total_files: usize,
    pub passed: usize,
    pub failed: usize,
    pub results: Vec<ExecutionResult>,
    pub failure_counts: BTreeMap<Stage, usize>,
}

impl Report {
    /// Empty report with every failure stage present at zero.
    pub fn new() -> Self {
        Self {
            total_files: 0,
            passed: 0,
            failed: 0,
            results: Vec::new(),
            failure_counts: Stage::FAILURES.iter().map(|stage| (*stage, 0)).collect(),
        }
    }

    /// Append a result and update the counters.
    ///
    /// `success` is authoritative: a passed result is stored with
    /// `Stage::None`, and a failed one carrying `Stage::None` is counted as
    /// `execute`, so `failure_counts` never gains a fifth key.
    pub fn record(&mut self, mut result: ExecutionResult) {
        if result.success {
            result.failure_stage = Stage::None;
        } else if !result.failure_stage.is_failure() {
            tracing::warn!(file = %result.file_path, "failed result without a stage; counting as execute");
            result.failure_stage = Stage::Execute;
        }

        self.total_files += 1;
        if result.success {
            self.passed += 1;
        } else {
            self.failed += 1;
            *self.failure_counts.entry(result.failure_stage).or_insert(0) += 1;
        }
        self.results.push(result);
    }

    pub fn failures_at(&self, stage: Stage) -> usize {
        self.failure_counts.get(&stage).copied().unwrap_or(0)
    }

    /// Checks the aggregate invariants. Used by tests and debug assertions.
    pub fn is_consistent(&self) -> bool {
        let counted: usize = self.failure_counts.values().sum();
        self.passed + self.failed == self.total_files
            && self.total_files == self.results.len()
            && counted == self.failed
            && Stage::FAILURES
                .iter()
                .all(|stage| self.failure_counts.contains_key(stage))
            && self
                .results
                .iter()
                .all(|r| r.success == (r.failure_stage == Stage::None))
    }
}

impl Default for Report {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_report_has_all_stages_zeroed() {
        let report = Report::new();
        assert_eq!(report.failure_counts.len(), 4);
        assert!(report.failure_counts.values().all(|count| *count == 0));
        assert!(report.is_consistent());
    }

    #[test]
    fn test_record_updates_counters() {
        let mut report = Report::new();
        report.record(ExecutionResult::passed(Path::new("/corpus/a.wasm"), vec![WasmValue::I32(2)]));
        report.record(ExecutionResult::failed(
            Path::new("/corpus/b.wasm"),
            &StagedError::validate("type mismatch"),
        ));
        report.record(ExecutionResult::failed(
            Path::new("/corpus/c.wasm"),
            &StagedError::validate("unknown opcode"),
        ));

        assert_eq!(report.total_files, 3);
        assert_eq!(report.passed, 1);
        assert_eq!(report.failed, 2);
        assert_eq!(report.failures_at(Stage::Validate), 2);
        assert_eq!(report.failures_at(Stage::Execute), 0);
        assert!(report.is_consistent());
    }

    #[test]
    fn test_failed_result_without_stage_counts_as_execute() {
        let mut report = Report::new();
        report.record(ExecutionResult {
            file_path: "/corpus/odd.wasm".to_string(),
            file_name: "odd.wasm".to_string(),
            success: false,
            failure_stage: Stage::None,
            error_message: Some("built by hand".to_string()),
            return_values: None,
        });

        assert_eq!(report.failure_counts.len(), 4);
        assert!(!report.failure_counts.contains_key(&Stage::None));
        assert_eq!(report.failures_at(Stage::Execute), 1);
        assert_eq!(report.results[0].failure_stage, Stage::Execute);
        assert!(report.is_consistent());
    }

    #[test]
    fn test_passed_result_with_stage_is_cleared() {
        let mut result = ExecutionResult::passed(Path::new("/corpus/a.wasm"), vec![]);
        result.failure_stage = Stage::Load;

        let mut report = Report::new();
        report.record(result);

        assert_eq!(report.passed, 1);
        assert_eq!(report.failures_at(Stage::Load), 0);
        assert_eq!(report.results[0].failure_stage, Stage::None);
        assert!(report.is_consistent());
    }

    #[test]
    fn test_failed_result_omits_return_values() {
        let result = ExecutionResult::failed(
            Path::new("/corpus/empty.wasm"),
            &StagedError::load("empty module file"),
        );
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(
            value,
            json!({
                "file_path": "/corpus/empty.wasm",
                "file_name": "empty.wasm",
                "success": false,
                "failure_stage": "load",
                "error_message": "empty module file",
            })
        );
    }

    #[test]
    fn test_passed_result_omits_error_message() {
        let result = ExecutionResult::passed(
            Path::new("add_one.wasm"),
            vec![WasmValue::I32(2), WasmValue::F64(0.5)],
        );
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["failure_stage"], "none");
        assert_eq!(value["return_values"], json!([2, 0.5]));
        assert!(value.get("error_message").is_none());
    }

    #[test]
    fn test_report_serialization_shape() {
        let report = Report::new();
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(
            value,
            json!({
                "total_files": 0,
                "passed": 0,
                "failed": 0,
                "results": [],
                "failure_counts": {
                    "load": 0,
                    "validate": 0,
                    "instantiate": 0,
                    "execute": 0,
                },
            })
        );
    }
}
