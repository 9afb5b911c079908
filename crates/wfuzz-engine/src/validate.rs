use wasmi::{Engine, Module};
use wasmparser::Validator;
use wfuzz_core::StagedError;

/// Full structural and type validation, then compilation into a wasmi
/// module. A module wasmparser accepts but wasmi rejects (an unsupported
/// proposal, for instance) is still a validation failure from the harness's
/// point of view.
pub(crate) fn validate(engine: &Engine, bytes: &[u8]) -> Result<Module, StagedError> {
    Validator::new()
        .validate_all(bytes)
        .map_err(|e| StagedError::validate("validation failed").with_cause(e))?;

    Module::new(engine, bytes).map_err(|e| StagedError::validate(format!("validation failed: {}", e)))
}
