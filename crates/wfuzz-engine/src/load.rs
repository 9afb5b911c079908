use std::path::Path;
use wasmparser::Parser;
use wfuzz_core::StagedError;

/// Reads the module bytes and checks the binary framing: magic number,
/// version and section headers. Section bodies are left to validation.
pub(crate) fn load(path: &Path) -> Result<Vec<u8>, StagedError> {
    let bytes = std::fs::read(path)
        .map_err(|e| StagedError::load("failed to read module file").with_cause(e))?;

    if bytes.is_empty() {
        return Err(StagedError::load("empty module file"));
    }

    for payload in Parser::new(0).parse_all(&bytes) {
        payload.map_err(|e| StagedError::load("load failed").with_cause(e))?;
    }

    Ok(bytes)
}
