//! File Processor: runs one module through the runtime boundary and
//! classifies what happened.
use crate::context::HarnessConfig;
use crate::data_model::{ExecutionResult, WasmValue};
use crate::runtime::{ModuleGuard, Runtime};
use crate::stage::{Stage, StagedError};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::time::Instant;

pub struct FileProcessor<R: Runtime> {
    runtime: R,
    config: HarnessConfig,
}

impl<R: Runtime> FileProcessor<R> {
    pub fn new(runtime: R) -> Self {
        Self::with_config(runtime, HarnessConfig::default())
    }

    pub fn with_config(runtime: R, config: HarnessConfig) -> Self {
        Self { runtime, config }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Processes the module at `path`. Never panics and never returns an
    /// error: every outcome, including a panic inside the engine, becomes a
    /// classified `ExecutionResult`.
    pub fn process(&self, path: &Path) -> ExecutionResult {
        let span = tracing::debug_span!("process", file = %path.display());
        let _entered = span.enter();
        let start = Instant::now();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.run_stages(path)));
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(Ok(values)) => {
                tracing::debug!(elapsed_ms, returned = values.len(), "module passed");
                ExecutionResult::passed(path, values)
            }
            Ok(Err(err)) => {
                tracing::warn!(stage = %err.stage(), error = %err.detail(), elapsed_ms, "module failed");
                ExecutionResult::failed(path, &err)
            }
            Err(payload) => {
                let err = StagedError::contained_panic(&panic_message(payload.as_ref()));
                tracing::error!(error = %err.detail(), elapsed_ms, "engine panicked; contained");
                ExecutionResult::failed(path, &err)
            }
        }
    }

    /// The ordered stages for one module. The guard releases the module on
    /// every exit from this function, unwinding included.
    fn run_stages(&self, path: &Path) -> Result<Vec<WasmValue>, StagedError> {
        let module = self
            .runtime
            .load_module(path)
            .map_err(|e| e.classify(Stage::Load))?;
        tracing::debug!("module loaded");

        let mut module = ModuleGuard::new(module);
        let args = [WasmValue::I32(self.config.input)];
        module
            .execute(&self.config.entry_point, &args)
            .map_err(|e| e.classify(Stage::Execute))
    }
}

/// Renders a panic payload. `panic!` produces `&str` or `String`; anything
/// else (`panic_any`) is opaque.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_str_and_string() {
        let payload: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(panic_message(payload.as_ref()), "static message");

        let payload: Box<dyn Any + Send> = Box::new(format!("formatted {}", 7));
        assert_eq!(panic_message(payload.as_ref()), "formatted 7");
    }

    #[test]
    fn test_panic_message_opaque_payload() {
        let payload: Box<dyn Any + Send> = Box::new(42_i32);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic payload");
    }
}
