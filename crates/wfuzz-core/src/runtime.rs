//! Runtime Boundary: the seam between the orchestrator and an execution engine
//!
//! ```text
//! load_module(path) ──► Module ──► execute(name, args) ──► Vec<WasmValue>
//!   load / validate /               execute                     │
//!   instantiate                                                 ▼
//!                                            release() (exactly once, via ModuleGuard)
//! ```
//!
//! The processor only ever talks to these traits. The real engine adapter
//! and the fault-injecting test double are interchangeable behind them.
use crate::data_model::WasmValue;
use crate::stage::{EngineError, StagedError};
use std::path::Path;

/// An execution engine able to turn a file into a runnable module.
pub trait Runtime {
    type Module: LoadedModule;

    /// Loads, validates and instantiates the module at `path` as one step.
    ///
    /// Errors should be tagged with the sub-phase that failed when the
    /// engine can tell; untagged errors are classified as `load`.
    fn load_module(&self, path: &Path) -> Result<Self::Module, EngineError>;
}

/// A loaded and instantiated module.
pub trait LoadedModule {
    /// Invokes the exported function `name` with positional `args`.
    /// Untagged errors are classified as `execute`.
    fn execute(&mut self, name: &str, args: &[WasmValue]) -> Result<Vec<WasmValue>, EngineError>;

    /// Releases engine resources. Must be idempotent and must not panic.
    fn release(&mut self);
}

/// Owns a loaded module and releases it exactly once, on whichever path
/// leaves the scope first: explicit release, normal drop, or unwinding.
pub struct ModuleGuard<M: LoadedModule> {
    module: Option<M>,
}

impl<M: LoadedModule> ModuleGuard<M> {
    pub fn new(module: M) -> Self {
        Self {
            module: Some(module),
        }
    }

    pub fn execute(&mut self, name: &str, args: &[WasmValue]) -> Result<Vec<WasmValue>, EngineError> {
        match self.module.as_mut() {
            Some(module) => module.execute(name, args),
            None => Err(StagedError::execute("module already released").into()),
        }
    }

    pub fn is_released(&self) -> bool {
        self.module.is_none()
    }

    pub fn release(&mut self) {
        if let Some(mut module) = self.module.take() {
            module.release();
            tracing::trace!("module released");
        }
    }
}

impl<M: LoadedModule> Drop for ModuleGuard<M> {
    fn drop(&mut self) {
        self.release();
    }
}
