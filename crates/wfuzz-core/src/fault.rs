//! Fault-injecting runtime for exercising the classification logic without
//! a real engine.
//!
//! Behaviour at both call sites is supplied per test as a closure, which may
//! return a tagged error, an untagged error, or panic.
//!
//! ```
//! use std::path::Path;
//! use wfuzz_core::fault::ScriptedRuntime;
//! use wfuzz_core::{EngineError, FileProcessor, Stage};
//!
//! let runtime = ScriptedRuntime::new()
//!     .on_execute(|_, _| Err(EngineError::untagged("integer divide by zero")));
//! let probe = runtime.probe();
//!
//! let result = FileProcessor::new(runtime).process(Path::new("/test/div.wasm"));
//! assert_eq!(result.failure_stage, Stage::Execute);
//! assert_eq!(probe.releases(), 1);
//! ```
use crate::data_model::WasmValue;
use crate::runtime::{LoadedModule, Runtime};
use crate::stage::EngineError;
use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;

type LoadFn = dyn Fn(&Path) -> Result<(), EngineError>;
type ExecuteFn = dyn Fn(&str, &[WasmValue]) -> Result<Vec<WasmValue>, EngineError>;

/// A single `execute` invocation as seen by the test double.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub function: String,
    pub args: Vec<WasmValue>,
}

/// Shared view of what the double observed, kept after the runtime has been
/// moved into a processor.
#[derive(Debug, Clone, Default)]
pub struct Probe {
    loads: Rc<RefCell<Vec<PathBuf>>>,
    calls: Rc<RefCell<Vec<Call>>>,
    releases: Rc<Cell<usize>>,
}

impl Probe {
    /// Paths passed to `load_module`, in order.
    pub fn loads(&self) -> Vec<PathBuf> {
        self.loads.borrow().clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Number of `release()` calls across all modules, repeats included.
    pub fn releases(&self) -> usize {
        self.releases.get()
    }
}

pub struct ScriptedRuntime {
    load: Box<LoadFn>,
    execute: Rc<ExecuteFn>,
    probe: Probe,
    record: bool,
}

impl ScriptedRuntime {
    /// Loads always succeed and `execute` returns `[I32(42)]`.
    pub fn new() -> Self {
        Self {
            load: Box::new(|_| Ok(())),
            execute: Rc::new(|_, _| Ok(vec![WasmValue::I32(42)])),
            probe: Probe::default(),
            record: true,
        }
    }

    pub fn on_load<F>(mut self, f: F) -> Self
    where
        F: Fn(&Path) -> Result<(), EngineError> + 'static,
    {
        self.load = Box::new(f);
        self
    }

    pub fn on_execute<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &[WasmValue]) -> Result<Vec<WasmValue>, EngineError> + 'static,
    {
        self.execute = Rc::new(f);
        self
    }

    /// Stops recording loads and calls; releases are still counted. For
    /// long-running loops such as benchmarks.
    pub fn without_recording(mut self) -> Self {
        self.record = false;
        self
    }

    pub fn probe(&self) -> Probe {
        self.probe.clone()
    }
}

impl Default for ScriptedRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime for ScriptedRuntime {
    type Module = ScriptedModule;

    fn load_module(&self, path: &Path) -> Result<ScriptedModule, EngineError> {
        if self.record {
            self.probe.loads.borrow_mut().push(path.to_path_buf());
        }
        (self.load)(path)?;
        Ok(ScriptedModule {
            execute: Rc::clone(&self.execute),
            probe: self.probe.clone(),
            record: self.record,
        })
    }
}

pub struct ScriptedModule {
    execute: Rc<ExecuteFn>,
    probe: Probe,
    record: bool,
}

impl LoadedModule for ScriptedModule {
    fn execute(&mut self, name: &str, args: &[WasmValue]) -> Result<Vec<WasmValue>, EngineError> {
        if self.record {
            self.probe.calls.borrow_mut().push(Call {
                function: name.to_string(),
                args: args.to_vec(),
            });
        }
        (self.execute)(name, args)
    }

    fn release(&mut self) {
        self.probe.releases.set(self.probe.releases.get() + 1);
    }
}
