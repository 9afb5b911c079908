//! WFUZZ Engine: runtime adapter over the wasmi interpreter.
//!
//! Each pipeline stage lives in its own module and tags its own failures,
//! so the single `load_module` call still reports the exact stage:
//!
//! ```text
//! file ─► load ─────► validate ─────► instantiate ─────► invoke
//!          │            │                │                  │
//!      framing /     wasmparser +     Linker + start     export lookup +
//!      magic         wasmi compile    function           Func::call
//! ```

mod instantiate;
mod invoke;
mod load;
mod validate;

use std::path::Path;
use wasmi::{Engine, Instance, Store};
use wfuzz_core::{EngineError, LoadedModule, Runtime, StagedError, WasmValue};

/// Runs modules on a shared wasmi `Engine`. Every module gets its own store.
#[derive(Default)]
pub struct WasmiRuntime {
    engine: Engine,
}

impl WasmiRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_engine(engine: Engine) -> Self {
        Self { engine }
    }
}

impl Runtime for WasmiRuntime {
    type Module = WasmiModule;

    fn load_module(&self, path: &Path) -> Result<WasmiModule, EngineError> {
        let bytes = load::load(path)?;
        tracing::trace!(bytes = bytes.len(), "loaded");

        let module = validate::validate(&self.engine, &bytes)?;
        tracing::trace!("validated");

        let (store, instance) = instantiate::instantiate(&self.engine, &module)?;
        tracing::trace!("instantiated");

        Ok(WasmiModule {
            store: Some(store),
            instance,
        })
    }
}

/// An instantiated module. Releasing drops the store, which owns every
/// runtime object of the instance.
pub struct WasmiModule {
    store: Option<Store<()>>,
    instance: Instance,
}

impl LoadedModule for WasmiModule {
    fn execute(&mut self, name: &str, args: &[WasmValue]) -> Result<Vec<WasmValue>, EngineError> {
        let store = self
            .store
            .as_mut()
            .ok_or_else(|| StagedError::execute("module already released"))?;
        Ok(invoke::invoke(store, &self.instance, name, args)?)
    }

    fn release(&mut self) {
        self.store = None;
    }
}
