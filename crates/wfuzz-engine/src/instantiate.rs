use wasmi::{Engine, Instance, Linker, Module, Store};
use wfuzz_core::StagedError;

/// Instantiates `module` in a fresh store and runs its start function.
///
/// No host functions are linked, so a module with any import fails here.
pub(crate) fn instantiate(engine: &Engine, module: &Module) -> Result<(Store<()>, Instance), StagedError> {
    let mut store = Store::new(engine, ());
    let linker = Linker::<()>::new(engine);

    let instance = linker
        .instantiate(&mut store, module)
        .and_then(|pre| pre.start(&mut store))
        .map_err(|e| StagedError::instantiate(format!("instantiation failed: {}", e)))?;

    Ok((store, instance))
}
