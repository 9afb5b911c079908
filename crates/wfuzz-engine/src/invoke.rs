use wasmi::{Instance, Store, Value};
use wfuzz_core::{StagedError, WasmValue};

/// Calls the export `name` with `args`, sizing the result buffer from the
/// function's signature.
pub(crate) fn invoke(
    store: &mut Store<()>,
    instance: &Instance,
    name: &str,
    args: &[WasmValue],
) -> Result<Vec<WasmValue>, StagedError> {
    let func = instance.get_func(&*store, name).ok_or_else(|| {
        StagedError::execute(format!("function '{}' not found in module exports", name))
    })?;

    let params = args
        .iter()
        .map(to_wasmi)
        .collect::<Result<Vec<_>, _>>()?;
    let mut results: Vec<Value> = func
        .ty(&*store)
        .results()
        .iter()
        .map(|ty| Value::default(*ty))
        .collect();

    func.call(&mut *store, &params, &mut results)
        .map_err(|e| StagedError::execute(format!("execution failed: {}", e)))?;

    Ok(results.iter().map(from_wasmi).collect())
}

fn to_wasmi(value: &WasmValue) -> Result<Value, StagedError> {
    match value {
        WasmValue::I32(v) => Ok(Value::I32(*v)),
        WasmValue::I64(v) => Ok(Value::I64(*v)),
        WasmValue::F32(v) => Ok(Value::F32((*v).into())),
        WasmValue::F64(v) => Ok(Value::F64((*v).into())),
        WasmValue::Ref(ty) => Err(StagedError::execute(format!(
            "cannot pass {} reference as an argument",
            ty
        ))),
    }
}

fn from_wasmi(value: &Value) -> WasmValue {
    match value {
        Value::I32(v) => WasmValue::I32(*v),
        Value::I64(v) => WasmValue::I64(*v),
        Value::F32(v) => WasmValue::F32(v.to_float()),
        Value::F64(v) => WasmValue::F64(v.to_float()),
        other => WasmValue::Ref(format!("{:?}", other.ty()).to_lowercase()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_argument_rejected() {
        let err = to_wasmi(&WasmValue::Ref("funcref".to_string())).unwrap_err();
        assert_eq!(err.stage(), wfuzz_core::Stage::Execute);
    }
}
