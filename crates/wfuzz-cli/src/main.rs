//! wasm-fuzzer binary.
//!
//! Usage: `wasm-fuzzer [--config wfuzz.yaml] [--compact] <directory>`
//!
//! Set `RUST_LOG=wfuzz_core=debug` for per-file stage logs on stderr.

use std::process::ExitCode;

fn main() -> ExitCode {
    wfuzz_cli::init_tracing();
    wfuzz_cli::install_panic_hook();
    wfuzz_cli::main_with_recovery()
}
