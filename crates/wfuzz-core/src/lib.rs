//! WFUZZ Core: stage taxonomy, runtime boundary and batch orchestration
//!
//! Runs a batch of WebAssembly modules through an untrusted engine and
//! classifies each one by the stage it reached:
//!
//! ```text
//! discover ─► for each file ─► load ─► validate ─► instantiate ─► execute
//!                 │               └──────── Runtime::load_module ──┘    │
//!                 │                                   LoadedModule::execute
//!                 ▼
//!           ExecutionResult ─► Report { passed, failed, failure_counts }
//! ```
//!
//! Every module yields exactly one result; no module failure, engine error
//! or engine panic aborts the batch.

pub mod stage;
pub mod runtime;
pub mod processor;
pub mod runner;
pub mod data_model;
pub mod error;
pub mod context;
pub mod fault;

pub use stage::{BoxError, EngineError, Stage, StagedError};
pub use runtime::{LoadedModule, ModuleGuard, Runtime};
pub use processor::FileProcessor;
pub use runner::{BatchRunner, DirectoryListing, ModuleDiscovery};
pub use data_model::{ExecutionResult, Report, WasmValue};
pub use context::HarnessConfig;
pub use error::HarnessError;

/// Harness version reported by the CLI
pub const WFUZZ_VERSION: &str = env!("CARGO_PKG_VERSION");
