//! Batch Runner: discovers module files and runs them through the processor
//! one at a time, aggregating a `Report`.
use crate::context::HarnessConfig;
use crate::data_model::Report;
use crate::error::HarnessError;
use crate::processor::FileProcessor;
use crate::runtime::Runtime;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Lists candidate module files in a directory.
pub trait ModuleDiscovery {
    fn discover(&self, dir: &Path) -> Result<Vec<PathBuf>, HarnessError>;
}

/// Non-recursive directory listing filtered by extension.
///
/// Order is whatever `std::fs::read_dir` yields and is not re-sorted, so it
/// can differ between filesystems.
#[derive(Debug, Clone)]
pub struct DirectoryListing {
    extension: String,
}

impl DirectoryListing {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }
}

impl ModuleDiscovery for DirectoryListing {
    fn discover(&self, dir: &Path) -> Result<Vec<PathBuf>, HarnessError> {
        let discovery_err = |source| HarnessError::Discovery {
            path: dir.to_path_buf(),
            source,
        };

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(discovery_err)? {
            let entry = entry.map_err(discovery_err)?;
            if entry.file_type().map_err(discovery_err)?.is_dir() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some(self.extension.as_str()) {
                files.push(path);
            }
        }
        Ok(files)
    }
}

pub struct BatchRunner<R: Runtime, D: ModuleDiscovery = DirectoryListing> {
    processor: FileProcessor<R>,
    discovery: D,
}

impl<R: Runtime> BatchRunner<R, DirectoryListing> {
    pub fn new(runtime: R) -> Self {
        Self::with_config(runtime, HarnessConfig::default())
    }

    pub fn with_config(runtime: R, config: HarnessConfig) -> Self {
        let discovery = DirectoryListing::new(config.extension.clone());
        Self {
            processor: FileProcessor::with_config(runtime, config),
            discovery,
        }
    }
}

impl<R: Runtime, D: ModuleDiscovery> BatchRunner<R, D> {
    pub fn with_discovery(processor: FileProcessor<R>, discovery: D) -> Self {
        Self {
            processor,
            discovery,
        }
    }

    pub fn processor(&self) -> &FileProcessor<R> {
        &self.processor
    }

    /// Processes every discovered file in discovery order. Only a discovery
    /// failure fails the run; module failures are recorded in the report.
    pub fn run(&self, dir: &Path) -> Result<Report, HarnessError> {
        let run_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("batch", %run_id, dir = %dir.display());
        let _entered = span.enter();
        let start = Instant::now();

        let files = self.discovery.discover(dir)?;
        tracing::info!(files = files.len(), "discovered modules");

        let mut report = Report::new();
        for path in &files {
            report.record(self.processor.process(path));
        }
        debug_assert!(report.is_consistent());

        tracing::info!(
            total = report.total_files,
            passed = report.passed,
            failed = report.failed,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "batch complete"
        );
        Ok(report)
    }
}
