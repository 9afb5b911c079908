//! Stage taxonomy: the closed set of pipeline stages and the stage-tagged error
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

/// Boxed error used for causes and untagged engine failures.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Pipeline stage a module reached before failing.
///
/// `None` marks success; the other four are mutually exclusive failure
/// classifications, listed in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    None,
    Load,
    Validate,
    Instantiate,
    Execute,
}

impl Stage {
    /// The four failure stages, in pipeline order.
    pub const FAILURES: [Stage; 4] = [
        Stage::Load,
        Stage::Validate,
        Stage::Instantiate,
        Stage::Execute,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::None => "none",
            Stage::Load => "load",
            Stage::Validate => "validate",
            Stage::Instantiate => "instantiate",
            Stage::Execute => "execute",
        }
    }

    pub fn is_failure(&self) -> bool {
        !matches!(self, Stage::None)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error attributed to a specific failure stage.
///
/// Only constructible for the four failure stages, so a `StagedError` never
/// carries `Stage::None`.
#[derive(Debug)]
pub struct StagedError {
    stage: Stage,
    message: String,
    cause: Option<BoxError>,
}

impl StagedError {
    fn new(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
            cause: None,
        }
    }

    pub fn load(message: impl Into<String>) -> Self {
        Self::new(Stage::Load, message)
    }

    pub fn validate(message: impl Into<String>) -> Self {
        Self::new(Stage::Validate, message)
    }

    pub fn instantiate(message: impl Into<String>) -> Self {
        Self::new(Stage::Instantiate, message)
    }

    pub fn execute(message: impl Into<String>) -> Self {
        Self::new(Stage::Execute, message)
    }

    /// A panic caught by the containment scope. Always classified `execute`:
    /// the stage that panicked is not recoverable after unwinding.
    pub fn contained_panic(payload: &str) -> Self {
        Self::new(Stage::Execute, format!("panic recovered: {}", payload))
    }

    pub fn with_cause(mut self, cause: impl Into<BoxError>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Message plus cause, without the stage prefix. This is what lands in
    /// `ExecutionResult::error_message`.
    pub fn detail(&self) -> String {
        match &self.cause {
            Some(cause) => format!("{}: {}", self.message, cause),
            None => self.message.clone(),
        }
    }
}

impl fmt::Display for StagedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.stage, self.detail())
    }
}

impl Error for StagedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_deref().map(|e| e as &(dyn Error + 'static))
    }
}

/// Failure reported by a runtime call site.
///
/// Engines tag what they can attribute; everything else stays untagged and
/// is defaulted by [`EngineError::classify`].
#[derive(Debug)]
pub enum EngineError {
    Staged(StagedError),
    Untagged(BoxError),
}

impl EngineError {
    pub fn untagged(err: impl Into<BoxError>) -> Self {
        EngineError::Untagged(err.into())
    }

    /// Explicit tag wins; otherwise the call site's nominal stage is used.
    pub fn classify(self, call_site: Stage) -> StagedError {
        match self {
            EngineError::Staged(err) => err,
            EngineError::Untagged(err) => {
                let verb = match call_site {
                    Stage::Load => "load",
                    Stage::Validate => "validation",
                    Stage::Instantiate => "instantiation",
                    Stage::Execute | Stage::None => "execution",
                };
                let stage = if call_site.is_failure() {
                    call_site
                } else {
                    Stage::Execute
                };
                StagedError::new(stage, format!("{} failed", verb)).with_cause(err)
            }
        }
    }
}

impl From<StagedError> for EngineError {
    fn from(err: StagedError) -> Self {
        EngineError::Staged(err)
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Staged(err) => fmt::Display::fmt(err, f),
            EngineError::Untagged(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            EngineError::Staged(err) => err.source(),
            EngineError::Untagged(err) => err.source(),
        }
    }
}
