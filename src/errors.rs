use std::path::PathBuf;
use thiserror::Error;

/// Error type for invalid operations.
///
/// Each variant is a distinct, catchable condition so callers can branch on
/// cause without string matching. Parameter failures leave the store
/// unchanged; either a write succeeds in full or nothing happens.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),
    #[error("parameter '{0}' is fixed at construction and cannot be changed while running")]
    ImmutableParameter(String),
    #[error("invalid value {value} for parameter '{name}': {reason}")]
    InvalidParameterValue {
        name: String,
        value: f64,
        reason: String,
    },
    #[error("no results available: no time step has been executed")]
    NoStepExecuted,
    #[error("simulation kernel failed at step {step}: {details}")]
    KernelFailure { step: u64, details: String },
    #[error("failed to read parameter input {}", path.display())]
    TemplateIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed parameter input {}: {details}", path.display())]
    TemplateFormat { path: PathBuf, details: String },
}

/// Convenience type for `Result<T, ModelError>`.
pub type ModelResult<T> = Result<T, ModelError>;

/// Unrecoverable failure reported by a simulation kernel during a step.
///
/// Raised at the kernel boundary and mapped by the model into
/// [`ModelError::KernelFailure`] together with the step index. Not retried.
#[derive(Error, Debug)]
#[error("{details}")]
pub struct FatalKernelError {
    pub details: String,
}

impl FatalKernelError {
    pub fn new(details: impl Into<String>) -> Self {
        Self {
            details: details.into(),
        }
    }
}
