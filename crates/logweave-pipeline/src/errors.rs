use crate::Diagnostic;
use thiserror::Error;

/// Failure reported by a single operator builder.
#[derive(Debug, Error)]
pub enum OperatorError {
    #[error("missing required field '{0}'")]
    MissingField(String),
    #[error("invalid field '{field}': {reason}")]
    InvalidField { field: String, reason: String },
    #[error("unsupported operator type '{0}'")]
    UnknownType(String),
    #[error("failed to decode operator config: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("reached max plugin depth of {0}")]
    MaxPluginDepth(usize),
    #[error("builder produced no operators")]
    NoOperators,
    #[error(transparent)]
    Nested(#[from] Box<PipelineError>),
}

impl OperatorError {
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to build operator '{operator_id}': {source}")]
    Build {
        operator_id: String,
        #[source]
        source: OperatorError,
    },
    #[error("invalid pipeline config: {0}")]
    Config(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl PipelineError {
    pub fn build(operator_id: impl Into<String>, source: OperatorError) -> Self {
        Self::Build {
            operator_id: operator_id.into(),
            source,
        }
    }
}

#[derive(Debug, Error, Clone)]
#[error("validation failed with {errors_count} error(s)")]
pub struct ValidationError {
    pub diagnostics: Vec<Diagnostic>,
    pub errors_count: usize,
}

impl ValidationError {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        let errors_count = diagnostics.iter().filter(|d| d.is_error()).count();
        Self {
            diagnostics,
            errors_count,
        }
    }
}
