//! Error types for this crate.
//!
//! All fallible operations return [`Result<T>`] which uses [`PipelineError`] as the error type.

use thiserror::Error;

/// A [`Result`](std::result::Result) alias using [`PipelineError`] as the error type.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// The unified error type for all crate errors.
///
/// # Example
///
/// ```rust
/// use assertive_rewriter::error::PipelineError;
///
/// fn describe(e: &PipelineError) -> &'static str {
///     match e {
///         PipelineError::InvalidInput(_) => "fix the input",
///         e if e.is_retryable() => "try again",
///         _ => "report a bug",
///     }
/// }
///
/// let e = PipelineError::Download("connection reset".into());
/// assert_eq!(describe(&e), "try again");
/// ```
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PipelineError {
    /// Network or download failure. Retry may help.
    #[error("{0}")]
    Download(String),

    /// Checkpoint config or weights could not be turned into a model.
    #[error("{0}")]
    ModelLoad(String),

    /// Tokenization failure. Check input text.
    #[error("{0}")]
    Tokenization(String),

    /// Device initialization failure. Fall back to CPU.
    #[error("{0}")]
    Device(String),

    /// The classifier ran but produced nothing usable.
    #[error("{0}")]
    Inference(String),

    /// Input rejected before any model was touched.
    #[error("{0}")]
    InvalidInput(String),
}

impl PipelineError {
    /// Whether asking again has a chance of succeeding.
    ///
    /// Network and device failures can clear up on their own. Bad input and
    /// unsupported or malformed checkpoints cannot.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PipelineError::Download(_) | PipelineError::Device(_))
    }
}

impl From<hf_hub::api::sync::ApiError> for PipelineError {
    fn from(value: hf_hub::api::sync::ApiError) -> Self {
        PipelineError::Download(format!("HuggingFace API error: {}", value))
    }
}

impl From<candle_core::Error> for PipelineError {
    fn from(value: candle_core::Error) -> Self {
        PipelineError::Inference(value.to_string())
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(value: std::io::Error) -> Self {
        PipelineError::ModelLoad(value.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(value: serde_json::Error) -> Self {
        PipelineError::ModelLoad(format!("Malformed model config: {value}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors_are_retryable() {
        assert!(PipelineError::Download("timeout".into()).is_retryable());
        assert!(PipelineError::Device("no cuda".into()).is_retryable());
    }

    #[test]
    fn broken_checkpoints_are_not_retryable() {
        assert!(!PipelineError::ModelLoad("model_type 'gpt2' unsupported".into()).is_retryable());
    }

    #[test]
    fn input_and_inference_errors_are_not_retryable() {
        assert!(!PipelineError::InvalidInput("empty".into()).is_retryable());
        assert!(!PipelineError::Inference("no labels".into()).is_retryable());
        assert!(!PipelineError::Tokenization("bad utf8".into()).is_retryable());
    }

    #[test]
    fn json_errors_map_to_model_load() {
        let err: PipelineError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, PipelineError::ModelLoad(_)));
        assert!(err.to_string().starts_with("Malformed model config"));
    }
}
