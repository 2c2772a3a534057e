// src/error.rs
use thiserror::Error;

/// Failures talking to the local inference server or reading its reply.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Cannot reach Ollama at {url}: {source}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Ollama error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Could not parse model reply: {0}")]
    Parse(String),

    #[error("Model returned empty content")]
    EmptyContent,
}

impl ExtractionError {
    /// Short text for the status line of the add-job screen
    pub fn user_message(&self) -> String {
        match self {
            ExtractionError::Connection { url, .. } => {
                format!("Ollama is not reachable at {url}. Is `ollama serve` running?")
            }
            ExtractionError::Api { status: 404, message } => {
                format!("Model not available: {message}")
            }
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for ExtractionError {
    fn from(err: serde_json::Error) -> Self {
        ExtractionError::Parse(err.to_string())
    }
}

/// Failures of the add-job pipeline. Nothing is persisted when one of these is returned.
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Please paste a job posting first")]
    EmptyInput,

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("Storage error: {0}")]
    Storage(#[source] anyhow::Error),
}

impl IntakeError {
    pub fn user_message(&self) -> String {
        match self {
            IntakeError::Extraction(e) => e.user_message(),
            IntakeError::Storage(e) => format!("Storage error: {e:#}"),
            IntakeError::EmptyInput => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_missing_message() {
        let err = ExtractionError::Api {
            status: 404,
            message: "model 'llama3.1' not found".to_string(),
        };
        assert!(err.user_message().starts_with("Model not available"));
    }

    #[test]
    fn test_json_error_becomes_parse() {
        let json_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err: ExtractionError = json_err.into();
        assert!(matches!(err, ExtractionError::Parse(_)));
    }

    #[test]
    fn test_intake_error_wraps_extraction() {
        let err: IntakeError = ExtractionError::EmptyContent.into();
        assert_eq!(err.user_message(), "Model returned empty content");
    }
}
