//! Error types.
//!
//! `AnswerProvider` failures are recovered per question by the collector;
//! every other variant is fatal and ends the run with exit code 1.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InsightError {
    /// Missing or invalid configuration, e.g. no API credential.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed or empty input table.
    #[error("Data error: {0}")]
    Data(String),

    /// The remote answer provider failed. The payload is already the
    /// human-readable text that replaces the answer in the report.
    #[error("{0}")]
    AnswerProvider(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_displays_bare_message() {
        let err = InsightError::AnswerProvider("API调用失败: Invalid API-key".into());
        assert_eq!(err.to_string(), "API调用失败: Invalid API-key");
    }

    #[test]
    fn test_data_error_has_single_prefix() {
        let err = InsightError::Data("line 3: found record with 3 fields".into());
        assert_eq!(err.to_string(), "Data error: line 3: found record with 3 fields");
    }
}
