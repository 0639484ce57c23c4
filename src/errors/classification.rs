use super::types::ChainError;

#[derive(Debug, Clone)]
pub struct ErrorClassification {
    pub error_type: &'static str,
    pub exit_code: i32,
}

impl ChainError {
    /// Classify this error for logging and process exit handling.
    pub fn classify(&self) -> ErrorClassification {
        match self {
            // Setup problems, nothing was sent to the target yet
            ChainError::Usage(_) => ErrorClassification {
                error_type: "UsageError",
                exit_code: 1,
            },
            ChainError::Config(_) => ErrorClassification {
                error_type: "ConfigError",
                exit_code: 2,
            },
            ChainError::InvalidTarget(_) => ErrorClassification {
                error_type: "InvalidTargetError",
                exit_code: 1,
            },

            // Exploit primitives
            ChainError::Transport(_) => ErrorClassification {
                error_type: "TransportFailure",
                exit_code: 1,
            },
            ChainError::Timeout(_) => ErrorClassification {
                error_type: "TransportFailure",
                exit_code: 1,
            },
            ChainError::Assertion(_) => ErrorClassification {
                error_type: "AssertionFailure",
                exit_code: 1,
            },
            ChainError::SearchExhaustion(_) => ErrorClassification {
                error_type: "SearchExhaustion",
                exit_code: 1,
            },

            // Local plumbing
            ChainError::Io(_) => ErrorClassification {
                error_type: "IoError",
                exit_code: 1,
            },
            ChainError::Json(_) => ErrorClassification {
                error_type: "JsonError",
                exit_code: 1,
            },
            ChainError::Yaml(_) => ErrorClassification {
                error_type: "YamlError",
                exit_code: 2,
            },
            ChainError::Internal(_) => ErrorClassification {
                error_type: "InternalError",
                exit_code: 1,
            },
        }
    }
}
