//! Error types for genbind.

pub mod convert;
pub mod unified;

pub use convert::ConvertError;
pub use unified::{ErrorCategory, RecoverySuggestion};

use std::fmt;

use thiserror::Error;

/// Boxed error returned by caller-supplied tool functions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Which side of a tool binding failed to convert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolStage {
    /// Decoding the model's arguments into the tool's input record.
    Input,
    /// Encoding the tool's output record for the model.
    Output,
}

impl fmt::Display for ToolStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("input"),
            Self::Output => f.write_str("output"),
        }
    }
}

/// Primary error type for all genbind operations.
#[derive(Error, Debug)]
pub enum GenbindError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Conversion error: {0}")]
    Convert(#[from] ConvertError),

    #[error("Unknown tool '{name}' requested in round {round}")]
    UnknownTool { name: String, round: usize },

    #[error("Tool '{tool_name}' {stage} conversion failed: {source}")]
    ToolConversion {
        tool_name: String,
        stage: ToolStage,
        #[source]
        source: ConvertError,
    },

    #[error("Tool execution error: {tool_name}: {message}")]
    ToolExecution {
        tool_name: String,
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limited: retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Tool '{tool_name}' timed out after {timeout_ms}ms in round {round}")]
    ToolTimeout {
        tool_name: String,
        round: usize,
        timeout_ms: u64,
    },

    /// A transport call failed during the given conversation round.
    #[error("Transport failed in round {round}: {source}")]
    Transport {
        round: usize,
        #[source]
        source: Box<GenbindError>,
    },

    #[error("Conversation cancelled in round {round}")]
    Cancelled { round: usize },

    #[error("Conversation exceeded the limit of {limit} rounds")]
    RoundLimitExceeded { limit: usize },

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl GenbindError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a tool execution error from a caller-reported failure.
    pub fn tool(tool_name: impl Into<String>, source: impl Into<BoxError>) -> Self {
        let source = source.into();
        Self::ToolExecution {
            tool_name: tool_name.into(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration(_) | Self::Convert(ConvertError::InvalidRecord { .. }) => {
                ErrorCategory::Configuration
            }
            Self::Convert(_) | Self::ToolConversion { .. } => ErrorCategory::Conversion,
            Self::UnknownTool { .. } | Self::RoundLimitExceeded { .. } => ErrorCategory::Protocol,
            Self::ToolExecution { .. } => ErrorCategory::ToolExecution,
            Self::Authentication(_) => ErrorCategory::Authentication,
            Self::RateLimited { .. } => ErrorCategory::RateLimit,
            Self::Network(_) => ErrorCategory::Network,
            Self::Timeout(_) | Self::ToolTimeout { .. } => ErrorCategory::Timeout,
            Self::Transport { source, .. } => source.category(),
            Self::Cancelled { .. } => ErrorCategory::Cancelled,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Api { status, .. } => match status {
                401 | 403 => ErrorCategory::Authentication,
                429 => ErrorCategory::RateLimit,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Api,
            },
            Self::InvalidState(_) => ErrorCategory::Unknown,
        }
    }

    /// Whether the failure came from the model transport.
    pub fn is_transport(&self) -> bool {
        if matches!(self, Self::Transport { .. }) {
            return true;
        }
        matches!(
            self.category(),
            ErrorCategory::Authentication
                | ErrorCategory::RateLimit
                | ErrorCategory::Network
                | ErrorCategory::Server
                | ErrorCategory::Api
        )
    }

    /// Whether this error is potentially retryable by a transport.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::RateLimit | ErrorCategory::Network | ErrorCategory::Server
        )
    }

    /// Suggest recovery actions.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self.category() {
            ErrorCategory::Authentication => RecoverySuggestion::CheckCredentials,
            ErrorCategory::RateLimit | ErrorCategory::Network | ErrorCategory::Server => {
                RecoverySuggestion::RetryWithBackoff
            }
            ErrorCategory::Timeout => RecoverySuggestion::IncreaseTimeout,
            ErrorCategory::Configuration => RecoverySuggestion::CheckConfiguration,
            ErrorCategory::Conversion => RecoverySuggestion::CheckRecordShape,
            ErrorCategory::ToolExecution => RecoverySuggestion::CheckToolImplementation,
            ErrorCategory::Protocol => RecoverySuggestion::CheckToolRegistry,
            _ => RecoverySuggestion::None,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, GenbindError>;
