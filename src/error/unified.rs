//! Error classification and recovery hints.

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Conversion,
    Protocol,
    ToolExecution,
    Authentication,
    RateLimit,
    Network,
    Timeout,
    Cancelled,
    Server,
    Api,
    Serialization,
    Unknown,
}

/// Suggested recovery action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySuggestion {
    RetryWithBackoff,
    CheckCredentials,
    CheckConfiguration,
    IncreaseTimeout,
    CheckRecordShape,
    CheckToolImplementation,
    CheckToolRegistry,
    None,
}
