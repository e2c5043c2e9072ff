//! Error types for Agentry.

pub mod unified;

pub use unified::{ErrorCategory, RecoverySuggestion};

use thiserror::Error;

/// Primary error type for all Agentry operations.
///
/// Every failure inside an invocation is delivered as the terminal item of the
/// invocation's [`MessageStream`](crate::stream::MessageStream); the blocking
/// [`Runner`](crate::runner::Runner) returns the same value directly.
#[derive(Error, Debug)]
pub enum AgentryError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Provider error: {provider} — {message}")]
    Provider { provider: String, message: String },

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Tool execution error: {tool_name} — {message}")]
    ToolExecution { tool_name: String, message: String },

    #[error("Missing final response: model stream ended without a completed message")]
    MissingFinalResponse,

    #[error("Maximum iterations exceeded ({0})")]
    MaxIterationsExceeded(usize),

    #[error("No final response: invocation produced no message")]
    NoFinalResponse,

    #[error("Session error: {0}")]
    Session(String),

    #[error("Invocation canceled")]
    Canceled,

    #[error("Rate limited: retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

}

impl AgentryError {
    /// Create a provider error.
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a tool execution error.
    pub fn tool(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolExecution {
            tool_name: tool_name.into(),
            message: message.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Provider { .. } => ErrorCategory::Provider,
            Self::RateLimited { .. } => ErrorCategory::RateLimit,
            Self::Timeout(_) => ErrorCategory::Timeout,
            Self::ToolNotFound(_) | Self::ToolExecution { .. } => ErrorCategory::ToolExecution,
            Self::MissingFinalResponse | Self::MaxIterationsExceeded(_) | Self::NoFinalResponse => {
                ErrorCategory::Protocol
            }
            Self::Session(_) | Self::Io(_) => ErrorCategory::Persistence,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Canceled => ErrorCategory::Canceled,
            Self::InvalidArgument(_) => ErrorCategory::Unknown,
        }
    }

    /// Whether this error is potentially retryable.
    ///
    /// The engine itself never retries; this only informs retry middleware.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::RateLimit | ErrorCategory::Timeout | ErrorCategory::Provider
        )
    }

    /// Suggest recovery actions.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self {
            Self::MaxIterationsExceeded(_) => RecoverySuggestion::RaiseIterationLimit,
            Self::MissingFinalResponse => RecoverySuggestion::CheckProviderStream,
            Self::NoFinalResponse => RecoverySuggestion::CheckAgentOutput,
            _ => match self.category() {
                ErrorCategory::RateLimit | ErrorCategory::Provider => {
                    RecoverySuggestion::RetryWithBackoff
                }
                ErrorCategory::Timeout => RecoverySuggestion::IncreaseTimeout,
                ErrorCategory::Configuration => RecoverySuggestion::CheckConfiguration,
                ErrorCategory::ToolExecution => RecoverySuggestion::CheckToolImplementation,
                ErrorCategory::Persistence => RecoverySuggestion::CheckSessionStore,
                ErrorCategory::Canceled => RecoverySuggestion::None,
                _ => RecoverySuggestion::ContactSupport,
            },
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, AgentryError>;
