//! Unified error classification and recovery.

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Provider,
    RateLimit,
    Timeout,
    ToolExecution,
    Protocol,
    Persistence,
    Serialization,
    Canceled,
    Unknown,
}

/// Suggested recovery action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySuggestion {
    RetryWithBackoff,
    CheckConfiguration,
    IncreaseTimeout,
    CheckToolImplementation,
    RaiseIterationLimit,
    /// The provider's stream ended without a completed chunk.
    CheckProviderStream,
    /// The agent (or a middleware) yielded nothing.
    CheckAgentOutput,
    CheckSessionStore,
    ContactSupport,
    None,
}
