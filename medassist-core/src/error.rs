//! Error taxonomy for the MedAssist core.
//!
//! Every failure the pipeline can produce is a variant of [`AssistError`].
//! Errors are returned as typed results, never allowed to crash a request;
//! [`AssistError::kind`] and [`AssistError::user_message`] give the serving
//! layer everything it needs to map a failure to a transport response.

use thiserror::Error;

/// Errors that can occur anywhere in the query or ingestion pipeline.
#[derive(Debug, Error)]
pub enum AssistError {
    /// Invalid configuration, detected at startup before any component runs.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The query was empty or whitespace-only after sanitisation.
    #[error("Query cannot be empty")]
    EmptyQuery,

    /// The query exceeded the configured maximum length.
    #[error("Query is too long ({chars} chars, max {max})")]
    QueryTooLong {
        /// Length of the rejected query in characters.
        chars: usize,
        /// The configured maximum.
        max: usize,
    },

    /// An embedding input exceeded the provider's configured limit.
    ///
    /// The provider never truncates silently; the caller pre-chunks instead.
    #[error("Embedding input is too large ({chars} chars, max {max})")]
    InputTooLarge {
        /// Length of the rejected input in characters.
        chars: usize,
        /// The configured maximum.
        max: usize,
    },

    /// A call-site argument was invalid (e.g. `k == 0` in a search).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The guard layer rejected the query.
    ///
    /// The matched rule name is carried for logging only; the user-facing
    /// message is fixed and generic so the ruleset is not leaked.
    #[error("Query rejected by guard rule '{rule}'")]
    RejectedQuery {
        /// Name of the guard rule that matched.
        rule: String,
    },

    /// The vector index is missing, corrupt, or not yet loaded.
    ///
    /// This is the expected state before first ingestion; the caller surfaces
    /// it as "knowledge base not initialised", not as a generic failure.
    #[error("Vector index unavailable: {reason}")]
    IndexUnavailable {
        /// Why the index could not be used.
        reason: String,
    },

    /// The embedding provider failed. Transient; the caller may retry.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The chat-completion provider failed. Transient; the caller may retry.
    #[error("Generation error ({provider}): {message}")]
    Generation {
        /// The chat provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An external call exceeded its deadline.
    #[error("Operation '{operation}' timed out after {elapsed_ms} ms")]
    Timeout {
        /// The operation that was cut off.
        operation: String,
        /// How long it ran before the deadline fired.
        elapsed_ms: u64,
    },

    /// An I/O failure while persisting or reading the index.
    #[error("Storage error at '{path}': {message}")]
    Storage {
        /// The path involved in the failed operation.
        path: String,
        /// A description of the failure.
        message: String,
    },
}

/// Coarse classification of an [`AssistError`] for transport mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Client-caused; resubmitting corrected input can succeed.
    InvalidInput,
    /// The guard layer refused the query.
    Rejected,
    /// The knowledge base is not initialised; re-run ingestion.
    NotReady,
    /// An upstream provider failed; retry with backoff.
    Upstream,
    /// An external call exceeded its deadline; retry with backoff.
    Timeout,
    /// Everything else.
    Internal,
}

impl AssistError {
    /// Classify this error for transport mapping.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyQuery
            | Self::QueryTooLong { .. }
            | Self::InputTooLarge { .. }
            | Self::InvalidArgument(_) => ErrorKind::InvalidInput,
            Self::RejectedQuery { .. } => ErrorKind::Rejected,
            Self::IndexUnavailable { .. } => ErrorKind::NotReady,
            Self::Embedding { .. } | Self::Generation { .. } => ErrorKind::Upstream,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Configuration(_) | Self::Storage { .. } => ErrorKind::Internal,
        }
    }

    /// Whether the caller can reasonably retry the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Upstream | ErrorKind::Timeout)
    }

    /// The message shown to the end user.
    ///
    /// Client-caused errors get specific, actionable text. Guard rejections
    /// get a fixed, non-revealing message. Upstream and internal failures get
    /// generic "try again" text with no internal detail.
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyQuery => "Query cannot be empty.".to_string(),
            Self::QueryTooLong { max, .. } => {
                format!("Query is too long. Please limit to {max} characters.")
            }
            Self::InputTooLarge { max, .. } => {
                format!("Input is too large. Please limit to {max} characters.")
            }
            Self::InvalidArgument(msg) => format!("Invalid request: {msg}"),
            Self::RejectedQuery { .. } => {
                "Your message could not be processed.".to_string()
            }
            Self::IndexUnavailable { .. } => {
                "The knowledge base is not yet initialised. Please contact the administrator."
                    .to_string()
            }
            Self::Embedding { .. }
            | Self::Generation { .. }
            | Self::Timeout { .. } => {
                "The service is temporarily unavailable. Please try again in a moment.".to_string()
            }
            Self::Configuration(_) | Self::Storage { .. } => {
                "An internal error occurred. Please try again later.".to_string()
            }
        }
    }
}

/// A convenience result type for core operations.
pub type Result<T> = std::result::Result<T, AssistError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_are_invalid_input() {
        assert_eq!(AssistError::EmptyQuery.kind(), ErrorKind::InvalidInput);
        assert_eq!(
            AssistError::QueryTooLong { chars: 3000, max: 2000 }.kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            AssistError::InvalidArgument("k must be > 0".into()).kind(),
            ErrorKind::InvalidInput
        );
    }

    #[test]
    fn upstream_and_timeout_are_retryable() {
        let embed = AssistError::Embedding { provider: "OpenAI".into(), message: "429".into() };
        let timeout = AssistError::Timeout { operation: "chat".into(), elapsed_ms: 30_000 };
        assert!(embed.is_retryable());
        assert!(timeout.is_retryable());
        assert!(!AssistError::EmptyQuery.is_retryable());
    }

    #[test]
    fn rejection_message_does_not_leak_rule_name() {
        let err = AssistError::RejectedQuery { rule: "injection.override_instructions".into() };
        assert!(!err.user_message().contains("injection"));
        assert!(!err.user_message().contains("override"));
    }

    #[test]
    fn index_unavailable_maps_to_not_ready() {
        let err = AssistError::IndexUnavailable { reason: "no index loaded".into() };
        assert_eq!(err.kind(), ErrorKind::NotReady);
        assert!(err.user_message().contains("not yet initialised"));
    }
}
