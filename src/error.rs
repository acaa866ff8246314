use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, SyncError>;

/// Error type covering the different failure cases that can occur while the
/// tool fetches, compares, or mutates group memberships.
///
/// The driver treats every variant except [`SyncError::Mutation`] as fatal for
/// the whole run; mutation failures are downgraded to log entries so the
/// remaining members of the delta still get processed.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Wrapper for IO failures such as reading the configuration file or the
    /// TLS certificate material.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when the YAML configuration cannot be parsed.
    #[error("configuration parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Raised when the configuration parses but fails validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Transport-level failures from the Groups Web Service client: DNS,
    /// connect, TLS handshake, request timeout, or client construction.
    #[error("Groups Web Service request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Raised when the Groups Web Service answers with a non-success status.
    #[error("Groups Web Service returned {status} for group {group}")]
    GwsStatus {
        status: reqwest::StatusCode,
        group: String,
    },

    /// Raised when the membership response body is not the expected JSON shape.
    #[error("malformed membership response: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised when the local group database query fails or the group record
    /// cannot be parsed.
    #[error("local group lookup failed for {group}: {detail}")]
    GroupLookup { group: String, detail: String },

    /// Raised when a single add/remove invocation exits non-zero. Carries the
    /// membership tool's stderr so the operator sees the underlying diagnostic.
    #[error("{action} {member} on {group} failed: {detail}")]
    Mutation {
        action: MutationAction,
        member: String,
        group: String,
        detail: String,
    },

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

/// Direction of a single membership mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationAction {
    Add,
    Remove,
}

impl std::fmt::Display for MutationAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MutationAction::Add => write!(f, "adding"),
            MutationAction::Remove => write!(f, "removing"),
        }
    }
}
