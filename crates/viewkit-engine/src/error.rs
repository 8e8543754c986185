//! Error types for list-view operations.

use thiserror::Error;
use viewkit_model::RenderIdentity;

/// Failure reported by a [`Transport`](crate::Transport) implementation.
///
/// The engine never retries; these are passed through to the caller.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be sent or no response arrived.
    #[error("request to {resource} failed: {message}")]
    Request { resource: String, message: String },

    /// The server answered with a non-success status.
    #[error("{resource} returned status {status}: {message}")]
    Status {
        resource: String,
        status: u16,
        message: String,
    },

    /// The response body was not a JSON document.
    #[error("could not decode response from {resource}: {source}")]
    Decode {
        resource: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors surfaced by [`ListController`](crate::ListController).
#[derive(Debug, Error)]
pub enum ViewError {
    // === Remote Errors ===
    /// The transport rejected a request. View state is left unchanged.
    #[error(transparent)]
    Transport(#[from] TransportError),

    // === Local Refusals ===
    /// The record has no usable key and cannot be updated or deleted.
    #[error("record {identity} has no usable key and cannot be modified")]
    UnaddressableRecord { identity: RenderIdentity },

    /// No row with this identity is loaded.
    #[error("no loaded row has identity {identity}")]
    UnknownRow { identity: RenderIdentity },

    /// The current user may not modify this record.
    #[error("not permitted to modify record {identity}")]
    NotPermitted { identity: RenderIdentity },
}

/// Result type for list-view operations.
pub type Result<T> = std::result::Result<T, ViewError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_pass_through_unchanged() {
        let err: ViewError = TransportError::Status {
            resource: "posts".into(),
            status: 503,
            message: "unavailable".into(),
        }
        .into();
        assert_eq!(err.to_string(), "posts returned status 503: unavailable");
        assert!(matches!(err, ViewError::Transport(TransportError::Status { status: 503, .. })));
    }

    #[test]
    fn refusals_name_the_row() {
        let err = ViewError::UnaddressableRecord {
            identity: RenderIdentity::new("tmp-1-0"),
        };
        assert!(err.to_string().contains("tmp-1-0"));
    }
}
