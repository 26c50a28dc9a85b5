//! Error types for request construction and delivery.
//!
//! Builder-time and pre-dispatch failures are returned as [`RequestError`].
//! Everything that can go wrong once a request is on its way (timeouts,
//! refused deliveries, broken transports, unreadable replies) is reported as
//! a [`crate::http::Outcome`] on the response instead.

use thiserror::Error;

/// Errors raised before any I/O takes place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// The request failed validation and was never sent.
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// The base URL could not be parsed, or a parameter could not be merged into it.
    #[error("malformed url '{url}': {reason}")]
    MalformedUrl { url: String, reason: String },

    /// The method name is not one of the supported request methods.
    #[error("unsupported method '{method}'")]
    UnsupportedMethod { method: String },
}

impl RequestError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        RequestError::InvalidRequest {
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed_url(url: impl Into<String>, reason: impl ToString) -> Self {
        RequestError::MalformedUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

/// Failures reported by an actor system while delivering a task.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// No actor is registered under the target name.
    #[error("no actor registered as '{target}'")]
    UnknownTarget { target: String },

    /// The actor's mailbox is full and refused the message.
    #[error("mailbox of '{target}' is full")]
    MailboxFull { target: String },

    /// The actor stopped before the message could be delivered or answered.
    #[error("actor '{target}' disconnected")]
    Disconnected { target: String },
}

/// Failures reported by a [`crate::transport::Transport`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportFailure {
    /// The connection could not be established or was refused.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The request could not be turned into a wire request.
    #[error("request rejected by transport: {0}")]
    Request(String),

    /// The exchange broke off while sending or receiving.
    #[error("io error: {0}")]
    Io(String),

    /// The response body exceeded the configured limit.
    #[error("response body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },
}
