//! Error types for the Zaraz API client.
//!
//! # Design
//! Three failure kinds must stay distinguishable so callers can decide on
//! retries: the round trip never completed (`Transport`), the body could not
//! be decoded (`Decode`), or the API answered with a failure envelope or a
//! non-2xx status (`Api`). The remaining variants are caller errors detected
//! before anything is sent.

use thiserror::Error;

use crate::envelope::ResponseInfo;

/// Failures of the outbound round trip itself.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The caller's cancellation token fired before a response arrived.
    #[error("request cancelled")]
    Cancelled,

    /// The context deadline or the HTTP client timeout elapsed.
    #[error("request timed out")]
    Timeout,

    /// The connection could not be established.
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("transport failure: {0}")]
    Other(String),
}

/// Errors returned by the Zaraz client.
#[derive(Debug, Error)]
pub enum ZarazError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The body was not JSON, lacked `success`, or `result` had the wrong shape.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The API reported failure, through `success: false` or a non-2xx status.
    #[error("API error (status {status}): {}", format_infos(.errors))]
    Api {
        status: u16,
        errors: Vec<ResponseInfo>,
        messages: Vec<ResponseInfo>,
    },

    /// The request payload could not be serialized to JSON.
    #[error("failed to serialize request: {0}")]
    Serialization(String),

    /// A zone or account id is required and was empty.
    #[error("missing zone or account identifier")]
    MissingIdentifier,

    #[error("invalid pagination: {0}")]
    InvalidPagination(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ZarazError {
    /// True when the request never got an answer; only these are worth retrying.
    pub fn is_transport(&self) -> bool {
        matches!(self, ZarazError::Transport(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ZarazError::Transport(TransportError::Cancelled))
    }

    /// The API errors carried by an `Api` failure, empty for other kinds.
    pub fn api_errors(&self) -> &[ResponseInfo] {
        match self {
            ZarazError::Api { errors, .. } => errors,
            _ => &[],
        }
    }
}

fn format_infos(infos: &[ResponseInfo]) -> String {
    if infos.is_empty() {
        return "no error details".to_string();
    }
    infos
        .iter()
        .map(|info| format!("{} ({})", info.message, info.code))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ZarazError>;
