//! error types
//!
//! structured errors for each pipeline stage: building the request,
//! moving it over the wire, and interpreting what came back.
//!
//! graphql execution errors are not here; they live in
//! [`crate::GraphQlResponse::errors`] as ordinary data.

use reqwest::header::HeaderMap;
use std::fmt;

/// library result type
pub type Result<T> = std::result::Result<T, Error>;

/// pipeline stage that produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// encoding the operation into an http request
    Build,
    /// sending the request and receiving the response
    Transport,
    /// classifying and decoding the response
    Interpret,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Build => "build",
            Stage::Transport => "transport",
            Stage::Interpret => "interpret",
        };
        f.write_str(name)
    }
}

/// error type for the client and its pipeline
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("url error: {0}")]
    Url(#[from] url::ParseError),

    /// the operation cannot be sent as-is (e.g. empty document)
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// variables could not be encoded to json
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// the request never completed (dns, connect, tls, timeout, body read)
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// the caller cancelled the send before it completed
    #[error("request cancelled")]
    Cancelled,

    /// the server answered with a non-2xx status
    #[error("graphql http error: {status}")]
    Http {
        /// http status code
        status: u16,
        /// raw response body, lossily decoded
        body: String,
        /// response headers
        headers: HeaderMap,
    },

    /// a 2xx body that is not a graphql response envelope
    #[error("deserialization error (status {status}): {source}")]
    Deserialization {
        /// http status code
        status: u16,
        /// raw response body, lossily decoded
        body: String,
        /// underlying json error
        #[source]
        source: serde_json::Error,
    },

    /// the client was disposed
    #[error("client is closed")]
    ClientClosed,
}

impl Error {
    /// pipeline stage that produced this error, if any
    ///
    /// construction-time errors and `ClientClosed` have no stage.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::InvalidOperation(_) | Error::Serialization(_) => Some(Stage::Build),
            Error::Transport(_) | Error::Cancelled => Some(Stage::Transport),
            Error::Http { .. } | Error::Deserialization { .. } => Some(Stage::Interpret),
            Error::Config(_) | Error::Url(_) | Error::ClientClosed => None,
        }
    }

    /// http status if the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } | Error::Deserialization { status, .. } => Some(*status),
            Error::Transport(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }

    /// true if the error looks like an auth failure
    pub fn is_auth_error(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    /// true if the send was cancelled by the caller
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}
