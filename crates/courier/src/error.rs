//! Error types.

use thiserror::Error;

/// Errors raised while configuring or driving a request.
///
/// Anything derivable from the response bytes is parsed best-effort and
/// never ends up here; a failed exchange is reported through
/// [`crate::response::Outcome::Failed`] instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid proxy URL: {0}")]
    InvalidProxyUrl(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Transport setup failed: {0}")]
    Runtime(String),

    #[error("Body encoding failed: {0}")]
    Encode(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid_proxy(msg: impl Into<String>) -> Self {
        Self::InvalidProxyUrl(msg.into())
    }

    pub fn invalid_header(msg: impl Into<String>) -> Self {
        Self::InvalidHeader(msg.into())
    }

    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}
