//! Error types for quote fetching and card rendering

use thiserror::Error;

/// Failure to obtain a quote from the remote service
#[derive(Error, Debug)]
pub enum QuoteFetchError {
    /// Transport-level failure (DNS, connect, TLS, reset)
    #[error("quote request failed: {0}")]
    Request(String),

    /// The request did not finish in time
    #[error("quote request timed out after {0}ms")]
    Timeout(u64),

    /// Upstream answered with a non-success status
    #[error("quote service returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Body was not the expected JSON document
    #[error("malformed quote response: {0}")]
    Decode(String),
}

/// Failure while producing the image
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("invalid card markup: {0}")]
    Svg(String),

    #[error("failed to allocate a {width}x{height} pixmap")]
    Pixmap { width: u32, height: u32 },

    #[error("png encoding failed: {0}")]
    Encode(String),

    /// The blocking render task panicked or was cancelled
    #[error("render task failed: {0}")]
    Task(String),

    #[error("{0} output is not enabled in this build")]
    Unsupported(&'static str),
}
