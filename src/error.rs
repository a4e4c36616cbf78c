use thiserror::Error;

/// Errors that can occur while encoding, sending, or dispatching plugin
/// messages.
#[derive(Error, Debug)]
pub enum Error {
    /// A string or blob is too large for the wire format's 16-bit length
    /// prefix.
    #[error("value of {len} bytes exceeds the 16-bit length prefix")]
    Oversized { len: usize },

    /// A decode read past the end of the frame.
    #[error("truncated frame: needed {needed} more bytes, {remaining} available")]
    TruncatedInput { needed: usize, remaining: usize },

    /// A frame declared an inconsistent length or carried invalid content.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// No eligible carrier connection to send the request through.
    #[error("no eligible carrier to route the message through")]
    NoRoute,

    /// Transport-level send or subscribe failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The pending request was abandoned (teardown or session end) before a
    /// reply arrived.
    #[error("request abandoned before a reply arrived")]
    Abandoned,

    /// The optional configured request timeout elapsed.
    #[error("request timed out")]
    Timeout,
}

impl Error {
    /// True for the decode-failure family contained to a single dispatch.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::TruncatedInput { .. } | Error::MalformedFrame(_))
    }
}

/// Result type alias for plugin-messaging operations
pub type Result<T> = std::result::Result<T, Error>;
