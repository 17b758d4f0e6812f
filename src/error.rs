use super::HeaderName;
use std::io::SeekFrom;

/// This is the enumeration of all the different kinds of errors which this
/// crate generates.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum Error {
    /// The attached string is the name of a header that is empty or has
    /// one or more characters in it which are not allowed in a token.
    #[error("header name contains an illegal character")]
    InvalidHeaderName(String),

    /// The header with the attached name was given a value containing an
    /// illegal character, or no value at all.  In the latter case the
    /// attached value is empty.
    #[error("header value is empty or contains an illegal character")]
    InvalidHeaderValue{name: HeaderName, value: String},

    /// The attached string describes why a stream was refused as a message
    /// body.
    #[error("invalid message body: {0}")]
    InvalidBody(String),

    /// A write was attempted on a stream which cannot be written.
    #[error("stream is not writable")]
    StreamNotWritable,

    /// The stream was closed or its underlying resource was detached.
    #[error("stream has been closed or detached")]
    StreamDetached,

    /// The attached seek would have moved the cursor before the start of
    /// the stream, or past the furthest position a stream can have.
    #[error("seek to invalid position")]
    InvalidSeek(SeekFrom),

    /// A write would have grown the stream beyond what can be held.
    #[error("stream cannot grow large enough")]
    StreamTooLarge,
}
