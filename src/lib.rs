//! Immutable HTTP message values.
//!
//! A [`Message`] holds the parts common to HTTP requests and responses: the
//! protocol version, a collection of headers, and a body stream.  Messages
//! never change once built.  Every `with_*` method leaves the receiver alone
//! and hands back a new, independent message carrying the change.
//!
//! Header names are compared without regard to case, but the casing used
//! when a header first went in is what [`Message::get_headers`] reports.
//!
//! ```
//! use rhymessage_http::Message;
//!
//! let message = Message::new()
//!     .with_header("Accept", "text/html")?
//!     .with_added_header("accept", "application/json")?;
//! assert_eq!("text/html, application/json", message.get_header_line("ACCEPT"));
//! assert!(message.get_headers().contains_key("Accept"));
//! # Ok::<(), rhymessage_http::Error>(())
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

#[cfg(test)]
#[macro_use]
extern crate named_tuple;

mod error;
mod header_bag;
mod message;
mod stream;

pub use error::Error;
pub use header_bag::{HeaderBag, IntoHeaderValues};
pub use message::{Message, DEFAULT_PROTOCOL_VERSION};
pub use stream::{MemoryStream, Stream};

// These are the characters, besides letters and digits, which may appear
// in a header name.
//
// Name of "tchar" chosen to match the symbol name from
// RFC 7230 (https://tools.ietf.org/html/rfc7230#section-3.2.6) which
// refers to this specific character set.
const TCHAR_SYMBOLS: &str = "!#$%&'*+-.^_`|~";

/// Check that the given text may be used as a header name, which means it
/// is a non-empty token made up of visible ASCII characters other than
/// delimiters.
pub fn validate_header_name(text: &str) -> Result<(), Error> {
    if !text.is_empty()
        && text.chars().all(|c|
            c.is_ascii_alphanumeric()
            || TCHAR_SYMBOLS.contains(c)
        )
    {
        Ok(())
    } else {
        Err(Error::InvalidHeaderName(text.to_string()))
    }
}

/// Check that the given text may be used as a value for the header with the
/// given name.  Empty values are refused, as are control characters other
/// than horizontal tab, which rules out line breaks and obsolete line folding.
pub fn validate_header_value(
    name: &HeaderName,
    text: &str,
) -> Result<(), Error> {
    if !text.is_empty()
        && !text.chars().any(|c| c != '\t' && c.is_control())
    {
        Ok(())
    } else {
        Err(Error::InvalidHeaderValue{
            name: name.clone(),
            value: text.to_string(),
        })
    }
}

/// The name of a header, kept in the casing it was given in, but compared
/// against other names without regard to case.
#[derive(Clone, Debug, Default, Eq)]
pub struct HeaderName {
    name: String,
}

impl HeaderName {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// Return the lowercase form of the name, under which the name is
    /// looked up.
    #[must_use]
    pub fn canonical(&self) -> String {
        self.name.to_ascii_lowercase()
    }
}

impl std::fmt::Display for HeaderName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl<T> From<T> for HeaderName
    where T: AsRef<str>
{
    fn from(name: T) -> Self {
        Self{
            name: name.as_ref().to_string(),
        }
    }
}

impl PartialEq for HeaderName {
    fn eq(&self, rhs: &Self) -> bool {
        self.name.eq_ignore_ascii_case(&rhs.name)
    }
}

impl PartialEq<&str> for HeaderName {
    fn eq(&self, rhs: &&str) -> bool {
        self.name.eq_ignore_ascii_case(*rhs)
    }
}

impl PartialEq<HeaderName> for &str {
    fn eq(&self, rhs: &HeaderName) -> bool {
        self.eq_ignore_ascii_case(&rhs.name)
    }
}
