use super::{
    Error,
    HeaderBag,
    HeaderName,
    IntoHeaderValues,
    MemoryStream,
    Stream,
};
use indexmap::IndexMap;
use std::sync::Arc;

/// This is the protocol version given to messages unless another is
/// supplied.
pub const DEFAULT_PROTOCOL_VERSION: &str = "1.1";

/// The parts common to HTTP requests and responses.
///
/// A message is immutable.  The `with_*` methods return a new message with
/// the requested change, leaving the message they were called on as it was.
/// Derived messages have headers of their own, but refer to the same body
/// stream unless given a different one.
#[derive(Clone, Debug)]
pub struct Message {
    protocol_version: String,
    headers: HeaderBag,
    body: Arc<dyn Stream>,
}

impl Message {
    /// Make a message with the default protocol version, no headers and an
    /// empty body.
    #[must_use]
    pub fn new() -> Self {
        Self{
            protocol_version: DEFAULT_PROTOCOL_VERSION.to_string(),
            headers: HeaderBag::new(),
            body: Arc::new(MemoryStream::new()),
        }
    }

    /// Make a message from its parts.  The headers are taken in order; a
    /// name given more than once has its values combined under the casing
    /// it was first given in.
    pub fn from_parts<V, I, N, H>(
        protocol_version: V,
        headers: I,
        body: Arc<dyn Stream>,
    ) -> Result<Self, Error>
        where V: Into<String>,
            I: IntoIterator<Item = (N, H)>,
            N: AsRef<str>,
            H: IntoHeaderValues
    {
        let mut header_bag = HeaderBag::new();
        for (name, values) in headers {
            header_bag.add(name, values)?;
        }
        check_body(&body)?;
        Ok(Self{
            protocol_version: protocol_version.into(),
            headers: header_bag,
            body,
        })
    }

    #[must_use]
    pub fn get_protocol_version(&self) -> &str {
        &self.protocol_version
    }

    /// Return a message with the given protocol version, such as `"1.0"`.
    /// The version is taken as given; it is not checked, and may even be
    /// empty.
    #[must_use]
    pub fn with_protocol_version<T>(&self, protocol_version: T) -> Self
        where T: Into<String>
    {
        Self{
            protocol_version: protocol_version.into(),
            ..self.clone()
        }
    }

    /// Return a copy of all headers, in the order they were first added,
    /// keyed by name in the casing in which each was first given.
    #[must_use]
    pub fn get_headers(&self) -> IndexMap<String, Vec<String>> {
        self.headers.to_ordered_map()
    }

    /// Iterate over the headers without copying them.
    pub fn headers(&self) -> impl Iterator<Item = (&HeaderName, &[String])> {
        self.headers.iter()
    }

    /// Borrow the headers as a collection.
    #[must_use]
    pub fn header_bag(&self) -> &HeaderBag {
        &self.headers
    }

    #[must_use]
    pub fn has_header<T>(&self, name: T) -> bool
        where T: AsRef<str>
    {
        self.headers.has(name)
    }

    /// Return the values of the header with the given name, which is matched
    /// without regard to case.  The result is empty if there is no such
    /// header.
    #[must_use]
    pub fn get_header<T>(&self, name: T) -> Vec<String>
        where T: AsRef<str>
    {
        self.headers.get(name).to_vec()
    }

    /// Return the values of the header with the given name joined by
    /// commas, or an empty string if there is no such header.
    ///
    /// Not every header may be combined this way, `Set-Cookie` being the
    /// usual example.  Use [`get_header`](Self::get_header) for those.
    #[must_use]
    pub fn get_header_line<T>(&self, name: T) -> String
        where T: AsRef<str>
    {
        self.headers.get(name).join(", ")
    }

    /// Return a message in which the header with the given name has only
    /// the given values, and is reported under the casing given here.
    pub fn with_header<N, V>(
        &self,
        name: N,
        values: V,
    ) -> Result<Self, Error>
        where N: AsRef<str>,
            V: IntoHeaderValues
    {
        let mut headers = self.headers.clone();
        headers.set(name, values)?;
        Ok(self.with_headers(headers))
    }

    /// Return a message in which the given values follow any the header
    /// with the given name already has.
    pub fn with_added_header<N, V>(
        &self,
        name: N,
        values: V,
    ) -> Result<Self, Error>
        where N: AsRef<str>,
            V: IntoHeaderValues
    {
        let mut headers = self.headers.clone();
        headers.add(name, values)?;
        Ok(self.with_headers(headers))
    }

    /// Return a message without the header with the given name, which is
    /// matched without regard to case.
    #[must_use]
    pub fn without_header<T>(&self, name: T) -> Self
        where T: AsRef<str>
    {
        let mut headers = self.headers.clone();
        headers.remove(name);
        self.with_headers(headers)
    }

    #[must_use]
    pub fn get_body(&self) -> &Arc<dyn Stream> {
        &self.body
    }

    /// Return a message referring to the given body.  The body must be
    /// readable.
    pub fn with_body(&self, body: Arc<dyn Stream>) -> Result<Self, Error> {
        check_body(&body)?;
        Ok(Self{
            body,
            ..self.clone()
        })
    }

    fn with_headers(&self, headers: HeaderBag) -> Self {
        Self{
            protocol_version: self.protocol_version.clone(),
            headers,
            body: Arc::clone(&self.body),
        }
    }
}

fn check_body(body: &Arc<dyn Stream>) -> Result<(), Error> {
    if body.is_readable() {
        Ok(())
    } else {
        log::debug!("rejected unreadable body {:?}", body);
        Err(Error::InvalidBody("stream is not readable".to_string()))
    }
}

impl Default for Message {
    fn default() -> Self {
        Self::new()
    }
}
