//! Body streams.
//!
//! A message refers to its body through the [`Stream`] trait and never does
//! any I/O itself.  Because derived messages share the body of the message
//! they came from, stream operations take `&self` and implementations keep
//! their cursor behind interior mutability.

use super::Error;
use std::convert::TryFrom;
use std::io::SeekFrom;
use std::sync::{
    Mutex,
    MutexGuard,
    PoisonError,
};

/// The capabilities a message body offers.
pub trait Stream: std::fmt::Debug + Send + Sync {
    fn is_readable(&self) -> bool;

    fn is_writable(&self) -> bool;

    fn is_seekable(&self) -> bool;

    /// Return the size of the stream in bytes, if known.
    fn size(&self) -> Option<u64>;

    /// Return the current position of the read/write cursor.
    fn tell(&self) -> Result<u64, Error>;

    /// Return whether the cursor is at the end of the stream.
    fn eof(&self) -> bool;

    /// Move the cursor, returning its new position.
    fn seek(&self, position: SeekFrom) -> Result<u64, Error>;

    fn rewind(&self) -> Result<(), Error> {
        self.seek(SeekFrom::Start(0)).map(|_| ())
    }

    /// Read up to `buffer.len()` bytes from the cursor, returning how many
    /// were read.  Zero means the end of the stream was reached.
    fn read(&self, buffer: &mut [u8]) -> Result<usize, Error>;

    /// Write the given bytes at the cursor, returning how many were written.
    fn write(&self, data: &[u8]) -> Result<usize, Error>;

    /// Read everything from the cursor to the end of the stream.
    fn contents(&self) -> Result<Vec<u8>, Error>;

    fn contents_string(&self) -> Result<String, Error> {
        self.contents()
            .map(|contents| String::from_utf8_lossy(&contents).into_owned())
    }

    /// Look up a piece of metadata about the stream, such as `"mode"` or
    /// `"seekable"`.
    fn metadata(&self, key: &str) -> Option<String>;

    /// Close the stream.  Afterwards the stream can no longer be used.
    fn close(&self);

    /// Separate the underlying resource from the stream and hand it back.
    /// Afterwards the stream can no longer be used.
    fn detach(&self) -> Option<Vec<u8>>;
}

#[derive(Debug)]
struct Buffer {
    bytes: Vec<u8>,
    position: u64,
    detached: bool,
}

impl Buffer {
    // Index of the cursor into the bytes, clamped to the end when the
    // cursor has been moved past it.
    fn start(&self) -> usize {
        usize::try_from(self.position)
            .map_or(self.bytes.len(), |position| {
                std::cmp::min(position, self.bytes.len())
            })
    }
}

/// A stream over a growable buffer held in memory.
#[derive(Debug)]
pub struct MemoryStream {
    buffer: Mutex<Buffer>,
    writable: bool,
}

impl MemoryStream {
    /// Make an empty stream which may be read, written and sought.
    #[must_use]
    pub fn new() -> Self {
        Self::from_bytes(Vec::new())
    }

    /// Make a stream which may be read, written and sought, starting out
    /// with the given bytes and the cursor at the beginning.
    #[must_use]
    pub fn from_bytes<T>(bytes: T) -> Self
        where T: Into<Vec<u8>>
    {
        Self{
            buffer: Mutex::new(Buffer{
                bytes: bytes.into(),
                position: 0,
                detached: false,
            }),
            writable: true,
        }
    }

    /// Make a stream over the given bytes which refuses writes.
    #[must_use]
    pub fn read_only<T>(bytes: T) -> Self
        where T: Into<Vec<u8>>
    {
        Self{
            writable: false,
            ..Self::from_bytes(bytes)
        }
    }

    fn lock(&self) -> MutexGuard<'_, Buffer> {
        // The buffer is left consistent by every operation, so a panic in
        // another thread holding the lock does not invalidate it.
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn attached(&self) -> Result<MutexGuard<'_, Buffer>, Error> {
        let buffer = self.lock();
        if buffer.detached {
            Err(Error::StreamDetached)
        } else {
            Ok(buffer)
        }
    }
}

impl Default for MemoryStream {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for MemoryStream {
    fn from(text: &str) -> Self {
        Self::from_bytes(text)
    }
}

impl From<Vec<u8>> for MemoryStream {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_bytes(bytes)
    }
}

impl Stream for MemoryStream {
    fn is_readable(&self) -> bool {
        !self.lock().detached
    }

    fn is_writable(&self) -> bool {
        self.writable && !self.lock().detached
    }

    fn is_seekable(&self) -> bool {
        !self.lock().detached
    }

    fn size(&self) -> Option<u64> {
        let buffer = self.lock();
        if buffer.detached {
            None
        } else {
            Some(buffer.bytes.len() as u64)
        }
    }

    fn tell(&self) -> Result<u64, Error> {
        Ok(self.attached()?.position)
    }

    fn eof(&self) -> bool {
        let buffer = self.lock();
        buffer.detached || buffer.position >= buffer.bytes.len() as u64
    }

    fn seek(&self, position: SeekFrom) -> Result<u64, Error> {
        let mut buffer = self.attached()?;
        let target = match position {
            SeekFrom::Start(offset) => i64::try_from(offset).ok(),
            SeekFrom::Current(offset) => i64::try_from(buffer.position).ok()
                .and_then(|current| current.checked_add(offset)),
            SeekFrom::End(offset) => i64::try_from(buffer.bytes.len()).ok()
                .and_then(|end| end.checked_add(offset)),
        };
        match target.and_then(|target| u64::try_from(target).ok()) {
            Some(target) => {
                buffer.position = target;
                Ok(target)
            },
            None => Err(Error::InvalidSeek(position)),
        }
    }

    fn read(&self, destination: &mut [u8]) -> Result<usize, Error> {
        let mut buffer = self.attached()?;
        let start = buffer.start();
        let amount = std::cmp::min(
            destination.len(),
            buffer.bytes.len() - start
        );
        destination[..amount].copy_from_slice(
            &buffer.bytes[start..start+amount]
        );
        buffer.position = (start + amount) as u64;
        Ok(amount)
    }

    fn write(&self, data: &[u8]) -> Result<usize, Error> {
        if !self.writable {
            return Err(Error::StreamNotWritable);
        }
        let mut buffer = self.attached()?;
        let start = usize::try_from(buffer.position)
            .map_err(|_| Error::StreamTooLarge)?;
        let end = start.checked_add(data.len())
            .ok_or(Error::StreamTooLarge)?;

        // Writing past the end grows the buffer, filling any gap left by
        // seeking beyond the end with zeros.
        if buffer.bytes.len() < end {
            let additional = end - buffer.bytes.len();
            if buffer.bytes.try_reserve(additional).is_err() {
                log::debug!("unable to grow memory stream to {} bytes", end);
                return Err(Error::StreamTooLarge);
            }
            buffer.bytes.resize(end, 0);
        }
        buffer.bytes[start..end].copy_from_slice(data);
        buffer.position = end as u64;
        Ok(data.len())
    }

    fn contents(&self) -> Result<Vec<u8>, Error> {
        let mut buffer = self.attached()?;
        let start = buffer.start();
        let contents = buffer.bytes[start..].to_vec();
        buffer.position = buffer.bytes.len() as u64;
        Ok(contents)
    }

    fn metadata(&self, key: &str) -> Option<String> {
        if self.lock().detached {
            return None;
        }
        match key {
            "mode" => Some(if self.writable { "r+" } else { "r" }.to_string()),
            "seekable" => Some("true".to_string()),
            _ => None,
        }
    }

    fn close(&self) {
        let mut buffer = self.lock();
        buffer.detached = true;
        buffer.bytes = Vec::new();
    }

    fn detach(&self) -> Option<Vec<u8>> {
        let mut buffer = self.lock();
        if buffer.detached {
            None
        } else {
            buffer.detached = true;
            buffer.position = 0;
            Some(std::mem::take(&mut buffer.bytes))
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn read_in_pieces() {
        let stream = MemoryStream::from("Hello World!");
        let mut piece = [0; 5];
        assert_eq!(Ok(5), stream.read(&mut piece));
        assert_eq!(b"Hello", &piece);
        assert_eq!(Ok(5), stream.tell());
        assert!(!stream.eof());
        assert_eq!(Ok(b" World!".to_vec()), stream.contents());
        assert!(stream.eof());
        assert_eq!(Ok(0), stream.read(&mut piece));
    }

    #[test]
    fn seek_and_rewind() {
        let stream = MemoryStream::from("abcdef");
        named_tuple!(
            struct TestVector {
                seek: SeekFrom,
                expected_position: u64,
                expected_rest: &'static str,
            }
        );
        let test_vectors: &[TestVector] = &[
            (SeekFrom::Start(2), 2, "cdef").into(),
            (SeekFrom::End(-1), 5, "f").into(),
            (SeekFrom::Current(-3), 3, "def").into(),
            (SeekFrom::End(4), 10, "").into(),
        ];
        for test_vector in test_vectors.iter() {
            assert_eq!(
                Ok(*test_vector.expected_position()),
                stream.seek(*test_vector.seek())
            );
            assert_eq!(
                Ok(test_vector.expected_rest().to_string()),
                stream.contents_string()
            );
        }
        assert_eq!(Ok(()), stream.rewind());
        assert_eq!(Ok("abcdef".to_string()), stream.contents_string());
        assert_eq!(
            Err(Error::InvalidSeek(SeekFrom::Current(-1))),
            stream.seek(SeekFrom::Start(0)).and_then(|_| stream.seek(SeekFrom::Current(-1)))
        );
        assert_eq!(Ok(0), stream.tell());
    }

    #[test]
    fn write_overwrites_and_grows() {
        let stream = MemoryStream::from("Hello World!");
        assert!(stream.is_writable());
        assert_eq!(Ok(6), stream.seek(SeekFrom::Start(6)));
        assert_eq!(Ok(7), stream.write(b"Rustace"));
        assert_eq!(Some(13), stream.size());
        assert_eq!(Ok(()), stream.rewind());
        assert_eq!(Ok("Hello Rustace".to_string()), stream.contents_string());
        assert_eq!(Ok(15), stream.seek(SeekFrom::End(2)));
        assert_eq!(Ok(1), stream.write(b"!"));
        assert_eq!(Some(16), stream.size());
        assert_eq!(Ok(13), stream.seek(SeekFrom::Start(13)));
        assert_eq!(Ok(vec![0, 0, b'!']), stream.contents());
    }

    #[test]
    fn seek_out_of_range() {
        let stream = MemoryStream::from("abcdef");
        for seek in &[
            SeekFrom::Start(u64::MAX),
            SeekFrom::Start(1 << 63),
            SeekFrom::End(-7),
            SeekFrom::End(i64::MAX),
            SeekFrom::Current(i64::MIN),
        ] {
            assert_eq!(Err(Error::InvalidSeek(*seek)), stream.seek(*seek));
            assert_eq!(Ok(0), stream.tell());
        }
        #[allow(clippy::cast_sign_loss)]
        let furthest = i64::MAX as u64;
        assert_eq!(Ok(furthest), stream.seek(SeekFrom::Start(furthest)));
        assert_eq!(
            Err(Error::InvalidSeek(SeekFrom::Current(1))),
            stream.seek(SeekFrom::Current(1))
        );
        assert_eq!(Ok(furthest), stream.tell());
    }

    #[test]
    fn write_far_past_end_refused() {
        let stream = MemoryStream::from("abcdef");
        #[allow(clippy::cast_sign_loss)]
        let furthest = i64::MAX as u64;
        assert_eq!(Ok(furthest), stream.seek(SeekFrom::Start(furthest)));
        assert_eq!(Err(Error::StreamTooLarge), stream.write(b"x"));
        assert_eq!(Some(6), stream.size());
        assert_eq!(Ok(()), stream.rewind());
        assert_eq!(Ok("abcdef".to_string()), stream.contents_string());
    }

    #[test]
    fn read_only_refuses_writes() {
        let stream = MemoryStream::read_only("fixed");
        assert!(stream.is_readable());
        assert!(!stream.is_writable());
        assert_eq!(Err(Error::StreamNotWritable), stream.write(b"x"));
        assert_eq!(Some("r".to_string()), stream.metadata("mode"));
        assert_eq!(Ok("fixed".to_string()), stream.contents_string());
    }

    #[test]
    fn metadata() {
        let stream = MemoryStream::new();
        assert_eq!(Some("r+".to_string()), stream.metadata("mode"));
        assert_eq!(Some("true".to_string()), stream.metadata("seekable"));
        assert_eq!(None, stream.metadata("uri"));
        assert_eq!(Some(0), stream.size());
        assert!(stream.eof());
    }

    #[test]
    fn detach_hands_back_bytes() {
        let stream = MemoryStream::from("payload");
        assert_eq!(Some(b"payload".to_vec()), stream.detach());
        assert_eq!(None, stream.detach());
        assert!(!stream.is_readable());
        assert!(!stream.is_writable());
        assert!(!stream.is_seekable());
        assert!(stream.eof());
        assert_eq!(None, stream.size());
        assert_eq!(None, stream.metadata("mode"));
        assert_eq!(Err(Error::StreamDetached), stream.tell());
        assert_eq!(Err(Error::StreamDetached), stream.contents());
        assert_eq!(Err(Error::StreamDetached), stream.write(b"x"));
        assert_eq!(Err(Error::StreamDetached), stream.rewind());
    }

    #[test]
    fn close_makes_stream_unusable() {
        let stream = MemoryStream::from("payload");
        stream.close();
        assert!(!stream.is_readable());
        assert_eq!(None, stream.detach());
        let mut piece = [0; 4];
        assert_eq!(Err(Error::StreamDetached), stream.read(&mut piece));
    }

}
