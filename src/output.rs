use std::io::{self, Write};
use std::mem;

use csvflow_core::pool;

/// A push-based sink of characters.
///
/// This is the only thing the writer knows about its output. Any
/// char-to-byte transcoding happens behind this trait. Flushing is explicit;
/// adapters also flush when dropped.
pub trait CharWrite {
    /// Write all of `s`.
    fn write_str(&mut self, s: &str) -> io::Result<()>;

    /// Write a single character.
    fn write_char(&mut self, ch: char) -> io::Result<()> {
        let mut buf = [0u8; 4];
        self.write_str(ch.encode_utf8(&mut buf))
    }

    /// Flush buffered output down to the underlying sink.
    fn flush(&mut self) -> io::Result<()>;
}

impl<T: CharWrite + ?Sized> CharWrite for &mut T {
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        (**self).write_str(s)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

/// An in-memory character sink.
impl CharWrite for String {
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        self.push_str(s);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A character sink encoding UTF-8 into any `io::Write`.
///
/// Output is staged in a pooled byte buffer and pushed down on overflow,
/// `flush` and drop. The buffer returns to the pool on drop.
#[derive(Debug)]
pub struct Utf8Writer<W: Write> {
    inner: Option<W>,
    buf: Vec<u8>,
    capacity: usize,
}

impl<W: Write> Utf8Writer<W> {
    /// Create a writer with the default buffer size.
    pub fn new(inner: W) -> Utf8Writer<W> {
        Utf8Writer::with_capacity(16 * 1024, inner)
    }

    /// Create a writer with a byte buffer of the given size.
    pub fn with_capacity(capacity: usize, inner: W) -> Utf8Writer<W> {
        let capacity = capacity.max(4);
        Utf8Writer {
            inner: Some(inner),
            buf: pool::rent_bytes(capacity),
            capacity,
        }
    }

    /// Flush and return the underlying sink.
    ///
    /// The underlying sink itself is not closed, so the stream can keep
    /// being used; all pooled storage is released.
    pub fn into_inner(mut self) -> io::Result<W> {
        self.flush_buf()?;
        Ok(self.inner.take().expect("writer still owns its sink"))
    }

    fn flush_buf(&mut self) -> io::Result<()> {
        if !self.buf.is_empty() {
            let inner = self.inner.as_mut().expect("writer still owns its sink");
            inner.write_all(&self.buf)?;
            self.buf.clear();
        }
        Ok(())
    }
}

impl<W: Write> CharWrite for Utf8Writer<W> {
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        let bytes = s.as_bytes();
        if self.buf.len() + bytes.len() > self.capacity {
            self.flush_buf()?;
        }
        if bytes.len() >= self.capacity {
            // Too large to stage; push straight through.
            let inner = self.inner.as_mut().expect("writer still owns its sink");
            return inner.write_all(bytes);
        }
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_buf()?;
        let inner = self.inner.as_mut().expect("writer still owns its sink");
        inner.flush()
    }
}

impl<W: Write> Drop for Utf8Writer<W> {
    fn drop(&mut self) {
        if self.inner.is_some() {
            let _ = self.flush_buf();
        }
        pool::give_bytes(mem::take(&mut self.buf));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_writes_are_buffered() {
        let mut wtr = Utf8Writer::with_capacity(8, Vec::new());
        wtr.write_str("ab").unwrap();
        wtr.write_str("cd").unwrap();
        assert!(wtr.inner.as_ref().unwrap().is_empty());
        wtr.flush().unwrap();
        assert_eq!(wtr.inner.as_ref().unwrap(), b"abcd");
    }

    #[test]
    fn large_writes_bypass_the_buffer() {
        let mut wtr = Utf8Writer::with_capacity(4, Vec::new());
        wtr.write_str("x").unwrap();
        wtr.write_str("0123456789").unwrap();
        let out = wtr.into_inner().unwrap();
        assert_eq!(out, b"x0123456789");
    }

    #[test]
    fn write_char_encodes_utf8() {
        let mut wtr = Utf8Writer::new(Vec::new());
        wtr.write_char('é').unwrap();
        wtr.write_char('x').unwrap();
        let out = wtr.into_inner().unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "éx");
    }

    #[test]
    fn into_inner_flushes() {
        let mut wtr = Utf8Writer::with_capacity(64, Vec::new());
        wtr.write_str("pending").unwrap();
        let out = wtr.into_inner().unwrap();
        assert_eq!(out, b"pending");
    }
}
