use std::io;
use std::mem;

use csvflow_core::pool;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::input::Utf8Decoder;

/// The async twin of [`CharRead`](crate::CharRead).
///
/// `0` means end of input; code points are never split across calls.
pub trait AsyncCharRead {
    /// Fill `dst` with up to `dst.len()` characters, returning how many were
    /// written.
    fn read_chars(
        &mut self,
        dst: &mut [char],
    ) -> impl std::future::Future<Output = io::Result<usize>> + Send;
}

/// The async twin of [`CharWrite`](crate::CharWrite).
pub trait AsyncCharWrite {
    /// Write all of `s`.
    fn write_str(&mut self, s: &str) -> impl std::future::Future<Output = io::Result<()>> + Send;

    /// Flush buffered output down to the underlying sink.
    fn flush(&mut self) -> impl std::future::Future<Output = io::Result<()>> + Send;
}

/// A character source decoding UTF-8 from any `tokio::io::AsyncRead`.
///
/// The decoding logic is shared with the blocking
/// [`Utf8Reader`](crate::Utf8Reader); only the refill suspends.
#[derive(Debug)]
pub struct Utf8AsyncReader<R> {
    inner: R,
    buf: Vec<u8>,
    start: usize,
    end: usize,
    decoder: Utf8Decoder,
    eof: bool,
}

impl<R: AsyncRead + Unpin> Utf8AsyncReader<R> {
    /// Create a reader with the default buffer size.
    pub fn new(inner: R) -> Utf8AsyncReader<R> {
        Utf8AsyncReader::with_capacity(16 * 1024, inner)
    }

    /// Create a reader with a byte buffer of the given size.
    pub fn with_capacity(capacity: usize, inner: R) -> Utf8AsyncReader<R> {
        let capacity = capacity.max(4);
        let mut buf = pool::rent_bytes(capacity);
        buf.resize(capacity, 0);
        Utf8AsyncReader {
            inner,
            buf,
            start: 0,
            end: 0,
            decoder: Utf8Decoder::new(),
            eof: false,
        }
    }
}

impl<R: AsyncRead + Unpin + Send> AsyncCharRead for Utf8AsyncReader<R> {
    async fn read_chars(&mut self, dst: &mut [char]) -> io::Result<usize> {
        if dst.is_empty() {
            return Ok(0);
        }
        loop {
            if self.start == self.end && !self.eof {
                let n = self.inner.read(&mut self.buf).await?;
                self.start = 0;
                self.end = n;
                if n == 0 {
                    self.eof = true;
                }
            }
            let (nin, nout) =
                self.decoder.decode(&self.buf[self.start..self.end], dst, self.eof)?;
            self.start += nin;
            if nout > 0 {
                return Ok(nout);
            }
            if self.eof {
                return Ok(0);
            }
        }
    }
}

impl<R> Drop for Utf8AsyncReader<R> {
    fn drop(&mut self) {
        pool::give_bytes(mem::take(&mut self.buf));
    }
}

/// A character sink encoding UTF-8 into any `tokio::io::AsyncWrite`.
#[derive(Debug)]
pub struct Utf8AsyncWriter<W> {
    inner: Option<W>,
    buf: Vec<u8>,
    capacity: usize,
}

impl<W: AsyncWrite + Unpin> Utf8AsyncWriter<W> {
    /// Create a writer with the default buffer size.
    pub fn new(inner: W) -> Utf8AsyncWriter<W> {
        Utf8AsyncWriter::with_capacity(16 * 1024, inner)
    }

    /// Create a writer with a byte buffer of the given size.
    pub fn with_capacity(capacity: usize, inner: W) -> Utf8AsyncWriter<W> {
        let capacity = capacity.max(4);
        Utf8AsyncWriter {
            inner: Some(inner),
            buf: pool::rent_bytes(capacity),
            capacity,
        }
    }

    /// Flush and return the underlying sink.
    ///
    /// The underlying sink itself is not shut down; all pooled storage is
    /// released.
    pub async fn into_inner(mut self) -> io::Result<W> {
        self.flush_buf().await?;
        Ok(self.inner.take().expect("writer still owns its sink"))
    }

    async fn flush_buf(&mut self) -> io::Result<()> {
        if !self.buf.is_empty() {
            let inner = self.inner.as_mut().expect("writer still owns its sink");
            inner.write_all(&self.buf).await?;
            self.buf.clear();
        }
        Ok(())
    }
}

impl<W: AsyncWrite + Unpin + Send> AsyncCharWrite for Utf8AsyncWriter<W> {
    async fn write_str(&mut self, s: &str) -> io::Result<()> {
        let bytes = s.as_bytes();
        if self.buf.len() + bytes.len() > self.capacity {
            self.flush_buf().await?;
        }
        if bytes.len() >= self.capacity {
            let inner = self.inner.as_mut().expect("writer still owns its sink");
            return inner.write_all(bytes).await;
        }
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    async fn flush(&mut self) -> io::Result<()> {
        self.flush_buf().await?;
        let inner = self.inner.as_mut().expect("writer still owns its sink");
        inner.flush().await
    }
}

impl<W> Drop for Utf8AsyncWriter<W> {
    fn drop(&mut self) {
        // An async sink cannot be flushed from a synchronous drop; callers
        // flush before dropping. Only the pool rental is reclaimed here.
        pool::give_bytes(mem::take(&mut self.buf));
    }
}
