use std::io::{self, Read};
use std::mem;

use csvflow_core::pool;

/// A pull-based source of characters.
///
/// This is the only thing the reader knows about its input: it fills a
/// caller-provided buffer with characters, returns `0` exactly at end of
/// input, and never splits a code point (which holds trivially, since whole
/// `char`s cross the boundary). Any byte-to-char transcoding happens behind
/// this trait.
pub trait CharRead {
    /// Fill `dst` with up to `dst.len()` characters, returning how many were
    /// written. `0` means end of input.
    fn read_chars(&mut self, dst: &mut [char]) -> io::Result<usize>;
}

impl<T: CharRead + ?Sized> CharRead for &mut T {
    fn read_chars(&mut self, dst: &mut [char]) -> io::Result<usize> {
        (**self).read_chars(dst)
    }
}

/// The expected length of a UTF-8 sequence given its leading byte, or `None`
/// for bytes that can never begin one.
fn utf8_len(byte: u8) -> Option<usize> {
    match byte {
        0x00..=0x7F => Some(1),
        0xC2..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF4 => Some(4),
        _ => None,
    }
}

fn invalid_utf8() -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, "invalid UTF-8 in CSV input")
}

/// An incremental UTF-8 decoder.
///
/// Incomplete trailing sequences are carried across calls, so chunk
/// boundaries can never split a code point. Shared by the blocking and async
/// input adapters.
#[derive(Debug, Default)]
pub(crate) struct Utf8Decoder {
    partial: [u8; 4],
    partial_len: usize,
}

impl Utf8Decoder {
    pub(crate) fn new() -> Utf8Decoder {
        Utf8Decoder::default()
    }

    /// Decode characters from `bytes` into `dst`.
    ///
    /// Returns the number of bytes consumed and characters written. Bytes of
    /// a trailing incomplete sequence count as consumed and are buffered
    /// internally; with `at_eof` set they are an error instead.
    pub(crate) fn decode(
        &mut self,
        bytes: &[u8],
        dst: &mut [char],
        at_eof: bool,
    ) -> io::Result<(usize, usize)> {
        if dst.is_empty() {
            return Ok((0, 0));
        }
        let mut nin = 0;
        let mut nout = 0;
        if self.partial_len > 0 {
            let need = match utf8_len(self.partial[0]) {
                Some(need) => need,
                None => return Err(invalid_utf8()),
            };
            while self.partial_len < need && nin < bytes.len() {
                self.partial[self.partial_len] = bytes[nin];
                self.partial_len += 1;
                nin += 1;
            }
            if self.partial_len < need {
                if at_eof {
                    return Err(invalid_utf8());
                }
                return Ok((nin, 0));
            }
            let seq = std::str::from_utf8(&self.partial[..need]).map_err(|_| invalid_utf8())?;
            dst[nout] = seq.chars().next().expect("decoded sequence is non-empty");
            nout += 1;
            self.partial_len = 0;
        }
        while nin < bytes.len() && nout < dst.len() {
            let byte = bytes[nin];
            if byte < 0x80 {
                dst[nout] = byte as char;
                nout += 1;
                nin += 1;
                continue;
            }
            let need = match utf8_len(byte) {
                Some(need) => need,
                None => return Err(invalid_utf8()),
            };
            if nin + need > bytes.len() {
                if at_eof {
                    return Err(invalid_utf8());
                }
                let rest = bytes.len() - nin;
                self.partial[..rest].copy_from_slice(&bytes[nin..]);
                self.partial_len = rest;
                nin = bytes.len();
                break;
            }
            let seq =
                std::str::from_utf8(&bytes[nin..nin + need]).map_err(|_| invalid_utf8())?;
            dst[nout] = seq.chars().next().expect("decoded sequence is non-empty");
            nout += 1;
            nin += need;
        }
        Ok((nin, nout))
    }
}

/// A character source decoding UTF-8 from any `io::Read`.
///
/// Bytes are pulled through a pooled buffer; the buffer returns to the pool
/// on drop. A leading byte-order mark is not stripped.
#[derive(Debug)]
pub struct Utf8Reader<R> {
    inner: R,
    buf: Vec<u8>,
    start: usize,
    end: usize,
    decoder: Utf8Decoder,
    eof: bool,
}

impl<R: Read> Utf8Reader<R> {
    /// Create a reader with the default buffer size.
    pub fn new(inner: R) -> Utf8Reader<R> {
        Utf8Reader::with_capacity(16 * 1024, inner)
    }

    /// Create a reader with a byte buffer of the given size.
    pub fn with_capacity(capacity: usize, inner: R) -> Utf8Reader<R> {
        let capacity = capacity.max(4);
        let mut buf = pool::rent_bytes(capacity);
        buf.resize(capacity, 0);
        Utf8Reader {
            inner,
            buf,
            start: 0,
            end: 0,
            decoder: Utf8Decoder::new(),
            eof: false,
        }
    }

    /// A reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }
}

impl<R: Read> CharRead for Utf8Reader<R> {
    fn read_chars(&mut self, dst: &mut [char]) -> io::Result<usize> {
        if dst.is_empty() {
            return Ok(0);
        }
        loop {
            if self.start == self.end && !self.eof {
                let n = self.inner.read(&mut self.buf)?;
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

impl<R> Drop for Utf8Reader<R> {
    fn drop(&mut self) {
        pool::give_bytes(mem::take(&mut self.buf));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all<R: Read>(mut rdr: Utf8Reader<R>, chunk: usize) -> io::Result<String> {
        let mut dst = vec!['\0'; chunk];
        let mut out = String::new();
        loop {
            let n = rdr.read_chars(&mut dst)?;
            if n == 0 {
                return Ok(out);
            }
            out.extend(&dst[..n]);
        }
    }

    #[test]
    fn decodes_ascii_and_multibyte() {
        let data = "héllo, wörld — ok";
        let rdr = Utf8Reader::new(data.as_bytes());
        assert_eq!(read_all(rdr, 4).unwrap(), data);
    }

    #[test]
    fn multibyte_sequences_survive_tiny_byte_buffers() {
        // The minimum 4-byte buffer forces sequences to straddle refills.
        let data = "aé€𐍈z";
        let rdr = Utf8Reader::with_capacity(1, data.as_bytes());
        assert_eq!(read_all(rdr, 2).unwrap(), data);
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        let rdr = Utf8Reader::new(&b"ab\xFFcd"[..]);
        let err = read_all(rdr, 8).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn truncated_sequence_at_eof_is_an_error() {
        // The first two bytes of a three-byte sequence, then EOF.
        let rdr = Utf8Reader::new(&"€".as_bytes()[..2]);
        let err = read_all(rdr, 8).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn bom_is_not_stripped() {
        let rdr = Utf8Reader::new("\u{feff}x".as_bytes());
        assert_eq!(read_all(rdr, 8).unwrap(), "\u{feff}x");
    }

    #[test]
    fn zero_means_eof_and_stays_eof() {
        let mut rdr = Utf8Reader::new(&b"a"[..]);
        let mut dst = ['\0'; 4];
        assert_eq!(rdr.read_chars(&mut dst).unwrap(), 1);
        assert_eq!(rdr.read_chars(&mut dst).unwrap(), 0);
        assert_eq!(rdr.read_chars(&mut dst).unwrap(), 0);
    }
}
