use std::collections::HashMap;

use csvflow_core::{Newline, Row, Status};
use serde::de::DeserializeOwned;
use tokio::io::AsyncRead;

use super::io::{AsyncCharRead, Utf8AsyncReader};
use crate::error::{Position, Result};
use crate::options::Options;
use crate::reader::ReadState;

/// The async counterpart of [`Reader`](crate::Reader).
///
/// It wraps the same state machine and reader state as the blocking
/// version; only the refill awaits. See the [module docs](crate::aio) for
/// the cancellation contract.
#[derive(Debug)]
pub struct AsyncReader<R> {
    state: ReadState,
    input: R,
}

impl<R: AsyncCharRead> AsyncReader<R> {
    /// Create a reader over any async character source.
    pub fn from_options(options: Options, input: R) -> Result<AsyncReader<R>> {
        Ok(AsyncReader { state: ReadState::new(options)?, input })
    }

    /// Read the next data row.
    ///
    /// Returns `Ok(None)` at end of input. The returned view borrows this
    /// reader and is invalidated by the next read.
    pub async fn read_row(&mut self) -> Result<Option<Row<'_>>> {
        if !self.advance_data_row().await? {
            return Ok(None);
        }
        Ok(Some(self.state.row()))
    }

    /// Read the next data row as a map from column name to field value.
    pub async fn read_dictionary(&mut self) -> Result<Option<HashMap<String, Option<String>>>> {
        if !self.advance_data_row().await? {
            return Ok(None);
        }
        Ok(Some(self.state.dictionary_from_row()))
    }

    /// Read the next data row as a deserialized record.
    pub async fn read_record<D: DeserializeOwned>(&mut self) -> Result<Option<D>> {
        if !self.advance_data_row().await? {
            return Ok(None);
        }
        self.state.record_from_row().map(Some)
    }

    /// The header names, capturing the header row first if necessary.
    pub async fn headers(&mut self) -> Result<&[String]> {
        self.ensure_start().await?;
        Ok(self.state.header_names())
    }

    /// Look up a column index by header name.
    pub async fn header_index(&mut self, name: &str) -> Result<Option<usize>> {
        self.ensure_start().await?;
        Ok(self.state.header_index(name))
    }

    /// The current position: the index the next row will get and the line
    /// the parser is on.
    pub fn position(&self) -> Position {
        self.state.position()
    }

    /// The first newline variant observed in the input, if any.
    pub fn detected_newline(&self) -> Option<Newline> {
        self.state.detected_newline()
    }

    /// True if the input is exhausted.
    pub fn is_done(&self) -> bool {
        self.state.is_done()
    }

    /// Pump the parser until it finishes a row or the input ends. The only
    /// suspension point is the refill.
    async fn pump(&mut self) -> Result<bool> {
        loop {
            if self.state.needs_fill() {
                let n = self.input.read_chars(self.state.fill_buf()).await?;
                self.state.note_fill(n);
            }
            match self.state.step() {
                Status::NeedInput => continue,
                Status::Row => return Ok(true),
                Status::End => return Ok(false),
            }
        }
    }

    async fn ensure_start(&mut self) -> Result<()> {
        if self.state.take_started() {
            return Ok(());
        }
        if self.state.wants_header() && self.pump().await? {
            self.state.after_row()?;
            self.state.capture_headers();
        }
        Ok(())
    }

    async fn advance_data_row(&mut self) -> Result<bool> {
        self.ensure_start().await?;
        if !self.pump().await? {
            return Ok(false);
        }
        self.state.after_row()?;
        Ok(true)
    }
}

impl<T: AsyncRead + Unpin + Send> AsyncReader<Utf8AsyncReader<T>> {
    /// Create a reader decoding UTF-8 from any `tokio::io::AsyncRead`.
    pub fn from_reader(options: Options, rdr: T) -> Result<AsyncReader<Utf8AsyncReader<T>>> {
        let input = Utf8AsyncReader::with_capacity(options.byte_buffer_size, rdr);
        AsyncReader::from_options(options, input)
    }
}
