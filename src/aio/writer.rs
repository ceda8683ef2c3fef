use csvflow_core::{Emitter, EmitterBuilder};
use serde::Serialize;
use tokio::io::AsyncWrite;

use super::io::{AsyncCharWrite, Utf8AsyncWriter};
use crate::convert::ToField;
use crate::error::Result;
use crate::options::Options;
use crate::writer::{format_value, Writer};

/// The async counterpart of [`Writer`](crate::Writer).
///
/// Quoting decisions and escaping come from the same emitter as the
/// blocking writer. There is no flush-on-drop: flush explicitly (or call
/// [`AsyncWriter::into_inner`]) before dropping.
#[derive(Debug)]
pub struct AsyncWriter<W> {
    out: W,
    emitter: Emitter,
    options: Options,
    newline: String,
    first_field: bool,
    field_index: u64,
    row_index: u64,
    header_written: bool,
}

impl<W: AsyncCharWrite> AsyncWriter<W> {
    /// Create a writer over any async character sink.
    pub fn from_options(options: Options, out: W) -> Result<AsyncWriter<W>> {
        options.validate()?;
        let emitter = EmitterBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .escape(options.escape)
            .build();
        let newline = options.output_newline().to_string();
        Ok(AsyncWriter {
            out,
            emitter,
            options,
            newline,
            first_field: true,
            field_index: 0,
            row_index: 0,
            header_written: false,
        })
    }

    /// Write one field, quoting and escaping as its content requires.
    pub async fn write_field(&mut self, field: &str) -> Result<()> {
        let emitter = self.emitter.clone();
        if !self.first_field {
            self.write_char(emitter.delimiter()).await?;
        }
        if emitter.needs_quotes(field) {
            self.write_char(emitter.quote()).await?;
            for (i, run) in emitter.escape_runs(field).enumerate() {
                if i > 0 {
                    self.write_char(emitter.escape()).await?;
                    self.write_char(emitter.quote()).await?;
                }
                self.out.write_str(run).await?;
            }
            self.write_char(emitter.quote()).await?;
        } else {
            self.out.write_str(field).await?;
        }
        self.first_field = false;
        self.field_index += 1;
        Ok(())
    }

    async fn write_char(&mut self, ch: char) -> Result<()> {
        let mut buf = [0u8; 4];
        self.out.write_str(ch.encode_utf8(&mut buf)).await?;
        Ok(())
    }

    /// Write one field from a convertible value. `None` values produce an
    /// empty field.
    pub async fn write_field_value<T: ToField + ?Sized>(&mut self, value: &T) -> Result<()> {
        let buf = format_value(value, &self.options.culture)?;
        self.write_field(buf.as_str()).await
    }

    /// Close the current record.
    pub async fn next_record(&mut self) -> Result<()> {
        self.out.write_str(&self.newline).await?;
        self.first_field = true;
        self.field_index = 0;
        self.row_index += 1;
        Ok(())
    }

    /// Write a complete record and close it.
    pub async fn write_record<I>(&mut self, record: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for field in record {
            self.write_field(field.as_ref()).await?;
        }
        self.next_record().await
    }

    /// Serialize a value as one record and close it.
    ///
    /// The record is encoded in memory by the blocking writer (so quoting
    /// and header behavior are byte-identical) and pushed through the sink
    /// in a single write.
    pub async fn serialize<S: Serialize>(&mut self, value: S) -> Result<()> {
        let options = Options {
            has_header: self.options.has_header && !self.header_written,
            newline: Some(self.newline.clone()),
            ..self.options.clone()
        };
        let mut encoder = Writer::from_options(options, String::new())?;
        encoder.serialize(value)?;
        self.header_written = true;
        let rows_written = encoder.row_index();
        let encoded = encoder.into_inner()?;
        self.out.write_str(&encoded).await?;
        self.row_index += rows_written;
        Ok(())
    }

    /// The zero-based index of the record being written.
    pub fn row_index(&self) -> u64 {
        self.row_index
    }

    /// The zero-based index of the next field within the current record.
    pub fn field_index(&self) -> u64 {
        self.field_index
    }

    /// Flush buffered output down to the underlying sink.
    pub async fn flush(&mut self) -> Result<()> {
        self.out.flush().await?;
        Ok(())
    }

    /// Flush and return the underlying character sink.
    pub async fn into_inner(mut self) -> Result<W> {
        self.flush().await?;
        Ok(self.out)
    }
}

impl<T: AsyncWrite + Unpin + Send> AsyncWriter<Utf8AsyncWriter<T>> {
    /// Create a writer encoding UTF-8 into any `tokio::io::AsyncWrite`.
    pub fn from_writer(options: Options, wtr: T) -> Result<AsyncWriter<Utf8AsyncWriter<T>>> {
        let capacity = options.byte_buffer_size;
        AsyncWriter::from_options(options, Utf8AsyncWriter::with_capacity(capacity, wtr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn collect(wtr: AsyncWriter<Utf8AsyncWriter<Vec<u8>>>) -> String {
        let inner = wtr.into_inner().await.unwrap();
        let bytes = inner.into_inner().await.unwrap();
        String::from_utf8(bytes).unwrap()
    }

    #[tokio::test]
    async fn matches_blocking_writer() {
        let options = Options { newline: Some("\n".to_string()), ..Options::default() };

        let mut wtr = AsyncWriter::from_writer(options.clone(), Vec::new()).unwrap();
        wtr.write_record(["1", "Ada,Lovelace", " padded "]).await.unwrap();
        wtr.write_record(["2", "say \"hi\"", "plain"]).await.unwrap();
        let got_async = collect(wtr).await;

        let mut wtr = Writer::from_options(options, String::new()).unwrap();
        wtr.write_record(["1", "Ada,Lovelace", " padded "]).unwrap();
        wtr.write_record(["2", "say \"hi\"", "plain"]).unwrap();
        let got_sync = wtr.into_inner().unwrap();

        assert_eq!(got_async, got_sync);
    }

    #[tokio::test]
    async fn serialize_writes_header_once() {
        use serde::Serialize;

        #[derive(Serialize)]
        struct Row<'a> {
            id: u64,
            name: &'a str,
        }

        let options = Options { newline: Some("\n".to_string()), ..Options::default() };
        let mut wtr = AsyncWriter::from_writer(options, Vec::new()).unwrap();
        wtr.serialize(Row { id: 1, name: "ada" }).await.unwrap();
        // The header record counts, matching the blocking writer.
        assert_eq!(wtr.row_index(), 2);
        wtr.serialize(Row { id: 2, name: "grace" }).await.unwrap();
        assert_eq!(wtr.row_index(), 3);
        assert_eq!(collect(wtr).await, "id,name\n1,ada\n2,grace\n");
    }

    #[tokio::test]
    async fn values_and_nulls() {
        let options = Options { newline: Some("\n".to_string()), ..Options::default() };
        let mut wtr = AsyncWriter::from_writer(options, Vec::new()).unwrap();
        wtr.write_field_value(&10u32).await.unwrap();
        wtr.write_field_value(&Option::<u32>::None).await.unwrap();
        wtr.next_record().await.unwrap();
        assert_eq!(collect(wtr).await, "10,\n");
    }
}
