use std::fs::File;
use std::io;
use std::mem;
use std::path::Path;

use arrayvec::ArrayString;
use csvflow_core::{pool, Emitter, EmitterBuilder};
use serde::Serialize;

use crate::convert::{Culture, ToField};
use crate::error::{Error, ErrorKind, Result};
use crate::options::Options;
use crate::output::{CharWrite, Utf8Writer};
use crate::ser;

/// A formatted field value: on the stack when it fits, pooled heap storage
/// when it does not.
pub(crate) enum FieldBuf {
    Inline(ArrayString<64>),
    Heap(String),
}

impl FieldBuf {
    pub(crate) fn as_str(&self) -> &str {
        match *self {
            FieldBuf::Inline(ref buf) => buf.as_str(),
            FieldBuf::Heap(ref buf) => buf.as_str(),
        }
    }
}

impl Drop for FieldBuf {
    fn drop(&mut self) {
        if let FieldBuf::Heap(ref mut buf) = *self {
            pool::give_string(mem::take(buf));
        }
    }
}

/// Format a value into a field buffer, spilling to a pooled heap buffer
/// only when the stack buffer overflows.
pub(crate) fn format_value<T: ToField + ?Sized>(value: &T, culture: &Culture) -> Result<FieldBuf> {
    let mut small = ArrayString::<64>::new();
    if value.format_field(&mut small, culture).is_ok() {
        return Ok(FieldBuf::Inline(small));
    }
    let mut big = pool::rent_string(128);
    value
        .format_field(&mut big, culture)
        .map_err(|_| Error::new(ErrorKind::Serialize("failed to format field value".to_string())))?;
    Ok(FieldBuf::Heap(big))
}

/// A configured CSV writer over a character sink.
///
/// Fields are quoted only when their content requires it (delimiter, quote,
/// newline, or boundary whitespace), and quotes inside quoted fields are
/// escaped by writing the field in segments; no temporary escaped copy is
/// built.
///
/// # Example
///
/// ```
/// use csvflow::{Options, Writer};
///
/// # fn example() -> Result<(), csvflow::Error> {
/// let mut wtr = Writer::from_options(
///     Options { newline: Some("\n".to_string()), ..Options::default() },
///     String::new(),
/// )?;
/// wtr.write_record(["id", "name"])?;
/// wtr.write_record(["1", "Ada,Lovelace"])?;
/// assert_eq!(wtr.into_inner()?, "id,name\n1,\"Ada,Lovelace\"\n");
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
#[derive(Debug)]
pub struct Writer<W: CharWrite> {
    out: Option<W>,
    emitter: Emitter,
    options: Options,
    newline: String,
    first_field: bool,
    field_index: u64,
    row_index: u64,
    header_written: bool,
}

impl<W: CharWrite> Writer<W> {
    /// Create a writer over any character sink.
    ///
    /// The options are validated here; invalid configuration is a `Config`
    /// error.
    pub fn from_options(options: Options, out: W) -> Result<Writer<W>> {
        options.validate()?;
        let emitter = EmitterBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .escape(options.escape)
            .build();
        let newline = options.output_newline().to_string();
        Ok(Writer {
            out: Some(out),
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
    pub fn write_field(&mut self, field: &str) -> Result<()> {
        let out = self.out.as_mut().expect("writer still owns its sink");
        if !self.first_field {
            out.write_char(self.emitter.delimiter())?;
        }
        if self.emitter.needs_quotes(field) {
            let quote = self.emitter.quote();
            let escape = self.emitter.escape();
            out.write_char(quote)?;
            for (i, run) in self.emitter.escape_runs(field).enumerate() {
                if i > 0 {
                    out.write_char(escape)?;
                    out.write_char(quote)?;
                }
                out.write_str(run)?;
            }
            out.write_char(quote)?;
        } else {
            out.write_str(field)?;
        }
        self.first_field = false;
        self.field_index += 1;
        Ok(())
    }

    /// Write one field from a convertible value.
    ///
    /// `None` values produce an empty field. Formatting goes through a stack
    /// buffer and only spills to pooled heap storage for oversized values.
    pub fn write_field_value<T: ToField + ?Sized>(&mut self, value: &T) -> Result<()> {
        let buf = format_value(value, &self.options.culture)?;
        self.write_field(buf.as_str())
    }

    /// Close the current record: write the configured newline and reset the
    /// field state.
    pub fn next_record(&mut self) -> Result<()> {
        let out = self.out.as_mut().expect("writer still owns its sink");
        out.write_str(&self.newline)?;
        self.first_field = true;
        self.field_index = 0;
        self.row_index += 1;
        Ok(())
    }

    /// Write a complete record and close it.
    pub fn write_record<I>(&mut self, record: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for field in record {
            self.write_field(field.as_ref())?;
        }
        self.next_record()
    }

    /// Serialize a value as one record and close it.
    ///
    /// When headers are enabled, the first serialized struct also writes a
    /// header row built from its field names; values without named members
    /// (tuples, sequences) never produce a header.
    pub fn serialize<S: Serialize>(&mut self, value: S) -> Result<()> {
        if self.options.has_header && !self.header_written {
            self.header_written = true;
            if let Some(names) = ser::header_names(&value)? {
                self.write_record(names)?;
            }
        }
        ser::serialize_fields(self, &value)?;
        self.next_record()
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
    pub fn flush(&mut self) -> Result<()> {
        let out = self.out.as_mut().expect("writer still owns its sink");
        out.flush()?;
        Ok(())
    }

    /// Flush and return the underlying character sink.
    pub fn into_inner(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.out.take().expect("writer still owns its sink"))
    }
}

impl<T: io::Write> Writer<Utf8Writer<T>> {
    /// Create a writer encoding UTF-8 into any `io::Write`.
    ///
    /// The writer buffers internally; there is no need to wrap `wtr` in a
    /// `BufWriter`.
    pub fn from_writer(options: Options, wtr: T) -> Result<Writer<Utf8Writer<T>>> {
        let capacity = options.byte_buffer_size;
        Writer::from_options(options, Utf8Writer::with_capacity(capacity, wtr))
    }
}

impl Writer<Utf8Writer<File>> {
    /// Create a writer for the file at the given path, truncating it if it
    /// exists.
    pub fn from_path<P: AsRef<Path>>(
        options: Options,
        path: P,
    ) -> Result<Writer<Utf8Writer<File>>> {
        let file = File::create(path)?;
        Writer::from_writer(options, file)
    }
}

impl<W: CharWrite> Drop for Writer<W> {
    fn drop(&mut self) {
        if let Some(ref mut out) = self.out {
            let _ = out.flush();
        }
    }
}
