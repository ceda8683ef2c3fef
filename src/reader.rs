use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::marker::PhantomData;
use std::mem;
use std::path::Path;

use csvflow_core::{pool, Anomaly, Newline, Parser, ParserBuilder, Row, Status};
use log::{debug, warn};
use serde::de::DeserializeOwned;

use crate::de;
use crate::error::{BadDataContext, Error, ErrorKind, Position, Result};
use crate::input::{CharRead, Utf8Reader};
use crate::options::{Options, ReadMode};

/// Header state owned by a reader: the captured names, the lookup honoring
/// the configured comparer, and the lazily grown `Column{n}` cache for
/// columns beyond the header width.
#[derive(Debug, Default)]
struct Headers {
    names: Vec<String>,
    index: HashMap<String, usize>,
    generated: Vec<String>,
}

/// Everything a reader is besides its input source.
///
/// The blocking [`Reader`] and the async reader wrap the same state and the
/// same parser; only the refill primitive differs between them.
#[derive(Debug)]
pub(crate) struct ReadState {
    options: Options,
    parser: Parser,
    buf: Vec<char>,
    buf_start: usize,
    buf_end: usize,
    at_eof: bool,
    started: bool,
    headers: Option<Headers>,
    expected_fields: Option<usize>,
}

impl ReadState {
    pub(crate) fn new(options: Options) -> Result<ReadState> {
        options.validate()?;
        let parser = ParserBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .escape(options.escape)
            .trim(options.trim)
            .ignore_blank_lines(options.ignore_blank_lines)
            .build();
        let size = options.char_buffer_size;
        let mut buf = pool::rent_chars(size);
        buf.resize(size, '\0');
        Ok(ReadState {
            options,
            parser,
            buf,
            buf_start: 0,
            buf_end: 0,
            at_eof: false,
            started: false,
            headers: None,
            expected_fields: None,
        })
    }

    /// True if the parser has consumed the whole buffer and the source is
    /// not yet exhausted.
    pub(crate) fn needs_fill(&self) -> bool {
        self.buf_start >= self.buf_end && !self.at_eof
    }

    /// The buffer a refill should write characters into.
    pub(crate) fn fill_buf(&mut self) -> &mut [char] {
        &mut self.buf
    }

    /// Record the outcome of a refill. Zero characters means end of input.
    pub(crate) fn note_fill(&mut self, n: usize) {
        self.buf_start = 0;
        self.buf_end = n;
        if n == 0 {
            self.at_eof = true;
        }
    }

    /// Feed the parser from the internal buffer.
    pub(crate) fn step(&mut self) -> Status {
        let (n, status) = self
            .parser
            .advance(&self.buf[self.buf_start..self.buf_end], self.at_eof);
        self.buf_start += n;
        status
    }

    pub(crate) fn take_started(&mut self) -> bool {
        mem::replace(&mut self.started, true)
    }

    pub(crate) fn wants_header(&self) -> bool {
        self.options.has_header
    }

    /// Post-row accounting: route anomalies per the read mode and enforce
    /// the detected column count. The first row (header or data) fixes the
    /// expected width.
    pub(crate) fn after_row(&mut self) -> Result<()> {
        for anomaly in self.parser.take_anomalies() {
            self.report_anomaly(&anomaly)?;
        }
        if self.options.detect_column_count {
            let got = self.parser.field_count();
            match self.expected_fields {
                None => self.expected_fields = Some(got),
                Some(expected) if got != expected => self.report_width(expected, got)?,
                Some(_) => {}
            }
        }
        Ok(())
    }

    fn report_anomaly(&self, anomaly: &Anomaly) -> Result<()> {
        let row = self.parser.row();
        let pos = Position::new(row.row_index(), anomaly.line, anomaly.field);
        match self.options.read_mode {
            ReadMode::Strict => {
                Err(Error::new(ErrorKind::Parse { pos, kind: anomaly.kind }))
            }
            ReadMode::Lenient => {
                let raw = row.get(anomaly.field as usize).unwrap_or("").to_string();
                let context = BadDataContext {
                    position: pos,
                    message: anomaly.kind.message().to_string(),
                    raw,
                };
                warn!("{}", context);
                if let Some(ref callback) = self.options.bad_data_callback {
                    callback(&context);
                }
                Ok(())
            }
        }
    }

    fn report_width(&self, expected: usize, got: usize) -> Result<()> {
        let row = self.parser.row();
        let pos = Position::new(row.row_index(), row.line_number(), got as u64);
        match self.options.read_mode {
            ReadMode::Strict => Err(Error::new(ErrorKind::UnequalLengths {
                pos,
                expected: expected as u64,
                got: got as u64,
            })),
            ReadMode::Lenient => {
                let context = BadDataContext {
                    position: pos,
                    message: format!("expected {} fields, found {}", expected, got),
                    raw: String::new(),
                };
                warn!("{}", context);
                if let Some(ref callback) = self.options.bad_data_callback {
                    callback(&context);
                }
                Ok(())
            }
        }
    }

    /// Turn the row the parser just finished into the header state and make
    /// the following rows zero-based again.
    pub(crate) fn capture_headers(&mut self) {
        let (names, index) = {
            let row = self.parser.row();
            let names: Vec<String> = row.iter().map(str::to_string).collect();
            let mut index = HashMap::with_capacity(names.len());
            for (i, name) in names.iter().enumerate() {
                // First occurrence wins for duplicated header names.
                index.entry(self.options.normalize_name(name)).or_insert(i);
            }
            (names, index)
        };
        debug!("captured {} header columns", names.len());
        self.headers = Some(Headers { names, index, generated: Vec::new() });
        self.parser.set_row_index(0);
    }

    pub(crate) fn header_names(&self) -> &[String] {
        self.headers.as_ref().map(|h| h.names.as_slice()).unwrap_or(&[])
    }

    pub(crate) fn header_index(&self, name: &str) -> Option<usize> {
        let headers = self.headers.as_ref()?;
        headers.index.get(&self.options.normalize_name(name)).copied()
    }

    pub(crate) fn row(&self) -> Row<'_> {
        self.parser.row()
    }

    /// Build an owned name/value map from the row the parser just finished.
    pub(crate) fn dictionary_from_row(&mut self) -> HashMap<String, Option<String>> {
        let fields: Vec<String> = self.parser.row().iter().map(str::to_string).collect();
        let header_len = self.header_names().len();
        let total = header_len.max(fields.len());
        self.ensure_generated(total);
        let mut map = HashMap::with_capacity(total);
        for i in 0..total {
            map.insert(self.column_name(i).to_string(), fields.get(i).cloned());
        }
        map
    }

    /// Deserialize the row the parser just finished into a record.
    pub(crate) fn record_from_row<D: DeserializeOwned>(&self) -> Result<D> {
        let row = self.parser.row();
        let headers = if self.options.has_header {
            self.headers.as_ref().map(|h| h.names.as_slice())
        } else {
            None
        };
        de::deserialize_row(&row, headers, &self.options)
    }

    pub(crate) fn position(&self) -> Position {
        Position::new(self.parser.pending_row_index(), self.parser.line(), 0)
    }

    pub(crate) fn detected_newline(&self) -> Option<Newline> {
        self.parser.detected_newline()
    }

    pub(crate) fn is_done(&self) -> bool {
        self.parser.is_done()
    }

    /// Grow the `Column{n}` cache until names exist for `total` columns.
    fn ensure_generated(&mut self, total: usize) {
        let headers = self.headers.get_or_insert_with(Headers::default);
        while headers.names.len() + headers.generated.len() < total {
            let i = headers.names.len() + headers.generated.len();
            headers.generated.push(format!("Column{}", i));
        }
    }

    fn column_name(&self, i: usize) -> &str {
        let headers = self.headers.as_ref().expect("generated names exist");
        if i < headers.names.len() {
            &headers.names[i]
        } else {
            &headers.generated[i - headers.names.len()]
        }
    }
}

impl Drop for ReadState {
    fn drop(&mut self) {
        pool::give_chars(mem::take(&mut self.buf));
    }
}

/// A configured CSV reader over a character source.
///
/// A reader parses rows on demand and exposes three levels of
/// materialization: borrowed [`Row`] views, owned name/value dictionaries,
/// and serde records. The header row, when enabled, is captured on the
/// first read.
///
/// # Example
///
/// ```
/// use csvflow::{Options, Reader};
///
/// # fn example() -> Result<(), csvflow::Error> {
/// let data = "id,name\n1,\"Ada,Lovelace\"\n";
/// let mut rdr = Reader::from_reader(Options::default(), data.as_bytes())?;
/// while let Some(row) = rdr.read_row()? {
///     assert_eq!(row.field_span(1), "Ada,Lovelace");
/// }
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
#[derive(Debug)]
pub struct Reader<R> {
    state: ReadState,
    input: R,
}

impl<R: CharRead> Reader<R> {
    /// Create a reader over any character source.
    ///
    /// The options are validated here; invalid configuration is a `Config`
    /// error.
    pub fn from_options(options: Options, input: R) -> Result<Reader<R>> {
        Ok(Reader { state: ReadState::new(options)?, input })
    }

    /// Read the next data row.
    ///
    /// Returns `Ok(None)` at end of input. The returned view borrows this
    /// reader and is invalidated by the next read.
    pub fn read_row(&mut self) -> Result<Option<Row<'_>>> {
        if !self.advance_data_row()? {
            return Ok(None);
        }
        Ok(Some(self.state.row()))
    }

    /// Read the next data row as a map from column name to field value.
    ///
    /// Keys come from the header; columns beyond the header width (or all
    /// columns, without a header) get generated `Column{n}` names. Fields
    /// missing from a short row map to `None`.
    pub fn read_dictionary(&mut self) -> Result<Option<HashMap<String, Option<String>>>> {
        if !self.advance_data_row()? {
            return Ok(None);
        }
        Ok(Some(self.state.dictionary_from_row()))
    }

    /// Read the next data row as a deserialized record.
    ///
    /// With a header, struct fields resolve against the header names; without
    /// one, they resolve positionally.
    pub fn read_record<D: DeserializeOwned>(&mut self) -> Result<Option<D>> {
        if !self.advance_data_row()? {
            return Ok(None);
        }
        self.state.record_from_row().map(Some)
    }

    /// Returns an iterator over deserialized records.
    pub fn deserialize<D: DeserializeOwned>(&mut self) -> DeserializeIter<'_, R, D> {
        DeserializeIter { rdr: self, _priv: PhantomData }
    }

    /// The header names, capturing the header row first if necessary.
    ///
    /// Returns an empty slice when reading headerless data.
    pub fn headers(&mut self) -> Result<&[String]> {
        self.ensure_start()?;
        Ok(self.state.header_names())
    }

    /// Look up a column index by header name, honoring the configured
    /// comparer.
    pub fn header_index(&mut self, name: &str) -> Result<Option<usize>> {
        self.ensure_start()?;
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

    /// Pump the parser until it finishes a row or the input ends.
    fn pump(&mut self) -> Result<bool> {
        loop {
            if self.state.needs_fill() {
                let n = self.input.read_chars(self.state.fill_buf())?;
                self.state.note_fill(n);
            }
            match self.state.step() {
                Status::NeedInput => continue,
                Status::Row => return Ok(true),
                Status::End => return Ok(false),
            }
        }
    }

    fn ensure_start(&mut self) -> Result<()> {
        if self.state.take_started() {
            return Ok(());
        }
        if self.state.wants_header() && self.pump()? {
            self.state.after_row()?;
            self.state.capture_headers();
        }
        Ok(())
    }

    fn advance_data_row(&mut self) -> Result<bool> {
        self.ensure_start()?;
        if !self.pump()? {
            return Ok(false);
        }
        self.state.after_row()?;
        Ok(true)
    }
}

impl<T: io::Read> Reader<Utf8Reader<T>> {
    /// Create a reader decoding UTF-8 from any `io::Read`.
    ///
    /// The reader buffers internally; there is no need to wrap `rdr` in a
    /// `BufReader`.
    pub fn from_reader(options: Options, rdr: T) -> Result<Reader<Utf8Reader<T>>> {
        let input = Utf8Reader::with_capacity(options.byte_buffer_size, rdr);
        Reader::from_options(options, input)
    }
}

impl Reader<Utf8Reader<File>> {
    /// Create a reader for the file at the given path.
    pub fn from_path<P: AsRef<Path>>(
        options: Options,
        path: P,
    ) -> Result<Reader<Utf8Reader<File>>> {
        let file = File::open(path)?;
        Reader::from_reader(options, file)
    }
}

/// A borrowed iterator over deserialized records.
///
/// The type parameter `D` refers to the type each row is deserialized into.
pub struct DeserializeIter<'r, R, D> {
    rdr: &'r mut Reader<R>,
    _priv: PhantomData<D>,
}

impl<'r, R: CharRead, D: DeserializeOwned> Iterator for DeserializeIter<'r, R, D> {
    type Item = Result<D>;

    fn next(&mut self) -> Option<Result<D>> {
        self.rdr.read_record().transpose()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::options::NameMatch;

    fn reader(data: &str, options: Options) -> Reader<Utf8Reader<&[u8]>> {
        Reader::from_reader(options, data.as_bytes()).unwrap()
    }

    #[test]
    fn reads_rows_after_header() {
        let mut rdr = reader("id,name\n1,ada\n2,grace\n", Options::default());

        let row = rdr.read_row().unwrap().unwrap();
        assert_eq!(row.iter().collect::<Vec<_>>(), vec!["1", "ada"]);
        assert_eq!(row.row_index(), 0);

        let row = rdr.read_row().unwrap().unwrap();
        assert_eq!(row.get(1), Some("grace"));
        assert_eq!(row.row_index(), 1);

        assert!(rdr.read_row().unwrap().is_none());
        assert!(rdr.is_done());
    }

    #[test]
    fn headers_are_available_before_reading() {
        let mut rdr = reader("id,name\n1,ada\n", Options::default());
        assert_eq!(rdr.headers().unwrap(), ["id", "name"]);
        let row = rdr.read_row().unwrap().unwrap();
        assert_eq!(row.get(0), Some("1"));
    }

    #[test]
    fn header_lookup_honors_comparer() {
        let mut rdr = reader("Id,Name\n1,ada\n", Options::default());
        assert_eq!(rdr.header_index("name").unwrap(), Some(1));
        assert_eq!(rdr.header_index("missing").unwrap(), None);

        let options = Options {
            header_comparer: NameMatch::CaseSensitive,
            ..Options::default()
        };
        let mut rdr = reader("Id,Name\n1,ada\n", options);
        assert_eq!(rdr.header_index("name").unwrap(), None);
        assert_eq!(rdr.header_index("Name").unwrap(), Some(1));
    }

    #[test]
    fn no_header_mode_returns_first_row() {
        let options = Options { has_header: false, ..Options::default() };
        let mut rdr = reader("a,b\nc,d\n", options);
        let row = rdr.read_row().unwrap().unwrap();
        assert_eq!(row.get(0), Some("a"));
        assert_eq!(row.row_index(), 0);
    }

    #[test]
    fn strict_mode_fails_on_width_mismatch() {
        let mut rdr = reader("a,b\n1,2\n3\n", Options::default());
        let row = rdr.read_row().unwrap().unwrap();
        assert_eq!(row.field_count(), 2);

        let err = rdr.read_row().unwrap_err();
        match err.into_kind() {
            ErrorKind::UnequalLengths { pos, expected, got } => {
                assert_eq!(pos.row(), 1);
                assert_eq!(expected, 2);
                assert_eq!(got, 1);
                assert_eq!(pos.field(), 1);
            }
            wrong => panic!("expected UnequalLengths, got {:?}", wrong),
        }
    }

    #[test]
    fn lenient_mode_reports_and_continues() {
        let reports = Arc::new(AtomicUsize::new(0));
        let seen = reports.clone();
        let options = Options {
            read_mode: ReadMode::Lenient,
            bad_data_callback: Some(Arc::new(move |ctx| {
                assert!(ctx.message.contains("quote"));
                seen.fetch_add(1, Ordering::SeqCst);
            })),
            ..Options::default()
        };
        let mut rdr = reader("a,b\n1,te\"st\n", options);
        let row = rdr.read_row().unwrap().unwrap();
        assert_eq!(row.get(1), Some("te\"st"));
        assert!(rdr.read_row().unwrap().is_none());
        assert_eq!(reports.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn flexible_widths_when_detection_disabled() {
        let options = Options { detect_column_count: false, ..Options::default() };
        let mut rdr = reader("a,b\n1\n2,3,4\n", options);
        assert_eq!(rdr.read_row().unwrap().unwrap().field_count(), 1);
        assert_eq!(rdr.read_row().unwrap().unwrap().field_count(), 3);
    }

    #[test]
    fn dictionary_uses_header_and_generated_names() {
        let mut rdr = reader("id,name\n1,ada,extra\n", Options {
            detect_column_count: false,
            ..Options::default()
        });
        let dict = rdr.read_dictionary().unwrap().unwrap();
        assert_eq!(dict["id"], Some("1".to_string()));
        assert_eq!(dict["name"], Some("ada".to_string()));
        assert_eq!(dict["Column2"], Some("extra".to_string()));
    }

    #[test]
    fn dictionary_marks_missing_fields() {
        let mut rdr = reader("id,name\n1\n", Options {
            detect_column_count: false,
            ..Options::default()
        });
        let dict = rdr.read_dictionary().unwrap().unwrap();
        assert_eq!(dict["id"], Some("1".to_string()));
        assert_eq!(dict["name"], None);
    }

    #[test]
    fn dictionary_without_header_generates_all_names() {
        let options = Options { has_header: false, ..Options::default() };
        let mut rdr = reader("x,y\n", options);
        let dict = rdr.read_dictionary().unwrap().unwrap();
        assert_eq!(dict["Column0"], Some("x".to_string()));
        assert_eq!(dict["Column1"], Some("y".to_string()));
    }

    #[test]
    fn blank_input_yields_no_rows_and_no_errors() {
        let options = Options { has_header: false, ..Options::default() };
        let mut rdr = reader("\n\n\r\n\n", options);
        assert!(rdr.read_row().unwrap().is_none());
    }

    #[test]
    fn detected_newline_is_first_observed() {
        let mut rdr = reader("a\r\n1\n2\r\n", Options::default());
        while rdr.read_row().unwrap().is_some() {}
        assert_eq!(rdr.detected_newline(), Some(Newline::CrLf));
    }

    #[test]
    fn position_tracks_lines() {
        let mut rdr = reader("a\n1\n2\n", Options::default());
        rdr.read_row().unwrap().unwrap();
        let pos = rdr.position();
        assert_eq!(pos.row(), 1);
        assert_eq!(pos.line(), 3);
    }
}
