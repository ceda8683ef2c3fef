use crate::buffer::{RowBuffer, Trim};
use crate::row::Row;

/// A newline variant observed in the input.
///
/// The parser records the first variant it sees; later variants are still
/// consumed but never overwrite the detection.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Newline {
    /// `\n`
    Lf,
    /// `\r`
    Cr,
    /// `\r\n`
    CrLf,
}

impl Newline {
    /// The newline as a string slice.
    pub fn as_str(&self) -> &'static str {
        match *self {
            Newline::Lf => "\n",
            Newline::Cr => "\r",
            Newline::CrLf => "\r\n",
        }
    }
}

/// The result of driving the parser over a chunk of input.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    /// The chunk was exhausted before a row was completed. Refill the input
    /// buffer and call [`Parser::advance`] again.
    NeedInput,
    /// A row was completed and can be inspected with [`Parser::row`]. The
    /// row's backing storage stays valid until the next call to `advance`.
    Row,
    /// All input has been parsed. Subsequent calls keep returning `End`.
    End,
}

/// A structural problem found while parsing.
///
/// Anomalies never abort the parse: the parser always finds *a* parse and
/// records what it had to tolerate. The caller decides whether an anomaly is
/// fatal.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Anomaly {
    /// What was tolerated.
    pub kind: AnomalyKind,
    /// The zero-based index of the field being read when it happened.
    pub field: u64,
    /// The one-based physical line it happened on.
    pub line: u64,
}

/// The kinds of structural anomaly the parser can tolerate.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AnomalyKind {
    /// A quote appeared in the middle of an unquoted field. The quote is
    /// kept as a literal character.
    StrayQuote,
    /// The input ended inside a quoted field. The field is completed with
    /// the characters read so far.
    UnterminatedQuote,
    /// A character other than a delimiter, newline or whitespace followed a
    /// closing quote. The character is kept as a literal.
    DanglingQuote,
}

impl AnomalyKind {
    /// A short human-readable description.
    pub fn message(&self) -> &'static str {
        match *self {
            AnomalyKind::StrayQuote => "unexpected quote in unquoted field",
            AnomalyKind::UnterminatedQuote => "unexpected end of input inside quoted field",
            AnomalyKind::DanglingQuote => "unexpected character after closing quote",
        }
    }
}

/// Builds a parser with various configuration knobs.
#[derive(Clone, Debug)]
pub struct ParserBuilder {
    delimiter: char,
    quote: char,
    escape: char,
    trim: Trim,
    ignore_blank_lines: bool,
}

impl Default for ParserBuilder {
    fn default() -> ParserBuilder {
        ParserBuilder {
            delimiter: ',',
            quote: '"',
            escape: '"',
            trim: Trim::None,
            ignore_blank_lines: true,
        }
    }
}

impl ParserBuilder {
    /// Create a new builder with the default configuration.
    pub fn new() -> ParserBuilder {
        ParserBuilder::default()
    }

    /// The field delimiter. The default is `,`.
    pub fn delimiter(&mut self, delimiter: char) -> &mut ParserBuilder {
        self.delimiter = delimiter;
        self
    }

    /// The quote character. The default is `"`.
    pub fn quote(&mut self, quote: char) -> &mut ParserBuilder {
        self.quote = quote;
        self
    }

    /// The escape character recognized inside quoted fields.
    ///
    /// When this equals the quote character (the default), escaping uses the
    /// doubled-quote convention. A doubled quote is recognized as an escape
    /// even when a distinct escape character is configured.
    pub fn escape(&mut self, escape: char) -> &mut ParserBuilder {
        self.escape = escape;
        self
    }

    /// The trim policy applied to unquoted fields. The default is `Trim::None`.
    pub fn trim(&mut self, trim: Trim) -> &mut ParserBuilder {
        self.trim = trim;
        self
    }

    /// Whether blank lines are silently discarded. The default is `true`.
    ///
    /// A blank line is a physical line that produces exactly one zero-length
    /// unquoted field.
    pub fn ignore_blank_lines(&mut self, yes: bool) -> &mut ParserBuilder {
        self.ignore_blank_lines = yes;
        self
    }

    /// Build a parser from this configuration.
    pub fn build(&self) -> Parser {
        Parser {
            delimiter: self.delimiter,
            quote: self.quote,
            escape: self.escape,
            trim: self.trim,
            ignore_blank_lines: self.ignore_blank_lines,
            in_quotes: false,
            after_closing_quote: false,
            field_was_quoted: false,
            pushback: None,
            row_buf: RowBuffer::new(),
            row: 0,
            line: 1,
            emitted_row: 0,
            emitted_line: 1,
            detected_newline: None,
            anomalies: Vec::new(),
            pending_reset: false,
            done: false,
        }
    }
}

/// The result of a one-character lookahead.
enum Look {
    /// The next character, consumed from the input.
    Char(char),
    /// There is no next character anywhere: the input is at its end.
    Eof,
    /// The chunk is exhausted but more input may follow.
    Pending,
}

/// A pull-based streaming CSV parser.
///
/// The parser consumes characters and produces rows of zero-copy field
/// slices over an internal pooled arena. It is driven incrementally: the
/// caller feeds chunks of characters to [`Parser::advance`] and refills on
/// [`Status::NeedInput`], so the same state machine serves blocking and
/// async callers; only the refill primitive differs.
///
/// Lookahead is at most one character in every transition, held in a single
/// pushback slot. When a lookahead lands on a chunk boundary the character
/// under inspection is parked in that slot and the transition re-runs
/// losslessly on the next call.
#[derive(Debug)]
pub struct Parser {
    delimiter: char,
    quote: char,
    escape: char,
    trim: Trim,
    ignore_blank_lines: bool,
    /// Inside a quoted field.
    in_quotes: bool,
    /// Just closed a quoted field; awaiting delimiter, newline or whitespace.
    after_closing_quote: bool,
    /// The next completed token should be marked quoted.
    field_was_quoted: bool,
    pushback: Option<char>,
    row_buf: RowBuffer,
    /// Zero-based index assigned to the next emitted row.
    row: u64,
    /// One-based number of the physical line being read.
    line: u64,
    emitted_row: u64,
    emitted_line: u64,
    detected_newline: Option<Newline>,
    anomalies: Vec<Anomaly>,
    /// The last emitted row is still borrowable; clear it on the next call.
    pending_reset: bool,
    done: bool,
}

impl Default for Parser {
    fn default() -> Parser {
        ParserBuilder::new().build()
    }
}

impl Parser {
    /// Create a parser with the default configuration.
    pub fn new() -> Parser {
        Parser::default()
    }

    /// Drive the parser over `input`.
    ///
    /// Returns the number of characters consumed and what happened. Pass
    /// `at_eof = true` once the input source is exhausted; the parser then
    /// finishes the pending row (if any) and reports [`Status::End`].
    ///
    /// After [`Status::Row`], the completed row is available from
    /// [`Parser::row`] until the next call.
    pub fn advance(&mut self, input: &[char], at_eof: bool) -> (usize, Status) {
        if self.pending_reset {
            self.row_buf.reset();
            self.pending_reset = false;
        }
        if self.done {
            return (0, Status::End);
        }
        let mut pos = 0;
        loop {
            let ch = match self.next_char(input, &mut pos) {
                Some(ch) => ch,
                None if at_eof => return (pos, self.finish_at_eof()),
                None => return (pos, Status::NeedInput),
            };

            if self.in_quotes {
                if ch == self.escape && self.escape != self.quote {
                    match self.look(input, &mut pos, at_eof) {
                        Look::Pending => return self.park(ch, pos),
                        Look::Char(next) if next == self.quote => {
                            self.row_buf.push(self.quote);
                        }
                        Look::Char(next) => {
                            self.pushback = Some(next);
                            self.row_buf.push(ch);
                        }
                        Look::Eof => self.row_buf.push(ch),
                    }
                } else if ch == self.quote {
                    match self.look(input, &mut pos, at_eof) {
                        Look::Pending => return self.park(ch, pos),
                        Look::Char(next) if next == self.quote => {
                            self.row_buf.push(self.quote);
                        }
                        Look::Char(next) => {
                            self.pushback = Some(next);
                            self.in_quotes = false;
                            self.after_closing_quote = true;
                        }
                        Look::Eof => {
                            self.in_quotes = false;
                            self.after_closing_quote = true;
                        }
                    }
                } else {
                    if ch == '\n' {
                        self.line += 1;
                    }
                    self.row_buf.push(ch);
                }
            } else if self.after_closing_quote {
                if ch == self.delimiter {
                    self.row_buf.complete_field(true, self.trim);
                    self.after_closing_quote = false;
                    self.field_was_quoted = false;
                } else if ch == '\r' || ch == '\n' {
                    if !self.consume_newline(ch, input, &mut pos, at_eof) {
                        return self.park(ch, pos);
                    }
                    self.row_buf.complete_field(true, self.trim);
                    self.after_closing_quote = false;
                    self.field_was_quoted = false;
                    if let Some(status) = self.end_of_line() {
                        return (pos, status);
                    }
                } else if ch.is_whitespace() {
                    // Dropped: quoted fields may be padded up to the next
                    // separator.
                } else {
                    self.note_anomaly(AnomalyKind::DanglingQuote);
                    self.row_buf.push(ch);
                    self.after_closing_quote = false;
                }
            } else {
                if ch == self.delimiter {
                    self.row_buf.complete_field(self.field_was_quoted, self.trim);
                    self.field_was_quoted = false;
                } else if ch == self.quote && self.row_buf.current_field_len() == 0 {
                    self.in_quotes = true;
                    self.field_was_quoted = true;
                } else if ch == self.quote {
                    self.note_anomaly(AnomalyKind::StrayQuote);
                    self.row_buf.push(ch);
                } else if ch == '\r' || ch == '\n' {
                    if !self.consume_newline(ch, input, &mut pos, at_eof) {
                        return self.park(ch, pos);
                    }
                    self.row_buf.complete_field(self.field_was_quoted, self.trim);
                    self.field_was_quoted = false;
                    if let Some(status) = self.end_of_line() {
                        return (pos, status);
                    }
                } else if ch.is_whitespace()
                    && self.row_buf.current_field_len() == 0
                    && self.trim.trims_start()
                {
                    // Dropped before it ever reaches the arena.
                } else {
                    self.row_buf.push(ch);
                }
            }
        }
    }

    /// The row completed by the last `advance` call that returned
    /// [`Status::Row`]. The view borrows this parser and is invalidated by
    /// the next call to `advance`.
    pub fn row(&self) -> Row<'_> {
        Row::new(&self.row_buf, self.emitted_row, self.emitted_line)
    }

    /// The number of fields in the row completed by the last `advance`.
    pub fn field_count(&self) -> usize {
        self.row_buf.len()
    }

    /// The current one-based line number.
    pub fn line(&self) -> u64 {
        self.line
    }

    /// The index that will be assigned to the next emitted row.
    pub fn pending_row_index(&self) -> u64 {
        self.row
    }

    /// Override the index assigned to the next emitted row.
    ///
    /// Callers that treat the first row specially (a header) use this to keep
    /// data rows zero-based.
    pub fn set_row_index(&mut self, row: u64) {
        self.row = row;
    }

    /// The first newline variant observed, if any newline was seen yet.
    pub fn detected_newline(&self) -> Option<Newline> {
        self.detected_newline
    }

    /// Take the anomalies recorded since the last call.
    pub fn take_anomalies(&mut self) -> Vec<Anomaly> {
        std::mem::take(&mut self.anomalies)
    }

    /// True if the parser has consumed all input.
    pub fn is_done(&self) -> bool {
        self.done
    }

    fn next_char(&mut self, input: &[char], pos: &mut usize) -> Option<char> {
        if let Some(ch) = self.pushback.take() {
            return Some(ch);
        }
        let ch = *input.get(*pos)?;
        *pos += 1;
        Some(ch)
    }

    fn look(&mut self, input: &[char], pos: &mut usize, at_eof: bool) -> Look {
        match input.get(*pos) {
            Some(&ch) => {
                *pos += 1;
                Look::Char(ch)
            }
            None if at_eof => Look::Eof,
            None => Look::Pending,
        }
    }

    /// Park the character whose transition could not finish in the pushback
    /// slot; the transition re-runs when more input arrives.
    fn park(&mut self, ch: char, pos: usize) -> (usize, Status) {
        self.pushback = Some(ch);
        (pos, Status::NeedInput)
    }

    /// Consume the remainder of a newline beginning with `first` and record
    /// the variant on first observation. Returns `false` if the lookahead
    /// after `\r` has to wait for more input.
    fn consume_newline(
        &mut self,
        first: char,
        input: &[char],
        pos: &mut usize,
        at_eof: bool,
    ) -> bool {
        let kind = if first == '\n' {
            Newline::Lf
        } else {
            match self.look(input, pos, at_eof) {
                Look::Pending => return false,
                Look::Char('\n') => Newline::CrLf,
                Look::Char(other) => {
                    self.pushback = Some(other);
                    Newline::Cr
                }
                Look::Eof => Newline::Cr,
            }
        };
        if self.detected_newline.is_none() {
            self.detected_newline = Some(kind);
        }
        true
    }

    /// Handle a completed physical line: discard it if it is an ignorable
    /// blank line, otherwise emit the row. The emitted row keeps the number
    /// of the line its terminator was on; the counter advances afterwards.
    fn end_of_line(&mut self) -> Option<Status> {
        if self.ignore_blank_lines && self.row_buf.is_blank_line() {
            self.row_buf.reset();
            self.line += 1;
            return None;
        }
        self.emitted_row = self.row;
        self.emitted_line = self.line;
        self.row += 1;
        self.line += 1;
        self.pending_reset = true;
        Some(Status::Row)
    }

    fn finish_at_eof(&mut self) -> Status {
        if self.in_quotes {
            self.note_anomaly(AnomalyKind::UnterminatedQuote);
            self.in_quotes = false;
        }
        let quoted = self.field_was_quoted || self.after_closing_quote;
        let has_pending =
            self.row_buf.current_field_len() > 0 || !self.row_buf.is_empty() || quoted;
        self.done = true;
        if !has_pending {
            return Status::End;
        }
        self.after_closing_quote = false;
        self.field_was_quoted = false;
        self.row_buf.complete_field(quoted, self.trim);
        if self.ignore_blank_lines && self.row_buf.is_blank_line() {
            self.row_buf.reset();
            return Status::End;
        }
        self.emitted_row = self.row;
        self.emitted_line = self.line;
        self.row += 1;
        self.pending_reset = true;
        Status::Row
    }

    fn note_anomaly(&mut self, kind: AnomalyKind) {
        self.anomalies.push(Anomaly {
            kind,
            field: self.row_buf.len() as u64,
            line: self.line,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Parse `data`, feeding the parser `chunk` characters at a time.
    fn parse_chunked(parser: &mut Parser, data: &str, chunk: usize) -> Vec<Vec<String>> {
        let chars: Vec<char> = data.chars().collect();
        let mut rows = Vec::new();
        let mut fed = 0;
        let mut window_end = chunk.min(chars.len());
        let mut at_eof = chars.is_empty();
        loop {
            let (n, status) = parser.advance(&chars[fed..window_end], at_eof);
            fed += n;
            match status {
                Status::NeedInput => {
                    if window_end == chars.len() {
                        at_eof = true;
                    } else {
                        window_end = (window_end + chunk).min(chars.len());
                    }
                }
                Status::Row => {
                    let row = parser.row();
                    rows.push(row.iter().map(str::to_string).collect());
                }
                Status::End => return rows,
            }
        }
    }

    macro_rules! parses_to {
        ($name:ident, $data:expr, $expected:expr) => {
            parses_to!($name, $data, $expected, |builder| builder);
        };
        ($name:ident, $data:expr, $expected:expr, $config:expr) => {
            #[test]
            fn $name() {
                let expected: Vec<Vec<&str>> = $expected;
                let expected: Vec<Vec<String>> = expected
                    .into_iter()
                    .map(|row| row.into_iter().map(str::to_string).collect())
                    .collect();
                // The parser must produce identical rows whether it sees the
                // input whole or one character at a time.
                for chunk in [1024, 1, 2, 3] {
                    let mut builder = ParserBuilder::new();
                    $config(&mut builder);
                    let mut parser = builder.build();
                    let got = parse_chunked(&mut parser, $data, chunk);
                    assert_eq!(expected, got, "chunk size {}", chunk);
                }
            }
        };
    }

    macro_rules! csv {
        ($([$($field:expr),*]),* $(,)?) => {
            vec![$(vec![$($field),*]),*]
        };
    }

    parses_to!(one_row_one_field, "a", csv![["a"]]);
    parses_to!(one_row_many_fields, "a,b,c", csv![["a", "b", "c"]]);
    parses_to!(one_row_trailing_comma, "a,b,", csv![["a", "b", ""]]);
    parses_to!(one_row_one_field_lf, "a\n", csv![["a"]]);
    parses_to!(one_row_many_fields_crlf, "a,b,c\r\n", csv![["a", "b", "c"]]);
    parses_to!(one_row_one_field_cr, "a\r", csv![["a"]]);
    parses_to!(many_rows_one_field, "a\nb", csv![["a"], ["b"]]);
    parses_to!(
        many_rows_many_fields,
        "a,b,c\nx,y,z",
        csv![["a", "b", "c"], ["x", "y", "z"]]
    );
    parses_to!(many_rows_one_field_cr, "a\rb\r", csv![["a"], ["b"]]);
    parses_to!(
        many_rows_many_fields_crlf,
        "a,b,c\r\nx,y,z\r\n",
        csv![["a", "b", "c"], ["x", "y", "z"]]
    );

    parses_to!(empty, "", csv![]);
    parses_to!(empty_lines, "\n\n\n\n", csv![]);
    parses_to!(
        empty_lines_interspersed,
        "\n\na,b\n\n\nx,y\n\n\nm,n\n",
        csv![["a", "b"], ["x", "y"], ["m", "n"]]
    );
    parses_to!(empty_lines_crlf, "\r\n\r\n\r\n\r\n", csv![]);
    parses_to!(empty_lines_mixed, "\r\n\n\r\n\n", csv![]);
    parses_to!(
        blank_lines_kept,
        "a\n\nb\n",
        csv![["a"], [""], ["b"]],
        |b: &mut ParserBuilder| {
            b.ignore_blank_lines(false);
        }
    );

    parses_to!(quote_empty, "\"\"", csv![[""]]);
    parses_to!(quote_lf, "\"\"\n", csv![[""]]);
    parses_to!(quote_space, "\" \"", csv![[" "]]);
    parses_to!(quote_inner_space, "\" a \"", csv![[" a "]]);
    parses_to!(quoted_delimiter, "1,\"Ada,Lovelace\"", csv![["1", "Ada,Lovelace"]]);
    parses_to!(
        quoted_newline,
        "1,\"line1\nline2\"",
        csv![["1", "line1\nline2"]]
    );
    parses_to!(doubled_quote, "\"a \"\"quote\"\" b\"", csv![["a \"quote\" b"]]);
    parses_to!(
        distinct_escape,
        "1;'Ada;Lovelace';'It\\'s fine'",
        csv![["1", "Ada;Lovelace", "It's fine"]],
        |b: &mut ParserBuilder| {
            b.delimiter(';').quote('\'').escape('\\');
        }
    );
    parses_to!(
        distinct_escape_keeps_doubled_quote,
        "'a ''b'' c'",
        csv![["a 'b' c"]],
        |b: &mut ParserBuilder| {
            b.quote('\'').escape('\\');
        }
    );
    parses_to!(
        distinct_escape_literal,
        "'a\\b'",
        csv![["a\\b"]],
        |b: &mut ParserBuilder| {
            b.quote('\'').escape('\\');
        }
    );

    parses_to!(stray_quote_literal, "1,te\"st", csv![["1", "te\"st"]]);
    parses_to!(unterminated_quote, "\"abc", csv![["abc"]]);
    parses_to!(dangling_quote, "\"abc\"def", csv![["abcdef"]]);
    parses_to!(quoted_padded, "\"a\"  ,b", csv![["a", "b"]]);

    parses_to!(delimiter_tab, "a\tb", csv![["a", "b"]], |b: &mut ParserBuilder| {
        b.delimiter('\t');
    });

    parses_to!(
        trim_both,
        "  a  ,  b  \n",
        csv![["a", "b"]],
        |b: &mut ParserBuilder| {
            b.trim(Trim::Both);
        }
    );
    parses_to!(
        trim_start_only,
        "  a  ,  b  ",
        csv![["a  ", "b  "]],
        |b: &mut ParserBuilder| {
            b.trim(Trim::Start);
        }
    );
    parses_to!(
        trim_lets_quotes_open_after_space,
        "  \"a b\"",
        csv![["a b"]],
        |b: &mut ParserBuilder| {
            b.trim(Trim::Both);
        }
    );
    parses_to!(no_trim_keeps_outer_space, "  \"a\"  ", csv![["  \"a\"  "]]);

    #[test]
    fn stray_quote_reports_anomaly_once() {
        let mut parser = Parser::new();
        let rows = parse_chunked(&mut parser, "1,te\"st\n", 1024);
        assert_eq!(rows, vec![vec!["1".to_string(), "te\"st".to_string()]]);
        let anomalies = parser.take_anomalies();
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].kind, AnomalyKind::StrayQuote);
        assert_eq!(anomalies[0].field, 1);
        assert!(parser.take_anomalies().is_empty());
    }

    #[test]
    fn unterminated_quote_reports_anomaly() {
        let mut parser = Parser::new();
        let rows = parse_chunked(&mut parser, "a,\"open", 1024);
        assert_eq!(rows.len(), 1);
        let anomalies = parser.take_anomalies();
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].kind, AnomalyKind::UnterminatedQuote);
    }

    #[test]
    fn detected_newline_is_stable() {
        let mut parser = Parser::new();
        parse_chunked(&mut parser, "a\r\n1\n2\r\n", 1024);
        assert_eq!(parser.detected_newline(), Some(Newline::CrLf));

        let mut parser = Parser::new();
        parse_chunked(&mut parser, "a\n1\r\n", 1024);
        assert_eq!(parser.detected_newline(), Some(Newline::Lf));
    }

    #[test]
    fn detected_newline_survives_chunk_boundary() {
        // The `\r` lands exactly on a chunk boundary; the parser must park
        // it and still detect CRLF.
        let mut parser = Parser::new();
        parse_chunked(&mut parser, "a\r\nb\n", 2);
        assert_eq!(parser.detected_newline(), Some(Newline::CrLf));
    }

    #[test]
    fn line_numbers_span_embedded_newlines() {
        let mut parser = Parser::new();
        let chars: Vec<char> = "id,notes\n1,\"line1\nline2\"\n".chars().collect();

        let (n, status) = parser.advance(&chars, true);
        assert_eq!(status, Status::Row);
        assert_eq!(parser.row().line_number(), 1);
        assert_eq!(parser.row().row_index(), 0);

        let (_, status) = parser.advance(&chars[n..], true);
        assert_eq!(status, Status::Row);
        let row = parser.row();
        assert_eq!(row.get(1), Some("line1\nline2"));
        assert_eq!(row.line_number(), 3);
        assert_eq!(row.row_index(), 1);
    }

    #[test]
    fn quoted_tokens_are_marked() {
        let mut parser = Parser::new();
        let chars: Vec<char> = "1,\"Ada,Lovelace\"\n".chars().collect();
        let (_, status) = parser.advance(&chars, true);
        assert_eq!(status, Status::Row);
        let row = parser.row();
        assert!(!row.was_quoted(0));
        assert!(row.was_quoted(1));
    }

    #[test]
    fn row_index_override() {
        let mut parser = Parser::new();
        let chars: Vec<char> = "h\nx\n".chars().collect();
        let (n, status) = parser.advance(&chars, true);
        assert_eq!(status, Status::Row);
        assert_eq!(parser.row().row_index(), 0);
        parser.set_row_index(0);
        let (_, status) = parser.advance(&chars[n..], true);
        assert_eq!(status, Status::Row);
        assert_eq!(parser.row().row_index(), 0);
    }

    #[test]
    fn end_is_sticky() {
        let mut parser = Parser::new();
        let chars: Vec<char> = "a\n".chars().collect();
        let (n, status) = parser.advance(&chars, true);
        assert_eq!(status, Status::Row);
        assert_eq!(parser.advance(&chars[n..], true), (0, Status::End));
        assert_eq!(parser.advance(&[], true), (0, Status::End));
        assert!(parser.is_done());
    }
}
