use std::str;

use memchr::{memchr, memchr3};

/// Builds an emitter with various configuration knobs.
#[derive(Clone, Debug)]
pub struct EmitterBuilder {
    delimiter: char,
    quote: char,
    escape: char,
}

impl Default for EmitterBuilder {
    fn default() -> EmitterBuilder {
        EmitterBuilder { delimiter: ',', quote: '"', escape: '"' }
    }
}

impl EmitterBuilder {
    /// Create a new builder with the default configuration.
    pub fn new() -> EmitterBuilder {
        EmitterBuilder::default()
    }

    /// The field delimiter. The default is `,`.
    pub fn delimiter(&mut self, delimiter: char) -> &mut EmitterBuilder {
        self.delimiter = delimiter;
        self
    }

    /// The quote character. The default is `"`.
    pub fn quote(&mut self, quote: char) -> &mut EmitterBuilder {
        self.quote = quote;
        self
    }

    /// The escape character emitted before each quote inside a quoted field.
    ///
    /// When this equals the quote character (the default), the escaped form
    /// is the doubled quote.
    pub fn escape(&mut self, escape: char) -> &mut EmitterBuilder {
        self.escape = escape;
        self
    }

    /// Build an emitter from this configuration.
    pub fn build(&self) -> Emitter {
        Emitter {
            delimiter: self.delimiter,
            quote: self.quote,
            escape: self.escape,
        }
    }
}

/// Decides quoting and escaping for outgoing fields.
///
/// The emitter never materializes an escaped copy of a field: callers write
/// the maximal quote-free runs produced by [`Emitter::escape_runs`] directly
/// to their sink, emitting the two-character escape sequence between runs.
#[derive(Clone, Debug)]
pub struct Emitter {
    delimiter: char,
    quote: char,
    escape: char,
}

impl Default for Emitter {
    fn default() -> Emitter {
        EmitterBuilder::new().build()
    }
}

impl Emitter {
    /// Create an emitter with the default configuration.
    pub fn new() -> Emitter {
        Emitter::default()
    }

    /// The configured delimiter.
    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// The configured quote character.
    pub fn quote(&self) -> char {
        self.quote
    }

    /// The configured escape character.
    pub fn escape(&self) -> char {
        self.escape
    }

    /// Whether `field` must be quoted to survive a round trip.
    ///
    /// A field needs quotes when it is non-empty and starts or ends with
    /// whitespace, or when it contains the delimiter, the quote character,
    /// `\r` or `\n`.
    pub fn needs_quotes(&self, field: &str) -> bool {
        let mut chars = field.chars();
        let first = match chars.next() {
            Some(first) => first,
            None => return false,
        };
        let last = chars.next_back().unwrap_or(first);
        if first.is_whitespace() || last.is_whitespace() {
            return true;
        }
        // A reader treats `\r` and `\n` as terminators no matter which
        // newline this writer emits, so both always force quotes.
        if self.delimiter.is_ascii() && self.quote.is_ascii() {
            let bytes = field.as_bytes();
            memchr3(self.delimiter as u8, self.quote as u8, b'\r', bytes).is_some()
                || memchr(b'\n', bytes).is_some()
        } else {
            field
                .chars()
                .any(|ch| ch == self.delimiter || ch == self.quote || ch == '\r' || ch == '\n')
        }
    }

    /// Split `field` into maximal runs free of the quote character.
    ///
    /// Writing the runs separated by the escape character followed by the
    /// quote character reproduces the field in escaped form. A field without
    /// quotes yields exactly one run.
    pub fn escape_runs<'f>(&self, field: &'f str) -> EscapeRuns<'f> {
        EscapeRuns(field.split(self.quote))
    }
}

/// An iterator over the quote-free runs of a field.
///
/// Returned by [`Emitter::escape_runs`].
pub struct EscapeRuns<'f>(str::Split<'f, char>);

impl<'f> Iterator for EscapeRuns<'f> {
    type Item = &'f str;

    fn next(&mut self) -> Option<&'f str> {
        self.0.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_fields_need_no_quotes() {
        let emitter = Emitter::new();
        assert!(!emitter.needs_quotes("abc"));
        assert!(!emitter.needs_quotes(""));
        assert!(!emitter.needs_quotes("a b c"));
    }

    #[test]
    fn special_characters_force_quotes() {
        let emitter = Emitter::new();
        assert!(emitter.needs_quotes("a,b"));
        assert!(emitter.needs_quotes("a\"b"));
        assert!(emitter.needs_quotes("a\nb"));
        assert!(emitter.needs_quotes("a\rb"));
    }

    #[test]
    fn boundary_whitespace_forces_quotes() {
        let emitter = Emitter::new();
        assert!(emitter.needs_quotes(" a"));
        assert!(emitter.needs_quotes("a "));
        assert!(emitter.needs_quotes("\tab"));
        assert!(emitter.needs_quotes(" "));
    }

    #[test]
    fn custom_delimiter_is_honored() {
        let emitter = EmitterBuilder::new().delimiter(';').build();
        assert!(emitter.needs_quotes("a;b"));
        assert!(!emitter.needs_quotes("a,b"));
    }

    #[test]
    fn non_ascii_quote_falls_back_to_char_scan() {
        let emitter = EmitterBuilder::new().delimiter('√').quote('«').build();
        assert!(emitter.needs_quotes("a√b"));
        assert!(emitter.needs_quotes("a«b"));
        assert!(!emitter.needs_quotes("plain"));
    }

    #[test]
    fn escape_runs_split_on_quotes() {
        let emitter = Emitter::new();
        let runs: Vec<&str> = emitter.escape_runs("a \"quote\" b").collect();
        assert_eq!(runs, vec!["a ", "quote", " b"]);

        let runs: Vec<&str> = emitter.escape_runs("no quotes").collect();
        assert_eq!(runs, vec!["no quotes"]);

        let runs: Vec<&str> = emitter.escape_runs("\"").collect();
        assert_eq!(runs, vec!["", ""]);
    }
}
