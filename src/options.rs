use std::fmt;
use std::sync::Arc;

use csvflow_core::Trim;

use crate::convert::Culture;
use crate::error::{BadDataContext, Error, ErrorKind, Result};

/// How a reader reacts to bad data.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ReadMode {
    /// The first qualifying failure is fatal. The reader is left in an
    /// undefined state and should be dropped.
    #[default]
    Strict,
    /// Failures invoke the bad-data callback and reading continues with
    /// best-effort field contents.
    Lenient,
}

/// How header names are compared during lookup.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum NameMatch {
    /// Names must match exactly.
    CaseSensitive,
    /// Names match ignoring case.
    #[default]
    CaseInsensitive,
}

/// The callback invoked for every bad-data report under lenient reading.
pub type BadDataHandler = Arc<dyn Fn(&BadDataContext) + Send + Sync>;

/// Configuration for readers and writers.
///
/// An `Options` value is a plain record: fill in the fields you care about
/// and leave the rest at their defaults. It is validated once, when a reader
/// or writer is constructed, and is immutable from then on.
///
/// # Example
///
/// ```
/// use csvflow::{Options, Trim};
///
/// let options = Options {
///     delimiter: ';',
///     trim: Trim::Both,
///     ..Options::default()
/// };
/// assert_eq!(options.quote, '"');
/// ```
#[derive(Clone)]
pub struct Options {
    /// The field separator. The default is `,`.
    pub delimiter: char,
    /// The field enclosure character. The default is `"`.
    pub quote: char,
    /// The escape prefix recognized inside quoted fields. When it equals
    /// `quote` (the default), escaping uses the doubled-quote convention.
    pub escape: char,
    /// Whether the first row is a header row. The default is `true`.
    pub has_header: bool,
    /// The newline written between records. When `None` (the default), the
    /// platform newline is used. Reading always accepts `\n`, `\r` and
    /// `\r\n` regardless of this setting.
    pub newline: Option<String>,
    /// The trim policy applied to unquoted fields. The default is
    /// `Trim::None`.
    pub trim: Trim,
    /// Whether the first row fixes the expected field count, making rows of
    /// a different width bad data. The default is `true`.
    pub detect_column_count: bool,
    /// Whether blank lines are silently discarded. The default is `true`.
    pub ignore_blank_lines: bool,
    /// Strict or lenient error handling. The default is strict.
    pub read_mode: ReadMode,
    /// The number formatting conventions for value conversion.
    pub culture: Culture,
    /// How header names are compared. The default is case-insensitive.
    pub header_comparer: NameMatch,
    /// The size of the character read buffer. The default is 16384.
    pub char_buffer_size: usize,
    /// The size of the byte transcoding buffers. The default is 16384.
    pub byte_buffer_size: usize,
    /// Invoked for every bad-data report when reading leniently.
    pub bad_data_callback: Option<BadDataHandler>,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            delimiter: ',',
            quote: '"',
            escape: '"',
            has_header: true,
            newline: None,
            trim: Trim::None,
            detect_column_count: true,
            ignore_blank_lines: true,
            read_mode: ReadMode::Strict,
            culture: Culture::invariant(),
            header_comparer: NameMatch::CaseInsensitive,
            char_buffer_size: 16 * 1024,
            byte_buffer_size: 16 * 1024,
            bad_data_callback: None,
        }
    }
}

impl Options {
    /// Check this configuration, returning a `Config` error for anything a
    /// reader or writer could not honor. Called once at construction.
    pub fn validate(&self) -> Result<()> {
        if self.delimiter == '\0' {
            return Err(config("delimiter must not be NUL"));
        }
        if self.quote == '\0' {
            return Err(config("quote must not be NUL"));
        }
        if self.escape == '\0' {
            return Err(config("escape must not be NUL"));
        }
        if self.char_buffer_size == 0 {
            return Err(config("char_buffer_size must be positive"));
        }
        if self.byte_buffer_size == 0 {
            return Err(config("byte_buffer_size must be positive"));
        }
        if let Some(ref newline) = self.newline {
            if !matches!(newline.as_str(), "\n" | "\r" | "\r\n") {
                return Err(config("newline must be \\n, \\r or \\r\\n"));
            }
        }
        Ok(())
    }

    /// The newline to write between records: the explicit override, or the
    /// platform default.
    pub(crate) fn output_newline(&self) -> &str {
        match self.newline {
            Some(ref newline) => newline,
            None if cfg!(windows) => "\r\n",
            None => "\n",
        }
    }

    /// Normalize a header name per the configured comparer.
    pub(crate) fn normalize_name(&self, name: &str) -> String {
        match self.header_comparer {
            NameMatch::CaseSensitive => name.to_string(),
            NameMatch::CaseInsensitive => name.to_lowercase(),
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Options")
            .field("delimiter", &self.delimiter)
            .field("quote", &self.quote)
            .field("escape", &self.escape)
            .field("has_header", &self.has_header)
            .field("newline", &self.newline)
            .field("trim", &self.trim)
            .field("detect_column_count", &self.detect_column_count)
            .field("ignore_blank_lines", &self.ignore_blank_lines)
            .field("read_mode", &self.read_mode)
            .field("culture", &self.culture)
            .field("header_comparer", &self.header_comparer)
            .field("char_buffer_size", &self.char_buffer_size)
            .field("byte_buffer_size", &self.byte_buffer_size)
            .field("bad_data_callback", &self.bad_data_callback.as_ref().map(|_| "..."))
            .finish()
    }
}

fn config(msg: &str) -> Error {
    Error::new(ErrorKind::Config(msg.to_string()))
}
