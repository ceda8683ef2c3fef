use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::result;

use csvflow_core::AnomalyKind;

use crate::de::DeserializeError;

/// A type alias for `Result<T, csvflow::Error>`.
pub type Result<T> = result::Result<T, Error>;

/// An error that can occur when processing CSV data.
///
/// This error can happen when reading or writing CSV data and is kept to one
/// machine word; the payload lives on the heap.
#[derive(Debug)]
pub struct Error(Box<ErrorKind>);

impl Error {
    /// A crate private constructor for `Error`.
    pub(crate) fn new(kind: ErrorKind) -> Error {
        Error(Box::new(kind))
    }

    /// Return the specific type of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.0
    }

    /// Unwrap this error into its underlying type.
    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    /// Returns true if this is an I/O error.
    ///
    /// If this is true, the underlying `ErrorKind` is guaranteed to be
    /// `ErrorKind::Io`.
    pub fn is_io_error(&self) -> bool {
        matches!(*self.0, ErrorKind::Io(_))
    }

    /// Return the position this error occurred at, if the error carries one.
    pub fn position(&self) -> Option<&Position> {
        match *self.0 {
            ErrorKind::Parse { ref pos, .. }
            | ErrorKind::UnequalLengths { ref pos, .. }
            | ErrorKind::Convert { ref pos, .. }
            | ErrorKind::Deserialize { ref pos, .. } => Some(pos),
            _ => None,
        }
    }
}

/// The specific type of an error.
#[derive(Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// An invalid configuration was rejected when a reader or writer was
    /// constructed.
    Config(String),
    /// An I/O error that occurred while reading or writing CSV data.
    Io(io::Error),
    /// A structural problem in the input, fatal under strict reading.
    Parse {
        /// Where the problem was found.
        pos: Position,
        /// What was found.
        kind: AnomalyKind,
    },
    /// A row was found with a number of fields different from the width
    /// established by the first row. Only occurs when column-count
    /// detection is enabled.
    UnequalLengths {
        /// The position of the offending row. The field index carries the
        /// actual field count of that row.
        pos: Position,
        /// The expected number of fields.
        expected: u64,
        /// The number of fields found.
        got: u64,
    },
    /// A field's contents could not be converted to the requested type.
    Convert {
        /// Where the field was.
        pos: Position,
        /// Why the conversion failed.
        message: String,
    },
    /// An error that occurred while deserializing a row into a record.
    Deserialize {
        /// The position of the row.
        pos: Position,
        /// The deserialization error.
        err: DeserializeError,
    },
    /// An error that occurred while serializing a record into a row.
    Serialize(String),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::new(ErrorKind::Io(err))
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        io::Error::new(io::ErrorKind::Other, err)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match *self.0 {
            ErrorKind::Io(ref err) => Some(err),
            ErrorKind::Deserialize { ref err, .. } => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self.0 {
            ErrorKind::Config(ref msg) => {
                write!(f, "CSV configuration error: {}", msg)
            }
            ErrorKind::Io(ref err) => err.fmt(f),
            ErrorKind::Parse { ref pos, kind } => {
                write!(
                    f,
                    "CSV parse error: row {} (line {}, field {}): {}",
                    pos.row(),
                    pos.line(),
                    pos.field(),
                    kind.message()
                )
            }
            ErrorKind::UnequalLengths { ref pos, expected, got } => {
                write!(
                    f,
                    "CSV error: row {} (line {}): \
                     found row with {} fields, but the first row has {} fields",
                    pos.row(),
                    pos.line(),
                    got,
                    expected
                )
            }
            ErrorKind::Convert { ref pos, ref message } => {
                write!(
                    f,
                    "CSV conversion error: row {} (line {}, field {}): {}",
                    pos.row(),
                    pos.line(),
                    pos.field(),
                    message
                )
            }
            ErrorKind::Deserialize { ref pos, ref err } => {
                write!(
                    f,
                    "CSV deserialize error: row {} (line {}): {}",
                    pos.row(),
                    pos.line(),
                    err
                )
            }
            ErrorKind::Serialize(ref err) => {
                write!(f, "CSV write error: {}", err)
            }
        }
    }
}

/// The position of an error or a bad-data report.
///
/// `row` is the zero-based index counting data rows only (a header row is
/// excluded), `line` is the one-based physical line number, and `field` is
/// the zero-based field index the report refers to.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Position {
    row: u64,
    line: u64,
    field: u64,
}

impl Position {
    /// Create a new position.
    pub fn new(row: u64, line: u64, field: u64) -> Position {
        Position { row, line, field }
    }

    /// The zero-based data row index.
    pub fn row(&self) -> u64 {
        self.row
    }

    /// The one-based physical line number.
    pub fn line(&self) -> u64 {
        self.line
    }

    /// The zero-based field index.
    pub fn field(&self) -> u64 {
        self.field
    }
}

/// What a lenient reader hands to the bad-data callback.
#[derive(Clone, Debug)]
pub struct BadDataContext {
    /// Where the bad data was found.
    pub position: Position,
    /// A short description of the problem.
    pub message: String,
    /// The contents of the affected field, best effort.
    pub raw: String,
}

impl fmt::Display for BadDataContext {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "bad data at row {} (line {}, field {}): {}",
            self.position.row(),
            self.position.line(),
            self.position.field(),
            self.message
        )
    }
}
